//! Merge contracts
//!
//! Converting into an existing project updates files where they already
//! live and only places new files under the default package directory.

use std::sync::Arc;

use crate::common::*;
use metaform::infrastructure::default_registry;
use metaform::xml::XmlValue;

const INCOMING_ACCOUNT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomObject xmlns="http://soap.sforce.com/2006/04/metadata">
    <fields>
        <fullName>Rating__c</fullName>
        <label>Customer Rating</label>
    </fields>
    <fields>
        <fullName>Tier__c</fullName>
        <label>Tier</label>
    </fields>
</CustomObject>
"#;

const EXISTING_ACCOUNT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomObject xmlns="http://soap.sforce.com/2006/04/metadata">
    <label>Account</label>
</CustomObject>
"#;

const EXISTING_RATING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomField xmlns="http://soap.sforce.com/2006/04/metadata">
    <fullName>Rating__c</fullName>
    <label>Rating</label>
</CustomField>
"#;

fn project_with_account() -> TestProject {
    let project = TestProject::new();
    project.write("mdapi/objects/Account.object", INCOMING_ACCOUNT);
    project.write(
        "proj/app/main/default/objects/Account/Account.object-meta.xml",
        EXISTING_ACCOUNT,
    );
    project.write(
        "proj/app/main/default/objects/Account/fields/Rating__c.field-meta.xml",
        EXISTING_RATING,
    );
    project
}

/// CONTRACT: an existing parent with real values is kept when the incoming
/// document has nothing but children.
#[test]
fn contract_merge_keeps_existing_parent_when_remainder_is_empty() {
    let project = project_with_account();
    let registry = Arc::new(default_registry().unwrap());

    let result = project.merge_into(&registry, "mdapi", "proj", "proj/app");

    let parent = project.path("proj/app/main/default/objects/Account/Account.object-meta.xml");
    assert!(!result.written.contains(&parent), "{:?}", result.written);
    assert_eq!(
        project.read("proj/app/main/default/objects/Account/Account.object-meta.xml"),
        EXISTING_ACCOUNT
    );
}

/// CONTRACT: children found in the project are rewritten in place, new
/// ones go under the default directory.
#[test]
fn contract_merge_updates_children_in_place() {
    let project = project_with_account();
    let registry = Arc::new(default_registry().unwrap());

    let result = project.merge_into(&registry, "mdapi", "proj", "proj/app");

    let rating = project.parse("proj/app/main/default/objects/Account/fields/Rating__c.field-meta.xml");
    assert_eq!(
        body(&rating, "CustomField")["label"],
        XmlValue::text("Customer Rating")
    );
    let tier = project.path("proj/app/main/default/objects/Account/fields/Tier__c.field-meta.xml");
    assert!(tier.is_file());
    assert!(result.written.contains(&tier));
    assert!(result.deleted.is_empty());
}

/// CONTRACT: stale children are deleted on merge only when no child type of
/// the parent is addressable on its own.
#[test]
fn contract_stale_children_deleted_only_for_unaddressable_types() {
    let project = TestProject::new();
    let registry = Arc::new(default_registry().unwrap());

    // Workflow children are not addressable
    project.write(
        "mdapi/workflows/Case.workflow",
        r#"<Workflow xmlns="http://soap.sforce.com/2006/04/metadata">
    <alerts><fullName>Keep</fullName><description>still here</description></alerts>
</Workflow>"#,
    );
    project.write(
        "proj/app/main/default/workflows/Case/Case.workflow-meta.xml",
        r#"<Workflow xmlns="http://soap.sforce.com/2006/04/metadata"></Workflow>"#,
    );
    project.write(
        "proj/app/main/default/workflows/Case/Keep.alert-meta.xml",
        r#"<WorkflowAlert xmlns="http://soap.sforce.com/2006/04/metadata"><fullName>Keep</fullName></WorkflowAlert>"#,
    );
    project.write(
        "proj/app/main/default/workflows/Case/Gone.alert-meta.xml",
        r#"<WorkflowAlert xmlns="http://soap.sforce.com/2006/04/metadata"><fullName>Gone</fullName></WorkflowAlert>"#,
    );

    // Custom fields are addressable
    project.write("mdapi/objects/Account.object", INCOMING_ACCOUNT);
    project.write(
        "proj/app/main/default/objects/Account/Account.object-meta.xml",
        EXISTING_ACCOUNT,
    );
    project.write(
        "proj/app/main/default/objects/Account/fields/Old__c.field-meta.xml",
        r#"<CustomField xmlns="http://soap.sforce.com/2006/04/metadata"><fullName>Old__c</fullName></CustomField>"#,
    );

    let result = project.merge_into(&registry, "mdapi", "proj", "proj/app");

    assert_eq!(
        result.deleted,
        vec![project.path("proj/app/main/default/workflows/Case/Gone.alert-meta.xml")]
    );
    assert!(project.exists("proj/app/main/default/workflows/Case/Keep.alert-meta.xml"));
    assert!(project.exists("proj/app/main/default/objects/Account/fields/Old__c.field-meta.xml"));
}

/// CONTRACT: every label lands in exactly one label file, the one that
/// already holds it, or the file under the default directory when new.
#[test]
fn contract_labels_are_partitioned_across_existing_files() {
    let project = TestProject::new();
    let registry = Arc::new(default_registry().unwrap());

    project.write(
        "mdapi/labels/CustomLabels.labels",
        r#"<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels><fullName>Greeting</fullName><value>Hello again</value></labels>
    <labels><fullName>Shared</fullName><value>Updated</value></labels>
    <labels><fullName>Fresh</fullName><value>New</value></labels>
</CustomLabels>"#,
    );
    project.write(
        "proj/app/main/default/labels/CustomLabels.labels-meta.xml",
        r#"<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels><fullName>Greeting</fullName><value>Hello</value></labels>
</CustomLabels>"#,
    );
    project.write(
        "proj/shared/main/default/labels/CustomLabels.labels-meta.xml",
        r#"<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels><fullName>Shared</fullName><value>Old</value></labels>
</CustomLabels>"#,
    );

    // Only the app package is a merge target; the shared file is discovered
    let components = project.resolve(&registry, "mdapi");
    let output = metaform::OutputConfig::Merge {
        merge_with: project.resolve(&registry, "proj/app"),
        default_directory: project.path("proj/app"),
        project_root: Some(project.path("proj")),
    };
    metaform::MetadataConverter::new(Arc::clone(&registry))
        .convert(
            components,
            &metaform::ConvertOptions::new(metaform::TargetFormat::Source, output),
        )
        .unwrap();

    let app = project.parse("proj/app/main/default/labels/CustomLabels.labels-meta.xml");
    let shared = project.parse("proj/shared/main/default/labels/CustomLabels.labels-meta.xml");
    let app = body(&app, "CustomLabels");
    let shared = body(&shared, "CustomLabels");

    assert_eq!(
        names(app, "labels", "fullName"),
        vec!["Greeting".to_string(), "Fresh".to_string()]
    );
    assert_eq!(names(shared, "labels", "fullName"), vec!["Shared".to_string()]);
    assert_eq!(names(shared, "labels", "value"), vec!["Updated".to_string()]);
    assert_eq!(names(app, "labels", "value")[0], "Hello again");
}

/// CONTRACT: merging into a project without a matching component places
/// everything under the default directory.
#[test]
fn contract_merge_into_empty_project_uses_default_directory() {
    let project = TestProject::new();
    let registry = Arc::new(default_registry().unwrap());
    project.write("mdapi/labels/CustomLabels.labels", LABELS);
    project.write("proj/app/.keep", "");

    project.merge_into(&registry, "mdapi", "proj", "proj/app");

    assert_eq!(
        project.files_under("proj/app"),
        vec![".keep", "main/default/labels/CustomLabels.labels-meta.xml"]
    );
}
