//! Round trip contracts
//!
//! Converting to source format and back reproduces a structurally equal
//! document. Entry order inside repeated groups is not part of the contract.

use crate::common::*;
use metaform::domain::value_objects::TargetFormat;
use metaform::xml::XmlValue;

fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

#[test]
fn contract_object_round_trips_through_source_format() {
    let project = TestProject::new();
    project.write("mdapi/objects/Account.object", ACCOUNT_OBJECT);

    project.convert_dir("mdapi", "source", TargetFormat::Source);
    assert_eq!(
        project.files_under("source"),
        vec![
            "main/default/objects/Account/Account.object-meta.xml",
            "main/default/objects/Account/fields/Rating__c.field-meta.xml",
            "main/default/objects/Account/fields/Tier__c.field-meta.xml",
            "main/default/objects/Account/validationRules/Needs_Rating.validationRule-meta.xml",
        ]
    );

    project.convert_dir("source", "back", TargetFormat::Metadata);
    assert_eq!(project.files_under("back"), vec!["objects/Account.object"]);

    let original = project.parse("mdapi/objects/Account.object");
    let recomposed = project.parse("back/objects/Account.object");
    let (original, recomposed) = (body(&original, "CustomObject"), body(&recomposed, "CustomObject"));

    assert_eq!(recomposed["label"], XmlValue::text("Account"));
    assert_eq!(
        sorted(names(recomposed, "fields", "fullName")),
        sorted(names(original, "fields", "fullName"))
    );
    assert_eq!(
        names(recomposed, "validationRules", "fullName"),
        vec!["Needs_Rating".to_string()]
    );
    assert_eq!(
        sorted(names(recomposed, "fields", "type")),
        vec!["Picklist".to_string(), "Text".to_string()]
    );
}

#[test]
fn contract_decomposed_parent_keeps_only_its_own_values() {
    let project = TestProject::new();
    project.write("mdapi/objects/Account.object", ACCOUNT_OBJECT);
    project.convert_dir("mdapi", "source", TargetFormat::Source);

    let parent = project.parse("source/main/default/objects/Account/Account.object-meta.xml");
    let parent = body(&parent, "CustomObject");
    assert_eq!(parent["label"], XmlValue::text("Account"));
    assert!(!parent.contains_key("fields"));
    assert!(!parent.contains_key("validationRules"));

    let field = project.parse("source/main/default/objects/Account/fields/Tier__c.field-meta.xml");
    let field = body(&field, "CustomField");
    assert_eq!(field["fullName"], XmlValue::text("Tier__c"));
    assert_eq!(field["type"], XmlValue::text("Picklist"));
}

#[test]
fn contract_labels_round_trip_through_source_format() {
    let project = TestProject::new();
    project.write("mdapi/labels/CustomLabels.labels", LABELS);

    project.convert_dir("mdapi", "source", TargetFormat::Source);
    assert_eq!(
        project.files_under("source"),
        vec!["main/default/labels/CustomLabels.labels-meta.xml"]
    );

    project.convert_dir("source", "back", TargetFormat::Metadata);
    let labels = project.parse("back/labels/CustomLabels.labels");
    assert_eq!(
        sorted(names(body(&labels, "CustomLabels"), "labels", "fullName")),
        vec!["Farewell".to_string(), "Greeting".to_string()]
    );
}

#[test]
fn contract_content_files_are_copied_unchanged() {
    let project = TestProject::new();
    let class = "public class Util {\n    // keep me\n}\n";
    project.write("mdapi/classes/Util.cls", class);
    project.write("mdapi/classes/Util.cls-meta.xml", APEX_CLASS_META);

    project.convert_dir("mdapi", "source", TargetFormat::Source);
    assert_eq!(project.read("source/main/default/classes/Util.cls"), class);

    project.convert_dir("source", "back", TargetFormat::Metadata);
    assert_eq!(project.read("back/classes/Util.cls"), class);
    assert!(project.exists("back/classes/Util.cls-meta.xml"));
}

/// A child that only makes sense next to its parent still gets the parent
/// file, carrying nothing but the namespace marker.
#[test]
fn contract_unaddressable_child_is_anchored_by_its_parent() {
    let project = TestProject::new();
    project.write(
        "mdapi/bots/Helper.bot",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Bot xmlns="http://soap.sforce.com/2006/04/metadata">
    <botVersions>
        <fullName>v1</fullName>
        <entryDialog>Welcome</entryDialog>
    </botVersions>
</Bot>
"#,
    );

    project.convert_dir("mdapi", "source", TargetFormat::Source);

    let parent = project.parse("source/main/default/bots/Helper/Helper.bot-meta.xml");
    let parent = body(&parent, "Bot");
    assert_eq!(
        parent.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["@_xmlns"]
    );
    assert!(project.exists("source/main/default/bots/Helper/v1.botVersion-meta.xml"));
}
