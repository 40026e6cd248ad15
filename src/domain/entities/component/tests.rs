use super::*;
use crate::domain::services::FileSelector;
use crate::domain::value_objects::Replacement;
use crate::infrastructure::fs::VirtualTree;
use crate::infrastructure::registry::default_registry;

const LABELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels>
        <fullName>Hello</fullName>
        <value>Hi</value>
    </labels>
    <labels>
        <fullName>Bye</fullName>
        <value>Ciao</value>
    </labels>
</CustomLabels>
"#;

fn registry() -> Registry {
    default_registry().unwrap()
}

fn object(tree: VirtualTree) -> SourceComponent {
    SourceComponent::new(
        "Account",
        registry().type_by_id("customobject").unwrap(),
        Arc::new(tree),
    )
    .with_xml("objects/Account/Account.object-meta.xml")
    .with_content("objects/Account")
}

#[test]
fn full_name_joins_parent_unless_ignored() {
    let tree = VirtualTree::from_files([
        ("objects/Account/Account.object-meta.xml", "<CustomObject/>"),
        ("objects/Account/fields/Rating__c.field-meta.xml", "<CustomField/>"),
    ]);
    let parent = object(tree);
    let children = parent.children(&registry()).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].full_name(), "Account.Rating__c");
    assert_eq!(children[0].key().as_str(), "customfield:Account.Rating__c");

    let labels_tree = VirtualTree::from_files([("labels/CustomLabels.labels-meta.xml", LABELS)]);
    let labels = SourceComponent::new(
        "CustomLabels",
        registry().type_by_id("customlabels").unwrap(),
        Arc::new(labels_tree),
    )
    .with_xml("labels/CustomLabels.labels-meta.xml");
    let children = labels.children(&registry()).unwrap();
    assert_eq!(children[0].full_name(), "Hello");
}

#[test]
fn decomposed_children_skip_unknown_suffixes() {
    let tree = VirtualTree::from_files([
        ("objects/Account/Account.object-meta.xml", "<CustomObject/>"),
        ("objects/Account/fields/A__c.field-meta.xml", "<CustomField/>"),
        ("objects/Account/notes/readme.txt", "notes"),
        ("objects/Account/other/X.mystery-meta.xml", "<Mystery/>"),
    ]);
    let children = object(tree).children(&registry()).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "A__c");
    assert!(children[0].parent.is_some());
}

#[test]
fn decomposed_children_reject_foreign_types() {
    let tree = VirtualTree::from_files([
        ("objects/Account/Account.object-meta.xml", "<CustomObject/>"),
        ("objects/Account/classes/A.cls-meta.xml", "<ApexClass/>"),
    ]);
    let err = object(tree).children(&registry()).unwrap_err();
    assert!(matches!(err, MetaformError::UnexpectedChildType { .. }));
}

#[test]
fn ignored_child_files_are_not_children() {
    let tree = VirtualTree::from_files([
        ("objects/Account/Account.object-meta.xml", "<CustomObject/>"),
        ("objects/Account/fields/A__c.field-meta.xml", "<CustomField/>"),
        ("objects/Account/fields/B__c.field-meta.xml", "<CustomField/>"),
    ]);
    let ignore =
        ForceIgnore::from_content(Path::new(""), Path::new(".forceignore"), "**/B__c.*\n").unwrap();
    let parent = object(tree).with_force_ignore(Arc::new(ignore));
    let children = parent.children(&registry()).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "A__c");
}

#[test]
fn non_decomposed_children_come_from_the_document() {
    let tree = VirtualTree::from_files([("labels/CustomLabels.labels-meta.xml", LABELS)]);
    let labels = SourceComponent::new(
        "CustomLabels",
        registry().type_by_id("customlabels").unwrap(),
        Arc::new(tree),
    )
    .with_xml("labels/CustomLabels.labels-meta.xml");

    let children = labels.children(&registry()).unwrap();
    let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Hello", "Bye"]);

    let doc = children[1].parse_xml().unwrap().unwrap();
    let body = doc["CustomLabel"].as_object().unwrap();
    assert_eq!(body["value"], XmlValue::text("Ciao"));
    assert!(body.contains_key(XML_NS_KEY));
}

#[test]
fn missing_unique_id_is_an_error() {
    let tree = VirtualTree::from_files([(
        "labels/CustomLabels.labels-meta.xml",
        "<CustomLabels><labels><value>x</value></labels></CustomLabels>",
    )]);
    let labels = SourceComponent::new(
        "CustomLabels",
        registry().type_by_id("customlabels").unwrap(),
        Arc::new(tree),
    )
    .with_xml("labels/CustomLabels.labels-meta.xml");
    let err = labels.children(&registry()).unwrap_err();
    assert!(matches!(
        err,
        MetaformError::MissingUniqueId { ref element, .. } if element == "fullName"
    ));
}

#[test]
fn parse_error_carries_path() {
    let tree = VirtualTree::from_files([("classes/A.cls-meta.xml", "<ApexClass><oops></ApexClass>")]);
    let class = SourceComponent::new(
        "A",
        registry().type_by_id("apexclass").unwrap(),
        Arc::new(tree),
    )
    .with_xml("classes/A.cls-meta.xml");
    match class.parse_xml().unwrap_err() {
        MetaformError::XmlParse { path, .. } => {
            assert_eq!(path, PathBuf::from("classes/A.cls-meta.xml"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reads_apply_attached_replacements() {
    let tree = VirtualTree::from_files([("classes/A.cls", "String url = '{{URL}}';")]);
    let mut set = ReplacementSet::new("", 8);
    set.push(
        FileSelector::Exact(PathBuf::from("classes/A.cls")),
        Replacement::literal("{{URL}}", "https://example.com"),
    );
    let mut class = SourceComponent::new(
        "A",
        registry().type_by_id("apexclass").unwrap(),
        Arc::new(tree),
    )
    .with_content("classes/A.cls");
    class.set_replacements(Some(Arc::new(set)));

    let bytes = class.read_source(Path::new("classes/A.cls")).unwrap();
    assert_eq!(bytes, b"String url = 'https://example.com';");
}

#[test]
fn strip_namespace_removes_marker_only() {
    let mut body = XmlObject::new();
    body.insert(XML_NS_KEY.to_string(), XmlValue::text("ns"));
    body.insert("label".to_string(), XmlValue::text("x"));
    let stripped = strip_namespace(body);
    assert_eq!(stripped.len(), 1);
    assert!(stripped.contains_key("label"));
}
