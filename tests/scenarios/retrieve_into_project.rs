//! Scenario: Merge a retrieval into an existing project
//!
//! User journey:
//! 1. User has a project with labels under `force-app/`
//! 2. User retrieves an updated label set into `mdapi/`
//! 3. User converts with `--merge` so files are updated in place

use crate::common::*;
use metaform::xml::XmlValue;

const EXISTING_LABELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels>
        <fullName>Greeting</fullName>
        <value>Hi</value>
    </labels>
</CustomLabels>
"#;

const LABELS_FILE: &str = "force-app/main/default/labels/CustomLabels.labels-meta.xml";

/// SCENARIO: Existing labels are updated in place and new ones join them
#[test]
fn scenario_merge_updates_project_in_place() {
    let project = TestProject::new();
    project.write(LABELS_FILE, EXISTING_LABELS);
    project.write("mdapi/labels/CustomLabels.labels", LABELS);

    let result = project.run(&[
        "convert", "--to", "source", "mdapi", "--merge", "force-app", "--json",
    ]);
    assert!(result.success, "merge failed: {}", result.stderr);

    let json: serde_json::Value = serde_json::from_str(&result.stdout).unwrap();
    let written: Vec<&str> = json["written"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert_eq!(written, vec![project.path(LABELS_FILE).to_str().unwrap()]);

    // Nothing lands outside the package directory
    assert!(!project.exists("main"));

    let merged = project.parse(LABELS_FILE);
    let merged = body(&merged, "CustomLabels");
    let mut labels = names(merged, "labels", "fullName");
    labels.sort();
    assert_eq!(labels, vec!["Farewell", "Greeting"]);

    let greeting = merged["labels"]
        .as_list()
        .into_iter()
        .filter_map(XmlValue::as_object)
        .find(|entry| entry["fullName"] == XmlValue::text("Greeting"))
        .unwrap();
    assert_eq!(greeting["value"], XmlValue::text("Hello"));
}

/// SCENARIO: A dry run merge reports the target file without touching it
#[test]
fn scenario_merge_dry_run_leaves_project_alone() {
    let project = TestProject::new();
    project.write(LABELS_FILE, EXISTING_LABELS);
    project.write("mdapi/labels/CustomLabels.labels", LABELS);

    let result = project.run(&[
        "convert", "--to", "source", "mdapi", "--merge", "force-app", "--dry-run",
    ]);
    assert!(result.success, "{}", result.stderr);
    assert!(result.stdout.contains("Dry run"), "{}", result.stdout);
    assert!(result.stdout.contains("CustomLabels.labels-meta.xml"), "{}", result.stdout);
    assert_eq!(project.read(LABELS_FILE), EXISTING_LABELS);
}
