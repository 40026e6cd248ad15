//! Scenario: Decompose a retrieved object and build it back
//!
//! User journey:
//! 1. User retrieved composed documents into `mdapi/`
//! 2. User converts them into a source tree to edit
//! 3. User previews the recomposition as JSON
//! 4. User recomposes the source tree for deployment

use crate::common::*;
use insta::assert_snapshot;

/// SCENARIO: Decompose, preview, recompose
#[test]
fn scenario_decompose_then_recompose() {
    let project = TestProject::new();
    project.write("mdapi/objects/Account.object", ACCOUNT_OBJECT);

    // Step 1: decompose
    let result = project.run(&["convert", "--to", "source", "mdapi", "-o", "source"]);
    assert!(result.success, "convert failed: {}", result.stderr);
    assert!(result.stdout.contains("Converted 1 components"), "{}", result.stdout);

    assert_snapshot!(
        project.read("source/main/default/objects/Account/fields/Tier__c.field-meta.xml"),
        @r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <CustomField xmlns="http://soap.sforce.com/2006/04/metadata">
        <fullName>Tier__c</fullName>
        <label>Tier</label>
        <type>Picklist</type>
    </CustomField>
    "#
    );

    // Step 2: preview the recomposition
    let preview = project.run(&[
        "convert", "--to", "metadata", "source", "-o", "back", "--dry-run", "--json",
    ]);
    assert!(preview.success, "dry run failed: {}", preview.stderr);
    assert!(!project.exists("back"));

    let json: serde_json::Value = serde_json::from_str(&preview.stdout).unwrap();
    let planned: Vec<&str> = json["planned"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["output"].as_str().unwrap())
        .collect();
    assert_eq!(planned, vec!["objects/Account.object"]);
    assert_eq!(json["written"].as_array().unwrap().len(), 0);

    // Step 3: recompose
    let result = project.run(&["convert", "--to", "metadata", "source", "-o", "back"]);
    assert!(result.success, "recompose failed: {}", result.stderr);
    assert_eq!(project.files_under("back"), vec!["objects/Account.object"]);

    let recomposed = project.parse("back/objects/Account.object");
    let recomposed = body(&recomposed, "CustomObject");
    let mut fields = names(recomposed, "fields", "fullName");
    fields.sort();
    assert_eq!(fields, vec!["Rating__c", "Tier__c"]);
}

/// SCENARIO: Converting twice leaves unchanged files alone
#[test]
fn scenario_second_run_reports_unchanged_files() {
    let project = TestProject::new();
    project.write("mdapi/objects/Account.object", ACCOUNT_OBJECT);

    let first = project.run(&["convert", "--to", "source", "mdapi", "-o", "source", "--json"]);
    assert!(first.success, "{}", first.stderr);
    let first: serde_json::Value = serde_json::from_str(&first.stdout).unwrap();
    assert_eq!(first["written"].as_array().unwrap().len(), 4);

    let second = project.run(&["convert", "--to", "source", "mdapi", "-o", "source", "--json"]);
    assert!(second.success, "{}", second.stderr);
    let second: serde_json::Value = serde_json::from_str(&second.stdout).unwrap();
    assert_eq!(second["written"].as_array().unwrap().len(), 0);
    assert_eq!(second["skipped"].as_array().unwrap().len(), 4);
}

/// SCENARIO: A config typo is reported with a suggestion
#[test]
fn scenario_config_typo_is_reported() {
    let project = TestProject::new();
    project.write("metaform.toml", "[convert]\nchunk_sise = 10\n");
    project.write("mdapi/labels/CustomLabels.labels", LABELS);

    let result = project.run(&["convert", "--to", "source", "mdapi", "-o", "source"]);
    assert!(result.success, "{}", result.stderr);
    assert!(
        result.stderr.contains("did you mean 'chunk_size'"),
        "stderr: {}",
        result.stderr
    );
}
