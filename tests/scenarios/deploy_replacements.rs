//! Scenario: Inject environment values while building a deployment
//!
//! User journey:
//! 1. User keeps a placeholder in an Apex class
//! 2. metaform.toml maps the placeholder to an environment variable
//! 3. User converts to metadata format with the variable set

use crate::common::*;

const API_CLASS: &str = "force-app/main/default/classes/Api.cls";

const CONFIG: &str = r#"
[[replacements]]
filename = "force-app/main/default/classes/Api.cls"
string_to_replace = "{{ENDPOINT}}"
replace_with_env = "ENDPOINT"
"#;

fn setup() -> TestProject {
    let project = TestProject::new();
    project.write("metaform.toml", CONFIG);
    project.write(API_CLASS, "String url = '{{ENDPOINT}}';");
    project.write(&format!("{API_CLASS}-meta.xml"), APEX_CLASS_META);
    project
}

/// SCENARIO: The placeholder is replaced in the output, never in the source
#[test]
fn scenario_env_value_is_injected() {
    let project = setup();

    let result = project.run_with_env(
        &["convert", "--to", "metadata", "force-app", "-o", "deploy"],
        &[("ENDPOINT", "https://api.example.test")],
    );
    assert!(result.success, "convert failed: {}", result.stderr);

    assert_eq!(
        project.read("deploy/classes/Api.cls"),
        "String url = 'https://api.example.test';"
    );
    assert_eq!(project.read(API_CLASS), "String url = '{{ENDPOINT}}';");
    assert_eq!(
        project.read("deploy/classes/Api.cls-meta.xml"),
        APEX_CLASS_META
    );
}

/// SCENARIO: A missing variable stops the conversion before anything is written
#[test]
fn scenario_missing_env_value_fails() {
    let project = setup();

    let result = project.run(&["convert", "--to", "metadata", "force-app", "-o", "deploy"]);
    assert!(!result.success);
    assert!(result.stderr.contains("ENDPOINT"), "stderr: {}", result.stderr);
    assert!(!project.exists("deploy"));
}

/// SCENARIO: Replacements never apply when converting to source format
#[test]
fn scenario_source_conversion_ignores_replacements() {
    let project = setup();

    let result = project.run(&["convert", "--to", "source", "force-app", "-o", "copy"]);
    assert!(result.success, "{}", result.stderr);
    assert_eq!(
        project.read("copy/main/default/classes/Api.cls"),
        "String url = '{{ENDPOINT}}';"
    );
}
