//! Custom registry contracts
//!
//! A type declared only in a project overlay decomposes and recomposes like
//! a built-in one.

use std::sync::Arc;

use crate::common::*;
use metaform::domain::value_objects::TargetFormat;
use metaform::infrastructure::RegistryLoader;
use metaform::xml::XmlValue;

const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Catalog xmlns="http://soap.sforce.com/2006/04/metadata">
    <items>
        <name>A</name>
        <val>1</val>
    </items>
    <items>
        <name>B</name>
        <val>2</val>
    </items>
</Catalog>
"#;

fn catalog_project() -> (TestProject, Arc<metaform::Registry>) {
    let project = TestProject::new();
    let overlay = project.write("registry.json", CATALOG_REGISTRY);
    let registry = RegistryLoader::new()
        .with_custom_registry(overlay)
        .load()
        .unwrap();
    project.write("mdapi/catalogs/Cat.catalog", CATALOG);
    (project, Arc::new(registry))
}

#[test]
fn contract_catalog_decomposes_into_one_file_per_item() {
    let (project, registry) = catalog_project();

    project.convert_dir_with(&registry, "mdapi", "source", TargetFormat::Source);

    assert_eq!(
        project.files_under("source/main/default/catalogs/Cat"),
        vec![
            "Cat.catalog-meta.xml",
            "items/A.item-meta.xml",
            "items/B.item-meta.xml",
        ]
    );

    let parent = project.parse("source/main/default/catalogs/Cat/Cat.catalog-meta.xml");
    let keys: Vec<&String> = body(&parent, "Catalog").keys().collect();
    assert_eq!(keys, vec!["@_xmlns"]);

    let item = project.parse("source/main/default/catalogs/Cat/items/B.item-meta.xml");
    let item = body(&item, "Item");
    assert_eq!(item["name"], XmlValue::text("B"));
    assert_eq!(item["val"], XmlValue::text("2"));
}

#[test]
fn contract_catalog_recomposes_the_original_items() {
    let (project, registry) = catalog_project();
    project.convert_dir_with(&registry, "mdapi", "source", TargetFormat::Source);

    project.convert_dir_with(&registry, "source", "back", TargetFormat::Metadata);
    assert_eq!(project.files_under("back"), vec!["catalogs/Cat.catalog"]);

    let recomposed = project.parse("back/catalogs/Cat.catalog");
    let recomposed = body(&recomposed, "Catalog");
    let mut items: Vec<(String, String)> = recomposed["items"]
        .as_list()
        .into_iter()
        .filter_map(XmlValue::as_object)
        .map(|entry| {
            (
                entry["name"].as_text().unwrap().to_string(),
                entry["val"].as_text().unwrap().to_string(),
            )
        })
        .collect();
    items.sort();
    assert_eq!(
        items,
        vec![
            ("A".to_string(), "1".to_string()),
            ("B".to_string(), "2".to_string()),
        ]
    );
}
