//! Property tests for decomposing a document and composing it back.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::common::*;
use metaform::domain::value_objects::TargetFormat;
use metaform::infrastructure::RegistryLoader;
use metaform::xml::{to_xml_string, with_namespace, XmlObject, XmlValue};

/// Scalar fields of one item, keyed by element name
type Fields = BTreeMap<String, String>;

fn scalar() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z0-9&<>]{1,12}").unwrap()
}

fn item_fields() -> impl Strategy<Value = Fields> {
    (scalar(), proptest::option::of(scalar())).prop_map(|(val, note)| {
        let mut fields = Fields::new();
        fields.insert("val".to_string(), val);
        if let Some(note) = note {
            fields.insert("note".to_string(), note);
        }
        fields
    })
}

/// Items keyed by their unique name
fn items() -> impl Strategy<Value = BTreeMap<String, Fields>> {
    proptest::collection::btree_map(
        proptest::string::string_regex("[a-z][a-z0-9]{0,7}").unwrap(),
        item_fields(),
        1..6,
    )
}

fn catalog_document(label: &Option<String>, items: &BTreeMap<String, Fields>) -> String {
    let mut body = XmlObject::new();
    if let Some(label) = label {
        body.insert("label".to_string(), XmlValue::text(label));
    }
    let entries: Vec<XmlValue> = items
        .iter()
        .map(|(name, fields)| {
            let mut entry = XmlObject::new();
            entry.insert("name".to_string(), XmlValue::text(name));
            for (key, value) in fields {
                entry.insert(key.clone(), XmlValue::text(value));
            }
            XmlValue::Object(entry)
        })
        .collect();
    let items = match entries.len() {
        1 => entries.into_iter().next().unwrap(),
        _ => XmlValue::Array(entries),
    };
    body.insert("items".to_string(), items);
    to_xml_string(&with_namespace("Catalog", body))
}

/// Items of a composed catalog, independent of their order
fn items_of(body: &XmlObject) -> BTreeMap<String, Fields> {
    body.get("items")
        .map(XmlValue::as_list)
        .unwrap_or_default()
        .into_iter()
        .filter_map(XmlValue::as_object)
        .map(|entry| {
            let mut fields = Fields::new();
            let mut name = String::new();
            for (key, value) in entry {
                let text = value.as_text().unwrap_or_default().to_string();
                if key == "name" {
                    name = text;
                } else {
                    fields.insert(key.clone(), text);
                }
            }
            (name, fields)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Decomposing a catalog and composing it back yields the same
    /// items and parent fields.
    #[test]
    fn property_decompose_then_recompose_preserves_content(
        label in proptest::option::of(scalar()),
        items in items(),
    ) {
        let project = TestProject::new();
        let overlay = project.write("registry.json", CATALOG_REGISTRY);
        let registry = Arc::new(
            RegistryLoader::new()
                .with_custom_registry(overlay)
                .load()
                .unwrap(),
        );
        project.write("mdapi/catalogs/Cat.catalog", &catalog_document(&label, &items));

        project.convert_dir_with(&registry, "mdapi", "source", TargetFormat::Source);
        project.convert_dir_with(&registry, "source", "back", TargetFormat::Metadata);

        prop_assert_eq!(project.files_under("back"), vec!["catalogs/Cat.catalog".to_string()]);
        let recomposed = project.parse("back/catalogs/Cat.catalog");
        let recomposed = body(&recomposed, "Catalog");
        prop_assert_eq!(
            recomposed.get("label").and_then(XmlValue::as_text).map(str::to_string),
            label
        );
        prop_assert_eq!(items_of(recomposed), items);
    }
}
