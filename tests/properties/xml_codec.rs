//! Property tests for the XML codec.

use proptest::prelude::*;

use metaform::xml::{parse_xml, to_xml_string, with_namespace, XmlObject, XmlValue};

fn element_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-zA-Z]{0,6}").unwrap()
}

/// Leaf text with markup characters but no surrounding whitespace
fn leaf() -> impl Strategy<Value = XmlValue> {
    proptest::string::string_regex("[a-zA-Z0-9&<>]{1,12}")
        .unwrap()
        .prop_map(XmlValue::Text)
}

fn value() -> impl Strategy<Value = XmlValue> {
    leaf().prop_recursive(3, 32, 4, |inner| {
        let item = inner
            .clone()
            .prop_filter("arrays do not nest", |v| !matches!(v, XmlValue::Array(_)));
        prop_oneof![
            proptest::collection::vec((element_name(), inner), 1..4)
                .prop_map(|entries| XmlValue::Object(entries.into_iter().collect())),
            proptest::collection::vec(item, 2..4).prop_map(XmlValue::Array),
        ]
    })
}

fn document() -> impl Strategy<Value = XmlObject> {
    proptest::collection::vec((element_name(), value()), 1..5)
        .prop_map(|entries| with_namespace("Root", entries.into_iter().collect()))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Parsing arbitrary input never panics.
    #[test]
    fn property_parse_never_panics(s in "(?s).{0,256}") {
        let _ = parse_xml(s.as_bytes());
    }

    /// PROPERTY: A serialized document parses back to the same tree.
    #[test]
    fn property_write_then_parse_is_identity(doc in document()) {
        let written = to_xml_string(&doc);
        let parsed = parse_xml(written.as_bytes()).unwrap();
        prop_assert_eq!(parsed, doc);
    }

    /// PROPERTY: Serialization is stable once a document was parsed.
    #[test]
    fn property_serialization_is_stable(doc in document()) {
        let first = to_xml_string(&doc);
        let second = to_xml_string(&parse_xml(first.as_bytes()).unwrap());
        prop_assert_eq!(first, second);
    }
}
