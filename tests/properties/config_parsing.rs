//! Property tests for config parsing.

use proptest::prelude::*;
use std::path::Path;

use metaform::config::parse_with_warnings;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Config parsing never panics on arbitrary input.
    #[test]
    fn property_parse_never_panics(s in "(?s).{0,256}") {
        let _ = parse_with_warnings(&s, Path::new("metaform.toml"));
    }

    /// PROPERTY: An unknown key is reported once, with the line it is on.
    #[test]
    fn property_unknown_key_is_reported(
        key in "[a-z]{3,10}".prop_filter("must not appear in the table header", |k| !"convert".contains(k.as_str())),
        blank_lines in 0usize..4,
    ) {
        let content = format!("{}[convert]\n{} = 1\n", "\n".repeat(blank_lines), key);
        let (_, warnings) = parse_with_warnings(&content, Path::new("metaform.toml")).unwrap();

        prop_assert_eq!(warnings.len(), 1);
        prop_assert_eq!(&warnings[0].key, &key);
        prop_assert_eq!(warnings[0].line, Some(blank_lines + 2));
    }
}
