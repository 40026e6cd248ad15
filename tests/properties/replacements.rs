//! Property tests for the streaming replacement engine.

use proptest::prelude::*;
use std::path::{Path, PathBuf};

use metaform::domain::services::{FileSelector, ReplacementSet};
use metaform::domain::value_objects::Replacement;

const FILE: &str = "app/classes/A.cls";

fn set(chunk_size: usize, literals: &[(String, String)]) -> ReplacementSet {
    let mut set = ReplacementSet::new("", chunk_size);
    for (find, with) in literals {
        set.push(
            FileSelector::Exact(PathBuf::from(FILE)),
            Replacement::literal(find.as_str(), with.as_str()),
        );
    }
    set
}

fn literal() -> impl Strategy<Value = (String, String)> {
    (
        proptest::string::string_regex("[ab]{1,4}").unwrap(),
        proptest::string::string_regex("[xy]{0,3}").unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A single literal streams to the same result as replacing
    /// the whole text at once, whatever the chunk size.
    #[test]
    fn property_single_literal_matches_str_replace(
        text in "[abc]{0,64}",
        (find, with) in literal(),
        chunk_size in 1usize..16,
    ) {
        let replaced = set(chunk_size, &[(find.clone(), with.clone())])
            .apply(Path::new(FILE), text.as_bytes())
            .unwrap();
        prop_assert_eq!(String::from_utf8(replaced).unwrap(), text.replace(&find, &with));
    }

    /// PROPERTY: The chunk size never changes the output.
    #[test]
    fn property_chunk_size_is_invisible(
        text in "[abc]{0,64}",
        literals in proptest::collection::vec(literal(), 1..4),
        chunk_size in 1usize..16,
    ) {
        let whole = set(4096, &literals).apply(Path::new(FILE), text.as_bytes()).unwrap();
        let chunked = set(chunk_size, &literals).apply(Path::new(FILE), text.as_bytes()).unwrap();
        prop_assert_eq!(chunked, whole);
    }

    /// PROPERTY: Several literals stream to the same result as applying
    /// each one in turn to the whole text.
    #[test]
    fn property_literals_apply_in_sequence(
        text in "[abc]{0,64}",
        literals in proptest::collection::vec(literal(), 1..4),
        chunk_size in 1usize..16,
    ) {
        let expected = literals
            .iter()
            .fold(text.clone(), |acc, (find, with)| acc.replace(find, with));
        let streamed = set(chunk_size, &literals).apply(Path::new(FILE), text.as_bytes()).unwrap();
        prop_assert_eq!(String::from_utf8(streamed).unwrap(), expected);
    }

    /// PROPERTY: Files no selector matches pass through untouched.
    #[test]
    fn property_unselected_files_are_untouched(
        text in "(?s).{0,128}",
        (find, with) in literal(),
    ) {
        let out = set(8, &[(find, with)])
            .apply(Path::new("app/classes/Other.cls"), text.as_bytes())
            .unwrap();
        prop_assert_eq!(out, text.as_bytes());
    }
}
