#![no_main]

use libfuzzer_sys::fuzz_target;
use metaform::xml::{parse_xml, to_xml_bytes};

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary bytes must never panic, and a parsed document must serialize
    if let Ok(doc) = parse_xml(data) {
        let bytes = to_xml_bytes(&doc);
        let _ = parse_xml(&bytes);
    }
});
