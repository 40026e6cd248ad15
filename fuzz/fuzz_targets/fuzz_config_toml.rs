#![no_main]

use libfuzzer_sys::fuzz_target;
use metaform::config::parse_with_warnings;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Fuzz TOML config parsing - this should never panic
        let _ = parse_with_warnings(content, Path::new("metaform.toml"));
    }
});
