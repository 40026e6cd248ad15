#![no_main]

use libfuzzer_sys::fuzz_target;
use metaform::domain::entities::Registry;
use metaform::infrastructure::registry::parse_registry_data;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Invalid registries are rejected with an error, never a panic
        if let Ok(registry_data) = parse_registry_data("fuzz", content) {
            let _ = Registry::new(registry_data);
        }
    }
});
