//! Component key - normalized identity used to key conversion state

use std::fmt;

/// Normalized `"typeid:fullName"` identity of a component.
///
/// The type part is the lowercase registry id so `CustomObject` and
/// `customobject` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey(String);

impl ComponentKey {
    pub fn new(type_id: &str, full_name: &str) -> Self {
        Self(format!("{}:{}", type_id.to_lowercase(), full_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The type id part of the key
    pub fn type_id(&self) -> &str {
        self.0.split_once(':').map(|(t, _)| t).unwrap_or(&self.0)
    }

    /// The full name part of the key
    pub fn full_name(&self) -> &str {
        self.0.split_once(':').map(|(_, n)| n).unwrap_or("")
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
