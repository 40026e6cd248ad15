//! Target format value object - which physical representation to convert into

use serde::{Deserialize, Serialize};

/// Physical representation of metadata on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TargetFormat {
    /// Decomposed multi-file tree (`main/default/...`, `-meta.xml` documents)
    Source,
    /// One composed document per logical unit, as the remote service expects
    Metadata,
}

impl TargetFormat {
    /// Root every source-format path is placed under
    pub const DEFAULT_PACKAGE_ROOT: &'static str = "main/default";

    /// Directory prefix applied to relative destinations in this format
    pub fn package_root(&self) -> &'static str {
        match self {
            TargetFormat::Source => Self::DEFAULT_PACKAGE_ROOT,
            TargetFormat::Metadata => "",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TargetFormat::Source => "source",
            TargetFormat::Metadata => "metadata",
        }
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
