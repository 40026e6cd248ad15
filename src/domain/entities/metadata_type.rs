//! MetadataType entity - static description of one document kind
//!
//! Deserialized from registry JSON. Child descriptors are nested under their
//! parent and shared through `Arc` so components can hold them cheaply.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Marker appended to the type suffix on composed documents in source format
pub const META_XML_SUFFIX: &str = "-meta.xml";

/// How a component is located on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceAdapterKind {
    /// Only a composed document
    #[default]
    Default,
    /// A content file next to its document (`Foo.cls` + `Foo.cls-meta.xml`)
    MatchingContentFile,
    /// Content is a file or a directory of arbitrary files
    MixedContent,
    /// A parent folder holding one file per child
    Decomposed,
    /// Labels catalog split into one file per label
    DecomposedLabels,
    /// One directory per component
    Bundle,
}

/// Which transformer handles the type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformerStrategy {
    #[default]
    #[serde(alias = "default")]
    Standard,
    Decomposed,
    NonDecomposed,
    StaticResource,
    DecomposedPermissionSet,
    DecomposedLabels,
    DecomposedExternalServiceRegistration,
}

impl TransformerStrategy {
    /// Variants that split the composed document into child files
    pub fn is_decomposed(self) -> bool {
        matches!(
            self,
            TransformerStrategy::Decomposed
                | TransformerStrategy::DecomposedPermissionSet
                | TransformerStrategy::DecomposedLabels
                | TransformerStrategy::DecomposedExternalServiceRegistration
        )
    }
}

/// Where decomposed child files are placed relative to the parent folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecompositionLayout {
    /// Directly in the parent folder
    #[default]
    TopLevel,
    /// In a sub-folder named after the child's directory name
    FolderPerType,
}

/// How recomposition seeds the composed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecompositionPolicy {
    /// Ignore the parent document and start from an empty shell
    StartEmpty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Strategies {
    #[serde(default)]
    pub adapter: SourceAdapterKind,
    #[serde(default)]
    pub transformer: TransformerStrategy,
    #[serde(default)]
    pub decomposition: DecompositionLayout,
    #[serde(default)]
    pub recomposition: Option<RecompositionPolicy>,
}

/// Child facet of a type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChildTypes {
    /// Child id to descriptor
    pub types: IndexMap<String, Arc<MetadataType>>,
    /// Child suffix to child id
    #[serde(default)]
    pub suffixes: IndexMap<String, String>,
    /// Child directory name to child id
    #[serde(default)]
    pub directories: IndexMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Description of a document kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetadataType {
    /// Lowercase identity
    pub id: String,
    /// Canonical name, also the root element of the composed document
    pub name: String,
    pub directory_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub in_folder: bool,
    /// Type id of the folder kind holding in-folder components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_type: Option<String>,
    /// Set on folder kinds: type id of what they contain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict_directory_name: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_parent_name: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_for: Option<String>,
    /// Element naming each child entry inside the parent document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id_element: Option<String>,
    /// Element grouping child entries inside the parent document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_element_name: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub is_addressable: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unaddressable_without_parent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<ChildTypes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategies: Option<Strategies>,
}

impl MetadataType {
    /// Minimal descriptor, mostly useful for building registries in code
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        directory_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            directory_name: directory_name.into(),
            suffix: None,
            legacy_suffix: None,
            in_folder: false,
            folder_type: None,
            folder_content_type: None,
            strict_directory_name: false,
            ignore_parent_name: false,
            alias_for: None,
            unique_id_element: None,
            xml_element_name: None,
            is_addressable: true,
            unaddressable_without_parent: false,
            children: None,
            strategies: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_strategies(mut self, strategies: Strategies) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn with_children(mut self, children: ChildTypes) -> Self {
        self.children = Some(children);
        self
    }

    pub fn transformer(&self) -> TransformerStrategy {
        self.strategies
            .as_ref()
            .map(|s| s.transformer)
            .unwrap_or_default()
    }

    pub fn adapter(&self) -> SourceAdapterKind {
        self.strategies
            .as_ref()
            .map(|s| s.adapter)
            .unwrap_or_default()
    }

    pub fn decomposition(&self) -> DecompositionLayout {
        self.strategies
            .as_ref()
            .map(|s| s.decomposition)
            .unwrap_or_default()
    }

    /// Whether recomposition ignores the parent document
    pub fn starts_empty(&self) -> bool {
        matches!(
            self.strategies.as_ref().and_then(|s| s.recomposition),
            Some(RecompositionPolicy::StartEmpty)
        )
    }

    /// Whether composed documents of this kind are split into child files
    pub fn is_decomposed(&self) -> bool {
        self.transformer().is_decomposed()
    }

    /// Folder kinds are the containers of in-folder kinds (`ReportFolder`)
    pub fn is_folder_type(&self) -> bool {
        self.folder_content_type.is_some()
    }

    /// `suffix-meta.xml`, if the type has a suffix
    pub fn meta_suffix(&self) -> Option<String> {
        self.suffix
            .as_ref()
            .map(|s| format!("{}{}", s, META_XML_SUFFIX))
    }

    /// Element under which children of this type are grouped in the parent document
    pub fn group_tag(&self) -> &str {
        self.xml_element_name
            .as_deref()
            .unwrap_or(&self.directory_name)
    }

    pub fn child_types(&self) -> impl Iterator<Item = &Arc<MetadataType>> {
        self.children.iter().flat_map(|c| c.types.values())
    }

    pub fn child_type(&self, id: &str) -> Option<&Arc<MetadataType>> {
        self.children
            .as_ref()
            .and_then(|c| c.types.get(&id.to_lowercase()))
    }

    pub fn child_type_by_suffix(&self, suffix: &str) -> Option<&Arc<MetadataType>> {
        let children = self.children.as_ref()?;
        children
            .suffixes
            .get(suffix)
            .and_then(|id| children.types.get(id))
    }

    pub fn child_type_by_directory(&self, directory: &str) -> Option<&Arc<MetadataType>> {
        let children = self.children.as_ref()?;
        children
            .directories
            .get(directory)
            .and_then(|id| children.types.get(id))
    }

    /// Child type whose entries sit under `group_tag` in the parent document
    pub fn child_type_by_group_tag(&self, tag: &str) -> Option<&Arc<MetadataType>> {
        self.child_types()
            .find(|c| c.xml_element_name.as_deref() == Some(tag))
    }

    pub fn has_children(&self) -> bool {
        self.children
            .as_ref()
            .map(|c| !c.types.is_empty())
            .unwrap_or(false)
    }

    /// True when every declared child is non-addressable
    pub fn all_children_unaddressable(&self) -> bool {
        self.has_children() && self.child_types().all(|c| !c.is_addressable)
    }
}
