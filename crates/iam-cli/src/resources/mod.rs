//! Per resource type policy.
//!
//! The four resource types share one export and import flow; a
//! [`ResourceKind`] answers the questions where they differ: file naming,
//! how a local file is matched to a deployed resource, which names are never
//! deleted, and which keywords and identifiers apply.

pub mod files;

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use iam_client::ResourceRef;
use iam_core::{ExportFormat, KeywordConfig, ResourceType, ToolConfig, RESIDENT_IDP_NAME};
use iam_keywords::{Document, IdentifierTable, KeywordMapping, Path as FieldPath};

/// Mask the server uses for user store secrets.
pub const USER_STORE_SECRET_MASK: &str = "ENCRYPTED PROPERTY";

/// How a local file is matched to a deployed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Compare a field of the file with deployed names.
    NameField(&'static str),
    /// Compare a field of the file with deployed ids.
    IdField(&'static str),
    /// Compare the URL-safe base64 form of the file stem with deployed ids.
    EncodedStem,
}

/// Policy of one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    resource_type: ResourceType,
}

impl ResourceKind {
    /// Policy for `resource_type`.
    #[must_use]
    pub const fn new(resource_type: ResourceType) -> Self {
        Self { resource_type }
    }

    /// Policies of all resource types, in processing order.
    pub fn all() -> impl Iterator<Item = Self> {
        ResourceType::ALL.into_iter().map(Self::new)
    }

    /// The resource type.
    #[must_use]
    pub const fn resource_type(self) -> ResourceType {
        self.resource_type
    }

    /// Directory of local files below `base_dir`.
    #[must_use]
    pub fn directory(self, base_dir: &Path) -> PathBuf {
        base_dir.join(self.resource_type.directory_name())
    }

    /// File stem for a resource name.
    ///
    /// Claim dialect URIs are flattened: `http://` is dropped and `:` and
    /// `/` become `.`.
    #[must_use]
    pub fn file_stem(self, name: &str) -> String {
        match self.resource_type {
            ResourceType::ClaimDialects => name.replace("http://", "").replace([':', '/'], "."),
            _ => name.to_string(),
        }
    }

    /// Local file name for a resource name.
    #[must_use]
    pub fn file_name(self, name: &str, format: ExportFormat) -> String {
        format!("{}.{}", self.file_stem(name), format.extension())
    }

    /// Names that are never deleted on the server.
    #[must_use]
    pub const fn protected_names(self) -> &'static [&'static str] {
        match self.resource_type {
            ResourceType::Applications => &["Console", "My Account"],
            ResourceType::IdentityProviders => &[RESIDENT_IDP_NAME],
            ResourceType::ClaimDialects => &["local"],
            ResourceType::UserStores => &["PRIMARY"],
        }
    }

    /// Returns whether `name` must not be deleted on the server.
    #[must_use]
    pub fn is_protected(self, name: &str) -> bool {
        self.protected_names().contains(&name)
    }

    /// How local files are matched to deployed resources.
    #[must_use]
    pub const fn identity(self) -> Identity {
        match self.resource_type {
            ResourceType::Applications => Identity::NameField("applicationName"),
            ResourceType::IdentityProviders => Identity::NameField("identityProviderName"),
            ResourceType::ClaimDialects => Identity::IdField("id"),
            ResourceType::UserStores => Identity::EncodedStem,
        }
    }

    /// Name of the resource a local file holds.
    ///
    /// Claim dialects are named by their URI; the other types by file stem.
    #[must_use]
    pub fn local_name(self, stem: &str, document: Option<&Document>) -> String {
        if self.resource_type == ResourceType::ClaimDialects {
            if let Some(uri) = field(document, "dialectURI") {
                return uri;
            }
        }
        stem.to_string()
    }

    /// Finds the deployed resource a local file corresponds to.
    ///
    /// The resident identity provider file always maps to the resident
    /// identity provider.
    #[must_use]
    pub fn find_deployed<'a>(
        self,
        stem: &str,
        document: Option<&Document>,
        deployed: &'a [ResourceRef],
    ) -> Option<ResourceRef> {
        if self.resource_type == ResourceType::IdentityProviders && stem == RESIDENT_IDP_NAME {
            return Some(ResourceRef::new(RESIDENT_IDP_NAME, RESIDENT_IDP_NAME));
        }
        let by_name = |name: &str| -> Option<&'a ResourceRef> {
            deployed.iter().find(|r| r.name == name)
        };
        let by_id = |id: &str| -> Option<&'a ResourceRef> { deployed.iter().find(|r| r.id == id) };

        let found = match self.identity() {
            Identity::NameField(key) => {
                let name = field(document, key);
                if name.as_deref().is_some_and(|name| name != stem) {
                    tracing::warn!("Resource name in file {stem} does not match the file name");
                }
                by_name(&name.unwrap_or_else(|| stem.to_string()))
            }
            Identity::IdField(key) => field(document, key).and_then(|id| by_id(&id)),
            Identity::EncodedStem => by_id(&URL_SAFE.encode(stem)),
        };
        found.cloned()
    }

    /// Id to update when the server reports an existing resource that the
    /// deployed list did not show.
    #[must_use]
    pub fn fallback_id(self, stem: &str, document: Option<&Document>) -> String {
        match self.identity() {
            Identity::NameField(key) | Identity::IdField(key) => {
                field(document, key).unwrap_or_else(|| stem.to_string())
            }
            Identity::EncodedStem => URL_SAFE.encode(stem),
        }
    }

    /// Identifier table for this type: built-in entries plus configured ones.
    #[must_use]
    pub fn identifiers(self, tool: &ToolConfig) -> IdentifierTable {
        let mut table = IdentifierTable::builtin();
        table.extend(
            tool.resource(self.resource_type)
                .array_identifiers
                .iter()
                .map(|(field, identifier)| (field.as_str(), identifier.as_str())),
        );
        table
    }

    /// Keyword mapping for one resource: defaults merged with its overrides.
    #[must_use]
    pub fn keyword_mapping(self, keywords: &KeywordConfig, name: &str) -> KeywordMapping {
        let mapping = KeywordMapping::from(keywords.defaults());
        match keywords.overrides(self.resource_type, name) {
            Some(overrides) => mapping.with_overrides(overrides),
            None => mapping,
        }
    }

    /// Whether secrets are withheld on export.
    ///
    /// User stores ignore the setting; their secrets are always masked.
    #[must_use]
    pub fn secrets_excluded(self, tool: &ToolConfig) -> bool {
        tool.resource(self.resource_type).secrets_excluded()
    }
}

fn field(document: Option<&Document>, key: &str) -> Option<String> {
    document?
        .get(&FieldPath::parse(key))
        .map(Document::render)
        .filter(|value| !value.is_empty())
}
