//! Resource types managed by the migration tool.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value the server returns in place of a secret it will not disclose.
pub const MASKED_SECRET: &str = "********";

/// Name of the resident identity provider, exported from a dedicated endpoint.
pub const RESIDENT_IDP_NAME: &str = "LOCAL";

/// Tenant used when none is configured.
pub const DEFAULT_TENANT_DOMAIN: &str = "carbon.super";

/// Identifier field used for array elements that have no explicit entry.
pub const DEFAULT_IDENTIFIER_FIELD: &str = "name";

/// Built-in array field name to identifier field path table.
///
/// Identifier paths may be nested (`localClaim.claimUri`).
pub const DEFAULT_ARRAY_IDENTIFIERS: &[(&str, &str)] = &[
    ("inboundAuthenticationRequestConfigs", "inboundAuthKey"),
    ("spProperties", "name"),
    ("authenticationSteps", "stepOrder"),
    ("localAuthenticatorConfigs", "name"),
    ("federatedIdentityProviders", "identityProviderName"),
    ("federatedAuthenticatorConfigs", "name"),
    ("properties", "name"),
    ("subProperties", "name"),
    ("idpProperties", "name"),
    ("provisioningConnectorConfigs", "name"),
    ("provisioningIdentityProviders", "identityProviderName"),
    ("requestPathAuthenticatorConfigs", "name"),
    ("roleMappings", "localRole.localRoleName"),
    ("claimMappings", "localClaim.claimUri"),
    ("idpClaims", "claimId"),
    ("provisioningProperties", "name"),
    ("claimAttributeMappings", "claimURI"),
];

/// A kind of resource the server exposes through its management API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// Service provider applications.
    Applications,
    /// Federated identity providers.
    IdentityProviders,
    /// Claim dialects and their claims.
    ClaimDialects,
    /// Secondary user stores.
    UserStores,
}

impl ResourceType {
    /// All resource types, in processing order.
    pub const ALL: [Self; 4] = [
        Self::ClaimDialects,
        Self::UserStores,
        Self::IdentityProviders,
        Self::Applications,
    ];

    /// Directory holding local files of this type.
    #[must_use]
    pub const fn directory_name(self) -> &'static str {
        match self {
            Self::Applications => "Applications",
            Self::IdentityProviders => "IdentityProviders",
            Self::ClaimDialects => "Claims",
            Self::UserStores => "UserStores",
        }
    }

    /// Path segment of the management API.
    #[must_use]
    pub const fn api_path(self) -> &'static str {
        match self {
            Self::Applications => "applications",
            Self::IdentityProviders => "identity-providers",
            Self::ClaimDialects => "claim-dialects",
            Self::UserStores => "userstores",
        }
    }

    /// Key of this type's section in the tool and keyword config files.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Applications => "APPLICATIONS",
            Self::IdentityProviders => "IDENTITY_PROVIDERS",
            Self::ClaimDialects => "CLAIM_DIALECTS",
            Self::UserStores => "USERSTORES",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Applications => "Applications",
            Self::IdentityProviders => "Identity Providers",
            Self::ClaimDialects => "Claim Dialects",
            Self::UserStores => "User Stores",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// File format used for exported resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// YAML (default).
    #[default]
    Yaml,
    /// JSON.
    Json,
    /// XML; stored as exported, without keyword reconciliation.
    Xml,
}

impl ExportFormat {
    /// Media type sent in `Accept` and multipart headers.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Yaml => "application/yaml",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Xml => "xml",
        })
    }
}
