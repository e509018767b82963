//! Module configuration loaded from TOML.
//!
//! ```toml
//! namespace = "msg_authorization"
//!
//! [[genesis]]
//! granter = "616c696365"
//! grantee = "626f62"
//! type_url = "/msg_authorization.GenericCapability"
//! expiration = "2030-01-01T00:00:00Z"
//! value = { action_kind = { route = "bank", name = "send" } }
//! ```
//!
//! Genesis grants name their capability by type URL and give its fields as
//! an inline table, so any registered capability variant can be seeded
//! without this module knowing about it.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use authz_types::{Address, AuthzError, AuthzResult, Envelope, Expiration};

use crate::engine::AuthzEngine;

pub const DEFAULT_NAMESPACE: &str = "msg_authorization";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// A grant to install when the module starts from an empty store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisGrant {
    pub granter: Address,
    pub grantee: Address,
    pub type_url: String,
    /// Capability fields, in the variant's serde form.
    pub value: serde_json::Value,
    /// Absent means the grant never expires.
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

impl GenesisGrant {
    pub fn expiration(&self) -> Expiration {
        self.expiration.map(Expiration::at).unwrap_or(Expiration::NEVER)
    }
}

/// Top-level module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// Key prefix separating this module's records in a shared store.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub genesis: Vec<GenesisGrant>,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            genesis: Vec::new(),
        }
    }
}

impl AuthzConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `AuthzError::ConfigError` if the TOML is malformed or the
    /// namespace is empty.
    pub fn from_toml_str(s: &str) -> AuthzResult<Self> {
        let config: AuthzConfig = toml::from_str(s).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to parse authorization config: {}", e),
        })?;
        if config.namespace.is_empty() {
            return Err(AuthzError::ConfigError {
                reason: "namespace must not be empty".to_string(),
            });
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AuthzResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}

/// Install genesis grants through the engine.
///
/// Each capability is decoded through the engine's registry first, so an
/// unknown type URL or malformed fields fail the whole genesis before any
/// grant is written.
pub fn init_genesis(engine: &AuthzEngine, grants: &[GenesisGrant]) -> AuthzResult<()> {
    let mut decoded = Vec::with_capacity(grants.len());
    for grant in grants {
        let envelope = Envelope::pack(&grant.type_url, &grant.value)?;
        let capability = engine
            .registry()
            .decode_capability(&envelope)
            .map_err(|e| AuthzError::ConfigError {
                reason: format!(
                    "genesis grant from {} to {}: {}",
                    grant.granter, grant.grantee, e
                ),
            })?;
        decoded.push((grant, capability));
    }

    for (grant, capability) in &decoded {
        engine.grant(
            &grant.granter,
            &grant.grantee,
            capability.as_ref(),
            grant.expiration(),
        )?;
    }

    info!(grants = decoded.len(), "genesis grants installed");
    Ok(())
}

/// Dump every stored grant in the form `init_genesis` reads back.
///
/// Expired grants that no lookup has removed yet are included as stored.
pub fn export_genesis(engine: &AuthzEngine) -> AuthzResult<Vec<GenesisGrant>> {
    engine
        .grant_records()?
        .into_iter()
        .map(|(granter, grantee, record)| {
            let value = serde_json::from_slice(&record.capability.value)
                .map_err(AuthzError::codec)?;
            let expiration = if record.expiration.is_never() {
                None
            } else {
                let at = DateTime::from_timestamp(record.expiration.0, 0).ok_or_else(|| {
                    AuthzError::codec(format!("expiration {} out of range", record.expiration.0))
                })?;
                Some(at)
            };
            Ok(GenesisGrant {
                granter,
                grantee,
                type_url: record.capability.type_url,
                value,
                expiration,
            })
        })
        .collect()
}
