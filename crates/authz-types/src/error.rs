//! Error types for delegated message authorization.
//!
//! Every fallible operation in the workspace returns `AuthzResult<T>`.
//! Variants carry enough context for the caller to tell which grant or
//! which action in a batch was at fault.

use thiserror::Error;

/// The unified error type for the authorization engine and its collaborators.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Revoke target does not exist.
    #[error("grant not found: grantee {grantee}, granter {granter}, action '{kind}'")]
    NotFound {
        grantee: String,
        granter: String,
        kind: String,
    },

    /// No live capability permits the action, or the capability rejected it.
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Grant parameters are malformed (empty address, unregistered
    /// capability type, expiration already past).
    #[error("invalid grant: {reason}")]
    InvalidGrant { reason: String },

    /// A message-layer request other than a grant failed basic validation.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Delegated actions must have exactly one signer.
    #[error("authorization can be given to actions with only one signer, '{action}' has {signers}")]
    MultiSignerUnsupported { action: String, signers: usize },

    /// The router has no handler for the action's route.
    #[error("unrecognized action route: {route}")]
    UnroutableAction { route: String },

    /// A routed handler failed; earlier actions in the batch stay applied.
    #[error("failed to execute action {index} ({action}): {source}")]
    HandlerFailure {
        index: usize,
        action: String,
        #[source]
        source: Box<AuthzError>,
    },

    /// A handler refused to execute an action on domain grounds
    /// (insufficient funds, malformed amounts).
    #[error("execution failed: {reason}")]
    ExecutionFailed { reason: String },

    /// No decoder is registered for the envelope's type URL.
    #[error("unknown type url '{type_url}'")]
    UnknownType { type_url: String },

    /// Encoding or decoding of a stored record or envelope failed.
    #[error("codec error: {reason}")]
    Codec { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl AuthzError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn codec(reason: impl std::fmt::Display) -> Self {
        Self::Codec {
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type AuthzResult<T> = Result<T, AuthzError>;
