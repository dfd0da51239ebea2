//! Errors for cosigner identity operations.

use thiserror::Error;

/// Error raised while constructing, restoring or querying a cosigner
/// identity.
///
/// All variants are programmer/input errors. They are raised synchronously at
/// the point of violation and never downgraded to defaults, so a failed
/// construction cannot leak a partially-initialized identity.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// Supplied private key bytes failed curve-validity or BIP-32 structural
    /// checks.
    #[error("invalid key material for {field}: {reason}")]
    InvalidKeyMaterial {
        /// Which key the bad bytes were supplied for.
        field: &'static str,
        /// Primitive-level failure description.
        reason: String,
    },

    /// A construction option had an inconsistent value.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A proof or signature accessor was invoked before the required identity
    /// fields were populated.
    #[error("missing identity field: {0}")]
    MissingIdentityField(&'static str),

    /// A serialized snapshot was missing fields, mistyped, or internally
    /// inconsistent.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

impl IdentityError {
    pub(crate) fn key_material(field: &'static str, err: impl ToString) -> Self {
        Self::InvalidKeyMaterial {
            field,
            reason: err.to_string(),
        }
    }
}
