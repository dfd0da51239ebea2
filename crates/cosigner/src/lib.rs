//! Cosigner identity for a multi-party wallet-join protocol.
//!
//! This crate models the cryptographic identity of one participant in a
//! shared multisig wallet: a master BIP-32 key, an authorization keypair for
//! signing proposals, and a join keypair for signing the wallet-join proof.
//! See [`identity::IdentityContext`] for the entry point.

pub mod cosigner;
pub mod errors;
pub mod identity;
pub mod paths;
pub mod snapshot;

pub use cosigner::{Cosigner, CosignerOptions, JoinRequest};
pub use errors::IdentityError;
pub use identity::{IdentityContext, IdentityOptions};
pub use snapshot::IdentitySnapshot;
