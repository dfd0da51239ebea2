//! Public projections of a cosigner identity.
//!
//! These are the only shapes that ever leave the local machine: the
//! [`Cosigner`] record peers verify against, and the [`JoinRequest`] payload
//! a client posts to a wallet-join endpoint. Neither carries private
//! material.

use bitcoin::bip32::Xpub;
use serde::{Deserialize, Serialize};

/// Exportable record describing one cosigner.
///
/// Produced (and memoized) by
/// [`IdentityContext::to_cosigner`](crate::identity::IdentityContext::to_cosigner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cosigner {
    /// Display name of the cosigner.
    pub name: String,
    /// Account extended public key at `m/44'/0'/0'`.
    pub account_key: Xpub,
    /// Compressed authorization public key.
    #[serde(with = "hex::serde")]
    pub auth_public_key: [u8; 33],
    /// Compact signature over the join hash, made with the join key.
    #[serde(with = "hex::serde")]
    pub join_signature: [u8; 64],
    /// First four bytes (big-endian) of hash160 of the master public key.
    pub fingerprint: u32,
    /// Authorization token; all zeroes when none was issued.
    #[serde(with = "hex::serde")]
    pub token: [u8; 32],
    /// BIP-44 purpose of the account branch.
    pub purpose: u32,
}

/// Wire payload of a wallet-join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Cosigner identity material the remote wallet records.
    pub cosigner: CosignerOptions,
    /// Compact join-key signature over the join hash.
    #[serde(with = "hex::serde")]
    pub join_signature: [u8; 64],
}

/// The `cosigner` object nested inside a [`JoinRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignerOptions {
    /// Display name of the cosigner.
    pub name: String,
    /// BIP-44 purpose of the account branch.
    pub purpose: u32,
    /// Master key fingerprint.
    pub fingerprint: u32,
    /// Opaque auxiliary payload.
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
    /// Authorization token.
    #[serde(with = "hex::serde")]
    pub token: [u8; 32],
    /// Account extended public key.
    pub account_key: Xpub,
    /// Compact proof-key signature over the join hash, demonstrating control
    /// of the account key independently of the join key.
    #[serde(with = "hex::serde")]
    pub account_key_proof: [u8; 64],
    /// Compressed authorization public key.
    #[serde(with = "hex::serde")]
    pub auth_public_key: [u8; 33],
}
