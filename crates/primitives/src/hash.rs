//! Canonical, domain-separated hash constructions.
//!
//! Remote peers verify join proofs and proposal signatures against these
//! exact digests, so every field is length-prefixed before hashing. Naive
//! concatenation would let `("ab", "c")` and `("a", "bc")` collide across
//! field boundaries.

use bitcoin::{
    bip32::Xpub,
    hashes::{sha256, Hash, HashEngine},
    Network,
};
use secp256k1::PublicKey;

/// Domain tag for join hashes.
const JOIN_TAG: &[u8] = b"msig/join/v1";

/// Domain tag for proposal hashes.
const PROPOSAL_TAG: &[u8] = b"msig/proposal/v1";

/// Feeds a single field into the engine as `len (u32 BE) || bytes`.
fn input_field(engine: &mut sha256::HashEngine, bytes: &[u8]) {
    engine.input(&(bytes.len() as u32).to_be_bytes());
    engine.input(bytes);
}

/// Computes the digest that a join signature and xpub proof commit to.
///
/// Binds the cosigner's display name, authorization public key and account
/// xpub to a specific named wallet on a specific network. Deterministic in
/// all five inputs.
pub fn join_hash(
    wallet_name: &str,
    name: &str,
    auth_public_key: &PublicKey,
    account_key: &Xpub,
    network: Network,
) -> [u8; 32] {
    let mut engine = sha256::Hash::engine();
    engine.input(JOIN_TAG);
    input_field(&mut engine, wallet_name.as_bytes());
    input_field(&mut engine, name.as_bytes());
    input_field(&mut engine, &auth_public_key.serialize());
    input_field(&mut engine, &account_key.encode());
    input_field(&mut engine, network.to_string().as_bytes());
    sha256::Hash::from_engine(engine).to_byte_array()
}

/// Computes the digest that a proposal signature commits to.
///
/// `kind` is the protocol-level proposal type tag and `payload` the canonical
/// byte encoding of the proposal body (see [`crate::proposal`]). Uses a
/// domain tag distinct from [`join_hash`], so the two constructions can never
/// produce the same digest for overlapping inputs.
pub fn proposal_hash(wallet_name: &str, kind: u8, payload: &[u8]) -> [u8; 32] {
    let mut engine = sha256::Hash::engine();
    engine.input(PROPOSAL_TAG);
    input_field(&mut engine, wallet_name.as_bytes());
    engine.input(&[kind]);
    input_field(&mut engine, payload);
    sha256::Hash::from_engine(engine).to_byte_array()
}
