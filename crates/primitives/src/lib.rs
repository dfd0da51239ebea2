//! Shared primitives for the multisig wallet-join protocol.
//!
//! This crate contains the canonical hash constructions that bind a cosigner
//! identity to a wallet, plus the proposal payload type fed into them. It lies
//! at the bottom of the crate hierarchy in this workspace and does not depend
//! on any other workspace crate.

pub mod hash;
pub mod proposal;
