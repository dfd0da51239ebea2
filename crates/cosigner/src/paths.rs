//! BIP32 derivation paths for the cosigner key hierarchy.
//!
//! ```text
//! master
//! └── m/44'/0'/0' ──────────────── account key (exported as xpub)
//!     └── 2147483647/0 ─────────── account-ownership proof key
//! ```
//!
//! The proof branch sits at the highest non-hardened index so it cannot
//! collide with ordinary receive/change chains, while remaining derivable
//! from the account xpub alone so peers can verify the proof without any
//! private material.

use bitcoin::bip32::ChildNumber;

/// BIP-44 purpose of the account branch. Advertised in the cosigner record.
pub const PURPOSE: u32 = 44;

/// Account derivation path relative to the master key (`m/44'/0'/0'`).
pub(crate) const ACCOUNT_DERIVATION_PATH: &[ChildNumber] = &[
    ChildNumber::Hardened { index: PURPOSE },
    ChildNumber::Hardened { index: 0 },
    ChildNumber::Hardened { index: 0 },
];

/// Protocol-reserved index of the proof branch (`2^31 - 1`, the maximum
/// non-hardened child number).
pub(crate) const PROOF_INDEX: u32 = (1 << 31) - 1;

/// Proof key path relative to the account key (`PROOF_INDEX/0`).
pub(crate) const PROOF_KEY_PATH: &[ChildNumber] = &[
    ChildNumber::Normal { index: PROOF_INDEX },
    ChildNumber::Normal { index: 0 },
];
