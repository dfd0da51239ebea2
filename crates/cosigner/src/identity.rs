//! The cosigner identity context.
//!
//! An [`IdentityContext`] owns a master BIP-32 key plus two independent
//! secp256k1 keypairs: the *authorization* key signs proposal messages, the
//! *join* key signs the proof that this identity may join a specific named
//! wallet. Everything a peer verifies is derived from these three secrets and
//! the display-level binding data (`name`, `wallet_name`).
//!
//! Proof artifacts are memoized behind `&mut self`, so exclusive access is
//! enforced by the borrow checker rather than a lock. After changing the
//! binding data, call [`IdentityContext::refresh`] to drop the memoized
//! values as a unit.

use std::fmt;

use bitcoin::{
    bip32::{Xpriv, Xpub},
    Network, NetworkKind,
};
use msig_primitives::{
    hash::{join_hash, proposal_hash},
    proposal::ProposalPayload,
};
use rand::Rng;
use secp256k1::{ecdsa::Signature, Message, PublicKey, SecretKey, SECP256K1};
use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::{
    cosigner::{Cosigner, CosignerOptions, JoinRequest},
    errors::IdentityError,
    paths::{ACCOUNT_DERIVATION_PATH, PROOF_KEY_PATH, PURPOSE},
};

/// Configuration for building a fresh [`IdentityContext`].
///
/// Every key field is optional; absent keys are generated from a
/// cryptographically secure RNG, an absent token defaults to the all-zero
/// sentinel. Supplied raw scalars are validated eagerly, before any derived
/// field is computed.
#[derive(Debug, Clone)]
pub struct IdentityOptions {
    /// Display name of the cosigner. May be empty at construction time, but
    /// proofs cannot be computed until it is set.
    pub name: String,
    /// Name of the wallet this identity will join. Same emptiness rule as
    /// `name`.
    pub wallet_name: String,
    /// Network selecting address/key-version parameters.
    pub network: Network,
    /// Authorization token; defaults to 32 zero bytes ("no token").
    pub token: Option<[u8; 32]>,
    /// Opaque auxiliary payload, default empty.
    pub data: Vec<u8>,
    /// Master HD private key; generated when absent.
    pub master: Option<Xpriv>,
    /// Raw 32-byte join secret key; generated when absent.
    pub join_secret_key: Option<Vec<u8>>,
    /// Raw 32-byte authorization secret key; generated when absent.
    pub auth_secret_key: Option<Vec<u8>>,
}

impl IdentityOptions {
    /// Empty options for the given network; all key material will be
    /// generated.
    pub fn new(network: Network) -> Self {
        Self {
            name: String::new(),
            wallet_name: String::new(),
            network,
            token: None,
            data: Vec::new(),
            master: None,
            join_secret_key: None,
            auth_secret_key: None,
        }
    }
}

/// Memoized proof artifacts, invalidated as a unit by
/// [`IdentityContext::refresh`].
#[derive(Debug, Clone, Default)]
struct ProofCache {
    join_hash: Option<[u8; 32]>,
    join_signature: Option<Signature>,
    xpub_proof: Option<Signature>,
    cosigner: Option<Cosigner>,
}

/// Cryptographic identity of one cosigner in a multi-party wallet.
#[derive(Debug)]
pub struct IdentityContext {
    pub(crate) network: Network,
    pub(crate) master: Xpriv,
    account_xpriv: Xpriv,
    pub(crate) account_key: Xpub,
    pub(crate) auth_secret_key: SecretKey,
    pub(crate) auth_public_key: PublicKey,
    pub(crate) join_secret_key: SecretKey,
    pub(crate) join_public_key: PublicKey,
    pub(crate) fingerprint: u32,
    pub(crate) name: String,
    pub(crate) wallet_name: String,
    pub(crate) token: [u8; 32],
    pub(crate) data: Vec<u8>,
    cache: ProofCache,
}

impl IdentityContext {
    /// Builds a fresh identity from `options`, generating any absent key
    /// material.
    pub fn new(options: IdentityOptions) -> Result<Self, IdentityError> {
        let IdentityOptions {
            name,
            wallet_name,
            network,
            token,
            data,
            master,
            join_secret_key,
            auth_secret_key,
        } = options;

        let master = match master {
            Some(master) => {
                if master.network != NetworkKind::from(network) {
                    return Err(IdentityError::InvalidConfiguration(format!(
                        "master key encodes network kind {:?}, options say {network}",
                        master.network
                    )));
                }
                master
            }
            None => generate_master(network)?,
        };

        let join_secret_key = secret_key_option("joinPrivateKey", join_secret_key)?;
        let auth_secret_key = secret_key_option("authPrivateKey", auth_secret_key)?;

        Self::from_parts(
            network,
            master,
            join_secret_key,
            auth_secret_key,
            name,
            wallet_name,
            token.unwrap_or([0u8; 32]),
            data,
        )
    }

    /// Internal constructor shared by [`Self::new`] and snapshot restore.
    ///
    /// Performs the `init` step: every public value (account key, keypair
    /// public halves, fingerprint) is rederived from the private material
    /// passed in, never accepted from outside. Pure, so rerunning it on the
    /// same inputs yields an identical context.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        network: Network,
        master: Xpriv,
        join_secret_key: SecretKey,
        auth_secret_key: SecretKey,
        name: String,
        wallet_name: String,
        token: [u8; 32],
        data: Vec<u8>,
    ) -> Result<Self, IdentityError> {
        let account_xpriv = master
            .derive_priv(SECP256K1, &ACCOUNT_DERIVATION_PATH)
            .map_err(|e| IdentityError::key_material("master", e))?;
        let account_key = Xpub::from_priv(SECP256K1, &account_xpriv);
        let fingerprint = u32::from_be_bytes(*master.fingerprint(SECP256K1).as_bytes());
        let auth_public_key = PublicKey::from_secret_key(SECP256K1, &auth_secret_key);
        let join_public_key = PublicKey::from_secret_key(SECP256K1, &join_secret_key);

        debug!(%network, fingerprint, "initialized cosigner identity");

        Ok(Self {
            network,
            master,
            account_xpriv,
            account_key,
            auth_secret_key,
            auth_public_key,
            join_secret_key,
            join_public_key,
            fingerprint,
            name,
            wallet_name,
            token,
            data,
            cache: ProofCache::default(),
        })
    }

    /// Network this identity operates on.
    pub const fn network(&self) -> Network {
        self.network
    }

    /// Display name of the cosigner.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the wallet this identity is bound to.
    pub fn wallet_name(&self) -> &str {
        &self.wallet_name
    }

    /// Master key fingerprint: big-endian first four bytes of hash160 of the
    /// master public key.
    pub const fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Account extended public key at `m/44'/0'/0'`.
    pub const fn account_key(&self) -> &Xpub {
        &self.account_key
    }

    /// Public half of the authorization keypair.
    pub const fn auth_public_key(&self) -> &PublicKey {
        &self.auth_public_key
    }

    /// Public half of the join keypair.
    pub const fn join_public_key(&self) -> &PublicKey {
        &self.join_public_key
    }

    /// Authorization token.
    pub const fn token(&self) -> &[u8; 32] {
        &self.token
    }

    /// Opaque auxiliary payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reassigns the display name. Call [`Self::refresh`] afterwards so the
    /// proofs are recomputed against the new binding.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Reassigns the wallet name. Same refresh rule as [`Self::set_name`].
    pub fn set_wallet_name(&mut self, wallet_name: impl Into<String>) {
        self.wallet_name = wallet_name.into();
    }

    /// Drops all memoized proof artifacts without touching identity
    /// material. The next accessor call recomputes from current fields.
    pub fn refresh(&mut self) {
        trace!("dropping memoized join-proof material");
        self.cache = ProofCache::default();
    }

    fn require_binding(&self) -> Result<(), IdentityError> {
        if self.name.is_empty() {
            return Err(IdentityError::MissingIdentityField("name"));
        }
        if self.wallet_name.is_empty() {
            return Err(IdentityError::MissingIdentityField("walletName"));
        }
        Ok(())
    }

    /// Digest binding this identity to its wallet. Memoized.
    pub fn join_hash(&mut self) -> Result<[u8; 32], IdentityError> {
        self.require_binding()?;
        if let Some(hash) = self.cache.join_hash {
            return Ok(hash);
        }
        let hash = join_hash(
            &self.wallet_name,
            &self.name,
            &self.auth_public_key,
            &self.account_key,
            self.network,
        );
        self.cache.join_hash = Some(hash);
        Ok(hash)
    }

    /// Join-key signature over the join hash. Memoized.
    pub fn join_signature(&mut self) -> Result<Signature, IdentityError> {
        if let Some(sig) = self.cache.join_signature {
            return Ok(sig);
        }
        let msg = Message::from_digest(self.join_hash()?);
        let sig = SECP256K1.sign_ecdsa(&msg, &self.join_secret_key);
        self.cache.join_signature = Some(sig);
        Ok(sig)
    }

    /// Proof-key signature over the join hash, demonstrating control of the
    /// account xpub independently of the join key. Memoized.
    pub fn xpub_proof(&mut self) -> Result<Signature, IdentityError> {
        if let Some(sig) = self.cache.xpub_proof {
            return Ok(sig);
        }
        let msg = Message::from_digest(self.join_hash()?);
        let proof_xpriv = self
            .account_xpriv
            .derive_priv(SECP256K1, &PROOF_KEY_PATH)
            .map_err(|e| IdentityError::key_material("accountKey", e))?;
        let sig = SECP256K1.sign_ecdsa(&msg, &proof_xpriv.private_key);
        self.cache.xpub_proof = Some(sig);
        Ok(sig)
    }

    /// Public key the [`Self::xpub_proof`] signature verifies against.
    ///
    /// Derivable by any peer from the account xpub alone, since the proof
    /// path is non-hardened.
    pub fn proof_public_key(&self) -> Result<PublicKey, IdentityError> {
        let proof_xpub = self
            .account_key
            .derive_pub(SECP256K1, &PROOF_KEY_PATH)
            .map_err(|e| IdentityError::key_material("accountKey", e))?;
        Ok(proof_xpub.public_key)
    }

    /// Signs a proposal message on behalf of this cosigner.
    ///
    /// Hashes `(wallet_name, kind, payload)` under the proposal domain tag
    /// and signs with the authorization key. Deterministic: the same triple
    /// always yields the same signature.
    pub fn sign_proposal(
        &self,
        kind: u8,
        payload: &ProposalPayload,
    ) -> Result<Signature, IdentityError> {
        if self.wallet_name.is_empty() {
            return Err(IdentityError::MissingIdentityField("walletName"));
        }
        let hash = proposal_hash(&self.wallet_name, kind, &payload.to_bytes());
        let msg = Message::from_digest(hash);
        Ok(SECP256K1.sign_ecdsa(&msg, &self.auth_secret_key))
    }

    /// Builds (and memoizes) the exportable [`Cosigner`] record.
    pub fn to_cosigner(&mut self) -> Result<Cosigner, IdentityError> {
        if let Some(cosigner) = &self.cache.cosigner {
            return Ok(cosigner.clone());
        }
        let join_signature = self.join_signature()?;
        let cosigner = Cosigner {
            name: self.name.clone(),
            account_key: self.account_key,
            auth_public_key: self.auth_public_key.serialize(),
            join_signature: join_signature.serialize_compact(),
            fingerprint: self.fingerprint,
            token: self.token,
            purpose: PURPOSE,
        };
        self.cache.cosigner = Some(cosigner.clone());
        Ok(cosigner)
    }

    /// Builds the wire payload for a wallet-join request.
    pub fn to_http_options(&mut self) -> Result<JoinRequest, IdentityError> {
        let join_signature = self.join_signature()?;
        let account_key_proof = self.xpub_proof()?;
        Ok(JoinRequest {
            cosigner: CosignerOptions {
                name: self.name.clone(),
                purpose: PURPOSE,
                fingerprint: self.fingerprint,
                data: self.data.clone(),
                token: self.token,
                account_key: self.account_key,
                account_key_proof: account_key_proof.serialize_compact(),
                auth_public_key: self.auth_public_key.serialize(),
            },
            join_signature: join_signature.serialize_compact(),
        })
    }
}

impl fmt::Display for IdentityContext {
    /// Human-readable identity dump. Diagnostic only; includes the master
    /// extended private key, so never log it outside of debugging sessions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cosigner identity")?;
        writeln!(f, "  name:         {}", self.name)?;
        writeln!(f, "  wallet:       {}", self.wallet_name)?;
        writeln!(f, "  network:      {}", self.network)?;
        writeln!(f, "  master:       {}", self.master)?;
        writeln!(f, "  token:        {}", hex::encode(self.token))?;
        writeln!(f, "  fingerprint:  {:08x}", self.fingerprint)?;
        writeln!(f, "  purpose:      {PURPOSE}'")?;
        writeln!(f, "  account key:  {}", self.account_key)?;
        writeln!(f, "  auth pubkey:  {}", self.auth_public_key)?;
        write!(f, "  join pubkey:  {}", self.join_public_key)?;
        if let Some(cosigner) = &self.cache.cosigner {
            write!(f, "\n  cosigner:     {cosigner:?}")?;
        }
        Ok(())
    }
}

/// Generates a fresh master key from 32 bytes of CSPRNG-provided seed.
fn generate_master(network: Network) -> Result<Xpriv, IdentityError> {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);
    let master =
        Xpriv::new_master(network, &seed).map_err(|e| IdentityError::key_material("master", e));
    seed.zeroize();
    master
}

/// Validates an optionally-supplied raw scalar, generating one when absent.
fn secret_key_option(
    field: &'static str,
    bytes: Option<Vec<u8>>,
) -> Result<SecretKey, IdentityError> {
    match bytes {
        Some(mut bytes) => {
            let key =
                SecretKey::from_slice(&bytes).map_err(|e| IdentityError::key_material(field, e));
            bytes.zeroize();
            key
        }
        None => Ok(SecretKey::new(&mut rand::thread_rng())),
    }
}
