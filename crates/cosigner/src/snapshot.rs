//! Snapshot (de)serialization of a cosigner identity.
//!
//! A snapshot carries exactly the private material plus display fields; every
//! public value is rederived on restore rather than trusted from the wire.
//! The one redundant field, `fingerprint`, is checked against the recomputed
//! value so a tampered or mis-spliced snapshot is rejected instead of
//! producing an identity that signs under the wrong lineage.

use bitcoin::{bip32::Xpriv, Network, NetworkKind};
use secp256k1::SecretKey;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use crate::{errors::IdentityError, identity::IdentityContext};

/// Serialized form of an [`IdentityContext`].
///
/// Raw byte fields are hex-encoded, `master` uses the network's base58
/// extended-key encoding, `network` its string tag. Holds private key
/// material; treat with the same care as the identity itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySnapshot {
    /// Display name of the cosigner.
    pub name: String,
    /// Name of the wallet this identity is bound to.
    pub wallet_name: String,
    /// Authorization token.
    #[serde(with = "hex::serde")]
    pub token: [u8; 32],
    /// Opaque auxiliary payload.
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
    /// Network tag the identity was created under.
    pub network: Network,
    /// Master extended private key.
    pub master: Xpriv,
    /// Raw join secret key.
    #[serde(with = "hex::serde")]
    pub join_private_key: [u8; 32],
    /// Raw authorization secret key.
    #[serde(with = "hex::serde")]
    pub auth_private_key: [u8; 32],
    /// Master key fingerprint; verified against the restored master key.
    pub fingerprint: u32,
}

impl IdentityContext {
    /// Captures the identity as a serializable snapshot.
    pub fn to_snapshot(&self) -> IdentitySnapshot {
        IdentitySnapshot {
            name: self.name.clone(),
            wallet_name: self.wallet_name.clone(),
            token: self.token,
            data: self.data.clone(),
            network: self.network,
            master: self.master,
            join_private_key: self.join_secret_key.secret_bytes(),
            auth_private_key: self.auth_secret_key.secret_bytes(),
            fingerprint: self.fingerprint,
        }
    }

    /// Restores an identity from a snapshot, rederiving every public value.
    pub fn from_snapshot(snapshot: IdentitySnapshot) -> Result<Self, IdentityError> {
        let IdentitySnapshot {
            name,
            wallet_name,
            token,
            data,
            network,
            master,
            mut join_private_key,
            mut auth_private_key,
            fingerprint,
        } = snapshot;

        if master.network != NetworkKind::from(network) {
            return Err(IdentityError::MalformedSnapshot(format!(
                "master key encodes network kind {:?}, snapshot says {network}",
                master.network
            )));
        }

        let join_secret_key = SecretKey::from_slice(&join_private_key)
            .map_err(|e| IdentityError::key_material("joinPrivateKey", e));
        join_private_key.zeroize();
        let auth_secret_key = SecretKey::from_slice(&auth_private_key)
            .map_err(|e| IdentityError::key_material("authPrivateKey", e));
        auth_private_key.zeroize();

        let ctx = Self::from_parts(
            network,
            master,
            join_secret_key?,
            auth_secret_key?,
            name,
            wallet_name,
            token,
            data,
        )?;

        if ctx.fingerprint != fingerprint {
            return Err(IdentityError::MalformedSnapshot(format!(
                "fingerprint {fingerprint} does not match master key (expected {})",
                ctx.fingerprint
            )));
        }

        debug!(fingerprint, "restored cosigner identity from snapshot");
        Ok(ctx)
    }

    /// Serializes the identity to its JSON snapshot form.
    pub fn to_json(&self) -> Result<String, IdentityError> {
        serde_json::to_string(&self.to_snapshot())
            .map_err(|e| IdentityError::MalformedSnapshot(e.to_string()))
    }

    /// Restores an identity from its JSON snapshot form.
    pub fn from_json(json: &str) -> Result<Self, IdentityError> {
        let snapshot: IdentitySnapshot = serde_json::from_str(json)
            .map_err(|e| IdentityError::MalformedSnapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::identity::IdentityOptions;

    fn fixed_context() -> IdentityContext {
        let options = IdentityOptions {
            name: "alice".to_owned(),
            wallet_name: "shared-wallet".to_owned(),
            master: Some(Xpriv::new_master(Network::Bitcoin, &[2u8; 32]).unwrap()),
            join_secret_key: Some(vec![0x11; 32]),
            auth_secret_key: Some(vec![0x22; 32]),
            ..IdentityOptions::new(Network::Bitcoin)
        };
        IdentityContext::new(options).unwrap()
    }

    #[test]
    fn snapshot_json_has_the_wire_field_set() {
        let json = fixed_context().to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        for field in [
            "name",
            "walletName",
            "token",
            "data",
            "network",
            "master",
            "joinPrivateKey",
            "authPrivateKey",
            "fingerprint",
        ] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["network"], "bitcoin");
        assert_eq!(value["token"], "00".repeat(32));
        assert!(value["master"].as_str().unwrap().starts_with("xprv"));
        assert!(value["fingerprint"].is_u64());
    }

    #[test]
    fn round_trip_preserves_every_accessor() {
        let mut original = fixed_context();
        let mut restored = IdentityContext::from_json(&original.to_json().unwrap()).unwrap();

        assert_eq!(restored.name(), original.name());
        assert_eq!(restored.wallet_name(), original.wallet_name());
        assert_eq!(restored.fingerprint(), original.fingerprint());
        assert_eq!(restored.account_key(), original.account_key());
        assert_eq!(restored.auth_public_key(), original.auth_public_key());
        assert_eq!(restored.join_public_key(), original.join_public_key());
        assert_eq!(restored.join_hash().unwrap(), original.join_hash().unwrap());
        assert_eq!(
            restored.join_signature().unwrap(),
            original.join_signature().unwrap(),
        );
        assert_eq!(restored.xpub_proof().unwrap(), original.xpub_proof().unwrap());
        assert_eq!(restored.to_cosigner().unwrap(), original.to_cosigner().unwrap());
    }

    #[test]
    fn tampered_fingerprint_is_rejected() {
        let mut snapshot = fixed_context().to_snapshot();
        snapshot.fingerprint ^= 1;
        let err = IdentityContext::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, IdentityError::MalformedSnapshot(_)));
    }

    #[test]
    fn network_mismatch_is_rejected() {
        let mut snapshot = fixed_context().to_snapshot();
        snapshot.network = Network::Regtest; // master stays a mainnet xprv
        let err = IdentityContext::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, IdentityError::MalformedSnapshot(_)));
    }

    #[test]
    fn undecodable_master_key_is_rejected() {
        let json = fixed_context().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["master"] = Value::String("xprvnotakey".to_owned());
        let err = IdentityContext::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, IdentityError::MalformedSnapshot(_)));
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = fixed_context().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().remove("joinPrivateKey");
        let err = IdentityContext::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, IdentityError::MalformedSnapshot(_)));
    }
}
