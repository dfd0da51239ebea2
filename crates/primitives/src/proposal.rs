//! Proposal payload encoding.

use serde::Serialize;
use serde_json::Value;

/// Body of a proposal message.
///
/// Peers hash the payload byte-for-byte, so JSON bodies are reduced to a
/// canonical encoding (`serde_json` with sorted object keys) before they hit
/// the proposal hash. Raw text passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalPayload {
    /// A payload that is already a string; hashed as its UTF-8 bytes.
    Text(String),
    /// A structured payload, canonically JSON-encoded before hashing.
    Json(Value),
}

impl ProposalPayload {
    /// Builds a JSON payload from any serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Canonical byte encoding fed into the proposal hash.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.clone().into_bytes(),
            Self::Json(value) => value.to_string().into_bytes(),
        }
    }
}

impl From<&str> for ProposalPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for ProposalPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ProposalPayload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_passes_through_unchanged() {
        let payload = ProposalPayload::from("spend 5 to bob");
        assert_eq!(payload.to_bytes(), b"spend 5 to bob");
    }

    #[test]
    fn json_encoding_is_canonical() {
        // serde_json maps are ordered, so equal values encode identically
        // regardless of how they were assembled.
        let a = json!({ "amount": 5, "to": "bob" });
        let b = json!({ "to": "bob", "amount": 5 });
        assert_eq!(
            ProposalPayload::from(a).to_bytes(),
            ProposalPayload::from(b).to_bytes(),
        );
    }

    #[test]
    fn json_helper_round_trips_serializable_values() {
        #[derive(Serialize)]
        struct Spend {
            amount: u64,
        }

        let payload = ProposalPayload::json(&Spend { amount: 5 }).unwrap();
        assert_eq!(payload.to_bytes(), br#"{"amount":5}"#);
    }
}
