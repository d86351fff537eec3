//! Hex helpers shared across the workspace
//!
//! The node emits and accepts 0x-prefixed hex throughout (identities,
//! signing keys, byte attributes, proof-field keys).

use thiserror::Error;

/// Hex decoding failure.
#[derive(Debug, Error)]
pub enum HexError {
    #[error("invalid hex string: {0}")]
    Invalid(#[from] hex::FromHexError),
}

/// Decode a hex string, tolerating an optional `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, HexError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(stripped)?)
}

/// Encode bytes as 0x-prefixed lowercase hex, the node's canonical form.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_both_forms() {
        assert_eq!(decode_hex("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(decode_hex("dead").unwrap(), vec![0xde, 0xad]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_hex("0xzz").is_err());
    }

    #[test]
    fn encode_is_prefixed_lowercase() {
        assert_eq!(encode_hex(&[0xDE, 0xAD]), "0xdead");
    }
}
