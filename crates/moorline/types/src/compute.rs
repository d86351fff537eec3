//! Compute-rule result decoding

use crate::encoding::{decode_hex, HexError};
use thiserror::Error;

/// Length of the encoded compute result in bytes.
const RESULT_LEN: usize = 32;

/// Failure decoding a compute-rule result attribute.
#[derive(Debug, Error)]
pub enum ResultDecodeError {
    #[error(transparent)]
    Hex(#[from] HexError),

    #[error("compute result must be {RESULT_LEN} bytes, got {0}")]
    Length(usize),
}

/// Output of a document's compute rule.
///
/// The compute module writes a single 32-byte value into its target
/// attribute: the risk score big-endian in the high 16 bytes, the computed
/// value big-endian in the low 16. This split is a fixed contract with the
/// module's output encoding, not a general numeric format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeResult {
    pub risk: u128,
    pub value: u128,
}

impl ComputeResult {
    /// Decode a fetched result attribute (hex string, 0x optional).
    pub fn decode(attr: &str) -> Result<Self, ResultDecodeError> {
        let bytes = decode_hex(attr)?;
        if bytes.len() != RESULT_LEN {
            return Err(ResultDecodeError::Length(bytes.len()));
        }

        let mut high = [0u8; 16];
        let mut low = [0u8; 16];
        high.copy_from_slice(&bytes[..16]);
        low.copy_from_slice(&bytes[16..]);

        Ok(Self {
            risk: u128::from_be_bytes(high),
            value: u128::from_be_bytes(low),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_risk_and_value() {
        // risk = 1, value = 1016
        let mut bytes = [0u8; 32];
        bytes[15] = 1;
        bytes[30] = 0x03;
        bytes[31] = 0xf8;
        let encoded = format!("0x{}", hex::encode(bytes));

        let result = ComputeResult::decode(&encoded).unwrap();
        assert_eq!(result.risk, 1);
        assert_eq!(result.value, 1016);
    }

    #[test]
    fn all_zero_bytes_decode_to_zero() {
        let encoded = format!("0x{}", hex::encode([0u8; 32]));
        let result = ComputeResult::decode(&encoded).unwrap();
        assert_eq!(result.risk, 0);
        assert_eq!(result.value, 0);
    }

    #[test]
    fn rejects_short_values() {
        let err = ComputeResult::decode("0xdeadbeef").unwrap_err();
        assert!(matches!(err, ResultDecodeError::Length(4)));
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(ComputeResult::decode("0xnothex").is_err());
    }
}
