//! Address derivation and proof-field construction for NFT minting
//!
//! A mint request must name the committed-document leaves the node will
//! prove. Four of those are fixed attribute leaves of the v2 document
//! schema; the fifth is the signature leaf of the minting identity, keyed by
//! the identity bytes concatenated with an address derived from the
//! account's signing key.
//!
//! The address derivation is the standard 20-byte account scheme: Keccak-256
//! over the public key without its uncompressed-point prefix byte, low 20
//! digest bytes, right-aligned into 32 bytes for proof-path encoding.

#![deny(unsafe_code)]

use moorline_types::{decode_hex, encode_hex, HexError};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Attribute leaves of the v2 schema every mint proof must cover.
///
/// The bracketed hashes identify well-known attribute labels; they are an
/// external contract with the node's schema and must not be recomputed here.
pub const FIXED_PROOF_FIELDS: [&str; 4] = [
    "cd_tree.attributes[0xe24e7917d4fcaf79095539ac23af9f6d5c80ea8b0d95c9cd860152bff8fdab17].byte_val",
    "cd_tree.attributes[0xcd35852d8705a28d4f83ba46f02ebdf46daf03638b40da74b9371d715976e6dd].byte_val",
    "cd_tree.attributes[0xbbaa573c53fa357a3b53624eb6deab5f4c758f299cffc2b0b6162400e3ec13ee].byte_val",
    "cd_tree.attributes[0xe5588a8a267ed4c32962568afe216d4ba70ae60576a611e3ca557b84f1724e29].byte_val",
];

/// Number of bytes in a derived account address before padding.
const ADDRESS_LEN: usize = 20;

/// Failure building proof fields.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("signing key too short: {0} bytes")]
    KeyLength(usize),

    #[error(transparent)]
    Hex(#[from] HexError),
}

/// Derive the 32-byte proof address for a signing public key.
///
/// Deterministic; the first 12 bytes of the output are always zero.
pub fn derive_address(public_key: &[u8]) -> Result<[u8; 32], ProofError> {
    if public_key.len() < 2 {
        return Err(ProofError::KeyLength(public_key.len()));
    }

    // Skip the uncompressed-point prefix byte before hashing.
    let digest = Keccak256::digest(&public_key[1..]);
    let address = &digest[digest.len() - ADDRESS_LEN..];

    let mut padded = [0u8; 32];
    padded[32 - ADDRESS_LEN..].copy_from_slice(address);
    Ok(padded)
}

/// Build the proof-field paths for a mint request: the four fixed attribute
/// leaves plus the minting identity's signature leaf.
///
/// `identity` is the 0x-hex identity the mint is issued under; `public_key`
/// is that account's signing key. Built fresh per call since the signature
/// leaf depends on the account's current key.
pub fn proof_fields(identity: &str, public_key: &[u8]) -> Result<Vec<String>, ProofError> {
    let address = derive_address(public_key)?;

    let mut key = decode_hex(identity)?;
    key.extend_from_slice(&address);

    let mut fields: Vec<String> = FIXED_PROOF_FIELDS.iter().map(|f| f.to_string()).collect();
    fields.push(format!("signatures_tree.signatures[{}]", encode_hex(&key)));
    Ok(fields)
}
