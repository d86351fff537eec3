//! Typed document attributes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value syntax a node accepts for an attribute.
///
/// The node, not this client, validates that the value string matches the
/// declared kind (timestamps are RFC3339 with nanoseconds, bytes are
/// 0x-prefixed hex, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Integer,
    Decimal,
    String,
    Bytes,
    Timestamp,
    Monetary,
}

/// A single typed attribute value as the node serializes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// Declared value syntax
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    /// Value encoded per the declared kind
    pub value: String,
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: AttributeKind::String,
            value: value.into(),
        }
    }

    pub fn integer(value: impl Into<String>) -> Self {
        Self {
            kind: AttributeKind::Integer,
            value: value.into(),
        }
    }

    pub fn decimal(value: impl Into<String>) -> Self {
        Self {
            kind: AttributeKind::Decimal,
            value: value.into(),
        }
    }

    /// A bytes attribute; `value` must already be 0x-prefixed hex.
    pub fn bytes(value: impl Into<String>) -> Self {
        Self {
            kind: AttributeKind::Bytes,
            value: value.into(),
        }
    }

    /// An RFC3339-with-nanoseconds timestamp attribute.
    pub fn timestamp(at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            kind: AttributeKind::Timestamp,
            value: at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
        }
    }

    pub fn monetary(value: impl Into<String>) -> Self {
        Self {
            kind: AttributeKind::Monetary,
            value: value.into(),
        }
    }
}

/// Attributes keyed by label. Labels are unique; ordering is irrelevant to
/// the node, a BTreeMap just keeps request bodies deterministic.
pub type AttributeSet = BTreeMap<String, AttributeValue>;
