//! Shared domain types for Moorline
//!
//! A Moorline document is a versioned, attribute-bearing record anchored by
//! a remote node. The types here are shared across the client, the lifecycle
//! flow, and the CLI:
//!
//! - **AttributeValue / AttributeSet**: typed attributes attached to a
//!   document. The node validates value syntax against the declared kind;
//!   these types only carry the contract.
//! - **ComputeResult**: the fixed binary encoding a compute rule writes into
//!   its target attribute (risk in the high 16 bytes, value in the low 16).
//! - **InvoiceRecord**: a business record mapped from a CSV row, plus the
//!   attribute dictionaries the lifecycle seeds documents with.
//! - Wire DTOs for the node's v2 HTTP surface.

#![deny(unsafe_code)]

mod attributes;
mod compute;
mod encoding;
mod record;
mod wire;

pub use attributes::*;
pub use compute::*;
pub use encoding::*;
pub use record::*;
pub use wire::*;
