//! HTTP client for a Moorline anchoring node
//!
//! [`NodeClient`] speaks the node's v2 surface: document create/update/
//! clone/commit, roles, transition rules, the committed view, accounts, NFT
//! minting, and the job endpoint the poller drives. Every request carries
//! the acting identity as a bearer `authorization` header.
//!
//! Commits and mints are asynchronous on the node; [`NodeClient::await_job`]
//! turns the returned job id into a synchronous outcome by polling at a
//! fixed interval.
//!
//! The lifecycle flow consumes this client through the [`DocumentApi`]
//! trait so its transitions can be unit-tested against a fake node.

#![deny(unsafe_code)]

mod api;
mod client;
mod error;

pub use api::DocumentApi;
pub use client::{NodeClient, NodeProfile};
pub use error::{ClientError, ClientResult};
