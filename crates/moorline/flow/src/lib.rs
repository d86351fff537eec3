//! Document lifecycle orchestration
//!
//! [`DocumentFlow`] drives one document through its stages against an
//! anchoring node: create (or clone from a template), authorize the
//! collaborator, attach the compute rule, commit and await the anchor job,
//! read the compute result, let the collaborator supply the remaining
//! inputs, commit again, read the recomputed result, and finally mint an
//! NFT gated by proof fields.
//!
//! Stages only move forward; the first failed remote call parks the flow in
//! [`FlowStage::Failed`] and the remaining steps are skipped. No rollback is
//! attempted; the remote document stays in whatever state the last
//! successful call left it.
//!
//! [`run_all`] executes many flows concurrently, one task per document,
//! collecting outcomes through a channel so a failed document never aborts
//! its siblings.

#![deny(unsafe_code)]

mod error;
mod flow;
mod runner;

pub use error::{FlowError, FlowResult};
pub use flow::{
    build_template, DocumentFlow, DocumentHandle, FlowConfig, FlowOutcome, FlowParticipants,
    FlowStage, RoleHandle, TemplateRef,
};
pub use runner::run_all;
