//! Wire DTOs for the node's v2 HTTP surface
//!
//! Only the fields the lifecycle reads are modeled; everything else in the
//! node's responses is ignored.

use crate::attributes::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header block returned by document create/update/clone/commit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentHeader {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub document_id: String,
    /// Only present on commit responses from newer nodes.
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Envelope for document actions.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResponse {
    pub header: DocumentHeader,
}

/// Response to role creation.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleResponse {
    pub id: String,
}

/// Committed (or draft, on older nodes) document view; only attributes are
/// read back.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentView {
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Account detail; only the signing key is read.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub signing_key_pair: SigningKeyPair,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigningKeyPair {
    /// 0x-hex public key, uncompressed-point prefix byte included.
    #[serde(rename = "pub")]
    pub public: String,
}

/// Response to an NFT mint request.
#[derive(Debug, Clone, Deserialize)]
pub struct MintResponse {
    pub header: MintHeader,
    pub token_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MintHeader {
    pub job_id: String,
}

/// Canonical job state, independent of which wire shape reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub finished: bool,
    /// Service-reported failure text, verbatim. `None` on a clean finish.
    pub error: Option<String>,
}

/// Job status as newer nodes report it: a task list with per-task errors.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusTasks {
    pub finished: bool,
    #[serde(default)]
    pub tasks: Vec<JobTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobTask {
    #[serde(default)]
    pub error: String,
}

impl From<JobStatusTasks> for JobStatus {
    fn from(dto: JobStatusTasks) -> Self {
        let error = dto
            .tasks
            .last()
            .map(|task| task.error.clone())
            .filter(|message| !message.is_empty());
        Self {
            finished: dto.finished,
            error,
        }
    }
}

/// Job status as older nodes report it: a status keyword plus message.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusKeyword {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<JobStatusKeyword> for JobStatus {
    fn from(dto: JobStatusKeyword) -> Self {
        match dto.status.as_str() {
            "pending" => Self {
                finished: false,
                error: None,
            },
            "success" => Self {
                finished: true,
                error: None,
            },
            other => Self {
                finished: true,
                error: Some(dto.message.unwrap_or_else(|| other.to_string())),
            },
        }
    }
}
