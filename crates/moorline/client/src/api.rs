//! The API seam between the lifecycle flow and the node

use crate::error::ClientResult;
use async_trait::async_trait;
use moorline_types::{AttributeSet, DocumentHeader, MintResponse};

/// Node operations the document lifecycle depends on.
///
/// [`crate::NodeClient`] is the production implementation; tests drive the
/// flow with an in-memory fake. Every call acts under the bearer `identity`
/// it is given, since the same document is touched by two identities over
/// its lifecycle.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Create a new document seeded with `attributes`.
    async fn create_document(
        &self,
        identity: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader>;

    /// Clone `template_id` into a new document, optionally seeding attributes.
    async fn clone_document(
        &self,
        identity: &str,
        template_id: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader>;

    /// Update attributes on an existing document. The node assigns a new
    /// document id for the new version; callers must adopt it.
    async fn update_document(
        &self,
        identity: &str,
        document_id: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader>;

    /// Request anchoring. The returned header carries the fingerprint (on
    /// newer nodes) and the job to await before relying on committed state.
    async fn commit_document(
        &self,
        identity: &str,
        document_id: &str,
    ) -> ClientResult<DocumentHeader>;

    /// Grant `collaborator` document-level access; returns the role id.
    async fn create_role(
        &self,
        owner: &str,
        collaborator: &str,
        document_id: &str,
    ) -> ClientResult<String>;

    /// Register a compute rule over `input_labels` producing `output_label`,
    /// and restrict writes on the inputs to `role_id`.
    async fn attach_compute_rule(
        &self,
        owner: &str,
        document_id: &str,
        role_id: &str,
        module: &[u8],
        input_labels: &[String],
        output_label: &str,
    ) -> ClientResult<()>;

    /// Read one attribute value from the committed view.
    async fn committed_attribute(
        &self,
        identity: &str,
        document_id: &str,
        label: &str,
    ) -> ClientResult<String>;

    /// Fetch the account's signing public key (0x-hex).
    async fn signing_key(&self, identity: &str, account_id: &str) -> ClientResult<String>;

    /// Submit a mint request against `registry`.
    async fn mint_nft(
        &self,
        identity: &str,
        document_id: &str,
        registry: &str,
        asset_contract: &str,
        deposit_address: &str,
        proof_fields: &[String],
    ) -> ClientResult<MintResponse>;

    /// Poll `job_id` to completion.
    async fn await_job(&self, identity: &str, job_id: &str) -> ClientResult<()>;
}
