//! Per-document lifecycle state machine

use crate::error::{FlowError, FlowResult};
use moorline_client::DocumentApi;
use moorline_proof::{proof_fields, ProofError};
use moorline_types::{decode_hex, AttributeSet, ComputeResult, InvoiceRecord};
use std::sync::Arc;

/// Stages a document moves through. Forward-only; any failed remote call
/// parks the flow in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    /// No remote state yet
    New,
    /// Document exists on the node, attributes not yet seeded
    Created,
    /// Initial attributes are on the draft
    AttributesSet,
    /// Collaborator role granted
    CollaboratorAuthorized,
    /// Compute rule registered (or inherited from a template)
    ComputeRuleAttached,
    /// Anchored; `1` after the owner's commit, `2` after the collaborator's
    Committed(u8),
    /// Compute result read from the committed view
    ResultAvailable(u8),
    /// Collaborator supplied the compute inputs
    CollaboratorUpdated,
    /// Terminal success
    Minted,
    /// Terminal failure; no rollback is attempted
    Failed,
}

/// The document this flow owns. The id is reassigned by clone/update; the
/// fingerprint appears after the first commit (newer nodes only).
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    pub document_id: String,
    pub fingerprint: Option<String>,
}

/// Role granted to the collaborator; immutable once created.
#[derive(Debug, Clone)]
pub struct RoleHandle {
    pub role_id: String,
}

/// A committed template documents can be cloned from. Its role and compute
/// rule travel with the clone.
#[derive(Debug, Clone)]
pub struct TemplateRef {
    pub document_id: String,
    pub fingerprint: Option<String>,
}

/// The two identities driving one document.
#[derive(Debug, Clone)]
pub struct FlowParticipants {
    /// Creates, commits first, and mints
    pub owner: String,
    /// Supplies the compute-rule inputs and commits second
    pub collaborator: String,
}

/// Static inputs shared by every flow in a run.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// NFT registry the mint is issued against
    pub registry: String,
    /// Asset manager contract address
    pub asset_contract: String,
    /// Deposit address for the minted token
    pub deposit_address: String,
    /// Compute module binary, sent hex-encoded
    pub compute_module: Vec<u8>,
    /// Attribute labels the compute rule reads
    pub input_labels: Vec<String>,
    /// Attribute label the compute rule writes
    pub output_label: String,
    /// Clone from this template instead of creating from scratch
    pub template: Option<TemplateRef>,
}

impl FlowConfig {
    pub fn new(
        registry: impl Into<String>,
        asset_contract: impl Into<String>,
        deposit_address: impl Into<String>,
        compute_module: Vec<u8>,
    ) -> Self {
        Self {
            registry: registry.into(),
            asset_contract: asset_contract.into(),
            deposit_address: deposit_address.into(),
            compute_module,
            input_labels: vec!["RiskScore".to_string(), "AssetValue".to_string()],
            output_label: "result".to_string(),
            template: None,
        }
    }

    pub fn with_template(mut self, template: TemplateRef) -> Self {
        self.template = Some(template);
        self
    }
}

/// Everything a finished flow reports back.
#[derive(Debug, Clone)]
pub struct FlowOutcome {
    pub document_id: String,
    pub fingerprint: Option<String>,
    /// Compute result after the collaborator's commit
    pub result: ComputeResult,
    pub token_id: String,
}

/// Drives one document through its lifecycle.
///
/// Each transition is guarded by the stage it expects, calls the node, and
/// advances (or parks the flow in `Failed`). [`DocumentFlow::run`] strings
/// the transitions together for one invoice record.
pub struct DocumentFlow<A: DocumentApi> {
    api: Arc<A>,
    participants: FlowParticipants,
    config: FlowConfig,
    stage: FlowStage,
    document: Option<DocumentHandle>,
    role: Option<RoleHandle>,
}

impl<A: DocumentApi> DocumentFlow<A> {
    pub fn new(api: Arc<A>, participants: FlowParticipants, config: FlowConfig) -> Self {
        Self {
            api,
            participants,
            config,
            stage: FlowStage::New,
            document: None,
            role: None,
        }
    }

    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.as_ref()
    }

    pub fn role(&self) -> Option<&RoleHandle> {
        self.role.as_ref()
    }

    fn guard(&self, want: FlowStage, action: &'static str) -> FlowResult<()> {
        if self.stage != want {
            return Err(FlowError::Sequence {
                action,
                stage: self.stage,
            });
        }
        Ok(())
    }

    /// Record a remote result, parking the flow in `Failed` on error.
    fn advance<T, E: Into<FlowError>>(&mut self, result: Result<T, E>) -> FlowResult<T> {
        result.map_err(|err| {
            self.stage = FlowStage::Failed;
            err.into()
        })
    }

    fn document_id(&self) -> String {
        self.document
            .as_ref()
            .map(|doc| doc.document_id.clone())
            .unwrap_or_default()
    }

    /// Create the document, seeding `attributes`.
    pub async fn create(&mut self, attributes: &AttributeSet) -> FlowResult<()> {
        self.guard(FlowStage::New, "create")?;
        let created = self
            .api
            .create_document(&self.participants.owner, attributes)
            .await;
        let header = self.advance(created)?;
        tracing::info!(document_id = %header.document_id, "document created");
        self.document = Some(DocumentHandle {
            document_id: header.document_id,
            fingerprint: None,
        });
        self.stage = FlowStage::AttributesSet;
        Ok(())
    }

    /// Clone the configured template into a fresh draft.
    pub async fn clone_from_template(&mut self, template_id: &str) -> FlowResult<()> {
        self.guard(FlowStage::New, "clone from template")?;
        let cloned = self
            .api
            .clone_document(&self.participants.owner, template_id, &AttributeSet::new())
            .await;
        let header = self.advance(cloned)?;
        tracing::info!(
            template_id,
            document_id = %header.document_id,
            "document cloned from template"
        );
        self.document = Some(DocumentHandle {
            document_id: header.document_id,
            fingerprint: None,
        });
        self.stage = FlowStage::Created;
        Ok(())
    }

    /// Anchor a freshly cloned draft, before its attributes are set. The
    /// update that follows starts a new version on top of the anchored one.
    pub async fn anchor_clone(&mut self) -> FlowResult<()> {
        self.guard(FlowStage::Created, "anchor clone")?;
        let owner = self.participants.owner.clone();
        self.commit_as(&owner).await
    }

    /// Put the initial attributes on a cloned draft.
    pub async fn seed_attributes(&mut self, attributes: &AttributeSet) -> FlowResult<()> {
        self.guard(FlowStage::Created, "seed attributes")?;
        let document_id = self.document_id();
        let updated = self
            .api
            .update_document(&self.participants.owner, &document_id, attributes)
            .await;
        let header = self.advance(updated)?;
        if let Some(doc) = self.document.as_mut() {
            doc.document_id = header.document_id;
        }
        self.stage = FlowStage::AttributesSet;
        Ok(())
    }

    /// Grant the collaborator document-level access.
    pub async fn authorize_collaborator(&mut self) -> FlowResult<()> {
        self.guard(FlowStage::AttributesSet, "authorize collaborator")?;
        let document_id = self.document_id();
        let created = self
            .api
            .create_role(
                &self.participants.owner,
                &self.participants.collaborator,
                &document_id,
            )
            .await;
        let role_id = self.advance(created)?;
        tracing::info!(document_id = %document_id, role_id = %role_id, "collaborator authorized");
        self.role = Some(RoleHandle { role_id });
        self.stage = FlowStage::CollaboratorAuthorized;
        Ok(())
    }

    /// Register the compute rule. Requires the collaborator role, since the
    /// rule restricts input-attribute writes to it.
    pub async fn attach_compute_rule(&mut self) -> FlowResult<()> {
        self.guard(FlowStage::CollaboratorAuthorized, "attach compute rule")?;
        let document_id = self.document_id();
        let role_id = self
            .role
            .as_ref()
            .map(|role| role.role_id.clone())
            .unwrap_or_default();
        let attached = self
            .api
            .attach_compute_rule(
                &self.participants.owner,
                &document_id,
                &role_id,
                &self.config.compute_module,
                &self.config.input_labels,
                &self.config.output_label,
            )
            .await;
        self.advance(attached)?;
        tracing::info!(document_id = %document_id, "compute rule attached");
        self.stage = FlowStage::ComputeRuleAttached;
        Ok(())
    }

    /// Adopt the role and compute rule carried over by a template clone.
    pub fn inherit_template_rules(&mut self) -> FlowResult<()> {
        self.guard(FlowStage::AttributesSet, "inherit template rules")?;
        self.stage = FlowStage::ComputeRuleAttached;
        Ok(())
    }

    /// First anchor, issued by the owner.
    pub async fn commit_first(&mut self) -> FlowResult<()> {
        self.guard(FlowStage::ComputeRuleAttached, "commit")?;
        let owner = self.participants.owner.clone();
        self.commit_as(&owner).await?;
        self.stage = FlowStage::Committed(1);
        Ok(())
    }

    /// Read the compute result after the first anchor.
    pub async fn fetch_result_first(&mut self) -> FlowResult<ComputeResult> {
        self.guard(FlowStage::Committed(1), "fetch result")?;
        let result = self.fetch_result().await?;
        self.stage = FlowStage::ResultAvailable(1);
        Ok(result)
    }

    /// Collaborator supplies the attributes the compute rule reads.
    pub async fn collaborator_update(&mut self, attributes: &AttributeSet) -> FlowResult<()> {
        self.guard(FlowStage::ResultAvailable(1), "collaborator update")?;
        let document_id = self.document_id();
        let updated = self
            .api
            .update_document(&self.participants.collaborator, &document_id, attributes)
            .await;
        let header = self.advance(updated)?;
        tracing::info!(
            document_id = %header.document_id,
            "collaborator updated compute inputs"
        );
        if let Some(doc) = self.document.as_mut() {
            doc.document_id = header.document_id;
        }
        self.stage = FlowStage::CollaboratorUpdated;
        Ok(())
    }

    /// Second anchor, issued by the collaborator.
    pub async fn commit_second(&mut self) -> FlowResult<()> {
        self.guard(FlowStage::CollaboratorUpdated, "commit")?;
        let collaborator = self.participants.collaborator.clone();
        self.commit_as(&collaborator).await?;
        self.stage = FlowStage::Committed(2);
        Ok(())
    }

    /// Read the recomputed result after the collaborator's anchor.
    pub async fn fetch_result_second(&mut self) -> FlowResult<ComputeResult> {
        self.guard(FlowStage::Committed(2), "fetch result")?;
        let result = self.fetch_result().await?;
        self.stage = FlowStage::ResultAvailable(2);
        Ok(result)
    }

    /// Mint the NFT: derive proof fields from the owner's signing key,
    /// submit the mint, and await its job.
    pub async fn mint(&mut self) -> FlowResult<String> {
        self.guard(FlowStage::ResultAvailable(2), "mint")?;
        let owner = self.participants.owner.clone();
        let document_id = self.document_id();

        let key = self.api.signing_key(&owner, &owner).await;
        let key_hex = self.advance(key)?;
        let key_bytes = decode_hex(&key_hex).map_err(ProofError::from);
        let key_bytes = self.advance(key_bytes)?;
        let fields = self.advance(proof_fields(&owner, &key_bytes))?;

        let minted = self
            .api
            .mint_nft(
                &owner,
                &document_id,
                &self.config.registry,
                &self.config.asset_contract,
                &self.config.deposit_address,
                &fields,
            )
            .await;
        let minted = self.advance(minted)?;
        let awaited = self.api.await_job(&owner, &minted.header.job_id).await;
        self.advance(awaited)?;

        tracing::info!(document_id = %document_id, token_id = %minted.token_id, "nft minted");
        self.stage = FlowStage::Minted;
        Ok(minted.token_id)
    }

    async fn commit_as(&mut self, identity: &str) -> FlowResult<()> {
        let document_id = self.document_id();
        let committed = self.api.commit_document(identity, &document_id).await;
        let header = self.advance(committed)?;
        let awaited = self.api.await_job(identity, &header.job_id).await;
        self.advance(awaited)?;
        tracing::info!(
            document_id = %document_id,
            fingerprint = header.fingerprint.as_deref().unwrap_or(""),
            "document anchored"
        );
        if let Some(doc) = self.document.as_mut() {
            if header.fingerprint.is_some() {
                doc.fingerprint = header.fingerprint;
            }
        }
        Ok(())
    }

    async fn fetch_result(&mut self) -> FlowResult<ComputeResult> {
        let owner = self.participants.owner.clone();
        let document_id = self.document_id();
        let fetched = self
            .api
            .committed_attribute(&owner, &document_id, &self.config.output_label)
            .await;
        let raw = self.advance(fetched)?;
        let result = self.advance(ComputeResult::decode(&raw))?;
        tracing::info!(
            document_id = %document_id,
            risk = %result.risk,
            value = %result.value,
            "compute result fetched"
        );
        Ok(result)
    }

    /// Drive the whole lifecycle for one invoice record.
    pub async fn run(&mut self, record: &InvoiceRecord) -> FlowResult<FlowOutcome> {
        match self.config.template.clone() {
            Some(template) => {
                self.clone_from_template(&template.document_id).await?;
                self.anchor_clone().await?;
                let document_id = self.document_id();
                let attributes =
                    record.initial_attributes(&self.participants.owner, &document_id);
                self.seed_attributes(&attributes).await?;
                self.inherit_template_rules()?;
            }
            None => {
                let attributes = record.initial_attributes(&self.participants.owner, "");
                self.create(&attributes).await?;
                self.authorize_collaborator().await?;
                self.attach_compute_rule().await?;
            }
        }

        self.commit_first().await?;
        let first = self.fetch_result_first().await?;
        tracing::debug!(risk = %first.risk, value = %first.value, "pre-update result");

        self.collaborator_update(&record.compute_attributes()).await?;
        self.commit_second().await?;
        let result = self.fetch_result_second().await?;

        let token_id = self.mint().await?;
        let document = self.document.clone().unwrap_or(DocumentHandle {
            document_id: String::new(),
            fingerprint: None,
        });
        Ok(FlowOutcome {
            document_id: document.document_id,
            fingerprint: document.fingerprint,
            result,
            token_id,
        })
    }
}

/// Build a reusable committed template: empty document, collaborator role,
/// compute rule, anchor. Clones of it inherit the role and rule.
pub async fn build_template<A: DocumentApi>(
    api: &A,
    participants: &FlowParticipants,
    config: &FlowConfig,
) -> FlowResult<TemplateRef> {
    let header = api
        .create_document(&participants.owner, &AttributeSet::new())
        .await?;
    let template_id = header.document_id;

    let role_id = api
        .create_role(&participants.owner, &participants.collaborator, &template_id)
        .await?;
    api.attach_compute_rule(
        &participants.owner,
        &template_id,
        &role_id,
        &config.compute_module,
        &config.input_labels,
        &config.output_label,
    )
    .await?;

    let commit = api.commit_document(&participants.owner, &template_id).await?;
    api.await_job(&participants.owner, &commit.job_id).await?;

    tracing::info!(template_id = %template_id, "template committed");
    Ok(TemplateRef {
        document_id: template_id,
        fingerprint: commit.fingerprint,
    })
}
