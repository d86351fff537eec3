//! Per-party client routing
//!
//! In a multi-node setup each party acts through its own node. The flow is
//! written against a single [`DocumentApi`]; this adapter picks the right
//! [`NodeClient`] for the identity each call is issued under.

use crate::config::MoorlineConfig;
use crate::error::CliResult;
use async_trait::async_trait;
use moorline_client::{ClientResult, DocumentApi, NodeClient};
use moorline_types::{AttributeSet, DocumentHeader, MintResponse};
use std::collections::HashMap;
use std::time::Duration;

/// Routes every call to the node the acting identity is configured for.
pub struct RoutingApi {
    default: NodeClient,
    overrides: HashMap<String, NodeClient>,
}

impl RoutingApi {
    /// Build one client per configured node URL.
    pub fn from_config(config: &MoorlineConfig) -> CliResult<Self> {
        let default = build_client(config, &config.node.url)?;

        let mut overrides = HashMap::new();
        for account in &config.accounts {
            if let Some(url) = &account.url {
                if url != &config.node.url {
                    overrides.insert(account.id.clone(), build_client(config, url)?);
                }
            }
        }

        Ok(Self { default, overrides })
    }

    fn client_for(&self, identity: &str) -> &NodeClient {
        self.overrides.get(identity).unwrap_or(&self.default)
    }
}

fn build_client(config: &MoorlineConfig, url: &str) -> CliResult<NodeClient> {
    let mut client = NodeClient::new(url)?
        .with_profile(config.node.profile.into())
        .with_poll_interval(Duration::from_millis(config.poll.interval_ms));
    if let Some(max) = config.poll.max_attempts {
        client = client.with_max_poll_attempts(max);
    }
    Ok(client)
}

#[async_trait]
impl DocumentApi for RoutingApi {
    async fn create_document(
        &self,
        identity: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader> {
        self.client_for(identity)
            .create_document(identity, attributes)
            .await
    }

    async fn clone_document(
        &self,
        identity: &str,
        template_id: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader> {
        self.client_for(identity)
            .clone_document(identity, template_id, attributes)
            .await
    }

    async fn update_document(
        &self,
        identity: &str,
        document_id: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader> {
        self.client_for(identity)
            .update_document(identity, document_id, attributes)
            .await
    }

    async fn commit_document(
        &self,
        identity: &str,
        document_id: &str,
    ) -> ClientResult<DocumentHeader> {
        self.client_for(identity)
            .commit_document(identity, document_id)
            .await
    }

    async fn create_role(
        &self,
        owner: &str,
        collaborator: &str,
        document_id: &str,
    ) -> ClientResult<String> {
        self.client_for(owner)
            .create_role(owner, collaborator, document_id)
            .await
    }

    async fn attach_compute_rule(
        &self,
        owner: &str,
        document_id: &str,
        role_id: &str,
        module: &[u8],
        input_labels: &[String],
        output_label: &str,
    ) -> ClientResult<()> {
        self.client_for(owner)
            .attach_compute_rule(owner, document_id, role_id, module, input_labels, output_label)
            .await
    }

    async fn committed_attribute(
        &self,
        identity: &str,
        document_id: &str,
        label: &str,
    ) -> ClientResult<String> {
        self.client_for(identity)
            .committed_attribute(identity, document_id, label)
            .await
    }

    async fn signing_key(&self, identity: &str, account_id: &str) -> ClientResult<String> {
        self.client_for(identity)
            .signing_key(identity, account_id)
            .await
    }

    async fn mint_nft(
        &self,
        identity: &str,
        document_id: &str,
        registry: &str,
        asset_contract: &str,
        deposit_address: &str,
        proof_fields: &[String],
    ) -> ClientResult<MintResponse> {
        self.client_for(identity)
            .mint_nft(
                identity,
                document_id,
                registry,
                asset_contract,
                deposit_address,
                proof_fields,
            )
            .await
    }

    async fn await_job(&self, identity: &str, job_id: &str) -> ClientResult<()> {
        self.client_for(identity).await_job(identity, job_id).await
    }
}
