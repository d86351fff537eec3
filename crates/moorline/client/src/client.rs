//! Node client and job poller

use crate::api::DocumentApi;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use moorline_types::{
    encode_hex, AccountResponse, AttributeSet, DocumentHeader, DocumentResponse, DocumentView,
    JobStatus, JobStatusKeyword, JobStatusTasks, MintResponse, RoleResponse,
};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Wire profile of the node being talked to.
///
/// Two historical surfaces exist: newer nodes report jobs as a task list
/// and expose the committed view under `/committed`; older nodes report a
/// status keyword and serve the committed view at the document root. Both
/// adapt to the same internal [`JobStatus`], so nothing above this module
/// branches on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeProfile {
    #[default]
    V2,
    Legacy,
}

/// Default pause between job polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Request timeout for every node call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Document payload shared by create, clone, and update.
#[derive(Serialize)]
struct DocumentPayload<'a> {
    scheme: &'a str,
    data: serde_json::Value,
    document_id: &'a str,
    attributes: &'a AttributeSet,
    write_access: Vec<&'a str>,
}

impl<'a> DocumentPayload<'a> {
    fn new(identity: &'a str, document_id: &'a str, attributes: &'a AttributeSet) -> Self {
        Self {
            scheme: "generic",
            data: serde_json::json!({}),
            document_id,
            attributes,
            write_access: vec![identity],
        }
    }
}

/// HTTP client for one anchoring node.
pub struct NodeClient {
    client: Client,
    base_url: String,
    profile: NodeProfile,
    poll_interval: Duration,
    max_poll_attempts: Option<u32>,
}

impl NodeClient {
    /// Create a client against `base_url` with the default (v2) profile.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile: NodeProfile::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: None,
        })
    }

    /// Select the wire profile.
    pub fn with_profile(mut self, profile: NodeProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Override the pause between job polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound the poller. Unbounded by default, matching the node's original
    /// contract that every job eventually terminates.
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = Some(attempts);
        self
    }

    /// Issue one authenticated JSON call and parse the response.
    ///
    /// Any status other than `expected` discards the body and fails the
    /// step; node error bodies are not interpreted.
    async fn call<T: DeserializeOwned>(
        &self,
        identity: &str,
        method: Method,
        path: &str,
        expected: StatusCode,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method, &url)
            .header("authorization", identity)
            .header("accept", "application/json")
            .header("content-type", "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != expected {
            return Err(ClientError::UnexpectedStatus {
                got: status.as_u16(),
                want: expected.as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn document_action(
        &self,
        identity: &str,
        method: Method,
        path: &str,
        expected: StatusCode,
        document_id: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader> {
        let payload = DocumentPayload::new(identity, document_id, attributes);
        let response: DocumentResponse = self
            .call(
                identity,
                method,
                path,
                expected,
                Some(serde_json::to_value(&payload)?),
            )
            .await?;
        Ok(response.header)
    }

    /// Fetch and adapt the status of one job.
    async fn job_status(&self, identity: &str, job_id: &str) -> ClientResult<JobStatus> {
        let path = format!("/v2/jobs/{job_id}");
        let raw: serde_json::Value = self
            .call(identity, Method::GET, &path, StatusCode::OK, None)
            .await?;

        let status = match self.profile {
            NodeProfile::V2 => serde_json::from_value::<JobStatusTasks>(raw)?.into(),
            NodeProfile::Legacy => serde_json::from_value::<JobStatusKeyword>(raw)?.into(),
        };
        Ok(status)
    }
}

#[async_trait]
impl DocumentApi for NodeClient {
    async fn create_document(
        &self,
        identity: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader> {
        self.document_action(
            identity,
            Method::POST,
            "/v2/documents",
            StatusCode::CREATED,
            "",
            attributes,
        )
        .await
    }

    async fn clone_document(
        &self,
        identity: &str,
        template_id: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader> {
        let path = format!("/v2/documents/{template_id}/clone");
        self.document_action(
            identity,
            Method::POST,
            &path,
            StatusCode::CREATED,
            template_id,
            attributes,
        )
        .await
    }

    async fn update_document(
        &self,
        identity: &str,
        document_id: &str,
        attributes: &AttributeSet,
    ) -> ClientResult<DocumentHeader> {
        let path = format!("/v2/documents/{document_id}");
        self.document_action(
            identity,
            Method::PATCH,
            &path,
            StatusCode::OK,
            document_id,
            attributes,
        )
        .await
    }

    async fn commit_document(
        &self,
        identity: &str,
        document_id: &str,
    ) -> ClientResult<DocumentHeader> {
        let path = format!("/v2/documents/{document_id}/commit");
        let response: DocumentResponse = self
            .call(identity, Method::POST, &path, StatusCode::ACCEPTED, None)
            .await?;
        Ok(response.header)
    }

    async fn create_role(
        &self,
        owner: &str,
        collaborator: &str,
        document_id: &str,
    ) -> ClientResult<String> {
        let path = format!("/v2/documents/{document_id}/roles");
        let body = serde_json::json!({
            "collaborators": [collaborator],
            "key": "random_key",
        });
        let response: RoleResponse = self
            .call(owner, Method::POST, &path, StatusCode::OK, Some(body))
            .await?;
        Ok(response.id)
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
        let path = format!("/v2/documents/{document_id}/transition_rules");
        let attribute_rules: Vec<serde_json::Value> = input_labels
            .iter()
            .map(|label| serde_json::json!({"key_label": label, "role_id": role_id}))
            .collect();
        let body = serde_json::json!({
            "compute_fields_rules": [{
                "wasm": encode_hex(module),
                "attribute_labels": input_labels,
                "target_attribute_label": output_label,
            }],
            "attribute_rules": attribute_rules,
        });

        let _: serde_json::Value = self
            .call(owner, Method::POST, &path, StatusCode::OK, Some(body))
            .await?;
        Ok(())
    }

    async fn committed_attribute(
        &self,
        identity: &str,
        document_id: &str,
        label: &str,
    ) -> ClientResult<String> {
        let path = match self.profile {
            NodeProfile::V2 => format!("/v2/documents/{document_id}/committed"),
            NodeProfile::Legacy => format!("/v2/documents/{document_id}"),
        };
        let view: DocumentView = self
            .call(identity, Method::GET, &path, StatusCode::OK, None)
            .await?;

        view.attributes
            .get(label)
            .map(|attr| attr.value.clone())
            .ok_or_else(|| ClientError::AttributeNotFound(label.to_string()))
    }

    async fn signing_key(&self, identity: &str, account_id: &str) -> ClientResult<String> {
        let path = format!("/v2/accounts/{account_id}");
        let response: AccountResponse = self
            .call(identity, Method::GET, &path, StatusCode::OK, None)
            .await?;
        Ok(response.signing_key_pair.public)
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
        let path = format!("/v2/nfts/registries/{registry}/mint");
        let body = serde_json::json!({
            "asset_manager_address": asset_contract,
            "deposit_address": deposit_address,
            "document_id": document_id,
            "proof_fields": proof_fields,
        });
        self.call(identity, Method::POST, &path, StatusCode::ACCEPTED, Some(body))
            .await
    }

    /// Poll the job until the node reports it terminal.
    ///
    /// Pending responses sleep the configured interval and retry; there is
    /// no backoff. A failed terminal state carries the node's message
    /// verbatim.
    async fn await_job(&self, identity: &str, job_id: &str) -> ClientResult<()> {
        let mut attempts: u32 = 0;
        loop {
            let status = self.job_status(identity, job_id).await?;
            if status.finished {
                return match status.error {
                    Some(message) => Err(ClientError::JobFailed { message }),
                    None => Ok(()),
                };
            }

            attempts += 1;
            if let Some(max) = self.max_poll_attempts {
                if attempts >= max {
                    return Err(ClientError::PollTimeout {
                        job_id: job_id.to_string(),
                        attempts,
                    });
                }
            }

            tracing::debug!(job_id, attempts, "job pending, retrying");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moorline_types::AttributeValue;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> NodeClient {
        NodeClient::new(&server.uri())
            .unwrap()
            .with_poll_interval(Duration::from_millis(5))
    }

    fn attrs() -> AttributeSet {
        let mut attrs = AttributeSet::new();
        attrs.insert(
            "reference_id".to_string(),
            AttributeValue::string("CF-001"),
        );
        attrs
    }

    #[tokio::test]
    async fn create_sends_auth_and_parses_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/documents"))
            .and(header("authorization", "0xa11ce"))
            .and(body_partial_json(serde_json::json!({
                "scheme": "generic",
                "write_access": ["0xa11ce"],
                "attributes": {"reference_id": {"type": "string", "value": "CF-001"}},
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "header": {"job_id": "j-1", "document_id": "0xd0c"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let created = client.create_document("0xa11ce", &attrs()).await.unwrap();
        assert_eq!(created.document_id, "0xd0c");
    }

    #[tokio::test]
    async fn unexpected_status_discards_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/documents"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "ignored"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.create_document("0xa11ce", &attrs()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::UnexpectedStatus { got: 500, want: 201 }
        ));
    }

    #[tokio::test]
    async fn update_patches_and_returns_new_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v2/documents/0xd0c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "header": {"job_id": "j-2", "document_id": "0xd0d"},
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let updated = client
            .update_document("0xa11ce", "0xd0c", &attrs())
            .await
            .unwrap();
        assert_eq!(updated.document_id, "0xd0d");
    }

    #[tokio::test]
    async fn commit_yields_fingerprint_and_job() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/documents/0xd0c/commit"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "header": {"job_id": "j-3", "document_id": "0xd0c", "fingerprint": "0xf1"},
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let committed = client.commit_document("0xa11ce", "0xd0c").await.unwrap();
        assert_eq!(committed.fingerprint.as_deref(), Some("0xf1"));
        assert_eq!(committed.job_id, "j-3");
    }

    #[tokio::test]
    async fn role_creation_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/documents/0xd0c/roles"))
            .and(body_partial_json(serde_json::json!({
                "collaborators": ["0xb0b"],
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "r-1"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let role = client.create_role("0xa11ce", "0xb0b", "0xd0c").await.unwrap();
        assert_eq!(role, "r-1");
    }

    #[tokio::test]
    async fn compute_rule_hex_encodes_the_module() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/documents/0xd0c/transition_rules"))
            .and(body_partial_json(serde_json::json!({
                "compute_fields_rules": [{
                    "wasm": "0x0061736d",
                    "attribute_labels": ["RiskScore", "AssetValue"],
                    "target_attribute_label": "result",
                }],
                "attribute_rules": [
                    {"key_label": "RiskScore", "role_id": "r-1"},
                    {"key_label": "AssetValue", "role_id": "r-1"},
                ],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let labels = vec!["RiskScore".to_string(), "AssetValue".to_string()];
        client
            .attach_compute_rule(
                "0xa11ce",
                "0xd0c",
                "r-1",
                &[0x00, 0x61, 0x73, 0x6d],
                &labels,
                "result",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn poller_retries_until_finished() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/jobs/j-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "finished": false, "tasks": [],
            })))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/jobs/j-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "finished": true, "tasks": [{"error": ""}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.await_job("0xa11ce", "j-1").await.unwrap();
    }

    #[tokio::test]
    async fn poller_surfaces_job_failure_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/jobs/j-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "finished": true,
                "tasks": [{"error": ""}, {"error": "anchor repository: tx reverted"}],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.await_job("0xa11ce", "j-9").await.unwrap_err();
        match err {
            ClientError::JobFailed { message } => {
                assert_eq!(message, "anchor repository: tx reverted")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn poller_times_out_when_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/jobs/j-stuck"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "finished": false, "tasks": [],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await.with_max_poll_attempts(3);
        let err = client.await_job("0xa11ce", "j-stuck").await.unwrap_err();
        assert!(matches!(err, ClientError::PollTimeout { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn legacy_profile_reads_keyword_jobs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/jobs/j-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "pending",
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/jobs/j-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await.with_profile(NodeProfile::Legacy);
        client.await_job("0xa11ce", "j-1").await.unwrap();
    }

    #[tokio::test]
    async fn committed_view_path_follows_profile() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "attributes": {"result": {"type": "bytes", "value": "0xff"}},
        });
        Mock::given(method("GET"))
            .and(path("/v2/documents/0xd0c/committed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/documents/0xd0c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let v2 = client_for(&server).await;
        assert_eq!(
            v2.committed_attribute("0xa11ce", "0xd0c", "result")
                .await
                .unwrap(),
            "0xff"
        );

        let legacy = client_for(&server).await.with_profile(NodeProfile::Legacy);
        assert_eq!(
            legacy
                .committed_attribute("0xa11ce", "0xd0c", "result")
                .await
                .unwrap(),
            "0xff"
        );
    }

    #[tokio::test]
    async fn missing_attribute_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/documents/0xd0c/committed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "attributes": {},
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .committed_attribute("0xa11ce", "0xd0c", "result")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::AttributeNotFound(label) if label == "result"));
    }

    #[tokio::test]
    async fn mint_posts_proof_fields_and_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/nfts/registries/0xreg/mint"))
            .and(body_partial_json(serde_json::json!({
                "asset_manager_address": "0xac",
                "deposit_address": "0xda",
                "document_id": "0xd0c",
                "proof_fields": ["a", "b"],
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "header": {"job_id": "j-7"},
                "token_id": "0x70ceb",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let minted = client
            .mint_nft(
                "0xa11ce",
                "0xd0c",
                "0xreg",
                "0xac",
                "0xda",
                &["a".to_string(), "b".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(minted.token_id, "0x70ceb");
        assert_eq!(minted.header.job_id, "j-7");
    }

    #[tokio::test]
    async fn signing_key_reads_the_pub_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/accounts/0xa11ce"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "signing_key_pair": {"pub": "0x04beef"},
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let key = client.signing_key("0xa11ce", "0xa11ce").await.unwrap();
        assert_eq!(key, "0x04beef");
    }
}
