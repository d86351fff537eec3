//! CLI configuration

use crate::error::{CliError, CliResult};
use moorline_client::NodeProfile;
use serde::{Deserialize, Serialize};

/// Main CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoorlineConfig {
    /// Node connection
    #[serde(default)]
    pub node: NodeSettings,

    /// Parties driving the lifecycle; the first is the document owner, the
    /// second the collaborator
    #[serde(default)]
    pub accounts: Vec<AccountSettings>,

    /// Mint targets
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Compute rule inputs
    #[serde(default)]
    pub compute: ComputeSettings,

    /// Committed template to clone documents from, if one exists
    #[serde(default)]
    pub template: Option<TemplateSettings>,

    /// Job poller tuning
    #[serde(default)]
    pub poll: PollSettings,
}

/// Node connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Base URL of the anchoring node
    pub url: String,

    /// Wire profile: `v2` or `legacy`
    #[serde(default)]
    pub profile: WireProfile,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8082".to_string(),
            profile: WireProfile::default(),
        }
    }
}

/// Serializable stand-in for [`NodeProfile`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireProfile {
    #[default]
    V2,
    Legacy,
}

impl From<WireProfile> for NodeProfile {
    fn from(profile: WireProfile) -> Self {
        match profile {
            WireProfile::V2 => NodeProfile::V2,
            WireProfile::Legacy => NodeProfile::Legacy,
        }
    }
}

/// One party: its bearer identity and, for multi-node setups, the URL of
/// the node it acts through
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSettings {
    /// 0x-hex identity
    pub id: String,

    /// Node this party talks to; defaults to the main node URL
    #[serde(default)]
    pub url: Option<String>,
}

/// Mint target addresses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySettings {
    pub nft_registry: String,
    pub asset_contract: String,
    pub deposit_address: String,
}

/// Compute-rule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeSettings {
    /// Path to the compute module binary
    #[serde(default = "default_module_path")]
    pub module_path: String,

    /// Attribute labels the rule reads
    #[serde(default = "default_input_labels")]
    pub input_labels: Vec<String>,

    /// Attribute label the rule writes
    #[serde(default = "default_output_label")]
    pub output_label: String,
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            module_path: default_module_path(),
            input_labels: default_input_labels(),
            output_label: default_output_label(),
        }
    }
}

/// A previously committed template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSettings {
    pub document_id: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Job poller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    /// Pause between job polls in milliseconds
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,

    /// Give up after this many pending polls; unbounded when unset
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            max_attempts: None,
        }
    }
}

// Default value helpers
fn default_module_path() -> String {
    "./simple_average.wasm".to_string()
}

fn default_input_labels() -> Vec<String> {
    vec!["RiskScore".to_string(), "AssetValue".to_string()]
}

fn default_output_label() -> String {
    "result".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

impl MoorlineConfig {
    /// Load configuration: defaults, then an optional file, then
    /// `MOORLINE_`-prefixed environment variables.
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&MoorlineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("MOORLINE")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Reject configurations the lifecycle cannot run with.
    pub fn validate(&mut self) -> CliResult<()> {
        self.node.url = self.node.url.trim_end_matches('/').to_string();
        if self.node.url.is_empty() {
            return Err(CliError::Config("node url is not set".to_string()));
        }

        if self.accounts.len() < 2 {
            return Err(CliError::Config(
                "two accounts (owner and collaborator) are required".to_string(),
            ));
        }
        for account in &mut self.accounts {
            if account.id.is_empty() {
                return Err(CliError::Config("account id is not set".to_string()));
            }
            if let Some(url) = account.url.as_mut() {
                *url = url.trim_end_matches('/').to_string();
            }
        }

        if self.registry.nft_registry.is_empty() {
            return Err(CliError::Config("nft registry is not set".to_string()));
        }
        if self.registry.asset_contract.is_empty() {
            return Err(CliError::Config("asset contract is not set".to_string()));
        }
        if self.registry.deposit_address.is_empty() {
            return Err(CliError::Config("deposit address is not set".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> MoorlineConfig {
        MoorlineConfig {
            accounts: vec![
                AccountSettings {
                    id: "0xa11ce".to_string(),
                    url: None,
                },
                AccountSettings {
                    id: "0xb0b".to_string(),
                    url: Some("http://other:8082/".to_string()),
                },
            ],
            registry: RegistrySettings {
                nft_registry: "0xreg".to_string(),
                asset_contract: "0xac".to_string(),
                deposit_address: "0xda".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = MoorlineConfig::default();
        assert_eq!(config.node.url, "http://127.0.0.1:8082");
        assert_eq!(config.poll.interval_ms, 1000);
        assert_eq!(config.poll.max_attempts, None);
        assert_eq!(config.compute.output_label, "result");
    }

    #[test]
    fn test_validate_accepts_and_normalizes() {
        let mut config = minimal();
        config.node.url = "http://127.0.0.1:8082/".to_string();
        config.validate().unwrap();
        assert_eq!(config.node.url, "http://127.0.0.1:8082");
        assert_eq!(
            config.accounts[1].url.as_deref(),
            Some("http://other:8082")
        );
    }

    #[test]
    fn test_validate_requires_two_accounts() {
        let mut config = minimal();
        config.accounts.truncate(1);
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_validate_requires_registry() {
        let mut config = minimal();
        config.registry.nft_registry.clear();
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }
}
