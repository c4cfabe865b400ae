//! Configuration management for the Stratus CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::debug;

use stratus_compute::{
    CredentialKey, InMemoryCredentialStore, InitialLogin, LoginCredentials, MockAdapter, MockNode,
    NodeState,
};

use crate::cli::Args;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/stratus/stratus.yaml";

/// Log format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (json, pretty)
    pub log_format: LogFormat,
    /// Mock provider configuration
    pub provider: ProviderConfig,
    /// Login credentials known for nodes, by node id
    pub credentials: BTreeMap<String, LoginCredentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            provider: ProviderConfig::default(),
            credentials: BTreeMap::new(),
        }
    }
}

/// Mock provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// User issued with a generated password on creation (none = no credentials)
    pub initial_login_user: Option<String>,
    /// Nodes that exist before any command runs
    pub nodes: Vec<NodeSeed>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            initial_login_user: Some("root".to_string()),
            nodes: Vec::new(),
        }
    }
}

/// A pre-existing node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSeed {
    pub id: String,
    pub name: String,
    #[serde(default = "default_seed_state")]
    pub state: NodeState,
    #[serde(default)]
    pub addresses: Vec<String>,
    pub hardware_id: Option<String>,
    pub image_id: Option<String>,
    pub location_id: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

fn default_seed_state() -> NodeState {
    NodeState::Running
}

impl NodeSeed {
    fn to_node(&self) -> MockNode {
        let mut node = MockNode::new(self.id.clone(), self.name.clone(), self.state)
            .with_addresses(self.addresses.iter().cloned());
        node.hardware_id = self.hardware_id.clone();
        node.image_id = self.image_id.clone();
        node.location_id = self.location_id.clone();
        node.tags = self.tags.clone();
        node
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for node in &self.provider.nodes {
            if node.id.is_empty() {
                anyhow::bail!("Node id must not be empty (name: {})", node.name);
            }
            if !seen.insert(node.id.as_str()) {
                anyhow::bail!("Duplicate node id: {}", node.id);
            }
        }
        Ok(())
    }

    /// Apply CLI argument overrides to the configuration.
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }

        if let Some(format) = args.log_format {
            self.log_format = format;
        }

        self
    }

    /// Build the mock provider seeded with the configured nodes.
    pub fn build_adapter(&self) -> Result<MockAdapter> {
        let initial_login = match &self.provider.initial_login_user {
            Some(user) => InitialLogin::GeneratedPassword { user: user.clone() },
            None => InitialLogin::None,
        };

        let adapter = MockAdapter::new().with_initial_login(initial_login);
        for seed in &self.provider.nodes {
            adapter
                .insert_node(seed.to_node())
                .with_context(|| format!("Failed to seed node {}", seed.id))?;
        }

        debug!(nodes = self.provider.nodes.len(), "Mock provider configured");
        Ok(adapter)
    }

    /// Build the credential store with the configured node credentials.
    pub fn build_credential_store(&self) -> InMemoryCredentialStore {
        self.credentials
            .iter()
            .map(|(id, creds)| (CredentialKey::node(id.clone()), creds.clone()))
            .collect()
    }
}
