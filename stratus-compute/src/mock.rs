//! Mock compute provider for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument};

use crate::credentials::{CredentialStore, LoginCredentials};
use crate::error::{ComputeError, Result};
use crate::prioritize::PrioritizeCredentialsFromTemplate;
use crate::strategy::AdaptingComputeServiceStrategies;
use crate::traits::{ComputeServiceAdapter, NodeMetadataMapper};
use crate::types::*;

/// Native node of the mock provider.
#[derive(Debug, Clone, Serialize)]
pub struct MockNode {
    pub id: String,
    pub name: String,
    pub state: NodeState,
    pub addresses: Vec<String>,
    pub hardware_id: Option<String>,
    pub image_id: Option<String>,
    pub location_id: Option<String>,
    /// Password reported inline by the provider
    #[serde(skip)]
    pub admin_password: Option<String>,
    pub tags: BTreeSet<String>,
    pub user_metadata: BTreeMap<String, String>,
    /// Ports opened for inbound traffic at creation
    pub inbound_ports: Vec<u16>,
    /// Script handed to the node at creation
    pub run_script: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MockNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, state: NodeState) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state,
            addresses: Vec::new(),
            hardware_id: None,
            image_id: None,
            location_id: None,
            admin_password: None,
            tags: BTreeSet::new(),
            user_metadata: BTreeMap::new(),
            inbound_ports: Vec::new(),
            run_script: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addresses.extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn with_hardware_id(mut self, hardware_id: impl Into<String>) -> Self {
        self.hardware_id = Some(hardware_id.into());
        self
    }

    pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = Some(image_id.into());
        self
    }

    pub fn with_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }
}

/// Credentials the mock provider issues on creation.
#[derive(Debug, Clone)]
pub enum InitialLogin {
    /// Issue nothing
    None,
    /// Issue `user` with a freshly generated password
    GeneratedPassword { user: String },
    /// Issue the same credentials for every node
    Fixed(LoginCredentials),
}

/// A call received by the mock provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterCall {
    ListNodes,
    GetNode(String),
    Create { group: String, name: String },
    Reboot(String),
    Resume(String),
    Suspend(String),
    Destroy(String),
    ListHardwareProfiles,
    ListImages,
    ListLocations,
}

impl AdapterCall {
    /// Whether the call mutates provider state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            AdapterCall::Create { .. }
                | AdapterCall::Reboot(_)
                | AdapterCall::Resume(_)
                | AdapterCall::Suspend(_)
                | AdapterCall::Destroy(_)
        )
    }
}

/// Mock compute provider.
///
/// Keeps nodes in memory without talking to any cloud. Useful for:
/// - Unit and integration testing
/// - Development without provider accounts
/// - Demo environments
pub struct MockAdapter {
    nodes: RwLock<HashMap<String, MockNode>>,
    hardware: Vec<Hardware>,
    images: Vec<Image>,
    locations: Vec<Location>,
    initial_login: InitialLogin,
    calls: Mutex<Vec<AdapterCall>>,
    unreachable: AtomicBool,
    sequence: AtomicU32,
}

impl MockAdapter {
    /// Create a new mock provider with a default catalogue.
    pub fn new() -> Self {
        info!("Creating mock compute provider");
        Self {
            nodes: RwLock::new(HashMap::new()),
            hardware: vec![
                Hardware::new("small", 1, 1024).with_volume(Volume {
                    size_gib: 20,
                    device: Some("/dev/vda".to_string()),
                    bootable: true,
                }),
                Hardware::new("medium", 2, 4096).with_volume(Volume {
                    size_gib: 40,
                    device: Some("/dev/vda".to_string()),
                    bootable: true,
                }),
                Hardware::new("large", 8, 16384).with_volume(Volume {
                    size_gib: 160,
                    device: Some("/dev/vda".to_string()),
                    bootable: true,
                }),
            ],
            images: vec![
                Image::new("ubuntu-22.04").with_os_description("Ubuntu 22.04 LTS"),
                Image::new("debian-12").with_os_description("Debian 12"),
            ],
            locations: vec![
                Location::new("mock", LocationScope::Provider),
                Location::new("mock-1", LocationScope::Region).with_parent("mock"),
                Location::new("mock-1a", LocationScope::Zone).with_parent("mock-1"),
            ],
            initial_login: InitialLogin::GeneratedPassword {
                user: "root".to_string(),
            },
            calls: Mutex::new(Vec::new()),
            unreachable: AtomicBool::new(false),
            sequence: AtomicU32::new(0),
        }
    }

    /// Set the credentials issued on creation.
    pub fn with_initial_login(mut self, initial_login: InitialLogin) -> Self {
        self.initial_login = initial_login;
        self
    }

    /// Seed a node.
    pub fn insert_node(&self, node: MockNode) -> Result<()> {
        let mut nodes = self.write_nodes()?;
        debug!(node_id = %node.id, "Seeding mock node");
        nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Make every subsequent call fail with a connection error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Calls received so far, in order.
    ///
    /// The log is append-only, so it stays readable after a panic poisoned it.
    pub fn calls(&self) -> Vec<AdapterCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutating calls received so far, in order.
    pub fn mutating_calls(&self) -> Vec<AdapterCall> {
        self.calls().into_iter().filter(AdapterCall::is_mutating).collect()
    }

    pub fn clear_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn hardware(&self) -> &[Hardware] {
        &self.hardware
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    fn record(&self, call: AdapterCall) -> Result<()> {
        self.calls
            .lock()
            .map_err(|_| ComputeError::Internal("Lock poisoned".to_string()))?
            .push(call);

        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ComputeError::ConnectionFailed(
                "mock provider is unreachable".to_string(),
            ));
        }
        Ok(())
    }

    fn read_nodes(&self) -> Result<RwLockReadGuard<'_, HashMap<String, MockNode>>> {
        self.nodes
            .read()
            .map_err(|_| ComputeError::Internal("Lock poisoned".to_string()))
    }

    fn write_nodes(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, MockNode>>> {
        self.nodes
            .write()
            .map_err(|_| ComputeError::Internal("Lock poisoned".to_string()))
    }

    fn issue_credentials(&self) -> Option<LoginCredentials> {
        match &self.initial_login {
            InitialLogin::None => None,
            InitialLogin::GeneratedPassword { user } => {
                Some(LoginCredentials::new(user.clone()).with_password(generate_password()))
            }
            InitialLogin::Fixed(credentials) => Some(credentials.clone()),
        }
    }

    /// Apply a state transition to an existing node.
    fn transition(
        &self,
        id: &str,
        allowed_from: &[NodeState],
        to: NodeState,
    ) -> Result<()> {
        let mut nodes = self.write_nodes()?;

        let node = nodes
            .get_mut(id)
            .ok_or_else(|| ComputeError::NodeNotFound(id.to_string()))?;

        if !allowed_from.contains(&node.state) {
            return Err(ComputeError::InvalidState(format!(
                "node {} is {}",
                id, node.state
            )));
        }

        node.state = to;
        Ok(())
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

#[async_trait]
impl ComputeServiceAdapter for MockAdapter {
    type Node = MockNode;
    type Hardware = Hardware;
    type Image = Image;
    type Location = Location;

    async fn list_nodes(&self) -> Result<Vec<MockNode>> {
        self.record(AdapterCall::ListNodes)?;

        let nodes = self.read_nodes()?;
        let mut result: Vec<MockNode> = nodes.values().cloned().collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(count = result.len(), "Listed mock nodes");
        Ok(result)
    }

    async fn get_node(&self, id: &str) -> Result<Option<MockNode>> {
        self.record(AdapterCall::GetNode(id.to_string()))?;

        let node = self.read_nodes()?.get(id).cloned();

        // Concurrent callers observe the same snapshot before either acts on it.
        tokio::task::yield_now().await;
        Ok(node)
    }

    #[instrument(skip(self, template), fields(group = %group, name = %name))]
    async fn create_node_with_group_encoded_into_name(
        &self,
        group: &str,
        name: &str,
        template: &Template,
    ) -> Result<NodeAndInitialCredentials<MockNode>> {
        self.record(AdapterCall::Create {
            group: group.to_string(),
            name: name.to_string(),
        })?;
        info!("Creating mock node");

        if !self.hardware.iter().any(|h| h.id == template.hardware.id) {
            return Err(ComputeError::ProviderRejected(format!(
                "unknown hardware profile {}",
                template.hardware.id
            )));
        }
        if !self.images.iter().any(|i| i.id == template.image.id) {
            return Err(ComputeError::ProviderRejected(format!(
                "unknown image {}",
                template.image.id
            )));
        }
        if !self.locations.iter().any(|l| l.id == template.location.id) {
            return Err(ComputeError::ProviderRejected(format!(
                "unknown location {}",
                template.location.id
            )));
        }

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let id = format!("i-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let credentials = self.issue_credentials();

        let mut node = MockNode::new(id.clone(), name, NodeState::Running)
            .with_addresses([
                format!("10.0.{}.{}", seq / 250, seq % 250 + 2),
                format!("203.0.113.{}", seq % 250 + 2),
            ])
            .with_hardware_id(template.hardware.id.clone())
            .with_image_id(template.image.id.clone())
            .with_location_id(template.location.id.clone());
        node.admin_password = credentials.as_ref().and_then(|c| c.password.clone());
        node.tags = template.options.tags.clone();
        node.user_metadata = template.options.user_metadata.clone();
        node.inbound_ports = template.options.inbound_ports.clone();
        node.run_script = template.options.run_script.clone();

        self.write_nodes()?.insert(id.clone(), node.clone());

        info!(node_id = %id, "Mock node created");
        Ok(NodeAndInitialCredentials::new(node, id, credentials))
    }

    #[instrument(skip(self), fields(node_id = %id))]
    async fn reboot_node(&self, id: &str) -> Result<()> {
        self.record(AdapterCall::Reboot(id.to_string()))?;
        info!("Rebooting mock node");

        self.transition(id, &[NodeState::Running], NodeState::Running)
    }

    #[instrument(skip(self), fields(node_id = %id))]
    async fn resume_node(&self, id: &str) -> Result<()> {
        self.record(AdapterCall::Resume(id.to_string()))?;
        info!("Resuming mock node");

        self.transition(id, &[NodeState::Suspended], NodeState::Running)
    }

    #[instrument(skip(self), fields(node_id = %id))]
    async fn suspend_node(&self, id: &str) -> Result<()> {
        self.record(AdapterCall::Suspend(id.to_string()))?;
        info!("Suspending mock node");

        self.transition(id, &[NodeState::Running], NodeState::Suspended)
    }

    #[instrument(skip(self), fields(node_id = %id))]
    async fn destroy_node(&self, id: &str) -> Result<()> {
        self.record(AdapterCall::Destroy(id.to_string()))?;
        info!("Destroying mock node");

        let mut nodes = self.write_nodes()?;
        let node = nodes
            .get_mut(id)
            .ok_or_else(|| ComputeError::NodeNotFound(id.to_string()))?;

        node.state = NodeState::Terminated;
        node.admin_password = None;
        Ok(())
    }

    async fn list_hardware_profiles(&self) -> Result<Vec<Hardware>> {
        self.record(AdapterCall::ListHardwareProfiles)?;
        Ok(self.hardware.clone())
    }

    async fn list_images(&self) -> Result<Vec<Image>> {
        self.record(AdapterCall::ListImages)?;
        Ok(self.images.clone())
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        self.record(AdapterCall::ListLocations)?;
        Ok(self.locations.clone())
    }
}

/// Maps [`MockNode`] into common metadata using the provider catalogue.
pub struct MockNodeToNodeMetadata {
    hardware: HashMap<String, Hardware>,
    images: HashMap<String, Image>,
    locations: HashMap<String, Location>,
}

impl MockNodeToNodeMetadata {
    pub fn for_adapter(adapter: &MockAdapter) -> Self {
        Self {
            hardware: adapter
                .hardware
                .iter()
                .map(|h| (h.id.clone(), h.clone()))
                .collect(),
            images: adapter
                .images
                .iter()
                .map(|i| (i.id.clone(), i.clone()))
                .collect(),
            locations: adapter
                .locations
                .iter()
                .map(|l| (l.id.clone(), l.clone()))
                .collect(),
        }
    }
}

impl NodeMetadataMapper<MockNode> for MockNodeToNodeMetadata {
    fn map(&self, node: &MockNode) -> NodeMetadata {
        let mut metadata = NodeMetadata::new(node.id.clone(), node.state)
            .with_uri(format!("mock://nodes/{}", node.id))
            .with_name(node.name.clone())
            .with_addresses(node.addresses.iter().cloned())
            .with_tags(node.tags.iter().cloned())
            .with_user_metadata(node.user_metadata.clone());

        if let Some(location) = node.location_id.as_ref().and_then(|id| self.locations.get(id)) {
            metadata = metadata.with_location(location.clone());
        }
        if let Some(hardware) = node.hardware_id.as_ref().and_then(|id| self.hardware.get(id)) {
            metadata = metadata.with_hardware(hardware.clone());
        }
        if let Some(image_id) = &node.image_id {
            metadata = metadata.with_image_id(image_id.clone());
            if let Some(os) = self.images.get(image_id).and_then(|i| i.os_description.clone()) {
                metadata = metadata.with_os_description(os);
            }
        }
        metadata
    }
}

/// Wire strategies over a mock provider with the default policy.
pub fn mock_strategies(
    adapter: Arc<MockAdapter>,
    credential_store: Arc<dyn CredentialStore>,
) -> AdaptingComputeServiceStrategies<MockAdapter> {
    let mapper = MockNodeToNodeMetadata::for_adapter(&adapter);
    AdaptingComputeServiceStrategies::new(
        credential_store,
        Arc::new(PrioritizeCredentialsFromTemplate),
        adapter,
        Arc::new(mapper),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        Template::new(
            Image::new("ubuntu-22.04"),
            Hardware::new("small", 1, 1024),
            Location::new("mock-1a", LocationScope::Zone),
        )
    }

    #[tokio::test]
    async fn test_create_node() {
        let adapter = MockAdapter::new();

        let created = adapter
            .create_node_with_group_encoded_into_name("web", "web-1", &template())
            .await
            .unwrap();
        assert!(created.node_id.starts_with("i-"));
        assert_eq!(created.node.state, NodeState::Running);
        assert_eq!(created.credentials.as_ref().unwrap().user, "root");
        assert_eq!(created.node.admin_password, created.credentials.unwrap().password);

        let fetched = adapter.get_node(&created.node_id).await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_create_records_boot_options() {
        let adapter = MockAdapter::new();
        let template = template().with_options(
            TemplateOptions::default()
                .inbound_ports([22, 443])
                .run_script("apt-get update")
                .tag("edge"),
        );

        let created = adapter
            .create_node_with_group_encoded_into_name("edge", "edge-1", &template)
            .await
            .unwrap();
        let node = adapter.get_node(&created.node_id).await.unwrap().unwrap();
        assert_eq!(node.inbound_ports, vec![22, 443]);
        assert_eq!(node.run_script.as_deref(), Some("apt-get update"));
        assert!(node.tags.contains("edge"));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_hardware() {
        let adapter = MockAdapter::new();
        let mut template = template();
        template.hardware = Hardware::new("huge", 64, 1 << 20);

        let err = adapter
            .create_node_with_group_encoded_into_name("web", "web-1", &template)
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::ProviderRejected(_)));
    }

    #[tokio::test]
    async fn test_node_lifecycle() {
        let adapter = MockAdapter::new();
        adapter
            .insert_node(MockNode::new("i-1", "app-1", NodeState::Running))
            .unwrap();

        adapter.suspend_node("i-1").await.unwrap();
        assert_eq!(adapter.get_node("i-1").await.unwrap().unwrap().state, NodeState::Suspended);

        // Suspended nodes cannot be rebooted
        let err = adapter.reboot_node("i-1").await.unwrap_err();
        assert!(matches!(err, ComputeError::InvalidState(_)));

        adapter.resume_node("i-1").await.unwrap();
        adapter.reboot_node("i-1").await.unwrap();
        assert_eq!(adapter.get_node("i-1").await.unwrap().unwrap().state, NodeState::Running);

        adapter.destroy_node("i-1").await.unwrap();
        adapter.destroy_node("i-1").await.unwrap();
        assert_eq!(adapter.get_node("i-1").await.unwrap().unwrap().state, NodeState::Terminated);
    }

    #[tokio::test]
    async fn test_unknown_node_and_unreachable() {
        let adapter = MockAdapter::new();
        assert!(adapter.get_node("missing").await.unwrap().is_none());

        let err = adapter.reboot_node("missing").await.unwrap_err();
        assert!(matches!(err, ComputeError::NodeNotFound(_)));

        adapter.set_unreachable(true);
        let err = adapter.list_nodes().await.unwrap_err();
        assert!(matches!(err, ComputeError::ConnectionFailed(_)));
        assert_eq!(
            adapter.calls(),
            vec![
                AdapterCall::GetNode("missing".to_string()),
                AdapterCall::Reboot("missing".to_string()),
                AdapterCall::ListNodes,
            ]
        );
    }

    #[tokio::test]
    async fn test_call_log_survives_poisoning() {
        let adapter = Arc::new(MockAdapter::new());
        adapter.list_images().await.unwrap();

        let holder = adapter.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.calls.lock().unwrap();
            panic!("reader died holding the call log");
        })
        .join();

        assert_eq!(adapter.calls(), vec![AdapterCall::ListImages]);
        adapter.clear_calls();
        assert!(adapter.calls().is_empty());
    }

    #[test]
    fn test_mapper_resolves_catalogue() {
        let adapter = MockAdapter::new();
        let mapper = MockNodeToNodeMetadata::for_adapter(&adapter);
        let node = MockNode::new("i-7", "db-7", NodeState::Running)
            .with_addresses(["10.0.0.7", "198.51.100.7"])
            .with_hardware_id("medium")
            .with_location_id("mock-1a")
            .with_image_id("debian-12");

        let metadata = mapper.map(&node);
        assert_eq!(metadata.group.as_deref(), Some("db"));
        assert_eq!(metadata.hardware.unwrap().cores, 2);
        assert_eq!(metadata.location.unwrap().scope, LocationScope::Zone);
        assert_eq!(metadata.image_id.as_deref(), Some("debian-12"));
        assert_eq!(metadata.os_description.as_deref(), Some("Debian 12"));
        assert!(metadata.private_addresses.contains("10.0.0.7"));
        assert!(metadata.public_addresses.contains("198.51.100.7"));
        assert_eq!(metadata.uri.as_deref(), Some("mock://nodes/i-7"));
    }
}
