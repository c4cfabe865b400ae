//! Type definitions for the common node model and creation templates.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::credentials::{CredentialOverride, LoginCredentials};
use crate::util::{is_private_address, parse_group_from_name};

// =============================================================================
// NODE STATE
// =============================================================================

/// Runtime state of a node, normalised across providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeState {
    Pending,
    Running,
    Suspended,
    Terminated,
    Error,
    #[default]
    Unrecognized,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Pending => "PENDING",
            NodeState::Running => "RUNNING",
            NodeState::Suspended => "SUSPENDED",
            NodeState::Terminated => "TERMINATED",
            NodeState::Error => "ERROR",
            NodeState::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(NodeState::Pending),
            "RUNNING" => Ok(NodeState::Running),
            "SUSPENDED" => Ok(NodeState::Suspended),
            "TERMINATED" => Ok(NodeState::Terminated),
            "ERROR" => Ok(NodeState::Error),
            "UNRECOGNIZED" => Ok(NodeState::Unrecognized),
            other => Err(format!("unknown node state: {}", other)),
        }
    }
}

// =============================================================================
// PLACEMENT AND SHAPE
// =============================================================================

/// Scope of a location in the provider's placement hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationScope {
    Provider,
    Region,
    #[default]
    Zone,
    Host,
}

/// Where a node runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Provider-scoped location id
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// Position in the placement hierarchy
    pub scope: LocationScope,
    /// Enclosing location, if any
    pub parent_id: Option<String>,
}

impl Location {
    pub fn new(id: impl Into<String>, scope: LocationScope) -> Self {
        let id = id.into();
        Self {
            description: id.clone(),
            id,
            scope,
            parent_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// A storage volume attached to a hardware profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume size in GiB
    pub size_gib: u64,
    /// Device name (e.g. "/dev/sda")
    pub device: Option<String>,
    /// Boot volume flag
    pub bootable: bool,
}

/// Hardware descriptor of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hardware {
    /// Provider-scoped hardware profile id
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Number of virtual cores
    pub cores: u32,
    /// Memory in MiB
    pub ram_mib: u64,
    /// Volumes
    pub volumes: Vec<Volume>,
}

impl Hardware {
    pub fn new(id: impl Into<String>, cores: u32, ram_mib: u64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            cores,
            ram_mib,
            volumes: Vec::new(),
        }
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volumes.push(volume);
        self
    }
}

/// Image a node is launched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Provider-scoped image id
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Operating system description
    pub os_description: Option<String>,
    /// Login credentials baked into the image
    pub default_credentials: Option<LoginCredentials>,
}

impl Image {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            os_description: None,
            default_credentials: None,
        }
    }

    pub fn with_os_description(mut self, description: impl Into<String>) -> Self {
        self.os_description = Some(description.into());
        self
    }

    pub fn with_default_credentials(mut self, credentials: LoginCredentials) -> Self {
        self.default_credentials = Some(credentials);
        self
    }
}

// =============================================================================
// TEMPLATE
// =============================================================================

/// Provider-agnostic options of a creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// Explicit login credentials that take priority over provider ones
    pub login_override: Option<CredentialOverride>,
    /// Ports to open for inbound traffic
    pub inbound_ports: Vec<u16>,
    /// Script to run once the node boots
    pub run_script: Option<String>,
    /// User metadata passed to the node
    pub user_metadata: BTreeMap<String, String>,
    /// Tags to apply to the node
    pub tags: BTreeSet<String>,
}

impl TemplateOptions {
    pub fn override_login(mut self, login: CredentialOverride) -> Self {
        self.login_override = Some(login);
        self
    }

    pub fn inbound_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.inbound_ports.extend(ports);
        self
    }

    pub fn run_script(mut self, script: impl Into<String>) -> Self {
        self.run_script = Some(script.into());
        self
    }

    pub fn user_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_metadata.insert(key.into(), value.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}

/// Caller-supplied creation request. Read-only for the strategy layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub image: Image,
    pub hardware: Hardware,
    pub location: Location,
    pub options: TemplateOptions,
}

impl Template {
    pub fn new(image: Image, hardware: Hardware, location: Location) -> Self {
        Self {
            image,
            hardware,
            location,
            options: TemplateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }
}

// =============================================================================
// NODE METADATA
// =============================================================================

/// Common, provider-agnostic representation of a compute instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Provider-scoped id
    pub id: String,
    /// Canonical URI of the node
    pub uri: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Group parsed out of the name
    pub group: Option<String>,
    /// Placement
    pub location: Option<Location>,
    /// Image the node was launched from
    pub image_id: Option<String>,
    /// Operating system running on the node
    pub os_description: Option<String>,
    /// Shape
    pub hardware: Option<Hardware>,
    /// Runtime state
    pub state: NodeState,
    /// Publicly routable addresses
    pub public_addresses: BTreeSet<String>,
    /// Private addresses
    pub private_addresses: BTreeSet<String>,
    /// Tags
    pub tags: BTreeSet<String>,
    /// User metadata
    pub user_metadata: BTreeMap<String, String>,
    /// Login credentials, attached from the credential store
    pub credentials: Option<LoginCredentials>,
}

impl NodeMetadata {
    pub fn new(id: impl Into<String>, state: NodeState) -> Self {
        Self {
            id: id.into(),
            uri: None,
            name: None,
            group: None,
            location: None,
            image_id: None,
            os_description: None,
            hardware: None,
            state,
            public_addresses: BTreeSet::new(),
            private_addresses: BTreeSet::new(),
            tags: BTreeSet::new(),
            user_metadata: BTreeMap::new(),
            credentials: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the name and derive the group from it.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.group = parse_group_from_name(&name);
        self.name = Some(name);
        self
    }

    /// Override the group derived from the name.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = Some(image_id.into());
        self
    }

    pub fn with_os_description(mut self, description: impl Into<String>) -> Self {
        self.os_description = Some(description.into());
        self
    }

    pub fn with_hardware(mut self, hardware: Hardware) -> Self {
        self.hardware = Some(hardware);
        self
    }

    /// Partition addresses into the public and private sets.
    pub fn with_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for address in addresses {
            let address = address.into();
            if is_private_address(&address) {
                self.private_addresses.insert(address);
            } else {
                self.public_addresses.insert(address);
            }
        }
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_user_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.user_metadata = metadata;
        self
    }

    pub fn with_credentials(mut self, credentials: Option<LoginCredentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

/// Result of a provider-side creation.
#[derive(Debug, Clone)]
pub struct NodeAndInitialCredentials<N> {
    /// Provider-native node
    pub node: N,
    /// Id assigned by the provider
    pub node_id: String,
    /// Login credentials the provider issued, if any
    pub credentials: Option<LoginCredentials>,
}

impl<N> NodeAndInitialCredentials<N> {
    pub fn new(node: N, node_id: impl Into<String>, credentials: Option<LoginCredentials>) -> Self {
        Self {
            node,
            node_id: node_id.into(),
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_state_parsing() {
        assert_eq!("running".parse::<NodeState>().unwrap(), NodeState::Running);
        assert_eq!("TERMINATED".parse::<NodeState>().unwrap(), NodeState::Terminated);
        assert!("rebooting".parse::<NodeState>().is_err());
    }

    #[test]
    fn test_node_state_serde() {
        let json = serde_json::to_string(&NodeState::Suspended).unwrap();
        assert_eq!(json, "\"SUSPENDED\"");
        assert_eq!(NodeState::default(), NodeState::Unrecognized);
    }

    #[test]
    fn test_addresses_are_partitioned() {
        let node = NodeMetadata::new("i-1", NodeState::Running)
            .with_addresses(["10.0.0.5", "203.0.113.7", "192.168.1.20", "fd00::1"]);

        assert_eq!(node.private_addresses.len(), 3);
        assert!(node.public_addresses.contains("203.0.113.7"));
        assert!(node.public_addresses.is_disjoint(&node.private_addresses));
    }

    #[test]
    fn test_name_derives_group() {
        let node = NodeMetadata::new("i-1", NodeState::Running).with_name("web-1f");
        assert_eq!(node.group.as_deref(), Some("web"));

        let node = NodeMetadata::new("i-2", NodeState::Running).with_name("standalone");
        assert_eq!(node.group, None);

        let node = node.with_group("batch");
        assert_eq!(node.group.as_deref(), Some("batch"));
    }
}
