//! Provider-facing contracts.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::*;

/// Raw operations of a single cloud provider.
///
/// Each provider implements this once, over its own native node, hardware,
/// image and location types. The adapter performs I/O and reports failures
/// through [`crate::ComputeError`]; it never attaches stored credentials,
/// which is the job of [`crate::AdaptingComputeServiceStrategies`].
#[async_trait]
pub trait ComputeServiceAdapter: Send + Sync {
    /// Provider-native node
    type Node: Send + Sync;
    /// Provider-native hardware profile
    type Hardware: Send;
    /// Provider-native image
    type Image: Send;
    /// Provider-native location
    type Location: Send;

    // =========================================================================
    // Nodes
    // =========================================================================

    /// List every node visible to the configured identity.
    async fn list_nodes(&self) -> Result<Vec<Self::Node>>;

    /// Fetch a node; `Ok(None)` when the provider has no such node.
    async fn get_node(&self, id: &str) -> Result<Option<Self::Node>>;

    /// Create a node whose name carries `group`.
    async fn create_node_with_group_encoded_into_name(
        &self,
        group: &str,
        name: &str,
        template: &Template,
    ) -> Result<NodeAndInitialCredentials<Self::Node>>;

    /// Reboot a node.
    async fn reboot_node(&self, id: &str) -> Result<()>;

    /// Resume a suspended node.
    async fn resume_node(&self, id: &str) -> Result<()>;

    /// Suspend a running node.
    async fn suspend_node(&self, id: &str) -> Result<()>;

    /// Destroy a node. Destroying a terminated node must be accepted.
    async fn destroy_node(&self, id: &str) -> Result<()>;

    // =========================================================================
    // Catalogue
    // =========================================================================

    /// List hardware profiles offered by the provider.
    async fn list_hardware_profiles(&self) -> Result<Vec<Self::Hardware>>;

    /// List images offered by the provider.
    async fn list_images(&self) -> Result<Vec<Self::Image>>;

    /// List locations offered by the provider.
    async fn list_locations(&self) -> Result<Vec<Self::Location>>;
}

/// Translates a provider-native node into common metadata.
///
/// Mappers are pure: no I/O, no credential store access.
pub trait NodeMetadataMapper<N>: Send + Sync {
    fn map(&self, node: &N) -> NodeMetadata;
}

impl<N, F> NodeMetadataMapper<N> for F
where
    F: Fn(&N) -> NodeMetadata + Send + Sync,
{
    fn map(&self, node: &N) -> NodeMetadata {
        self(node)
    }
}
