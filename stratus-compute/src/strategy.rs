//! Unified compute operations built on a provider adapter.
//!
//! ```text
//! caller ─▶ AdaptingComputeServiceStrategies ─▶ ComputeServiceAdapter (I/O)
//!                                                     │ native node
//!                                                     ▼
//!                                  NodeMetadataMapper::map (pure)
//!                                                     │ NodeMetadata
//!                                                     ▼
//!                                  enrich (CredentialStore lookup) ─▶ caller
//! ```

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::credentials::{CredentialKey, CredentialStore};
use crate::error::{ComputeError, Result};
use crate::predicates;
use crate::prioritize::PrioritizeCredentials;
use crate::traits::{ComputeServiceAdapter, NodeMetadataMapper};
use crate::types::{NodeMetadata, NodeState, Template};

/// Lifecycle strategies shared by every provider.
///
/// Single-node operations resolve the node first and return `Ok(None)` when
/// it does not exist. Mutating operations return the metadata read before
/// the mutation; call [`Self::get_node`] again for fresh state.
pub struct AdaptingComputeServiceStrategies<A: ComputeServiceAdapter> {
    credential_store: Arc<dyn CredentialStore>,
    prioritize_credentials: Arc<dyn PrioritizeCredentials>,
    adapter: Arc<A>,
    node_metadata_mapper: Arc<dyn NodeMetadataMapper<A::Node>>,
}

impl<A: ComputeServiceAdapter> Clone for AdaptingComputeServiceStrategies<A> {
    fn clone(&self) -> Self {
        Self {
            credential_store: Arc::clone(&self.credential_store),
            prioritize_credentials: Arc::clone(&self.prioritize_credentials),
            adapter: Arc::clone(&self.adapter),
            node_metadata_mapper: Arc::clone(&self.node_metadata_mapper),
        }
    }
}

impl<A: ComputeServiceAdapter> AdaptingComputeServiceStrategies<A> {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        prioritize_credentials: Arc<dyn PrioritizeCredentials>,
        adapter: Arc<A>,
        node_metadata_mapper: Arc<dyn NodeMetadataMapper<A::Node>>,
    ) -> Self {
        Self {
            credential_store,
            prioritize_credentials,
            adapter,
            node_metadata_mapper,
        }
    }

    /// The underlying provider adapter.
    pub fn adapter(&self) -> &Arc<A> {
        &self.adapter
    }

    /// The shared credential store.
    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        &self.credential_store
    }

    // =========================================================================
    // Normalization pipeline
    // =========================================================================

    /// Attach the stored login credentials of a node.
    ///
    /// Credentials on returned metadata come from the store only: when there
    /// is no entry the node is returned without credentials.
    pub fn enrich(&self, mut node: NodeMetadata) -> Result<NodeMetadata> {
        node.credentials = self.credential_store.get(&CredentialKey::node(&node.id))?;
        Ok(node)
    }

    /// Map a native node and enrich the result.
    pub fn to_metadata(&self, node: &A::Node) -> Result<NodeMetadata> {
        self.enrich(self.node_metadata_mapper.map(node))
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List every node.
    pub async fn list_nodes(&self) -> Result<Vec<NodeMetadata>> {
        self.list_details_on_nodes_matching(predicates::all()).await
    }

    /// List nodes whose common metadata matches `filter`.
    ///
    /// The filter runs after mapping and enrichment.
    #[instrument(skip(self, filter))]
    pub async fn list_details_on_nodes_matching<P>(&self, filter: P) -> Result<Vec<NodeMetadata>>
    where
        P: Fn(&NodeMetadata) -> bool + Send + Sync,
    {
        let native = self.adapter.list_nodes().await?;
        let total = native.len();

        let mut nodes = Vec::with_capacity(total);
        for node in &native {
            let metadata = self.to_metadata(node)?;
            if filter(&metadata) {
                nodes.push(metadata);
            }
        }

        debug!(total = total, matched = nodes.len(), "Listed nodes");
        Ok(nodes)
    }

    // =========================================================================
    // Single node
    // =========================================================================

    /// Get a node, or `None` if the provider does not know it.
    #[instrument(skip(self), fields(node_id = %id))]
    pub async fn get_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        match self.adapter.get_node(id).await? {
            Some(node) => self.to_metadata(&node).map(Some),
            None => {
                debug!("Node not found");
                Ok(None)
            }
        }
    }

    /// Reboot a node unless it is missing or terminated.
    #[instrument(skip(self), fields(node_id = %id))]
    pub async fn reboot_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        let node = self.get_node(id).await?;
        if skips_transition(node.as_ref(), &[NodeState::Terminated]) {
            debug!("Skipping reboot");
            return Ok(node);
        }

        self.adapter.reboot_node(id).await?;
        info!("Node reboot requested");
        Ok(node)
    }

    /// Resume a node unless it is missing, terminated or already running.
    #[instrument(skip(self), fields(node_id = %id))]
    pub async fn resume_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        let node = self.get_node(id).await?;
        if skips_transition(node.as_ref(), &[NodeState::Terminated, NodeState::Running]) {
            debug!("Skipping resume");
            return Ok(node);
        }

        self.adapter.resume_node(id).await?;
        info!("Node resume requested");
        Ok(node)
    }

    /// Suspend a node unless it is missing, terminated or already suspended.
    #[instrument(skip(self), fields(node_id = %id))]
    pub async fn suspend_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        let node = self.get_node(id).await?;
        if skips_transition(node.as_ref(), &[NodeState::Terminated, NodeState::Suspended]) {
            debug!("Skipping suspend");
            return Ok(node);
        }

        self.adapter.suspend_node(id).await?;
        info!("Node suspend requested");
        Ok(node)
    }

    /// Destroy a node unless it is missing.
    ///
    /// Terminated nodes are still sent to the provider.
    #[instrument(skip(self), fields(node_id = %id))]
    pub async fn destroy_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        let node = self.get_node(id).await?;
        if node.is_none() {
            debug!("Skipping destroy");
            return Ok(node);
        }

        self.adapter.destroy_node(id).await?;
        info!("Node destroy requested");
        Ok(node)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a node named `name` in `group`.
    ///
    /// `name` must contain `group`. Credentials chosen by the
    /// prioritization policy are stored under the new node's key before the
    /// node is mapped, so the returned metadata already carries them.
    #[instrument(skip(self, template), fields(group = %group, name = %name))]
    pub async fn create_node_with_group_encoded_into_name(
        &self,
        group: &str,
        name: &str,
        template: &Template,
    ) -> Result<NodeMetadata> {
        if group.is_empty() {
            return Err(ComputeError::InvalidArgument(
                "group (that which groups identical nodes together) must be specified".to_string(),
            ));
        }
        if !name.contains(group) {
            return Err(ComputeError::InvalidArgument(format!(
                "name should have {} encoded into it",
                group
            )));
        }

        let created = self
            .adapter
            .create_node_with_group_encoded_into_name(group, name, template)
            .await?;

        let credentials = self
            .prioritize_credentials
            .prioritize(template, created.credentials);
        if let Some(credentials) = credentials {
            self.credential_store
                .put(CredentialKey::node(&created.node_id), credentials)?;
        }

        let node = self.to_metadata(&created.node)?;
        info!(node_id = %node.id, "Node created");
        Ok(node)
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    pub async fn list_hardware_profiles(&self) -> Result<Vec<A::Hardware>> {
        self.adapter.list_hardware_profiles().await
    }

    pub async fn list_images(&self) -> Result<Vec<A::Image>> {
        self.adapter.list_images().await
    }

    pub async fn list_locations(&self) -> Result<Vec<A::Location>> {
        self.adapter.list_locations().await
    }
}

/// Whether a lifecycle call must not reach the adapter.
fn skips_transition(node: Option<&NodeMetadata>, skip: &[NodeState]) -> bool {
    match node {
        None => true,
        Some(node) => skip.contains(&node.state),
    }
}
