//! # Stratus Compute
//!
//! Provider-independent compute operations over pluggable cloud adapters.
//!
//! Each cloud provider implements [`ComputeServiceAdapter`] over its own
//! native types and supplies a [`NodeMetadataMapper`]. The
//! [`AdaptingComputeServiceStrategies`] compose both with a shared
//! [`CredentialStore`] and a [`PrioritizeCredentials`] policy:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │    AdaptingComputeServiceStrategies     │
//! │ (list, get, create, reboot, destroy...) │
//! └──────┬──────────────┬───────────────┬───┘
//!        ▼              ▼               ▼
//! ┌─────────────┐ ┌────────────┐ ┌──────────────┐
//! │   Adapter   │ │   Mapper   │ │  Credential  │
//! │ (provider)  │ │   (pure)   │ │    Store     │
//! └─────────────┘ └────────────┘ └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stratus_compute::{mock_strategies, InMemoryCredentialStore, MockAdapter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let strategies = mock_strategies(
//!         Arc::new(MockAdapter::new()),
//!         Arc::new(InMemoryCredentialStore::new()),
//!     );
//!
//!     for node in strategies.list_nodes().await.unwrap() {
//!         println!("{} {}", node.id, node.state);
//!     }
//! }
//! ```

pub mod credentials;
pub mod error;
pub mod mock;
pub mod predicates;
pub mod prioritize;
pub mod strategy;
pub mod traits;
pub mod types;
pub mod util;
pub mod vcloud;

pub use credentials::{
    CredentialKey,
    CredentialOverride,
    CredentialStore,
    InMemoryCredentialStore,
    LoginCredentials,
    NODE_KEY_PREFIX,
};
pub use error::{ComputeError, Result};
pub use mock::{mock_strategies, AdapterCall, InitialLogin, MockAdapter, MockNode, MockNodeToNodeMetadata};
pub use prioritize::{PrioritizeCredentials, PrioritizeCredentialsFromTemplate};
pub use strategy::AdaptingComputeServiceStrategies;
pub use traits::{ComputeServiceAdapter, NodeMetadataMapper};
pub use types::*;
pub use util::{is_private_address, parse_group_from_name};
