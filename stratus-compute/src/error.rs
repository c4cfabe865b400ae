//! Error types for the compute abstraction layer.

use thiserror::Error;

/// Errors that can occur during compute operations.
///
/// A node that does not exist is never an error at the strategy layer:
/// single-node operations return `Ok(None)` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    /// A caller-supplied argument violated a precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to reach the provider endpoint.
    #[error("Failed to connect to provider: {0}")]
    ConnectionFailed(String),

    /// The provider refused the supplied identity.
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// The provider rejected the request.
    #[error("Provider rejected request: {0}")]
    ProviderRejected(String),

    /// The provider has no node with this id (provider-side mutation).
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Node is in an invalid state for the requested operation.
    #[error("Invalid node state for operation: {0}")]
    InvalidState(String),

    /// General provider operation failed.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// The credential store could not be read or written.
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ComputeError {
    /// Whether this error was raised by a provider adapter during I/O.
    pub fn is_adapter_failure(&self) -> bool {
        matches!(
            self,
            ComputeError::ConnectionFailed(_)
                | ComputeError::AuthorizationFailed(_)
                | ComputeError::ProviderRejected(_)
                | ComputeError::NodeNotFound(_)
                | ComputeError::InvalidState(_)
                | ComputeError::OperationFailed(_)
        )
    }
}

/// Result type alias for compute operations.
pub type Result<T> = std::result::Result<T, ComputeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_failure_classification() {
        assert!(ComputeError::ConnectionFailed("timeout".into()).is_adapter_failure());
        assert!(ComputeError::InvalidState("busy".into()).is_adapter_failure());
        assert!(!ComputeError::InvalidArgument("group".into()).is_adapter_failure());
        assert!(!ComputeError::CredentialStore("poisoned".into()).is_adapter_failure());
    }
}
