//! Filters over common node metadata, for use with
//! [`crate::AdaptingComputeServiceStrategies::list_details_on_nodes_matching`].

use std::collections::HashSet;

use crate::types::{NodeMetadata, NodeState};

/// Matches every node.
pub fn all() -> impl Fn(&NodeMetadata) -> bool + Send + Sync + Clone {
    |_| true
}

/// Matches nodes whose parsed group equals `group`.
pub fn in_group(group: impl Into<String>) -> impl Fn(&NodeMetadata) -> bool + Send + Sync + Clone {
    let group = group.into();
    move |node| node.group.as_deref() == Some(group.as_str())
}

/// Matches nodes with one of the given ids.
pub fn with_ids<I, S>(ids: I) -> impl Fn(&NodeMetadata) -> bool + Send + Sync + Clone
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let ids: HashSet<String> = ids.into_iter().map(Into::into).collect();
    move |node| ids.contains(&node.id)
}

/// Matches nodes in `state`.
pub fn in_state(state: NodeState) -> impl Fn(&NodeMetadata) -> bool + Send + Sync + Clone {
    move |node| node.state == state
}

pub fn running() -> impl Fn(&NodeMetadata) -> bool + Send + Sync + Clone {
    in_state(NodeState::Running)
}

pub fn terminated() -> impl Fn(&NodeMetadata) -> bool + Send + Sync + Clone {
    in_state(NodeState::Terminated)
}
