//! Command execution against the adapting strategies.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use stratus_compute::{
    AdaptingComputeServiceStrategies, CredentialOverride, MockAdapter, NodeMetadata, NodeState,
    Template, TemplateOptions,
};

use crate::cli::Command;

type Strategies = AdaptingComputeServiceStrategies<MockAdapter>;

/// Run a command and return its JSON output.
///
/// Single-node commands yield `null` when the node does not exist.
pub async fn run(command: &Command, strategies: &Strategies) -> Result<Value> {
    let output = match command {
        Command::List { group, state } => {
            let state = state
                .as_deref()
                .map(str::parse::<NodeState>)
                .transpose()
                .map_err(anyhow::Error::msg)?;
            let group = group.clone();

            let nodes = strategies
                .list_details_on_nodes_matching(move |node: &NodeMetadata| {
                    group.as_ref().map_or(true, |g| node.group.as_ref() == Some(g))
                        && state.map_or(true, |s| node.state == s)
                })
                .await?;
            serde_json::to_value(nodes)?
        }
        Command::Get { id } => serde_json::to_value(strategies.get_node(id).await?)?,
        Command::Create {
            group,
            name,
            image,
            hardware,
            location,
            login_user,
            password,
            private_key,
            inbound_ports,
            run_script,
            tags,
        } => {
            let template = resolve_template(strategies, image, hardware, location).await?;

            let mut options = TemplateOptions::default().inbound_ports(inbound_ports.iter().copied());
            if let Some(script) = run_script {
                options = options.run_script(script.clone());
            }
            for tag in tags {
                options = options.tag(tag.clone());
            }
            let login = CredentialOverride {
                user: login_user.clone(),
                password: password.clone(),
                private_key: private_key.clone(),
                authenticate_sudo: false,
            };
            if !login.is_empty() {
                options = options.override_login(login);
            }

            let node = strategies
                .create_node_with_group_encoded_into_name(group, name, &template.with_options(options))
                .await?;
            info!(node_id = %node.id, "Created node");
            serde_json::to_value(node)?
        }
        Command::Reboot { id } => serde_json::to_value(strategies.reboot_node(id).await?)?,
        Command::Resume { id } => serde_json::to_value(strategies.resume_node(id).await?)?,
        Command::Suspend { id } => serde_json::to_value(strategies.suspend_node(id).await?)?,
        Command::Destroy { id } => serde_json::to_value(strategies.destroy_node(id).await?)?,
        Command::Hardware => serde_json::to_value(strategies.list_hardware_profiles().await?)?,
        Command::Images => serde_json::to_value(strategies.list_images().await?)?,
        Command::Locations => serde_json::to_value(strategies.list_locations().await?)?,
    };

    Ok(output)
}

/// Look up the template parts in the provider catalogue.
async fn resolve_template(
    strategies: &Strategies,
    image: &str,
    hardware: &str,
    location: &str,
) -> Result<Template> {
    let image = strategies
        .list_images()
        .await?
        .into_iter()
        .find(|i| i.id == image)
        .with_context(|| format!("Unknown image: {}", image))?;

    let hardware = strategies
        .list_hardware_profiles()
        .await?
        .into_iter()
        .find(|h| h.id == hardware)
        .with_context(|| format!("Unknown hardware profile: {}", hardware))?;

    let location = strategies
        .list_locations()
        .await?
        .into_iter()
        .find(|l| l.id == location)
        .with_context(|| format!("Unknown location: {}", location))?;

    Ok(Template::new(image, hardware, location))
}
