//! Integration tests for the CLI configuration and commands.

use std::sync::Arc;

use clap::Parser;
use stratus_cli::cli::{Args, Command};
use stratus_cli::commands;
use stratus_cli::config::{Config, LogFormat};
use stratus_compute::{mock_strategies, ComputeServiceAdapter, NodeState};

const CONFIG: &str = r#"
log_level: debug
log_format: json

provider:
  initial_login_user: admin
  nodes:
    - id: i-1
      name: web-1
      state: RUNNING
      addresses: [10.0.0.5, 203.0.113.5]
      hardware_id: small
      location_id: mock-1a
    - id: i-2
      name: web-2
      state: TERMINATED
    - id: i-3
      name: db-1
      state: SUSPENDED

credentials:
  i-1:
    user: root
    private_key: K
"#;

fn strategies(config: &Config) -> stratus_compute::AdaptingComputeServiceStrategies<stratus_compute::MockAdapter> {
    mock_strategies(
        Arc::new(config.build_adapter().unwrap()),
        Arc::new(config.build_credential_store()),
    )
}

/// Test that default configuration is valid.
#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.log_level, "info");
    assert_eq!(config.log_format, LogFormat::Pretty);
    assert_eq!(config.provider.initial_login_user.as_deref(), Some("root"));
}

/// Test configuration loading from YAML.
#[test]
fn test_config_yaml_parsing() {
    let config = Config::from_yaml(CONFIG).expect("Failed to parse YAML");

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.provider.nodes.len(), 3);
    assert_eq!(config.provider.nodes[1].state, NodeState::Terminated);
    assert_eq!(config.credentials["i-1"].private_key.as_deref(), Some("K"));
}

#[test]
fn test_duplicate_node_ids_rejected() {
    let yaml = r#"
provider:
  nodes:
    - { id: i-1, name: web-1 }
    - { id: i-1, name: web-2 }
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("Duplicate node id"));
}

#[test]
fn test_cli_overrides() {
    let args = Args::parse_from(["stratus", "--log-level", "trace", "--log-format", "json", "images"]);
    let config = Config::default().with_cli_overrides(&args);

    assert_eq!(config.log_level, "trace");
    assert_eq!(config.log_format, LogFormat::Json);
    assert!(matches!(args.command, Command::Images));
}

#[tokio::test]
async fn test_get_attaches_configured_credentials() {
    let config = Config::from_yaml(CONFIG).unwrap();
    let strategies = strategies(&config);

    let output = commands::run(&Command::Get { id: "i-1".into() }, &strategies)
        .await
        .unwrap();
    assert_eq!(output["credentials"]["user"], "root");
    assert_eq!(output["credentials"]["private_key"], "K");
    assert_eq!(output["group"], "web");

    let missing = commands::run(&Command::Get { id: "i-404".into() }, &strategies)
        .await
        .unwrap();
    assert!(missing.is_null());
}

#[tokio::test]
async fn test_list_filters_by_group_and_state() {
    let config = Config::from_yaml(CONFIG).unwrap();
    let strategies = strategies(&config);

    let command = Command::List {
        group: Some("web".into()),
        state: Some("running".into()),
    };
    let output = commands::run(&command, &strategies).await.unwrap();
    let nodes = output.as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["id"], "i-1");

    let bad = Command::List { group: None, state: Some("sleeping".into()) };
    assert!(commands::run(&bad, &strategies).await.is_err());
}

#[tokio::test]
async fn test_create_then_suspend() {
    let config = Config::from_yaml(CONFIG).unwrap();
    let strategies = strategies(&config);

    let args = Args::parse_from(["stratus", "create", "--group", "api", "--name", "api-1", "--port", "22"]);
    let created = commands::run(&args.command, &strategies).await.unwrap();
    assert_eq!(created["state"], "RUNNING");
    assert_eq!(created["credentials"]["user"], "admin");

    let id = created["id"].as_str().unwrap().to_string();
    let snapshot = commands::run(&Command::Suspend { id: id.clone() }, &strategies)
        .await
        .unwrap();
    assert_eq!(snapshot["state"], "RUNNING");

    let fresh = commands::run(&Command::Get { id }, &strategies).await.unwrap();
    assert_eq!(fresh["state"], "SUSPENDED");
    assert_eq!(fresh["os_description"], "Ubuntu 22.04 LTS");
}

#[tokio::test]
async fn test_create_passes_boot_options_to_provider() {
    let config = Config::from_yaml(CONFIG).unwrap();
    let adapter = Arc::new(config.build_adapter().unwrap());
    let strategies = mock_strategies(adapter.clone(), Arc::new(config.build_credential_store()));

    let args = Args::parse_from([
        "stratus", "create", "--group", "job", "--name", "job-1",
        "--port", "22", "--port", "8080", "--run-script", "echo ready",
    ]);
    let created = commands::run(&args.command, &strategies).await.unwrap();
    let id = created["id"].as_str().unwrap();

    let node = adapter.get_node(id).await.unwrap().unwrap();
    assert_eq!(node.inbound_ports, vec![22, 8080]);
    assert_eq!(node.run_script.as_deref(), Some("echo ready"));
}

#[tokio::test]
async fn test_create_rejects_name_without_group() {
    let config = Config::from_yaml(CONFIG).unwrap();
    let strategies = strategies(&config);

    let args = Args::parse_from(["stratus", "create", "--group", "api", "--name", "web-9"]);
    let err = commands::run(&args.command, &strategies).await.unwrap_err();
    assert!(err.to_string().contains("Invalid argument"));

    let args = Args::parse_from(["stratus", "create", "--group", "api", "--name", "api-9", "--image", "nope"]);
    let err = commands::run(&args.command, &strategies).await.unwrap_err();
    assert!(err.to_string().contains("Unknown image"));
}
