//! Command-line argument parsing.

use clap::{Parser, Subcommand};

use crate::config::LogFormat;

/// Stratus - unified compute operations over cloud providers
#[derive(Parser, Debug)]
#[command(name = "stratus")]
#[command(about = "Stratus - unified compute operations over cloud providers")]
#[command(version)]
pub struct Args {
    /// Path to configuration file (optional, defaults used if not found)
    #[arg(short, long, env = "STRATUS_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations on the configured provider.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List nodes, optionally filtered
    List {
        /// Only nodes in this group
        #[arg(long)]
        group: Option<String>,
        /// Only nodes in this state (e.g. RUNNING)
        #[arg(long)]
        state: Option<String>,
    },

    /// Show a single node ("null" if it does not exist)
    Get { id: String },

    /// Create a node whose name carries its group
    Create {
        #[arg(long)]
        group: String,
        #[arg(long)]
        name: String,
        /// Image id from the provider catalogue
        #[arg(long, default_value = "ubuntu-22.04")]
        image: String,
        /// Hardware profile id from the provider catalogue
        #[arg(long, default_value = "small")]
        hardware: String,
        /// Location id from the provider catalogue
        #[arg(long, default_value = "mock-1a")]
        location: String,
        /// Override the login user
        #[arg(long)]
        login_user: Option<String>,
        /// Override the login password
        #[arg(long)]
        password: Option<String>,
        /// Override the login private key
        #[arg(long)]
        private_key: Option<String>,
        /// Inbound ports to open
        #[arg(long = "port")]
        inbound_ports: Vec<u16>,
        /// Script to run once the node boots
        #[arg(long)]
        run_script: Option<String>,
        /// Tags to apply
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Reboot a node
    Reboot { id: String },

    /// Resume a suspended node
    Resume { id: String },

    /// Suspend a running node
    Suspend { id: String },

    /// Destroy a node
    Destroy { id: String },

    /// List hardware profiles
    Hardware,

    /// List images
    Images,

    /// List locations
    Locations,
}
