//! vCloud native shapes consumed by the vApp mapper.

use serde::{Deserialize, Serialize};

/// Status of a vCloud vApp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VAppStatus {
    Unresolved,
    Resolved,
    Deployed,
    Suspended,
    On,
    WaitingForInput,
    Unknown,
    Unrecognized,
    Off,
    Inconsistent,
    Mixed,
    Error,
}

impl VAppStatus {
    /// Decode the numeric status code carried by vCloud documents.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => VAppStatus::Error,
            0 => VAppStatus::Unresolved,
            1 => VAppStatus::Resolved,
            2 => VAppStatus::Deployed,
            3 => VAppStatus::Suspended,
            4 => VAppStatus::On,
            5 => VAppStatus::WaitingForInput,
            6 => VAppStatus::Unknown,
            8 => VAppStatus::Off,
            9 => VAppStatus::Inconsistent,
            10 => VAppStatus::Mixed,
            _ => VAppStatus::Unrecognized,
        }
    }
}

/// A vCloud vApp as returned by the provider API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VApp {
    /// Canonical href, used as the node id
    pub href: String,
    pub name: String,
    /// Href of the virtual datacenter holding the vApp
    pub vdc_href: Option<String>,
    pub status: VAppStatus,
    /// IP addresses across all VMs of the vApp
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    /// Guest operating system as reported by the first VM
    pub os_description: Option<String>,
    /// Guest customization admin password
    pub admin_password: Option<String>,
}

impl VApp {
    pub fn new(href: impl Into<String>, name: impl Into<String>, status: VAppStatus) -> Self {
        Self {
            href: href.into(),
            name: name.into(),
            vdc_href: None,
            status,
            ip_addresses: Vec::new(),
            os_description: None,
            admin_password: None,
        }
    }

    pub fn in_vdc(mut self, vdc_href: impl Into<String>) -> Self {
        self.vdc_href = Some(vdc_href.into());
        self
    }

    pub fn with_ip_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ip_addresses.extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn with_os_description(mut self, description: impl Into<String>) -> Self {
        self.os_description = Some(description.into());
        self
    }
}
