//! vApp to node metadata translation.

use std::collections::HashMap;
use tracing::warn;

use super::types::{VApp, VAppStatus};
use crate::traits::NodeMetadataMapper;
use crate::types::{Hardware, Location, NodeMetadata, NodeState};

/// Hardware resolution for a vApp.
pub type HardwareForVApp = Box<dyn Fn(&VApp) -> Hardware + Send + Sync>;

/// Default vApp status to node state table.
pub fn default_status_map() -> HashMap<VAppStatus, NodeState> {
    HashMap::from([
        (VAppStatus::Unresolved, NodeState::Pending),
        (VAppStatus::Resolved, NodeState::Pending),
        (VAppStatus::Deployed, NodeState::Pending),
        (VAppStatus::Inconsistent, NodeState::Pending),
        (VAppStatus::Mixed, NodeState::Pending),
        (VAppStatus::WaitingForInput, NodeState::Pending),
        (VAppStatus::Off, NodeState::Suspended),
        (VAppStatus::Suspended, NodeState::Suspended),
        (VAppStatus::On, NodeState::Running),
        (VAppStatus::Error, NodeState::Error),
        (VAppStatus::Unrecognized, NodeState::Unrecognized),
        (VAppStatus::Unknown, NodeState::Unrecognized),
    ])
}

/// Maps vCloud vApps into common metadata.
///
/// The guest customization password is provider data, not a stored
/// credential: it is never copied onto the metadata.
pub struct VAppToNodeMetadata {
    status_map: HashMap<VAppStatus, NodeState>,
    locations_by_vdc: HashMap<String, Location>,
    hardware_for_vapp: HardwareForVApp,
}

impl VAppToNodeMetadata {
    pub fn new(
        locations_by_vdc: HashMap<String, Location>,
        hardware_for_vapp: HardwareForVApp,
    ) -> Self {
        Self {
            status_map: default_status_map(),
            locations_by_vdc,
            hardware_for_vapp,
        }
    }

    pub fn with_status_map(mut self, status_map: HashMap<VAppStatus, NodeState>) -> Self {
        self.status_map = status_map;
        self
    }
}

impl NodeMetadataMapper<VApp> for VAppToNodeMetadata {
    fn map(&self, vapp: &VApp) -> NodeMetadata {
        let state = self.status_map.get(&vapp.status).copied().unwrap_or_else(|| {
            warn!(href = %vapp.href, status = ?vapp.status, "Unmapped vApp status");
            NodeState::Unrecognized
        });

        let mut node = NodeMetadata::new(vapp.href.clone(), state)
            .with_uri(vapp.href.clone())
            .with_name(vapp.name.clone())
            .with_hardware((self.hardware_for_vapp)(vapp))
            .with_addresses(vapp.ip_addresses.iter().cloned());

        if let Some(location) = vapp
            .vdc_href
            .as_ref()
            .and_then(|vdc| self.locations_by_vdc.get(vdc))
        {
            node = node.with_location(location.clone());
        }
        if let Some(os) = &vapp.os_description {
            node = node.with_os_description(os.clone());
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocationScope;

    const VDC: &str = "https://vcloud.example.com/api/vdc/1";

    fn mapper() -> VAppToNodeMetadata {
        let locations = HashMap::from([(
            VDC.to_string(),
            Location::new(VDC, LocationScope::Zone).with_description("Org VDC"),
        )]);
        VAppToNodeMetadata::new(
            locations,
            Box::new(|vapp: &VApp| Hardware::new(format!("{}/hardware", vapp.href), 2, 2048)),
        )
    }

    #[test]
    fn test_maps_vapp() {
        let mut vapp = VApp::new(
            "https://vcloud.example.com/api/vApp/vapp-42",
            "web-2a",
            VAppStatus::On,
        )
        .in_vdc(VDC)
        .with_ip_addresses(["10.150.4.93", "174.47.101.164"])
        .with_os_description("Ubuntu Linux (64-bit)");
        vapp.admin_password = Some("secret".to_string());

        let node = mapper().map(&vapp);

        assert_eq!(node.id, vapp.href);
        assert_eq!(node.uri.as_deref(), Some(vapp.href.as_str()));
        assert_eq!(node.group.as_deref(), Some("web"));
        assert_eq!(node.state, NodeState::Running);
        assert_eq!(node.location.unwrap().description, "Org VDC");
        assert_eq!(node.hardware.unwrap().ram_mib, 2048);
        assert_eq!(node.os_description.as_deref(), Some("Ubuntu Linux (64-bit)"));
        assert!(node.private_addresses.contains("10.150.4.93"));
        assert!(node.public_addresses.contains("174.47.101.164"));
        assert_eq!(node.credentials, None);
    }

    #[test]
    fn test_status_mapping() {
        let map = default_status_map();
        assert_eq!(map[&VAppStatus::Off], NodeState::Suspended);
        assert_eq!(map[&VAppStatus::Resolved], NodeState::Pending);
        assert_eq!(map[&VAppStatus::Unknown], NodeState::Unrecognized);
        assert_eq!(VAppStatus::from_code(4), VAppStatus::On);
        assert_eq!(VAppStatus::from_code(7), VAppStatus::Unrecognized);
    }

    #[test]
    fn test_unmapped_status_is_unrecognized() {
        let mapper = mapper().with_status_map(HashMap::new());
        let vapp = VApp::new("https://vcloud.example.com/api/vApp/vapp-1", "db-1", VAppStatus::On);

        assert_eq!(mapper.map(&vapp).state, NodeState::Unrecognized);
        assert_eq!(mapper.map(&vapp).location, None);
        assert_eq!(mapper.map(&vapp).os_description, None);
    }
}
