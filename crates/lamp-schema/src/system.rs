use crate::capability::Capability;
use crate::host::HostClass;
use crate::types::{CommitId, SystemId};
use serde::{Deserialize, Serialize};

/// A named hardware/sensor deployment target.
///
/// Capabilities keep their declaration order; the planner emits services in
/// that order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct System {
    pub id: SystemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub host_class: HostClass,
    pub capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitId>,
}

impl System {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
