use crate::capability::Capability;
use crate::host::HostClass;
use crate::types::{CommitId, ImageRef, SystemId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A host device exposed inside a container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceBinding {
    pub host: String,
    pub container: String,
}

impl DeviceBinding {
    /// Bind a device at the same path inside the container.
    pub fn identity(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            container: path.clone(),
            host: path,
        }
    }

    /// Parse `<host>` or `<host>:<container>`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once(':') {
            Some((host, container)) => {
                let host = host.trim();
                let container = container.trim();
                if host.is_empty() || container.is_empty() {
                    None
                } else {
                    Some(Self {
                        host: host.to_owned(),
                        container: container.to_owned(),
                    })
                }
            }
            None if raw.is_empty() => None,
            None => Some(Self::identity(raw)),
        }
    }
}

/// One container to start for a capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub name: String,
    pub capability: Capability,
    pub image: ImageRef,
    pub devices: Vec<DeviceBinding>,
    pub privileged: bool,
    pub environment: BTreeMap<String, String>,
}

/// Ordered service definitions for one system, ready for a container runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub system: SystemId,
    pub host_class: HostClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitId>,
    pub services: Vec<ServiceDefinition>,
}

impl DeploymentPlan {
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn digest(&self) -> crate::digest::PlanIdentity {
        crate::digest::compute_plan_digest(self)
    }

    /// The same plan retargeted at another host class.
    #[must_use]
    pub fn with_host_class(mut self, host_class: HostClass) -> Self {
        self.host_class = host_class;
        self
    }
}
