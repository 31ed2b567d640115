use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of machine a deployment plan may run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HostClass {
    #[serde(rename = "nuc")]
    Nuc,
    #[serde(rename = "generic-x86")]
    GenericX86,
    #[serde(rename = "macos-dev")]
    MacosDev,
}

impl HostClass {
    pub const ALL: [HostClass; 3] = [HostClass::Nuc, HostClass::GenericX86, HostClass::MacosDev];

    pub fn as_str(self) -> &'static str {
        match self {
            HostClass::Nuc => "nuc",
            HostClass::GenericX86 => "generic-x86",
            HostClass::MacosDev => "macos-dev",
        }
    }
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown host class '{0}' (expected: nuc, generic-x86, macos-dev)")]
pub struct UnknownHostClass(pub String);

impl FromStr for HostClass {
    type Err = UnknownHostClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        HostClass::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| UnknownHostClass(s.to_owned()))
    }
}

/// Device passthrough policy of one host class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostProfile {
    pub host_class: HostClass,
    /// Device path prefixes that can be bound into containers.
    pub devices: Vec<String>,
    pub allow_privileged: bool,
}

impl HostProfile {
    pub fn builtin(host_class: HostClass) -> Self {
        let devices: &[&str] = match host_class {
            HostClass::Nuc => &[
                "/dev/dri",
                "/dev/bus/usb",
                "/dev/video",
                "/dev/ttyUSB",
                "/dev/ttyACM",
            ],
            HostClass::GenericX86 => &["/dev/dri", "/dev/bus/usb", "/dev/video"],
            // Docker Desktop runs containers inside a VM; host devices never reach it.
            HostClass::MacosDev => &[],
        };
        Self {
            host_class,
            devices: devices.iter().map(|d| (*d).to_owned()).collect(),
            allow_privileged: host_class != HostClass::MacosDev,
        }
    }

    /// Whether `device` falls under one of the allowed prefixes after
    /// resolving `.` and `..` components.
    pub fn allows_device(&self, device: &str) -> bool {
        let canonical = canonicalize_logical(device);
        self.devices
            .iter()
            .any(|prefix| canonical.starts_with(&canonicalize_logical(prefix)))
    }
}

/// Resolve `.` and `..` components in an absolute path without touching the filesystem.
///
/// The device may not exist on the machine doing the planning, so
/// `std::fs::canonicalize()` is not an option.
pub fn canonicalize_logical(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}
