use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A hardware or sensor feature a system requires on its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Gpu,
    Lidar,
    CameraArray,
    Radar,
    Imu,
    Gnss,
    MapOverlay,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Gpu,
        Capability::Lidar,
        Capability::CameraArray,
        Capability::Radar,
        Capability::Imu,
        Capability::Gnss,
        Capability::MapOverlay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Gpu => "gpu",
            Capability::Lidar => "lidar",
            Capability::CameraArray => "camera_array",
            Capability::Radar => "radar",
            Capability::Imu => "imu",
            Capability::Gnss => "gnss",
            Capability::MapOverlay => "map_overlay",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability '{0}'")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_owned()))
    }
}
