use crate::fleet::{parse_fleet_str, SchemaError};
use crate::normalize::NormalizedFleet;

/// Fleet used when no `--fleet` file is given.
pub const BUILTIN_FLEET: &str = r#"fleet_version = 1

[base]
registry = "ghcr.io/lamp"
tag = "humble"
ros_domain_id = 0

[base.env]
RMW_IMPLEMENTATION = "rmw_cyclonedds_cpp"

[base.map_overlay]
coverage_meters = 500
image_size = 1024
tile_provider = "esri"
cache_dir = "/tmp/map_tiles"

[systems.nglamp]
description = "Next-generation LAMP payload"
host_class = "nuc"
capabilities = ["gpu", "lidar", "camera_array", "imu", "gnss", "map_overlay"]

[systems.nglamp.config]
ros_domain_id = 11

[systems.prism_v1]
description = "PRISM handheld, first revision"
host_class = "nuc"
capabilities = ["lidar", "camera_array", "imu"]

[systems.prism_v1.config]
tag = "foxy"

[systems.prism_v2]
description = "PRISM handheld, second revision"
host_class = "nuc"
capabilities = ["gpu", "lidar", "camera_array", "imu"]

[systems.polaris_v2]
description = "Polaris vehicle kit"
host_class = "nuc"
capabilities = ["gpu", "lidar", "imu", "gnss", "map_overlay"]

[systems.labr]
description = "Lab rig"
host_class = "generic-x86"
capabilities = ["lidar", "imu"]

[systems.labr.config.devices]
imu = ["/dev/bus/usb"]

[systems.slamp]
description = "Small LAMP"
host_class = "nuc"
capabilities = ["lidar", "imu"]

[systems.clamp]
description = "Camera LAMP"
host_class = "nuc"
capabilities = ["camera_array", "imu"]

[systems.gegi_v2]
description = "GEGI workstation, second revision"
host_class = "generic-x86"
capabilities = ["gpu", "lidar", "camera_array"]

[systems.radarlamp]
description = "Radar LAMP"
host_class = "nuc"
capabilities = ["radar", "lidar", "imu"]

[systems.radarlamp.config.devices]
radar = ["/dev/ttyACM1"]
"#;

/// Identifiers declared by [`BUILTIN_FLEET`], in id order.
pub const BUILTIN_SYSTEM_IDS: &[&str] = &[
    "clamp",
    "gegi_v2",
    "labr",
    "nglamp",
    "polaris_v2",
    "prism_v1",
    "prism_v2",
    "radarlamp",
    "slamp",
];

pub fn builtin_fleet() -> Result<NormalizedFleet, SchemaError> {
    parse_fleet_str(BUILTIN_FLEET)?.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::host::HostClass;

    #[test]
    fn builtin_fleet_parses_and_normalizes() {
        let fleet = builtin_fleet().expect("built-in fleet must be valid");
        let ids: Vec<&str> = fleet.systems.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, BUILTIN_SYSTEM_IDS);
    }

    #[test]
    fn every_builtin_system_has_an_override_entry() {
        let fleet = builtin_fleet().unwrap();
        for id in BUILTIN_SYSTEM_IDS {
            assert!(fleet.overrides.contains_key(*id), "missing override for {id}");
        }
    }

    #[test]
    fn nglamp_declares_gpu_first() {
        let fleet = builtin_fleet().unwrap();
        let nglamp = fleet.systems.iter().find(|s| s.id == "nglamp").unwrap();
        assert_eq!(nglamp.host_class, HostClass::Nuc);
        assert_eq!(nglamp.capabilities[0], Capability::Gpu);
        assert!(nglamp.has_capability(Capability::MapOverlay));
    }
}
