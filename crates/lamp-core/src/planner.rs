use crate::resolver::EffectiveDescriptor;
use lamp_schema::{
    Capability, ConfigTable, ConfigValue, DeploymentPlan, DeviceBinding, ImageRef,
    ServiceDefinition,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const DEFAULT_REGISTRY: &str = "ghcr.io/lamp";
pub const DEFAULT_TAG: &str = "latest";

/// How one capability is realised as a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityProfile {
    pub capability: Capability,
    pub service: &'static str,
    pub image: &'static str,
    pub devices: &'static [&'static str],
    pub privileged: bool,
}

const PROFILES: [CapabilityProfile; 7] = [
    CapabilityProfile {
        capability: Capability::Gpu,
        service: "gpu-runtime",
        image: "gpu-runtime",
        devices: &["/dev/dri"],
        privileged: true,
    },
    CapabilityProfile {
        capability: Capability::Lidar,
        service: "lidar-driver",
        image: "lidar-driver",
        devices: &[],
        privileged: false,
    },
    CapabilityProfile {
        capability: Capability::CameraArray,
        service: "camera-array",
        image: "camera-array",
        devices: &["/dev/bus/usb"],
        privileged: false,
    },
    CapabilityProfile {
        capability: Capability::Radar,
        service: "radar-driver",
        image: "radar-driver",
        devices: &["/dev/ttyACM0"],
        privileged: false,
    },
    CapabilityProfile {
        capability: Capability::Imu,
        service: "imu-driver",
        image: "imu-driver",
        devices: &["/dev/ttyUSB0"],
        privileged: false,
    },
    CapabilityProfile {
        capability: Capability::Gnss,
        service: "gnss-driver",
        image: "gnss-driver",
        devices: &["/dev/ttyUSB1"],
        privileged: false,
    },
    CapabilityProfile {
        capability: Capability::MapOverlay,
        service: "map-overlay",
        image: "map-overlay",
        devices: &[],
        privileged: false,
    },
];

/// `PROFILES` is laid out in `Capability` declaration order.
pub fn capability_profile(capability: Capability) -> &'static CapabilityProfile {
    &PROFILES[capability as usize]
}

/// Turn a resolved descriptor into one service per capability, in capability
/// order.
///
/// Never fails: settings of the wrong shape are logged and ignored.
pub fn plan(descriptor: &EffectiveDescriptor) -> DeploymentPlan {
    let config = descriptor.config();
    let registry = string_setting(config, "registry").unwrap_or(DEFAULT_REGISTRY);
    let tag = string_setting(config, "tag").unwrap_or(DEFAULT_TAG);
    let images = map_setting(config, "images");
    let devices = map_setting(config, "devices");

    let mut shared_env = BTreeMap::new();
    if let Some(env) = map_setting(config, "env") {
        for (key, value) in env {
            match value.to_env_string() {
                Some(v) => {
                    shared_env.insert(key.clone(), v);
                }
                None => warn!("ignoring non-scalar env.{key} ({})", value.kind()),
            }
        }
    }
    match config.get("ros_domain_id") {
        Some(ConfigValue::Integer(id)) => {
            shared_env.insert("ROS_DOMAIN_ID".to_owned(), id.to_string());
        }
        Some(other) => warn!("ignoring ros_domain_id: expected integer, got {}", other.kind()),
        None => {}
    }

    let services = descriptor
        .capabilities()
        .iter()
        .map(|&capability| {
            let profile = capability_profile(capability);
            let key = capability.as_str();

            let image = match images.and_then(|m| m.get(key)) {
                Some(ConfigValue::String(image)) => ImageRef::new(image.clone()),
                Some(other) => {
                    warn!("ignoring images.{key}: expected string, got {}", other.kind());
                    default_image(registry, profile.image, tag)
                }
                None => default_image(registry, profile.image, tag),
            };

            let bindings = match devices.and_then(|m| m.get(key)) {
                Some(ConfigValue::List(list)) => device_list(key, list),
                Some(other) => {
                    warn!("ignoring devices.{key}: expected list, got {}", other.kind());
                    default_devices(profile)
                }
                None => default_devices(profile),
            };

            let mut environment = shared_env.clone();
            match config.get(key) {
                Some(ConfigValue::Map(params)) => {
                    for (param, value) in params {
                        match value.to_env_string() {
                            Some(v) => {
                                environment.insert(format!("{key}_{param}").to_uppercase(), v);
                            }
                            None => warn!("ignoring non-scalar {key}.{param}"),
                        }
                    }
                }
                Some(other) => warn!("ignoring {key}: expected table, got {}", other.kind()),
                None => {}
            }
            environment.insert("LAMP_SYSTEM".to_owned(), descriptor.system().to_string());
            environment.insert("LAMP_CAPABILITY".to_owned(), key.to_owned());

            ServiceDefinition {
                name: profile.service.to_owned(),
                capability,
                image,
                devices: bindings,
                privileged: profile.privileged,
                environment,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "planned {} services for {}",
        services.len(),
        descriptor.system()
    );

    DeploymentPlan {
        system: descriptor.system().clone(),
        host_class: descriptor.host_class(),
        commit: descriptor.commit().cloned(),
        services,
    }
}

fn string_setting<'a>(config: &'a ConfigTable, key: &str) -> Option<&'a str> {
    match config.get(key) {
        Some(ConfigValue::String(s)) => Some(s),
        Some(other) => {
            warn!("ignoring {key}: expected string, got {}", other.kind());
            None
        }
        None => None,
    }
}

fn map_setting<'a>(config: &'a ConfigTable, key: &str) -> Option<&'a ConfigTable> {
    match config.get(key) {
        Some(ConfigValue::Map(m)) => Some(m),
        Some(other) => {
            warn!("ignoring {key}: expected table, got {}", other.kind());
            None
        }
        None => None,
    }
}

fn default_image(registry: &str, image: &str, tag: &str) -> ImageRef {
    ImageRef::new(format!("{}/{image}:{tag}", registry.trim_end_matches('/')))
}

fn default_devices(profile: &CapabilityProfile) -> Vec<DeviceBinding> {
    profile
        .devices
        .iter()
        .map(|d| DeviceBinding::identity(*d))
        .collect()
}

fn device_list(key: &str, list: &[ConfigValue]) -> Vec<DeviceBinding> {
    list.iter()
        .filter_map(|value| {
            let binding = value.as_str().and_then(DeviceBinding::parse);
            if binding.is_none() {
                warn!("ignoring invalid device entry in devices.{key}: {value:?}");
            }
            binding
        })
        .collect()
}
