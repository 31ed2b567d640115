use crate::capability::Capability;
use crate::host::HostClass;
use crate::value::ConfigTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read fleet file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse fleet file: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported fleet_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("system id must not be empty")]
    EmptySystemId,
    #[error("invalid system id '{0}': only lowercase letters, digits, '_' and '-' are allowed")]
    InvalidSystemId(String),
    #[error("system '{0}' is declared more than once")]
    DuplicateSystemId(String),
    #[error("system '{system}' declares no host_class")]
    MissingHostClass { system: String },
    #[error("system '{system}' is not pinned: commit '{commit}' is not a 40-character hex SHA")]
    UnpinnedCommit { system: String, commit: String },
    #[error("unknown host class '{0}' in [hosts] (expected: nuc, generic-x86, macos-dev)")]
    UnknownHostClass(String),
}

/// Top-level fleet declaration as written in `fleet.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FleetDeclaration {
    pub fleet_version: u32,
    /// Base configuration layer shared by every system.
    #[serde(default)]
    pub base: ConfigTable,
    #[serde(default)]
    pub systems: BTreeMap<String, SystemDeclaration>,
    #[serde(default)]
    pub hosts: BTreeMap<String, HostDeclaration>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SystemDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub host_class: Option<HostClass>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Override configuration layer for this system.
    #[serde(default)]
    pub config: ConfigTable,
}

/// Override of a built-in host profile. Omitted fields keep the built-in value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HostDeclaration {
    #[serde(default)]
    pub devices: Option<Vec<String>>,
    #[serde(default)]
    pub allow_privileged: Option<bool>,
}

pub fn parse_fleet_str(input: &str) -> Result<FleetDeclaration, SchemaError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_fleet_file(path: impl AsRef<Path>) -> Result<FleetDeclaration, SchemaError> {
    let content = fs::read_to_string(path)?;
    parse_fleet_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ConfigValue;

    #[test]
    fn parses_full_fleet() {
        let input = r#"
fleet_version = 1

[base]
registry = "ghcr.io/lamp"
tag = "humble"

[base.env]
RMW_IMPLEMENTATION = "rmw_cyclonedds_cpp"

[systems.nglamp]
description = "Next-generation payload"
host_class = "nuc"
capabilities = ["gpu", "lidar", "camera_array"]
commit = "0123456789abcdef0123456789abcdef01234567"

[systems.nglamp.config]
ros_domain_id = 11

[hosts.generic-x86]
devices = ["/dev/dri"]
"#;
        let fleet = parse_fleet_str(input).expect("should parse");
        assert_eq!(fleet.fleet_version, 1);
        assert_eq!(fleet.base["tag"], ConfigValue::from("humble"));
        let nglamp = &fleet.systems["nglamp"];
        assert_eq!(nglamp.host_class, Some(HostClass::Nuc));
        assert_eq!(
            nglamp.capabilities,
            vec![Capability::Gpu, Capability::Lidar, Capability::CameraArray]
        );
        assert_eq!(nglamp.config["ros_domain_id"], ConfigValue::Integer(11));
        assert_eq!(
            fleet.hosts["generic-x86"].devices.as_deref(),
            Some(&["/dev/dri".to_owned()][..])
        );
    }

    #[test]
    fn parses_minimal_fleet() {
        let fleet = parse_fleet_str("fleet_version = 1\n").expect("should parse");
        assert!(fleet.systems.is_empty());
        assert!(fleet.base.is_empty());
    }

    #[test]
    fn rejects_unknown_system_fields() {
        let input = r#"
fleet_version = 1
[systems.labr]
host_class = "nuc"
sensors = ["lidar"]
"#;
        assert!(parse_fleet_str(input).is_err());
    }

    #[test]
    fn rejects_unknown_host_fields() {
        let input = r#"
fleet_version = 1
[hosts.nuc]
gpu = true
"#;
        let err = parse_fleet_str(input).unwrap_err();
        assert!(matches!(err, SchemaError::ParseToml(_)));
        assert!(err.to_string().contains("gpu"));
    }

    #[test]
    fn rejects_nan_in_config_layers() {
        let input = r#"
fleet_version = 1
[systems.labr]
host_class = "nuc"
[systems.labr.config]
scale = nan
"#;
        assert!(matches!(
            parse_fleet_str(input),
            Err(SchemaError::ParseToml(_))
        ));
    }

    #[test]
    fn rejects_unknown_capability() {
        let input = r#"
fleet_version = 1
[systems.labr]
host_class = "nuc"
capabilities = ["thermal"]
"#;
        assert!(parse_fleet_str(input).is_err());
    }

    #[test]
    fn rejects_missing_version() {
        assert!(parse_fleet_str("[systems]\n").is_err());
    }
}
