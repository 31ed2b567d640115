//! Fleet declaration parsing, configuration values, and plan types for LAMP.
//!
//! This crate defines the schema layer: TOML fleet parsing (`FleetDeclaration`),
//! the validated fleet (`NormalizedFleet`), systems and their capabilities,
//! host classes and their device passthrough profiles, the `ConfigValue`
//! tagged union configuration layers are made of, deployment plan types and
//! their deterministic digest, and the built-in LAMP fleet.

pub mod builtin;
pub mod capability;
pub mod digest;
pub mod fleet;
pub mod host;
pub mod normalize;
pub mod plan;
pub mod system;
pub mod types;
pub mod value;

pub use builtin::{builtin_fleet, BUILTIN_FLEET, BUILTIN_SYSTEM_IDS};
pub use capability::{Capability, UnknownCapability};
pub use digest::{compute_plan_digest, PlanIdentity};
pub use fleet::{
    parse_fleet_file, parse_fleet_str, FleetDeclaration, HostDeclaration, SchemaError,
    SystemDeclaration,
};
pub use host::{canonicalize_logical, HostClass, HostProfile, UnknownHostClass};
pub use normalize::NormalizedFleet;
pub use plan::{DeploymentPlan, DeviceBinding, ServiceDefinition};
pub use system::System;
pub use types::{CommitId, ImageRef, PlanDigest, ShortDigest, SystemId};
pub use value::{parse_table_str, ConfigLayer, ConfigTable, ConfigValue, ValueKind};
