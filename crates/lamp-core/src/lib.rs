//! Core pipeline for LAMP fleet deployments.
//!
//! This crate ties the schema layer and the runtime backends together into the
//! `Engine`: it looks systems up in the `Registry`, sources their configuration
//! layers from a `ConfigProvider`, merges them into an `EffectiveDescriptor`,
//! plans one container service per capability, and validates the plan against
//! a host profile before anything reaches a container runtime.

pub mod engine;
pub mod planner;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod validator;

pub use engine::Engine;
pub use planner::{capability_profile, plan, CapabilityProfile, DEFAULT_REGISTRY, DEFAULT_TAG};
pub use provider::{ConfigProvider, DirectoryProvider, FleetProvider, ProviderError, SourceTree};
pub use registry::{Registry, RegistryError};
pub use resolver::{merge_tables, resolve, resolve_source, EffectiveDescriptor, ResolveError};
pub use validator::{validate, validate_with, IncompatibleHostError, Violation};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("fleet error: {0}")]
    Schema(#[from] lamp_schema::SchemaError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Incompatible(#[from] IncompatibleHostError),
    #[error("runtime error: {0}")]
    Runtime(#[from] lamp_runtime::RuntimeError),
}
