//! Container runtime backends and host integration for LAMP deployments.
//!
//! This crate implements the execution layer: the pluggable `ContainerRuntime`
//! trait with a docker compose backend and an in-memory mock, compose file
//! rendering from a `DeploymentPlan`, local host-class detection, and runtime
//! prerequisite checking.

pub mod backend;
pub mod compose;
pub mod host;
pub mod mock;
pub mod prereq;

pub use backend::{select_runtime, ContainerRuntime, RunningSet, RuntimeStatus};
pub use compose::{check_devices, project_name, render_compose, ComposeRuntime};
pub use host::{classify_host, detect_host_class};
pub use mock::MockRuntime;
pub use prereq::{check_compose_prereqs, format_missing, MissingPrereq};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("runtime '{0}' is not available on this system")]
    BackendUnavailable(String),
    #[error("system '{0}' is not running")]
    NotRunning(String),
    #[error("system '{0}' is already running")]
    AlreadyRunning(String),
    #[error("device '{device}' required by service '{service}' does not exist on this host")]
    DeviceMissing { service: String, device: String },
    #[error("runtime execution failed: {0}")]
    ExecFailed(String),
    #[error("failed to render compose file: {0}")]
    Render(#[from] serde_json::Error),
}
