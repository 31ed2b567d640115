use crate::RuntimeError;
use lamp_schema::{DeploymentPlan, SystemId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Services a runtime started for one plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunningSet {
    pub system: SystemId,
    pub project: String,
    pub services: Vec<String>,
    pub started_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeStatus {
    pub system: String,
    pub running: bool,
    pub services: Vec<String>,
}

/// A container runtime that can instantiate a validated deployment plan.
///
/// Failures are returned as-is; implementations never retry.
pub trait ContainerRuntime: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    fn up(&self, plan: &DeploymentPlan) -> Result<RunningSet, RuntimeError>;

    fn down(&self, plan: &DeploymentPlan) -> Result<(), RuntimeError>;

    fn status(&self, system: &str) -> Result<RuntimeStatus, RuntimeError>;
}

pub fn select_runtime(
    name: &str,
    work_dir: &Path,
) -> Result<Box<dyn ContainerRuntime>, RuntimeError> {
    match name {
        "compose" => Ok(Box::new(crate::compose::ComposeRuntime::new(work_dir))),
        "mock" => Ok(Box::new(crate::mock::MockRuntime::new())),
        other => Err(RuntimeError::BackendUnavailable(other.to_owned())),
    }
}
