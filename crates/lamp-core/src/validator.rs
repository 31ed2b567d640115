use lamp_schema::{DeploymentPlan, HostClass, HostProfile};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// One reason a plan cannot run on a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    DeviceUnavailable { service: String, device: String },
    PrivilegedDenied { service: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DeviceUnavailable { service, device } => {
                write!(f, "{service}: device {device} is not available")
            }
            Violation::PrivilegedDenied { service } => {
                write!(f, "{service}: privileged containers are not allowed")
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("incompatible host '{host_class}': {}", join_violations(.violations))]
pub struct IncompatibleHostError {
    pub host_class: HostClass,
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check a plan against the built-in profile of `host_class`.
pub fn validate(plan: &DeploymentPlan, host_class: HostClass) -> Result<(), IncompatibleHostError> {
    validate_with(plan, &HostProfile::builtin(host_class))
}

/// Check a plan against an explicit host profile, reporting every violation.
pub fn validate_with(
    plan: &DeploymentPlan,
    profile: &HostProfile,
) -> Result<(), IncompatibleHostError> {
    let mut violations = Vec::new();
    for service in &plan.services {
        for device in &service.devices {
            if !profile.allows_device(&device.host) {
                violations.push(Violation::DeviceUnavailable {
                    service: service.name.clone(),
                    device: device.host.clone(),
                });
            }
        }
        if service.privileged && !profile.allow_privileged {
            violations.push(Violation::PrivilegedDenied {
                service: service.name.clone(),
            });
        }
    }

    if violations.is_empty() {
        debug!("{} is compatible with {}", plan.system, profile.host_class);
        Ok(())
    } else {
        Err(IncompatibleHostError {
            host_class: profile.host_class,
            violations,
        })
    }
}
