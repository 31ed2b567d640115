use crate::plan::DeploymentPlan;
use crate::types::{PlanDigest, ShortDigest};
use serde::Serialize;

/// Content digest of a deployment plan, stable across runs and machines.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanIdentity {
    pub digest: PlanDigest,
    pub short_digest: ShortDigest,
}

/// Hash every field that changes what the container runtime would start.
///
/// Each field goes in as a tagged, length-prefixed frame, so no two distinct
/// plans share a hash input. Services are hashed in plan order, so reordering
/// services changes the digest. Environment bindings are hashed in key order.
pub fn compute_plan_digest(plan: &DeploymentPlan) -> PlanIdentity {
    let mut hasher = blake3::Hasher::new();

    frame(&mut hasher, "system", plan.system.as_str());
    frame(&mut hasher, "host", plan.host_class.as_str());
    if let Some(commit) = &plan.commit {
        frame(&mut hasher, "commit", commit.as_str());
    }

    for service in &plan.services {
        frame(&mut hasher, "service", &service.name);
        frame(&mut hasher, "capability", service.capability.as_str());
        frame(&mut hasher, "image", service.image.as_str());
        for device in &service.devices {
            frame(&mut hasher, "dev.host", &device.host);
            frame(&mut hasher, "dev.container", &device.container);
        }
        if service.privileged {
            frame(&mut hasher, "privileged", "");
        }
        for (key, value) in &service.environment {
            frame(&mut hasher, "env.key", key);
            frame(&mut hasher, "env.value", value);
        }
        frame(&mut hasher, "end-service", "");
    }

    let hex = hasher.finalize().to_hex().to_string();
    let short = hex[..12].to_owned();

    PlanIdentity {
        digest: PlanDigest::new(hex),
        short_digest: ShortDigest::new(short),
    }
}

fn frame(hasher: &mut blake3::Hasher, tag: &str, value: &str) {
    hasher.update(&(tag.len() as u64).to_le_bytes());
    hasher.update(tag.as_bytes());
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
