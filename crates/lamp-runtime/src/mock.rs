use crate::backend::{ContainerRuntime, RunningSet, RuntimeStatus};
use crate::RuntimeError;
use lamp_schema::DeploymentPlan;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory runtime that records what would have been started.
pub struct MockRuntime {
    state: Mutex<HashMap<String, Vec<String>>>,
    missing_devices: HashSet<String>,
    up_calls: AtomicUsize,
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            missing_devices: HashSet::new(),
            up_calls: AtomicUsize::new(0),
        }
    }
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `device` is absent on this host.
    #[must_use]
    pub fn with_missing_device(mut self, device: impl Into<String>) -> Self {
        self.missing_devices.insert(device.into());
        self
    }

    /// Number of times `up` was invoked, including failed attempts.
    pub fn up_calls(&self) -> usize {
        self.up_calls.load(Ordering::SeqCst)
    }
}

impl ContainerRuntime for MockRuntime {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn available(&self) -> bool {
        true
    }

    fn up(&self, plan: &DeploymentPlan) -> Result<RunningSet, RuntimeError> {
        self.up_calls.fetch_add(1, Ordering::SeqCst);
        crate::compose::check_devices(plan, |p| {
            !self.missing_devices.contains(&*p.to_string_lossy())
        })?;

        let mut state = self
            .state
            .lock()
            .map_err(|e| RuntimeError::ExecFailed(format!("mutex poisoned: {e}")))?;
        if state.contains_key(plan.system.as_str()) {
            return Err(RuntimeError::AlreadyRunning(plan.system.to_string()));
        }
        let services: Vec<String> = plan.services.iter().map(|s| s.name.clone()).collect();
        state.insert(plan.system.to_string(), services.clone());

        Ok(RunningSet {
            system: plan.system.clone(),
            project: crate::compose::project_name(plan.system.as_str()),
            services,
            started_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn down(&self, plan: &DeploymentPlan) -> Result<(), RuntimeError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RuntimeError::ExecFailed(format!("mutex poisoned: {e}")))?;
        state
            .remove(plan.system.as_str())
            .map(|_| ())
            .ok_or_else(|| RuntimeError::NotRunning(plan.system.to_string()))
    }

    fn status(&self, system: &str) -> Result<RuntimeStatus, RuntimeError> {
        let state = self
            .state
            .lock()
            .map_err(|e| RuntimeError::ExecFailed(format!("mutex poisoned: {e}")))?;
        let services = state.get(system).cloned().unwrap_or_default();
        Ok(RuntimeStatus {
            system: system.to_owned(),
            running: state.contains_key(system),
            services,
        })
    }
}
