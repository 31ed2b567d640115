use crate::provider::{ConfigProvider, FleetProvider};
use crate::registry::Registry;
use crate::resolver::{resolve_source, EffectiveDescriptor};
use crate::validator::validate_with;
use crate::{planner, CoreError};
use lamp_runtime::{ContainerRuntime, RunningSet, RuntimeStatus};
use lamp_schema::{
    DeploymentPlan, HostClass, HostProfile, NormalizedFleet, System, SystemId,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// The registry → resolver → planner → validator pipeline.
///
/// An engine holds no mutable state: every operation borrows the registry and
/// provider and either returns a result or fails immediately.
pub struct Engine {
    registry: Registry,
    provider: Box<dyn ConfigProvider>,
    hosts: BTreeMap<HostClass, HostProfile>,
}

impl Engine {
    pub fn new(registry: Registry, provider: Box<dyn ConfigProvider>) -> Self {
        let hosts = HostClass::ALL
            .into_iter()
            .map(|class| (class, HostProfile::builtin(class)))
            .collect();
        Self {
            registry,
            provider,
            hosts,
        }
    }

    /// Engine over a fleet declaration, using its embedded layers and host
    /// profile overrides.
    pub fn from_fleet(fleet: &NormalizedFleet) -> Self {
        Self::new(
            Registry::from_fleet(fleet),
            Box::new(FleetProvider::from_fleet(fleet)),
        )
        .with_host_profiles(fleet.hosts.clone())
    }

    pub fn builtin() -> Result<Self, CoreError> {
        Ok(Self::from_fleet(&lamp_schema::builtin_fleet()?))
    }

    /// Replace the configuration source, keeping registry and host profiles.
    #[must_use]
    pub fn with_provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.provider = provider;
        self
    }

    #[must_use]
    pub fn with_host_profiles(mut self, hosts: BTreeMap<HostClass, HostProfile>) -> Self {
        self.hosts.extend(hosts);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn host_profile(&self, host_class: HostClass) -> HostProfile {
        self.hosts
            .get(&host_class)
            .cloned()
            .unwrap_or_else(|| HostProfile::builtin(host_class))
    }

    pub fn lookup(&self, system_id: &str) -> Result<&System, CoreError> {
        Ok(self.registry.lookup(system_id)?)
    }

    pub fn resolve(&self, system_id: &str) -> Result<EffectiveDescriptor, CoreError> {
        let system = self.lookup(system_id)?;
        let source = self.provider.source(system)?;
        Ok(resolve_source(system, &source)?)
    }

    /// Plan for the system's declared host class, without validation.
    pub fn plan(&self, system_id: &str) -> Result<DeploymentPlan, CoreError> {
        let descriptor = self.resolve(system_id)?;
        Ok(planner::plan(&descriptor))
    }

    /// Plan and validate against `host_class`, or the system's declared host
    /// class when `None`.
    pub fn plan_for_host(
        &self,
        system_id: &str,
        host_class: Option<HostClass>,
    ) -> Result<DeploymentPlan, CoreError> {
        let mut plan = self.plan(system_id)?;
        if let Some(class) = host_class {
            plan = plan.with_host_class(class);
        }
        validate_with(&plan, &self.host_profile(plan.host_class))?;
        Ok(plan)
    }

    /// Validate, then start the system's services. An incompatible plan never
    /// reaches the runtime.
    pub fn deploy(
        &self,
        system_id: &str,
        host_class: Option<HostClass>,
        runtime: &dyn ContainerRuntime,
    ) -> Result<RunningSet, CoreError> {
        let plan = self.plan_for_host(system_id, host_class)?;
        let digest = plan.digest();
        info!(
            "deploying {} ({}) on {} via {}",
            plan.system,
            digest.short_digest,
            plan.host_class,
            runtime.name()
        );
        Ok(runtime.up(&plan)?)
    }

    /// Stop a system's services.
    pub fn teardown(
        &self,
        system_id: &str,
        runtime: &dyn ContainerRuntime,
    ) -> Result<(), CoreError> {
        let plan = self.plan(system_id)?;
        info!("stopping {} via {}", plan.system, runtime.name());
        Ok(runtime.down(&plan)?)
    }

    pub fn status(
        &self,
        system_id: &str,
        runtime: &dyn ContainerRuntime,
    ) -> Result<RuntimeStatus, CoreError> {
        let system = self.lookup(system_id)?;
        Ok(runtime.status(system.id.as_str())?)
    }

    /// Plan and validate every registered system concurrently.
    ///
    /// Results come back in registry id order regardless of which thread
    /// finishes first.
    pub fn plan_all(
        &self,
        host_class: Option<HostClass>,
    ) -> Vec<(SystemId, Result<DeploymentPlan, CoreError>)> {
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .registry
                .systems()
                .map(|system| {
                    let id = system.id.clone();
                    let handle = scope.spawn(move || self.plan_for_host(id.as_str(), host_class));
                    (system.id.clone(), handle)
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|(id, handle)| match handle.join() {
                    Ok(result) => Some((id, result)),
                    Err(_) => {
                        warn!("planning thread for {id} panicked");
                        None
                    }
                })
                .collect()
        });
        debug!("planned {} systems", results.len());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamp_runtime::MockRuntime;

    #[test]
    fn builtin_engine_plans_every_system() {
        let engine = Engine::builtin().unwrap();
        for system in engine.registry().systems() {
            let plan = engine.plan(system.id.as_str()).unwrap();
            assert_eq!(plan.services.len(), system.capabilities.len());
        }
    }

    #[test]
    fn unknown_system_fails_before_planning() {
        let engine = Engine::builtin().unwrap();
        assert!(matches!(
            engine.plan("nope"),
            Err(CoreError::Registry(crate::RegistryError::NotFound(_)))
        ));
    }

    #[test]
    fn incompatible_deploy_never_reaches_runtime() {
        let engine = Engine::builtin().unwrap();
        let runtime = MockRuntime::new();
        let err = engine
            .deploy("prism_v2", Some(HostClass::MacosDev), &runtime)
            .unwrap_err();
        assert!(matches!(err, CoreError::Incompatible(_)));
        assert_eq!(runtime.up_calls(), 0);
    }

    #[test]
    fn plan_all_preserves_id_order() {
        let engine = Engine::builtin().unwrap();
        let ids: Vec<String> = engine
            .plan_all(None)
            .into_iter()
            .map(|(id, _)| id.into_inner())
            .collect();
        let expected: Vec<String> = engine.registry().ids().map(ToString::to_string).collect();
        assert_eq!(ids, expected);
    }
}
