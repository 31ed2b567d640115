use crate::backend::{ContainerRuntime, RunningSet, RuntimeStatus};
use crate::RuntimeError;
use lamp_schema::DeploymentPlan;
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const COMPOSE_FILE: &str = "compose.json";

/// Compose project name for a system.
pub fn project_name(system: &str) -> String {
    format!("lamp-{system}")
}

/// Render a deployment plan as a compose document.
///
/// Compose accepts JSON as well as YAML, so the document is written as JSON.
pub fn render_compose(plan: &DeploymentPlan) -> Value {
    let mut services = Map::new();
    for service in &plan.services {
        let devices: Vec<String> = service
            .devices
            .iter()
            .map(|d| format!("{}:{}", d.host, d.container))
            .collect();

        let mut def = Map::new();
        def.insert("image".to_owned(), json!(service.image.as_str()));
        def.insert("network_mode".to_owned(), json!("host"));
        def.insert("restart".to_owned(), json!("unless-stopped"));
        if !devices.is_empty() {
            def.insert("devices".to_owned(), json!(devices));
        }
        if service.privileged {
            def.insert("privileged".to_owned(), json!(true));
        }
        def.insert("environment".to_owned(), json!(service.environment));
        def.insert(
            "labels".to_owned(),
            json!({
                "lamp.system": plan.system.as_str(),
                "lamp.capability": service.capability.as_str(),
                "lamp.host_class": plan.host_class.as_str(),
            }),
        );
        services.insert(service.name.clone(), Value::Object(def));
    }

    json!({
        "name": project_name(plan.system.as_str()),
        "services": services,
    })
}

/// Confirm every host device a plan binds is present.
///
/// Runs after policy validation, so a failure here means the host matches its
/// class but is missing hardware.
pub fn check_devices(
    plan: &DeploymentPlan,
    exists: impl Fn(&Path) -> bool,
) -> Result<(), RuntimeError> {
    for service in &plan.services {
        for device in &service.devices {
            if !exists(Path::new(&device.host)) {
                return Err(RuntimeError::DeviceMissing {
                    service: service.name.clone(),
                    device: device.host.clone(),
                });
            }
        }
    }
    Ok(())
}

pub struct ComposeRuntime {
    work_dir: PathBuf,
}

impl ComposeRuntime {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn compose_file(&self, system: &str) -> PathBuf {
        self.work_dir.join(system).join(COMPOSE_FILE)
    }

    /// Write the compose document for a plan atomically and return its path.
    pub fn write_compose(&self, plan: &DeploymentPlan) -> Result<PathBuf, RuntimeError> {
        let dir = self.work_dir.join(plan.system.as_str());
        std::fs::create_dir_all(&dir)?;

        let content = serde_json::to_string_pretty(&render_compose(plan))?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.write_all(b"\n")?;

        let path = dir.join(COMPOSE_FILE);
        tmp.persist(&path).map_err(|e| RuntimeError::Io(e.error))?;
        debug!("wrote compose file {}", path.display());
        Ok(path)
    }

    fn compose(project: &str, file: &Path, args: &[&str]) -> Result<(), RuntimeError> {
        let file_arg = file.to_string_lossy();
        let output = Command::new("docker")
            .args(["compose", "-p", project, "-f", &file_arg])
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| RuntimeError::ExecFailed(format!("docker compose failed: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(RuntimeError::ExecFailed(format!(
                "docker compose {} exited with code {}: {}",
                args.join(" "),
                output.status.code().unwrap_or(1),
                stderr.trim()
            )))
        }
    }
}

impl ContainerRuntime for ComposeRuntime {
    fn name(&self) -> &'static str {
        "compose"
    }

    fn available(&self) -> bool {
        Command::new("docker")
            .args(["compose", "version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    fn up(&self, plan: &DeploymentPlan) -> Result<RunningSet, RuntimeError> {
        if !self.available() {
            return Err(RuntimeError::BackendUnavailable(
                "docker compose not found".to_owned(),
            ));
        }
        check_devices(plan, Path::exists)?;

        let file = self.write_compose(plan)?;
        let project = project_name(plan.system.as_str());
        info!("starting {} services for {}", plan.services.len(), plan.system);
        Self::compose(&project, &file, &["up", "-d", "--remove-orphans"])?;

        Ok(RunningSet {
            system: plan.system.clone(),
            project,
            services: plan.services.iter().map(|s| s.name.clone()).collect(),
            started_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn down(&self, plan: &DeploymentPlan) -> Result<(), RuntimeError> {
        let file = self.compose_file(plan.system.as_str());
        if !file.exists() {
            return Err(RuntimeError::NotRunning(plan.system.to_string()));
        }
        let project = project_name(plan.system.as_str());
        info!("stopping {project}");
        Self::compose(&project, &file, &["down"])?;
        std::fs::remove_file(&file)?;
        Ok(())
    }

    fn status(&self, system: &str) -> Result<RuntimeStatus, RuntimeError> {
        let file = self.compose_file(system);
        if !file.exists() {
            return Ok(RuntimeStatus {
                system: system.to_owned(),
                running: false,
                services: Vec::new(),
            });
        }

        let project = project_name(system);
        let file_arg = file.to_string_lossy();
        let output = Command::new("docker")
            .args(["compose", "-p", &project, "-f", &file_arg])
            .args(["ps", "--services", "--status", "running"])
            .output()
            .map_err(|e| RuntimeError::ExecFailed(format!("docker compose ps failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RuntimeError::ExecFailed(format!(
                "docker compose ps failed: {}",
                stderr.trim()
            )));
        }

        let services: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(RuntimeStatus {
            system: system.to_owned(),
            running: !services.is_empty(),
            services,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamp_schema::{
        Capability, DeviceBinding, HostClass, ImageRef, ServiceDefinition, SystemId,
    };
    use std::collections::BTreeMap;

    fn test_plan() -> DeploymentPlan {
        let mut env = BTreeMap::new();
        env.insert("LAMP_SYSTEM".to_owned(), "prism_v2".to_owned());
        DeploymentPlan {
            system: SystemId::new("prism_v2"),
            host_class: HostClass::Nuc,
            commit: None,
            services: vec![
                ServiceDefinition {
                    name: "gpu-runtime".to_owned(),
                    capability: Capability::Gpu,
                    image: ImageRef::new("ghcr.io/lamp/gpu-runtime:humble"),
                    devices: vec![DeviceBinding::identity("/dev/dri")],
                    privileged: true,
                    environment: env.clone(),
                },
                ServiceDefinition {
                    name: "lidar-driver".to_owned(),
                    capability: Capability::Lidar,
                    image: ImageRef::new("ghcr.io/lamp/lidar-driver:humble"),
                    devices: Vec::new(),
                    privileged: false,
                    environment: env,
                },
            ],
        }
    }

    #[test]
    fn render_includes_every_service() {
        let doc = render_compose(&test_plan());
        assert_eq!(doc["name"], "lamp-prism_v2");
        let gpu = &doc["services"]["gpu-runtime"];
        assert_eq!(gpu["image"], "ghcr.io/lamp/gpu-runtime:humble");
        assert_eq!(gpu["devices"][0], "/dev/dri:/dev/dri");
        assert_eq!(gpu["privileged"], true);
        assert_eq!(gpu["environment"]["LAMP_SYSTEM"], "prism_v2");
        assert_eq!(gpu["labels"]["lamp.capability"], "gpu");

        let lidar = &doc["services"]["lidar-driver"];
        assert!(lidar.get("devices").is_none());
        assert!(lidar.get("privileged").is_none());
    }

    #[test]
    fn check_devices_reports_first_missing() {
        let plan = test_plan();
        assert!(check_devices(&plan, |_| true).is_ok());
        let err = check_devices(&plan, |_| false).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::DeviceMissing { ref service, ref device }
                if service == "gpu-runtime" && device == "/dev/dri"
        ));
    }

    #[test]
    fn write_compose_is_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = ComposeRuntime::new(dir.path());
        let path = runtime.write_compose(&test_plan()).unwrap();
        assert_eq!(path, dir.path().join("prism_v2").join("compose.json"));

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, render_compose(&test_plan()));
    }

    #[test]
    fn status_without_compose_file_is_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = ComposeRuntime::new(dir.path());
        let status = runtime.status("slamp").unwrap();
        assert!(!status.running);
        assert!(status.services.is_empty());
    }

    #[test]
    fn down_without_compose_file_is_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = ComposeRuntime::new(dir.path());
        let err = runtime.down(&test_plan()).unwrap_err();
        assert!(matches!(err, RuntimeError::NotRunning(_)));
    }
}
