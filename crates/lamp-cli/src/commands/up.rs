use super::{json_pretty, spin_fail, spin_ok, spinner, target_host, EXIT_SUCCESS};
use lamp_core::Engine;
use lamp_runtime::select_runtime;
use lamp_schema::HostClass;
use std::path::Path;

pub fn run(
    engine: &Engine,
    system_id: &str,
    host_class: Option<HostClass>,
    runtime_name: &str,
    work_dir: &Path,
    json: bool,
) -> Result<u8, String> {
    let host = target_host(engine, system_id, host_class)?;
    let runtime =
        select_runtime(runtime_name, work_dir).map_err(|e| format!("runtime error: {e}"))?;

    let pb = if json {
        None
    } else {
        Some(spinner(&format!("starting {system_id} on {host}...")))
    };

    let running = match engine.deploy(system_id, Some(host), runtime.as_ref()) {
        Ok(r) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, &format!("{system_id} is up"));
            }
            r
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, &format!("{system_id} failed to start"));
            }
            return Err(e.to_string());
        }
    };

    if json {
        println!("{}", json_pretty(&running)?);
    } else {
        println!("project:  {}", running.project);
        println!("services: {}", running.services.join(", "));
    }
    Ok(EXIT_SUCCESS)
}
