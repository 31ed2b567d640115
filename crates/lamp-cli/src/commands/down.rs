use super::{json_pretty, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use lamp_core::Engine;
use lamp_runtime::select_runtime;
use std::path::Path;

pub fn run(
    engine: &Engine,
    system_id: &str,
    runtime_name: &str,
    work_dir: &Path,
    json: bool,
) -> Result<u8, String> {
    let runtime =
        select_runtime(runtime_name, work_dir).map_err(|e| format!("runtime error: {e}"))?;

    let pb = if json {
        None
    } else {
        Some(spinner(&format!("stopping {system_id}...")))
    };
    match engine.teardown(system_id, runtime.as_ref()) {
        Ok(()) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, &format!("{system_id} stopped"));
            }
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, &format!("failed to stop {system_id}"));
            }
            return Err(e.to_string());
        }
    }

    if json {
        let payload = serde_json::json!({
            "system": system_id,
            "status": "stopped",
        });
        println!("{}", json_pretty(&payload)?);
    }
    Ok(EXIT_SUCCESS)
}
