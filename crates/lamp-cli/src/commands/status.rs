use super::{colorize_status, json_pretty, EXIT_SUCCESS};
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
    let status = engine
        .status(system_id, runtime.as_ref())
        .map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&status)?);
    } else {
        let state = if status.running { "running" } else { "stopped" };
        println!("{}: {}", status.system, colorize_status(state));
        for service in &status.services {
            println!("  {service}");
        }
    }
    Ok(EXIT_SUCCESS)
}
