use super::{json_pretty, EXIT_SUCCESS};
use lamp_core::Engine;

pub fn run(engine: &Engine, system_id: &str, json: bool) -> Result<u8, String> {
    let descriptor = engine.resolve(system_id).map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&descriptor)?);
    } else {
        let caps: Vec<&str> = descriptor
            .capabilities()
            .iter()
            .map(|c| c.as_str())
            .collect();
        println!("# system:       {}", descriptor.system());
        println!("# host_class:   {}", descriptor.host_class());
        println!("# capabilities: {}", caps.join(", "));
        if let Some(commit) = descriptor.commit() {
            println!("# commit:       {commit}");
        }
        let config = toml::to_string(descriptor.config())
            .map_err(|e| format!("failed to render configuration: {e}"))?;
        print!("{config}");
    }
    Ok(EXIT_SUCCESS)
}
