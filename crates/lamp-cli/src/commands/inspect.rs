use super::{json_pretty, EXIT_SUCCESS};
use lamp_core::Engine;

pub fn run(engine: &Engine, system_id: &str, json: bool) -> Result<u8, String> {
    let system = engine.lookup(system_id).map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(system)?);
    } else {
        let caps: Vec<&str> = system.capabilities.iter().map(|c| c.as_str()).collect();
        println!("system:       {}", system.id);
        println!(
            "description:  {}",
            system.description.as_deref().unwrap_or("(none)")
        );
        println!("host_class:   {}", system.host_class);
        println!("capabilities: {}", caps.join(", "));
        println!(
            "commit:       {}",
            system.commit.as_ref().map_or("(unpinned)", |c| c.as_str())
        );
    }
    Ok(EXIT_SUCCESS)
}
