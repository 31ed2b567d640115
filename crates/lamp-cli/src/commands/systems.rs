use super::{json_pretty, EXIT_SUCCESS};
use lamp_core::Engine;

pub fn run(engine: &Engine, json: bool) -> Result<u8, String> {
    let systems: Vec<_> = engine.registry().systems().collect();
    if json {
        println!("{}", json_pretty(&systems)?);
    } else if systems.is_empty() {
        println!("no systems declared");
    } else {
        println!("{:<14} {:<12} CAPABILITIES", "SYSTEM", "HOST");
        for system in systems {
            let caps: Vec<&str> = system.capabilities.iter().map(|c| c.as_str()).collect();
            println!(
                "{:<14} {:<12} {}",
                system.id,
                system.host_class,
                caps.join(",")
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
