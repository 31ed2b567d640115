use super::{json_pretty, target_host, EXIT_SUCCESS};
use lamp_core::Engine;
use lamp_schema::HostClass;

pub fn run(
    engine: &Engine,
    system_id: &str,
    host_class: Option<HostClass>,
    json: bool,
) -> Result<u8, String> {
    let host = target_host(engine, system_id, host_class)?;
    let plan = engine
        .plan_for_host(system_id, Some(host))
        .map_err(|e| e.to_string())?;
    let identity = plan.digest();

    if json {
        let payload = serde_json::json!({
            "plan": plan,
            "digest": identity.digest,
            "short_digest": identity.short_digest,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "plan for {} on {} ({})",
            plan.system, plan.host_class, identity.short_digest
        );
        for service in &plan.services {
            let devices: Vec<String> = service
                .devices
                .iter()
                .map(|d| {
                    if d.host == d.container {
                        d.host.clone()
                    } else {
                        format!("{}:{}", d.host, d.container)
                    }
                })
                .collect();
            println!("  {:<14} {}", service.name, service.image);
            if !devices.is_empty() {
                println!("  {:<14} devices: {}", "", devices.join(", "));
            }
            if service.privileged {
                println!("  {:<14} privileged", "");
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
