use super::{load_engine, EXIT_FAILURE, EXIT_SUCCESS};
use std::path::Path;

pub fn run(fleet: Option<&Path>, config_dir: Option<&Path>, json_output: bool) -> Result<u8, String> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    let host = lamp_runtime::detect_host_class();
    checks.push(Check::info("host_class", &format!("Detected host class: {host}")));

    check_prereqs(&mut checks, &mut all_pass);

    match load_engine(fleet, config_dir) {
        Ok(engine) => {
            checks.push(Check::pass(
                "fleet",
                &format!(
                    "Fleet loaded ({} systems, {} configuration)",
                    engine.registry().len(),
                    engine.provider_name()
                ),
            ));
            let local: Vec<String> = engine
                .registry()
                .systems()
                .filter(|s| s.host_class == host)
                .map(|s| s.id.to_string())
                .collect();
            if local.is_empty() {
                checks.push(Check::warn(
                    "local_systems",
                    &format!("No systems target {host}"),
                ));
            } else {
                checks.push(Check::info(
                    "local_systems",
                    &format!("Systems targeting {host}: {}", local.join(", ")),
                ));
            }
        }
        Err(e) => {
            all_pass = false;
            checks.push(Check::fail("fleet", &format!("Fleet failed to load: {e}")));
        }
    }

    print_results(&checks, all_pass, json_output)
}

fn check_prereqs(checks: &mut Vec<Check>, all_pass: &mut bool) {
    let missing = lamp_runtime::check_compose_prereqs();
    if missing.is_empty() {
        checks.push(Check::pass(
            "runtime_prereqs",
            "Compose runtime prerequisites satisfied",
        ));
    } else {
        *all_pass = false;
        checks.push(Check::fail(
            "runtime_prereqs",
            &lamp_runtime::format_missing(&missing),
        ));
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, String> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
        );
    } else {
        println!("lamp doctor\n");
        for check in checks {
            let icon = match check.status {
                "pass" => "✓",
                "fail" => "✗",
                "warn" => "⚠",
                _ => "ℹ",
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: &'static str,
    status: &'static str,
    message: String,
}

impl Check {
    fn new(name: &'static str, status: &'static str, message: &str) -> Self {
        Self {
            name,
            status,
            message: message.to_owned(),
        }
    }

    fn pass(name: &'static str, message: &str) -> Self {
        Self::new(name, "pass", message)
    }

    fn fail(name: &'static str, message: &str) -> Self {
        Self::new(name, "fail", message)
    }

    fn warn(name: &'static str, message: &str) -> Self {
        Self::new(name, "warn", message)
    }

    fn info(name: &'static str, message: &str) -> Self {
        Self::new(name, "info", message)
    }
}
