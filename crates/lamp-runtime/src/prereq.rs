use std::fmt;
use std::process::Command;

/// A missing prerequisite with actionable install instructions.
#[derive(Debug)]
pub struct MissingPrereq {
    pub name: &'static str,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn compose_plugin_works() -> bool {
    Command::new("docker")
        .args(["compose", "version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check prerequisites for the compose runtime.
/// Returns a list of missing items. Empty list means all prerequisites are met.
pub fn check_compose_prereqs() -> Vec<MissingPrereq> {
    let mut missing = Vec::new();

    if !command_exists("docker") {
        missing.push(MissingPrereq {
            name: "docker",
            purpose: "running LAMP service containers",
            install_hint: "apt install docker.io | dnf install moby-engine | https://docs.docker.com/engine/install/",
        });
    } else if !compose_plugin_works() {
        missing.push(MissingPrereq {
            name: "docker compose",
            purpose: "starting a system's services as one project",
            install_hint: "apt install docker-compose-plugin | dnf install docker-compose-plugin",
        });
    }

    missing
}

/// Format a list of missing prerequisites into a user-friendly error message.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing prerequisites:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\nlamp needs these tools to deploy systems with the compose runtime.");
    msg
}
