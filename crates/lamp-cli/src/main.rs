mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{exit_code_for, expand_tilde, load_engine, EXIT_FAILURE};
use lamp_schema::HostClass;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "lamp",
    version,
    about = "Fleet configuration and deployment resolver for LAMP hardware systems"
)]
struct Cli {
    /// Fleet declaration TOML file (defaults to the built-in fleet).
    #[arg(long, global = true)]
    fleet: Option<PathBuf>,

    /// Read configuration layers from a checked-out config tree instead of the fleet file.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List registered systems.
    Systems,
    /// Show one system's declaration.
    Inspect {
        /// System identifier.
        system: String,
    },
    /// Print a system's merged configuration.
    Resolve {
        /// System identifier.
        system: String,
    },
    /// Resolve, plan and validate a system without starting anything.
    Plan {
        /// System identifier.
        system: String,
        /// Target host class (defaults to the system's declared host class).
        #[arg(long)]
        host_class: Option<HostClass>,
    },
    /// Plan and validate every system.
    Check {
        /// Validate every system against this host class instead of its own.
        #[arg(long)]
        host_class: Option<HostClass>,
    },
    /// Validate a system's plan, then start its services.
    Up {
        /// System identifier.
        system: String,
        /// Target host class (defaults to the system's declared host class).
        #[arg(long)]
        host_class: Option<HostClass>,
        /// Container runtime.
        #[arg(long, default_value = "compose", value_parser = ["compose", "mock"])]
        runtime: String,
        /// Directory compose files are written to.
        #[arg(long, default_value = "~/.local/state/lamp")]
        work_dir: PathBuf,
    },
    /// Stop a system's services.
    Down {
        /// System identifier.
        system: String,
        /// Container runtime.
        #[arg(long, default_value = "compose", value_parser = ["compose", "mock"])]
        runtime: String,
        /// Directory compose files are written to.
        #[arg(long, default_value = "~/.local/state/lamp")]
        work_dir: PathBuf,
    },
    /// Show whether a system's services are running.
    Status {
        /// System identifier.
        system: String,
        /// Container runtime.
        #[arg(long, default_value = "compose", value_parser = ["compose", "mock"])]
        runtime: String,
        /// Directory compose files are written to.
        #[arg(long, default_value = "~/.local/state/lamp")]
        work_dir: PathBuf,
    },
    /// Report the detected host class and runtime prerequisites.
    Doctor,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LAMP_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let fleet = cli.fleet.as_deref();
    let config_dir = cli.config_dir.as_deref();

    let needs_compose = matches!(
        &cli.command,
        Commands::Up { runtime, .. } | Commands::Down { runtime, .. } if runtime == "compose"
    );
    if needs_compose && std::env::var("LAMP_SKIP_PREREQS").as_deref() != Ok("1") {
        let missing = lamp_runtime::check_compose_prereqs();
        if !missing.is_empty() {
            eprintln!("error: {}", lamp_runtime::format_missing(&missing));
            return ExitCode::from(EXIT_FAILURE);
        }
    }

    let result = match cli.command {
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
        Commands::Doctor => commands::doctor::run(fleet, config_dir, json_output),
        command => load_engine(fleet, config_dir).and_then(|engine| match command {
            Commands::Systems => commands::systems::run(&engine, json_output),
            Commands::Inspect { system } => commands::inspect::run(&engine, &system, json_output),
            Commands::Resolve { system } => commands::resolve::run(&engine, &system, json_output),
            Commands::Plan { system, host_class } => {
                commands::plan::run(&engine, &system, host_class, json_output)
            }
            Commands::Check { host_class } => {
                commands::check::run(&engine, host_class, json_output)
            }
            Commands::Up {
                system,
                host_class,
                runtime,
                work_dir,
            } => commands::up::run(
                &engine,
                &system,
                host_class,
                &runtime,
                &expand_tilde(&work_dir),
                json_output,
            ),
            Commands::Down {
                system,
                runtime,
                work_dir,
            } => commands::down::run(
                &engine,
                &system,
                &runtime,
                &expand_tilde(&work_dir),
                json_output,
            ),
            Commands::Status {
                system,
                runtime,
                work_dir,
            } => commands::status::run(
                &engine,
                &system,
                &runtime,
                &expand_tilde(&work_dir),
                json_output,
            ),
            Commands::Doctor | Commands::Completions { .. } | Commands::ManPages { .. } => {
                unreachable!("handled before the engine is loaded")
            }
        }),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}
