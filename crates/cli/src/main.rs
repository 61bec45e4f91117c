use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use orbit_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};

mod commands;

/// Orbit - run commands across every module of a multi-module workspace
#[derive(Parser)]
#[command(name = "orbit")]
#[command(about = "Discover, order and run commands across workspace modules")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Module short names to skip, comma separated
    #[arg(
        long,
        env = "ORBIT_EXCLUDE_MODULES",
        value_delimiter = ',',
        global = true
    )]
    exclude: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List modules in the workspace
    List {
        /// Include excluded modules
        #[arg(long)]
        all: bool,
    },
    /// Show the module dependency graph
    Graph,
    /// Show execution plan for a task without running it
    Plan {
        /// Target in format "module:task" or just "task" for all modules
        target: String,
    },
    /// Run a configured task in every module
    Run {
        /// Target in format "module:task" or just "task" for all modules
        target: String,
    },
    /// Run an arbitrary command in every module
    Exec {
        program: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the JSON schema of .orbit/workspace.yml
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    // Initialize workspace manager with all business logic
    let manager = WorkspaceManager::new(WorkspaceManagerConfig {
        workspace_root: cli.workspace,
        exclude_modules: cli.exclude,
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize workspace: {}", e))?;

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::List { all } => commands::list::execute(&manager, all),
        Commands::Graph => commands::graph::execute(&manager),
        Commands::Plan { target } => commands::plan::execute(&manager, &target),
        Commands::Run { target } => commands::run::execute(&manager, &target),
        Commands::Exec { program, args } => commands::exec::execute(&manager, &program, &args),
        Commands::Schema => commands::schema::execute(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("orbit_core={level},orbit={level}"))
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
