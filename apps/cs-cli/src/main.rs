use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use cs_cli::{CliResult, DriveConfig, load_config, run_left_gear};

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(about = "ctrlsys CLI - run the drivetrain autonomous routine in simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the left-gear routine against the simulated drivetrain
    Run {
        /// Path to a drivetrain YAML config (defaults are used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Tick budget before giving up
        #[arg(long, default_value_t = 4000)]
        max_ticks: u32,
    },
    /// Print the default configuration as YAML
    DefaultConfig,
}

fn main() -> CliResult<()> {
    // Initialize tracing (honours RUST_LOG)
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, max_ticks } => cmd_run(config.as_deref(), max_ticks),
        Commands::DefaultConfig => cmd_default_config(),
    }
}

fn cmd_run(config_path: Option<&Path>, max_ticks: u32) -> CliResult<()> {
    let config = match config_path {
        Some(path) => {
            println!("Loading config: {}", path.display());
            load_config(path)?
        }
        None => DriveConfig::default(),
    };

    println!("Running left-gear routine (period {} s)", config.period);
    let summary = run_left_gear(&config, max_ticks)?;

    println!("✓ Routine complete in {} ticks", summary.ticks);
    println!(
        "  elapsed:  {:.3} s",
        f64::from(summary.ticks) * config.period
    );
    println!("  states:   {}", summary.visited.join(" -> "));
    println!("  distance: {:.2} in", summary.distance);
    println!("  heading:  {:.2} deg", summary.heading);
    println!("  final:    {}", summary.trace);
    Ok(())
}

fn cmd_default_config() -> CliResult<()> {
    print!("{}", DriveConfig::default().to_yaml()?);
    Ok(())
}
