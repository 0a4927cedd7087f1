//! CLI for airvane — thermal and power control for MacBook-class laptops.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airvane")]
#[command(about = "airvane — fan, CPU frequency ceiling, and backlight control daemon")]
#[command(version = airvane_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Sysfs location overrides shared by all subcommands. Defaults come from
/// the library configuration.
#[derive(Args)]
struct Overrides {
    /// Search base for hwmon devices (coretemp, applesmc)
    #[arg(long)]
    hwmon_path: Option<PathBuf>,

    /// Display backlight device directory
    #[arg(long)]
    backlight_path: Option<PathBuf>,

    /// Battery power supply directory
    #[arg(long)]
    battery_path: Option<PathBuf>,

    /// AC adapter power supply directory
    #[arg(long)]
    ac_path: Option<PathBuf>,

    /// Base directory of per-CPU devices
    #[arg(long)]
    cpu_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop in the foreground (Ctrl-C to stop)
    Run {
        #[command(flatten)]
        overrides: Overrides,

        /// Control loop period in seconds
        #[arg(long)]
        tick_interval: Option<u64>,
    },

    /// Print a one-shot sensor/actuator status dump
    Status {
        #[command(flatten)]
        overrides: Overrides,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            overrides,
            tick_interval,
        } => commands::run(&overrides, tick_interval),
        Commands::Status { overrides } => commands::status(&overrides),
    }
}
