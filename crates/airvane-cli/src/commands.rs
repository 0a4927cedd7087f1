//! Subcommand implementations.

use std::process::exit;

use log::{error, info, warn};
use tokio::sync::mpsc;

use airvane_core::event::StatusProvider;
use airvane_core::{Monitor, MonitorConfig, Shutdown, scheduler};

use crate::Overrides;

fn build_config(overrides: &Overrides) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    if let Some(path) = &overrides.hwmon_path {
        config.hwmon_path = path.clone();
    }
    if let Some(path) = &overrides.backlight_path {
        config.backlight_path = path.clone();
    }
    if let Some(path) = &overrides.battery_path {
        config.battery_path = path.clone();
    }
    if let Some(path) = &overrides.ac_path {
        config.ac_path = path.clone();
    }
    if let Some(path) = &overrides.cpu_path {
        config.cpu_path = path.clone();
    }
    config
}

fn build_monitor(config: MonitorConfig) -> Monitor {
    match Monitor::new(config) {
        Ok(monitor) => monitor,
        Err(err) => {
            // Missing hardware has no degraded mode; refuse to start.
            error!("startup failed: {err}");
            exit(1);
        }
    }
}

/// Run the control loop until Ctrl-C, then restore safe backlight
/// defaults.
pub fn run(overrides: &Overrides, tick_interval: Option<u64>) {
    let mut config = build_config(overrides);
    if let Some(secs) = tick_interval {
        config.tick_interval = secs.max(1);
    }

    let mut monitor = build_monitor(config);

    let shutdown = Shutdown::new();
    let trigger = shutdown.trigger_handle();
    if let Err(err) = ctrlc::set_handler(move || {
        let _ = trigger.send(true);
    }) {
        warn!("cannot install signal handler: {err}");
    }

    // The input-event decoder is a separate component; it feeds activity
    // events into this channel. Keep the sender alive so an unwired
    // channel does not read as end-of-events.
    let (_events_tx, events_rx) = mpsc::channel(16);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("cannot build runtime: {err}");
            exit(1);
        }
    };

    info!("airvane {} starting", airvane_core::VERSION);
    runtime.block_on(scheduler::run(&mut monitor, events_rx, &shutdown));
    info!("stopping");

    if let Err(err) = monitor.ensure_safe_defaults() {
        error!("restoring safe defaults failed: {err}");
    }
}

/// Print one status dump and exit.
pub fn status(overrides: &Overrides) {
    let monitor = build_monitor(build_config(overrides));
    print!("{}", monitor.status());
}
