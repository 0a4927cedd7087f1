//! # airvane-core
//!
//! Thermal and power control core for MacBook-class laptops running
//! Linux: it turns a sliding history of temperature and battery-energy
//! samples into fan, CPU-frequency-ceiling, and backlight decisions,
//! with per-power-source policies and hysteresis everywhere a naive
//! controller would oscillate.
//!
//! ## Architecture
//!
//! Sensors → [`SampleHistory`] → sustained-window bounds → [`Ratchet`]
//! estimates → {fan curve, CPU governor} → actuator writes.
//!
//! The key debounce idea: a trailing-window *minimum* is the hot bound
//! (above a threshold only when the whole window was hot), a
//! trailing-window *maximum* is the cold bound. Ratcheted estimates move
//! only toward a bound the entire window supports, so one noisy sample
//! can never flip an actuator.
//!
//! User activity (lid, brightness keys, keyboard/mouse) enters through
//! [`Event`] and drives the idle state machine and the perceptual
//! brightness stepper, independent of the periodic tick. Everything is
//! owned by one [`Monitor`] and driven by the single-threaded
//! [`scheduler`] loop.

pub mod config;
pub mod control;
pub mod error;
pub mod event;
pub mod history;
pub mod hw;
pub mod monitor;
pub mod scheduler;
pub mod sysfs;

pub use config::{BrightnessCurve, MonitorConfig, PowerModeConfig};
pub use control::{CpuGovernor, IdleLevel};
pub use error::{Error, Result};
pub use event::{Event, EventHandler, StatusProvider};
pub use history::{Ratchet, SampleHistory};
pub use monitor::Monitor;
pub use scheduler::Shutdown;

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
