//! Pure decision logic for the actuators. Every function here is
//! deterministic over its arguments; the monitor owns the sysfs side
//! effects.

pub mod brightness;
pub mod cpu;
pub mod fan;
pub mod idle;

pub use cpu::CpuGovernor;
pub use idle::IdleLevel;
