//! Typed wrappers over the sysfs attribute groups the daemon touches:
//! CPU die temperature sensors, the SMC (fans, extra temp sensors, ambient
//! light, keyboard backlight), the display backlight, per-core cpufreq,
//! and the AC/battery power supplies.

pub mod backlight;
pub mod coretemp;
pub mod cpufreq;
pub mod power_supply;
pub mod smc;

pub use backlight::Led;
pub use coretemp::CoreTemp;
pub use cpufreq::CpuInfo;
pub use power_supply::PowerSupply;
pub use smc::Smc;
