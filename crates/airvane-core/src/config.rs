//! Daemon configuration: sysfs locations, sampling cadence, and the two
//! per-power-source threshold bundles.
//!
//! Thresholds come in one bundle per power source (AC, battery) so that
//! plugging or unplugging the charger instantly switches the whole policy:
//! idle timeouts, backlight dim targets, the fan curve, and the CPU
//! throttle thresholds. Time quantities are whole seconds — the control
//! loop never runs faster than 1 Hz.

use std::path::PathBuf;

/// Parameters of the perceptual brightness step curve; the display and
/// keyboard backlights each get their own instance.
#[derive(Debug, Clone, Copy)]
pub struct BrightnessCurve {
    /// Perceptual exponent: raw level ≈ perceived^exponent.
    pub exponent: f64,
    /// Step size in perceptual space for a normal keypress.
    pub step: f64,
    /// Step size for the fine-grained (slow) variant.
    pub step_slow: f64,
}

/// Thresholds that depend on the active power source.
#[derive(Debug, Clone)]
pub struct PowerModeConfig {
    /// Seconds without input before the backlights dim.
    pub idle_timeout: u64,
    /// Display backlight level to dim to on idle.
    pub display_idle_level: u32,
    /// Keyboard backlight level to dim to on idle.
    pub keyboard_idle_level: u32,

    /// Trailing window (s) that must be entirely hot before the fan
    /// estimate may rise.
    pub fan_hot_window: u64,
    /// Trailing window (s) that must be entirely cool before the fan
    /// estimate may fall.
    pub fan_cold_window: u64,
    /// Fan curve: speed at or below `fan_temp_min`, in rpm.
    pub fan_speed_min: u32,
    /// Fan curve ceiling, in rpm.
    pub fan_speed_max: u32,
    /// Fan curve step, in rpm per temperature step.
    pub fan_speed_delta: u32,
    /// Temperature where the curve starts, in °C.
    pub fan_temp_min: f64,
    /// Width of one curve step, in °C.
    pub fan_temp_delta: f64,

    /// Trailing window (s) for the CPU hot bound.
    pub cpu_hot_window: u64,
    /// Trailing window (s) for the CPU cold bound.
    pub cpu_cold_window: u64,
    /// Estimate above this (°C) arms a throttle step.
    pub cpu_temp_hot: f64,
    /// Estimate below this (°C) arms an unthrottle step.
    pub cpu_temp_cold: f64,
    /// Seconds before another throttle step may fire.
    pub cpu_throttle_delay: u64,
    /// Seconds before another unthrottle step may fire.
    pub cpu_unthrottle_delay: u64,
    /// Frequency ceiling for this power source, in kHz.
    pub cpu_max_freq: u32,
}

/// Top-level monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Search base for hwmon devices (coretemp, applesmc).
    pub hwmon_path: PathBuf,
    /// Display backlight device directory.
    pub backlight_path: PathBuf,
    /// Battery power supply directory.
    pub battery_path: PathBuf,
    /// AC adapter power supply directory.
    pub ac_path: PathBuf,
    /// Base directory of per-CPU devices (`cpu0`, `cpu1`, …).
    pub cpu_path: PathBuf,

    /// Control loop period in seconds.
    pub tick_interval: u64,
    /// Total sample history span in seconds; bounds every trailing window.
    pub history_window: u64,
    /// Distance (s) between the two endpoints of the power estimate.
    pub power_interval: u64,
    /// Samples averaged at each endpoint of the power estimate.
    pub power_measurements: usize,

    pub display_brightness: BrightnessCurve,
    pub keyboard_brightness: BrightnessCurve,
    /// Display level the shutdown safety net will not leave the panel
    /// below.
    pub min_safe_display_level: u32,

    /// Below this battery percentage the powersave frequency cap kicks in.
    pub powersave_min_energy_percent: f64,
    /// Frequency cap (kHz) while in powersave.
    pub powersave_cpu_max_freq: u32,

    pub on_ac: PowerModeConfig,
    pub on_battery: PowerModeConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            hwmon_path: PathBuf::from("/sys/devices/platform"),
            backlight_path: PathBuf::from("/sys/class/backlight/intel_backlight"),
            battery_path: PathBuf::from("/sys/class/power_supply/BAT0"),
            ac_path: PathBuf::from("/sys/class/power_supply/ADP1"),
            cpu_path: PathBuf::from("/sys/bus/cpu/devices"),

            tick_interval: 1,
            history_window: 300,
            power_interval: 30,
            power_measurements: 3,

            display_brightness: BrightnessCurve {
                exponent: 4.0,
                step: 0.2,
                step_slow: 0.05,
            },
            keyboard_brightness: BrightnessCurve {
                exponent: 2.0,
                step: 1.0,
                step_slow: 0.25,
            },
            min_safe_display_level: 50,

            powersave_min_energy_percent: 10.0,
            powersave_cpu_max_freq: 1_000_000,

            on_ac: PowerModeConfig {
                idle_timeout: 120,
                display_idle_level: 100,
                keyboard_idle_level: 0,
                ..PowerModeConfig::base()
            },
            on_battery: PowerModeConfig {
                idle_timeout: 30,
                display_idle_level: 50,
                keyboard_idle_level: 0,
                cpu_max_freq: 1_600_000,
                ..PowerModeConfig::base()
            },
        }
    }
}

impl PowerModeConfig {
    /// Thresholds shared by both power sources; the `Default` impl of
    /// [`MonitorConfig`] overrides the fields that differ.
    fn base() -> Self {
        Self {
            idle_timeout: 120,
            display_idle_level: 100,
            keyboard_idle_level: 0,

            fan_hot_window: 40,
            fan_cold_window: 20,
            fan_speed_min: 2000,
            fan_speed_max: 6500,
            fan_speed_delta: 500,
            fan_temp_min: 40.0,
            fan_temp_delta: 5.0,

            cpu_hot_window: 10,
            cpu_cold_window: 20,
            cpu_temp_hot: 90.0,
            cpu_temp_cold: 70.0,
            cpu_throttle_delay: 10,
            cpu_unthrottle_delay: 10,
            cpu_max_freq: 2_000_000,
        }
    }

    /// Longest trailing window any controller needs; no control action is
    /// taken until the history covers it.
    pub fn longest_window(&self) -> u64 {
        self.fan_hot_window
            .max(self.fan_cold_window)
            .max(self.cpu_hot_window)
            .max(self.cpu_cold_window)
    }
}
