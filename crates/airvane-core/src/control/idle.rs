//! Idle severity levels for backlight suppression.
//!
//! Severity only ever rises through events and timeouts (`Active` →
//! `Dimmed` → `LidClosed`); the single way back down is a full reset to
//! `Active` when the user shows up again. The dim targets for a level
//! come from the active power mode; a closed lid always targets zero.

use crate::config::PowerModeConfig;

/// Ordered idle severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IdleLevel {
    /// User present; backlights untouched.
    Active,
    /// Idle timeout fired; backlights dimmed to the mode's idle levels.
    Dimmed,
    /// Lid closed; both backlights off.
    LidClosed,
}

/// Display and keyboard backlight targets when entering `level`. Only
/// `Dimmed` keeps any light on; everything else targets darkness.
pub fn dim_targets(level: IdleLevel, mode: &PowerModeConfig) -> (u32, u32) {
    match level {
        IdleLevel::Dimmed => (mode.display_idle_level, mode.keyboard_idle_level),
        _ => (0, 0),
    }
}
