//! CPU frequency ceiling governor.
//!
//! The governor walks a ladder of hardware-supported frequencies one rung
//! per tick. A step down (throttle) fires when the ratcheted estimate sits
//! above `cpu_temp_hot` and the throttle cooldown has expired; a step up
//! (unthrottle) mirrors that against `cpu_temp_cold`. Each applied step
//! re-arms its own cooldown, so the ceiling cannot thrash even when the
//! estimate hovers at a threshold.

use crate::config::PowerModeConfig;

/// Cooldown countdowns, one per step direction. Durations in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuGovernor {
    throttle_remaining: u64,
    unthrottle_remaining: u64,
}

/// One tick's decision: which directions are armed.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub throttle: bool,
    pub unthrottle: bool,
}

impl CpuGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the estimate against the mode thresholds and advance both
    /// cooldowns by one tick. A direction is armed only when its cooldown
    /// already reached zero; a cooling-down direction just counts down.
    pub fn decide(&mut self, estimate: f64, mode: &PowerModeConfig, tick_interval: u64) -> Decision {
        let throttle = if self.throttle_remaining == 0 {
            estimate > mode.cpu_temp_hot
        } else {
            self.throttle_remaining = self.throttle_remaining.saturating_sub(tick_interval);
            false
        };

        let unthrottle = if self.unthrottle_remaining == 0 {
            estimate < mode.cpu_temp_cold
        } else {
            self.unthrottle_remaining = self.unthrottle_remaining.saturating_sub(tick_interval);
            false
        };

        Decision {
            throttle,
            unthrottle,
        }
    }

    /// Re-arm the cooldown of the direction that was actually applied.
    /// Called only when a new ceiling was written.
    pub fn applied(&mut self, decision: Decision, mode: &PowerModeConfig) {
        if decision.throttle {
            self.throttle_remaining = mode.cpu_throttle_delay;
        } else if decision.unthrottle {
            self.unthrottle_remaining = mode.cpu_unthrottle_delay;
        }
    }
}

/// First index in the ascending `ladder` holding a value `>= freq`
/// (`ladder.len()` when every rung is smaller).
pub fn ladder_index(ladder: &[u32], freq: u32) -> usize {
    ladder.partition_point(|&f| f < freq)
}

/// Pick the next ladder index.
///
/// The current index is first pulled down to the cap, then moved at most
/// one rung: down on throttle (never below 0), up on unthrottle (never
/// above the cap).
pub fn next_index(cur_ix: usize, cap_ix: usize, decision: Decision) -> usize {
    let mut new_ix = cur_ix.min(cap_ix);

    if decision.throttle {
        if new_ix == cur_ix && new_ix > 0 {
            new_ix -= 1;
        }
    } else if decision.unthrottle && new_ix < cap_ix {
        new_ix += 1;
    }

    new_ix
}
