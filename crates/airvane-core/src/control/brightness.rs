//! Perceptual backlight stepping.
//!
//! Raw backlight levels are perceived roughly as a power curve: the jump
//! from 10 to 20 looks huge, the one from 900 to 910 is invisible. Steps
//! are therefore taken in perceptual space (`level^(1/exponent)`) and
//! mapped back, which makes every keypress feel the same size across the
//! whole range.

use crate::config::BrightnessCurve;

/// Compute the next backlight level.
///
/// `up` picks the direction, `slow` the fine-grained step size. The result
/// always differs from `cur` by at least one unit (rounding at the bottom
/// of the curve would otherwise swallow small steps) and stays inside
/// `[0, max]` — except that at the range ends the clamp wins and the
/// result may equal `cur`; callers skip the write in that case.
pub fn step(curve: &BrightnessCurve, cur: u32, max: u32, up: bool, slow: bool) -> u32 {
    let delta = if slow { curve.step_slow } else { curve.step };

    let mut norm = (cur as f64).powf(1.0 / curve.exponent);
    norm += if up { delta } else { -delta };
    norm = norm.max(0.0);

    let mut target = norm.powf(curve.exponent).round() as i64;

    if target == cur as i64 {
        target += if up { 1 } else { -1 };
    }

    target.clamp(0, max as i64) as u32
}
