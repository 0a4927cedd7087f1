//! Sample history: fixed-capacity ring buffers of temperature and battery
//! energy, one entry per control tick.
//!
//! The history answers one question for the controllers: has the
//! temperature been high (or low) for the *entire* trailing window, not
//! just in a single noisy sample? [`SampleHistory::window_min`] returns
//! the coldest reading inside a trailing window — if even that exceeds a
//! threshold, the window was continuously hot. [`SampleHistory::window_max`]
//! is the mirror image for continuously cold. A [`Ratchet`] combines the
//! two into an estimate that only moves when a whole window agrees.

/// Ring-buffered temperature and energy samples.
pub struct SampleHistory {
    temperature: Vec<f64>,
    energy: Vec<f64>,
    /// Monotonic sample counter; the latest sample lives in slot
    /// `counter % capacity`.
    counter: u64,
    tick_interval: u64,
}

impl SampleHistory {
    /// Capacity is `ceil(history_window / tick_interval)` slots — enough
    /// to span the configured history window.
    pub fn new(history_window: u64, tick_interval: u64) -> Self {
        let capacity = history_window.div_ceil(tick_interval).max(1) as usize;
        Self {
            temperature: vec![0.0; capacity],
            energy: vec![0.0; capacity],
            counter: 0,
            tick_interval,
        }
    }

    pub fn capacity(&self) -> usize {
        self.temperature.len()
    }

    /// Number of samples recorded so far (not capped at capacity).
    pub fn count(&self) -> u64 {
        self.counter
    }

    /// Append one sample, overwriting the oldest slot once full.
    pub fn push(&mut self, temperature: f64, energy: f64) {
        self.counter += 1;
        let slot = (self.counter % self.capacity() as u64) as usize;
        self.temperature[slot] = temperature;
        self.energy[slot] = energy;
    }

    /// Whether enough history exists to evaluate a trailing window of
    /// `window` seconds.
    pub fn covers(&self, window: u64) -> bool {
        window / self.tick_interval < self.counter
    }

    /// Temperature recorded `steps_back` ticks ago (0 = latest). Caller
    /// must not look back further than the history covers.
    fn temperature_back(&self, steps_back: u64) -> f64 {
        let slot = ((self.counter - steps_back) % self.capacity() as u64) as usize;
        self.temperature[slot]
    }

    fn energy_back(&self, steps_back: u64) -> f64 {
        let slot = ((self.counter - steps_back) % self.capacity() as u64) as usize;
        self.energy[slot]
    }

    /// Minimum temperature over samples no older than `window` seconds.
    ///
    /// This is the *hot* bound: it only exceeds a threshold if every
    /// sample in the window does — a one-sample spike cannot move it.
    pub fn window_min(&self, window: u64) -> f64 {
        let mut cur = 1000.0_f64;
        let mut steps = 0;
        while steps * self.tick_interval <= window && steps < self.counter.min(self.capacity() as u64) {
            cur = cur.min(self.temperature_back(steps));
            steps += 1;
        }
        cur
    }

    /// Maximum temperature over samples no older than `window` seconds.
    ///
    /// The *cold* bound: below a threshold only if every sample is.
    pub fn window_max(&self, window: u64) -> f64 {
        let mut cur = -300.0_f64;
        let mut steps = 0;
        while steps * self.tick_interval <= window && steps < self.counter.min(self.capacity() as u64) {
            cur = cur.max(self.temperature_back(steps));
            steps += 1;
        }
        cur
    }

    /// Average battery draw in watts over the trailing `power_interval`.
    ///
    /// Sums `power_measurements` energy samples at "now" and the same
    /// number taken `power_interval` seconds earlier, and converts the Wh
    /// difference over the interval into watts. Averaging both endpoints
    /// smooths the battery controller's quantization steps. Returns 0
    /// until enough history exists.
    pub fn estimate_power(&self, power_interval: u64, power_measurements: usize) -> f64 {
        let delta = power_interval / self.tick_interval;

        if self.counter <= delta + power_measurements as u64 {
            return 0.0;
        }

        let mut old = 0.0;
        let mut now = 0.0;
        for i in 0..power_measurements as u64 {
            now += self.energy_back(i);
            old += self.energy_back(delta + i);
        }

        3600.0 * (old - now) / (power_measurements as f64 * power_interval as f64)
    }
}

/// An estimate that only moves toward a bound the whole window supports.
///
/// `update` takes the hot bound (window minimum) and cold bound (window
/// maximum) and moves the estimate up only when even the coldest sample
/// of the hot window sits above it, down only when even the hottest
/// sample of the cold window sits below it. Anything in between leaves
/// the estimate where it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ratchet {
    estimate: Option<f64>,
}

impl Ratchet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the bounds for this tick and return the updated estimate.
    /// The first call seeds the estimate at the midpoint of the bounds.
    pub fn update(&mut self, hot_bound: f64, cold_bound: f64) -> f64 {
        let estimate = match self.estimate {
            None => (hot_bound + cold_bound) / 2.0,
            Some(est) if hot_bound > est => hot_bound,
            Some(est) if cold_bound < est => cold_bound,
            Some(est) => est,
        };
        self.estimate = Some(estimate);
        estimate
    }

    pub fn estimate(&self) -> Option<f64> {
        self.estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(history_window: u64, tick: u64, temps: &[f64]) -> SampleHistory {
        let mut h = SampleHistory::new(history_window, tick);
        for &t in temps {
            h.push(t, 0.0);
        }
        h
    }

    // -----------------------------------------------------------------------
    // Ring buffer tests
    // -----------------------------------------------------------------------

    #[test]
    fn capacity_rounds_up() {
        assert_eq!(SampleHistory::new(300, 1).capacity(), 300);
        assert_eq!(SampleHistory::new(300, 7).capacity(), 43);
    }

    #[test]
    fn window_ignores_overwritten_samples() {
        // Capacity 5; push 8 samples. The first three (900.0) are
        // overwritten and must not appear in any window query.
        let mut h = SampleHistory::new(5, 1);
        for _ in 0..3 {
            h.push(900.0, 0.0);
        }
        for _ in 0..5 {
            h.push(50.0, 0.0);
        }
        assert_eq!(h.window_max(1000), 50.0);
        assert_eq!(h.window_min(1000), 50.0);
    }

    #[test]
    fn window_consistent_after_wraparound() {
        let mut h = SampleHistory::new(4, 1);
        for t in 0..100 {
            h.push(t as f64, 0.0);
        }
        // Most recent 4 samples are 96..=99.
        assert_eq!(h.window_max(1000), 99.0);
        assert_eq!(h.window_min(1000), 96.0);
        // A 2-second window sees ages 0, 1, 2 → 97..=99.
        assert_eq!(h.window_min(2), 97.0);
    }

    #[test]
    fn covers_requires_full_window() {
        let mut h = SampleHistory::new(300, 1);
        for _ in 0..40 {
            h.push(50.0, 0.0);
        }
        assert!(h.covers(39));
        assert!(!h.covers(40));
        h.push(50.0, 0.0);
        assert!(h.covers(40));
    }

    // -----------------------------------------------------------------------
    // Sustained-window tests
    // -----------------------------------------------------------------------

    #[test]
    fn one_sample_spike_does_not_raise_hot_bound() {
        // 39 samples at 60 °C, one spike at 95 °C: the window minimum
        // stays 60, so a threshold at 90 is not "sustained".
        let mut temps = vec![60.0; 39];
        temps.push(95.0);
        let h = filled(300, 1, &temps);
        assert_eq!(h.window_min(30), 60.0);
    }

    #[test]
    fn fully_hot_window_raises_hot_bound() {
        let h = filled(300, 1, &vec![95.0; 41]);
        assert_eq!(h.window_min(40), 95.0);
    }

    #[test]
    fn window_length_counts_inclusive_ages() {
        // tick 1 s, window 3 s → ages 0,1,2,3 are considered.
        let h = filled(300, 1, &[10.0, 99.0, 99.0, 99.0, 99.0]);
        assert_eq!(h.window_min(3), 99.0);
        assert_eq!(h.window_min(4), 10.0);
    }

    // -----------------------------------------------------------------------
    // Ratchet tests
    // -----------------------------------------------------------------------

    #[test]
    fn ratchet_seeds_at_midpoint() {
        let mut r = Ratchet::new();
        assert_eq!(r.update(80.0, 90.0), 85.0);
    }

    #[test]
    fn ratchet_moves_up_only_when_hot_bound_exceeds() {
        let mut r = Ratchet::new();
        r.update(60.0, 70.0); // seed 65
        assert_eq!(r.update(80.0, 85.0), 80.0); // sustained hot → up
        assert_eq!(r.update(75.0, 85.0), 80.0); // neither bound wins → hold
        assert_eq!(r.update(60.0, 72.0), 72.0); // sustained cold → down
    }

    #[test]
    fn ratchet_holds_between_bounds() {
        let mut r = Ratchet::new();
        r.update(50.0, 50.0);
        for _ in 0..10 {
            assert_eq!(r.update(45.0, 55.0), 50.0);
        }
    }

    // -----------------------------------------------------------------------
    // Power estimator tests
    // -----------------------------------------------------------------------

    #[test]
    fn power_estimate_zero_without_history() {
        let mut h = SampleHistory::new(300, 1);
        // Needs more than 30 + 3 samples.
        for i in 0..33 {
            h.push(50.0, 50.0 - i as f64 * 0.001);
        }
        assert_eq!(h.estimate_power(30, 3), 0.0);
    }

    #[test]
    fn power_estimate_converges_to_drain_rate() {
        // Constant drain of 2.5e-3 Wh per 1 s tick = 9 W.
        let mut h = SampleHistory::new(300, 1);
        for i in 0..120 {
            h.push(50.0, 50.0 - i as f64 * 2.5e-3);
        }
        let watts = h.estimate_power(30, 3);
        assert!((watts - 9.0).abs() < 1e-9, "estimate was {watts}");
    }

    #[test]
    fn power_estimate_survives_wraparound() {
        let mut h = SampleHistory::new(60, 1);
        for i in 0..500 {
            h.push(50.0, 500.0 - i as f64 * 1e-3); // 3.6 W drain
        }
        let watts = h.estimate_power(30, 3);
        assert!((watts - 3.6).abs() < 1e-9, "estimate was {watts}");
    }
}
