//! The monitor: single owner of every sensor, actuator, and piece of
//! control state.
//!
//! Two entry points mutate it. The periodic [`Monitor::tick`] samples the
//! sensors, advances the sustained-window ratchets, and drives the fan
//! and the CPU frequency ceiling. [`Monitor::handle_event`] reacts to
//! user activity: lid transitions, idle wake-up, and backlight keys. Both
//! run on the same thread, so no decision ever observes another half
//! applied.
//!
//! Sensor failures during a tick are logged and the tick abandoned; the
//! next tick retries from scratch. Missing hardware at construction time
//! is fatal.

use std::fmt::Write as _;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::{MonitorConfig, PowerModeConfig};
use crate::control::{CpuGovernor, IdleLevel, brightness, cpu, fan, idle};
use crate::error::Result;
use crate::event::{Event, EventHandler, StatusProvider};
use crate::history::{Ratchet, SampleHistory};
use crate::hw::{CoreTemp, CpuInfo, Led, PowerSupply, Smc};

pub struct Monitor {
    config: MonitorConfig,

    coretemp: CoreTemp,
    smc: Smc,
    cpuinfo: CpuInfo,
    backlight: Led,
    ac: PowerSupply,
    battery: PowerSupply,

    on_ac: bool,
    history: SampleHistory,
    fan_ratchet: Ratchet,
    cpu_ratchet: Ratchet,
    governor: CpuGovernor,

    idle_level: IdleLevel,
    saved_display: u32,
    saved_keyboard: u32,

    /// Backlight levels found at startup; the shutdown safety net never
    /// leaves the machine darker than these.
    original_display: u32,
    original_keyboard: u32,
}

impl Monitor {
    /// Discover all hardware and capture the initial actuator state.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        let coretemp = CoreTemp::discover(&config.hwmon_path)?;
        let smc = Smc::discover(&config.hwmon_path)?;
        let cpuinfo = CpuInfo::enumerate(&config.cpu_path);
        let backlight = Led::new(&config.backlight_path);
        let ac = PowerSupply::new(&config.ac_path);
        let battery = PowerSupply::new(&config.battery_path);

        info!("coretemp path: {}", coretemp.path().display());
        info!("applesmc path: {}", smc.path().display());
        if !cpuinfo.configurable() {
            info!("no frequency ladder exposed; CPU governor disabled");
        }

        let original_display = backlight.brightness()?;
        let original_keyboard = smc.keyboard_backlight().brightness()?;
        let on_ac = ac.online()?;
        let history = SampleHistory::new(config.history_window, config.tick_interval);

        Ok(Self {
            config,
            coretemp,
            smc,
            cpuinfo,
            backlight,
            ac,
            battery,
            on_ac,
            history,
            fan_ratchet: Ratchet::new(),
            cpu_ratchet: Ratchet::new(),
            governor: CpuGovernor::new(),
            idle_level: IdleLevel::Active,
            saved_display: 0,
            saved_keyboard: 0,
            original_display,
            original_keyboard,
        })
    }

    /// The threshold bundle of the current power source.
    pub fn active_mode(&self) -> &PowerModeConfig {
        if self.on_ac {
            &self.config.on_ac
        } else {
            &self.config.on_battery
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn idle_level(&self) -> IdleLevel {
        self.idle_level
    }

    /// Idle timeout of the *current* power source, for (re)starting the
    /// idle timer.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.active_mode().idle_timeout)
    }

    /// Trailing-average battery draw in watts (0 until enough history).
    pub fn estimate_power(&self) -> f64 {
        self.history
            .estimate_power(self.config.power_interval, self.config.power_measurements)
    }

    // -----------------------------------------------------------------------
    // Periodic check
    // -----------------------------------------------------------------------

    /// One control period: sample, ratchet, actuate. Any sensor or
    /// actuator failure abandons the tick; the next one retries.
    pub fn tick(&mut self) {
        if let Err(err) = self.update().and_then(|()| self.run_checks()) {
            warn!("{err}");
        }
    }

    /// Refresh the power source flag and append one sample. Both sensors
    /// are read before anything is stored, so a failing read leaves the
    /// history untouched.
    fn update(&mut self) -> Result<()> {
        self.on_ac = self.ac.online()?;
        let temperature = self.coretemp.max_input()?;
        let energy = self.battery.energy_now()?;
        self.history.push(temperature, energy);
        Ok(())
    }

    fn run_checks(&mut self) -> Result<()> {
        let mode = self.active_mode().clone();

        // No control action until the history spans the longest window a
        // controller will ask about.
        if !self.history.covers(mode.longest_window()) {
            return Ok(());
        }

        let fan_hot = self.history.window_min(mode.fan_hot_window);
        let fan_cold = self.history.window_max(mode.fan_cold_window);
        let cpu_hot = self.history.window_min(mode.cpu_hot_window);
        let cpu_cold = self.history.window_max(mode.cpu_cold_window);

        debug!("fan_hot={fan_hot}, fan_cold={fan_cold}, cpu_hot={cpu_hot}, cpu_cold={cpu_cold}");

        let fan_estimate = self.fan_ratchet.update(fan_hot, fan_cold);
        let cpu_estimate = self.cpu_ratchet.update(cpu_hot, cpu_cold);

        self.check_fan(fan_estimate, &mode)?;
        if self.cpuinfo.configurable() {
            self.check_cpu(cpu_estimate, &mode)?;
        }
        Ok(())
    }

    fn check_fan(&self, estimate: f64, mode: &PowerModeConfig) -> Result<()> {
        let speed = fan::fan_speed(mode, estimate);
        debug!("fan_estimate={estimate}, fan_speed={speed}");
        self.smc.set_fan_speed(speed)
    }

    /// The ceiling the governor may unthrottle up to: the mode's maximum,
    /// or the powersave cap when the battery is low and mains power is
    /// out.
    fn cpu_cap(&self, mode: &PowerModeConfig) -> Result<u32> {
        if !self.on_ac && self.battery.energy_percent()? < self.config.powersave_min_energy_percent
        {
            return Ok(self.config.powersave_cpu_max_freq);
        }
        Ok(mode.cpu_max_freq)
    }

    fn check_cpu(&mut self, estimate: f64, mode: &PowerModeConfig) -> Result<()> {
        let decision = self.governor.decide(estimate, mode, self.config.tick_interval);

        let ladder = self.cpuinfo.available_frequencies()?;
        if ladder.is_empty() {
            return Ok(());
        }

        let current = self.cpuinfo.scaling_max_freq()?;
        let cur_ix = cpu::ladder_index(&ladder, current);
        let cap_ix = cpu::ladder_index(&ladder, self.cpu_cap(mode)?).min(ladder.len() - 1);
        let new_ix = cpu::next_index(cur_ix, cap_ix, decision);

        debug!(
            "cpu_estimate={estimate}, throttle={}, unthrottle={}, ix: {cur_ix} -> {new_ix}",
            decision.throttle, decision.unthrottle
        );

        if new_ix != cur_ix {
            self.cpuinfo.set_scaling_max_freq(ladder[new_ix])?;
            self.governor.applied(decision, mode);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Events and idle
    // -----------------------------------------------------------------------

    /// React to one activity event. Lid events force their idle
    /// transition; any other event wakes the machine from (non-lid) idle
    /// before its own effect is applied.
    pub fn handle_event(&mut self, event: Event) {
        let result = match event {
            Event::LidClosed => {
                info!("lid closed");
                self.enter_idle(IdleLevel::LidClosed)
            }
            Event::LidOpened => {
                info!("lid opened");
                self.leave_idle()
            }
            _ if self.idle_level < IdleLevel::LidClosed => self.leave_idle(),
            _ => Ok(()),
        };
        if let Err(err) = result {
            warn!("{err}");
        }

        let result = match event {
            Event::DisplayBrightness { up, slow } => self.set_display_brightness(up, slow),
            Event::KeyboardBrightness { up, slow } => self.set_keyboard_brightness(up, slow),
            _ => Ok(()),
        };
        if let Err(err) = result {
            warn!("{err}");
        }
    }

    /// Idle timer expired without activity.
    pub fn on_idle_timeout(&mut self) {
        info!("idle");
        if let Err(err) = self.enter_idle(IdleLevel::Dimmed) {
            warn!("{err}");
        }
    }

    /// Raise the idle level. Brightness is snapshotted on the first
    /// transition out of `Active` only, so a later lid-close does not
    /// overwrite the saved values with the dimmed ones. Dim targets are
    /// written only when they lower the light — idle never brightens —
    /// but the level advances regardless.
    fn enter_idle(&mut self, level: IdleLevel) -> Result<()> {
        debug!("enter_idle({level:?})");

        if level <= self.idle_level {
            return Ok(());
        }

        let display_current = self.backlight.actual_brightness()?;
        let keyboard_current = self.smc.keyboard_backlight().brightness()?;

        if self.idle_level == IdleLevel::Active {
            self.saved_display = display_current;
            self.saved_keyboard = keyboard_current;
        }

        let (display_target, keyboard_target) = idle::dim_targets(level, self.active_mode());

        if display_target < display_current {
            self.backlight.set_brightness(display_target)?;
        }
        if keyboard_target < keyboard_current {
            self.smc.keyboard_backlight().set_brightness(keyboard_target)?;
        }

        self.idle_level = level;
        Ok(())
    }

    /// Restore the backlights saved at the first idle transition and
    /// return to `Active`.
    fn leave_idle(&mut self) -> Result<()> {
        if self.idle_level > IdleLevel::Active {
            debug!(
                "leave_idle() [{:?}, {}, {}]",
                self.idle_level, self.saved_display, self.saved_keyboard
            );
            self.backlight.set_brightness(self.saved_display)?;
            self.smc
                .keyboard_backlight()
                .set_brightness(self.saved_keyboard)?;
            self.idle_level = IdleLevel::Active;
        }
        Ok(())
    }

    fn set_display_brightness(&mut self, up: bool, slow: bool) -> Result<()> {
        let max = self.backlight.max_brightness()?;
        let cur = self.backlight.actual_brightness()?;
        let target = brightness::step(&self.config.display_brightness, cur, max, up, slow);

        debug!("display backlight {cur} -> {target}");

        if target != cur {
            self.backlight.set_brightness(target)?;
        }
        Ok(())
    }

    fn set_keyboard_brightness(&mut self, up: bool, slow: bool) -> Result<()> {
        let led = self.smc.keyboard_backlight();
        let max = led.max_brightness()?;
        let cur = led.brightness()?;
        let target = brightness::step(&self.config.keyboard_brightness, cur, max, up, slow);

        debug!("keyboard backlight {cur} -> {target}");

        if target != cur {
            led.set_brightness(target)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Shutdown safety net
    // -----------------------------------------------------------------------

    /// Make sure the machine is not left dark: raise the display to at
    /// least `min_safe_display_level` (or its startup level, whichever is
    /// higher) and the keyboard back to its startup level. Never lowers
    /// anything.
    pub fn ensure_safe_defaults(&self) -> Result<()> {
        info!("setting safe defaults");

        let keyboard = self.smc.keyboard_backlight();
        let display_floor = self.original_display.max(self.config.min_safe_display_level);

        debug!(
            "display: {display_floor} ({}), keyboard: {}",
            self.original_display, self.original_keyboard
        );

        if self.backlight.brightness()? < display_floor {
            self.backlight.set_brightness(display_floor)?;
        }
        if keyboard.brightness()? < self.original_keyboard {
            keyboard.set_brightness(self.original_keyboard)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    fn render_power_status(&self, out: &mut String) -> Result<()> {
        let _ = writeln!(
            out,
            "Display Backlight: {}/{}",
            self.backlight.actual_brightness()?,
            self.backlight.max_brightness()?
        );
        let _ = write!(out, "Running on {}", if self.on_ac { "AC" } else { "battery" });
        if !self.on_ac {
            let _ = write!(
                out,
                ", current power consumption: {} W ({} W)",
                self.battery.power_now()?,
                self.estimate_power()
            );
        }
        out.push('\n');
        Ok(())
    }
}

impl EventHandler for Monitor {
    fn handle_event(&mut self, event: Event) {
        Monitor::handle_event(self, event);
    }
}

impl StatusProvider for Monitor {
    /// Render every section, turning a failing one into an inline error
    /// line rather than losing the whole dump.
    fn status(&self) -> String {
        let mut out = String::new();
        if let Err(err) = self.coretemp.render_status(&mut out) {
            let _ = writeln!(out, "error: {err}");
        }
        if let Err(err) = self.smc.render_status(&mut out) {
            let _ = writeln!(out, "error: {err}");
        }
        if let Err(err) = self.cpuinfo.render_status(&mut out) {
            let _ = writeln!(out, "error: {err}");
        }
        if let Err(err) = self.render_power_status(&mut out) {
            let _ = writeln!(out, "error: {err}");
        }
        out
    }
}
