//! The Apple SMC hwmon device: fans, auxiliary temperature sensors, the
//! ambient light sensor, and the keyboard backlight LED.
//!
//! Fans and temp sensors are enumerated by probing `fanN_label` /
//! `tempN_label` from N = 1 upward. Fan actuation goes through
//! [`Smc::set_fan_speed`], which flips a fan into manual mode the first
//! time it is driven and skips writes that would not change the output.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::hw::backlight::Led;
use crate::hw::coretemp::TempSensor;
use crate::sysfs::{self, Attr};

/// One SMC fan.
#[derive(Debug, Clone)]
pub struct Fan {
    input: Attr,
    label: Attr,
    manual: Attr,
    min: Attr,
    max: Attr,
    output: Attr,
}

impl Fan {
    pub fn new(dir: &Path, index: usize) -> Self {
        Self {
            input: Attr::new(dir.join(format!("fan{index}_input"))),
            label: Attr::new(dir.join(format!("fan{index}_label"))),
            manual: Attr::new(dir.join(format!("fan{index}_manual"))),
            min: Attr::new(dir.join(format!("fan{index}_min"))),
            max: Attr::new(dir.join(format!("fan{index}_max"))),
            output: Attr::new(dir.join(format!("fan{index}_output"))),
        }
    }

    pub fn probe(dir: &Path) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut ix = 1;
        while Attr::new(dir.join(format!("fan{ix}_label"))).exists() {
            indices.push(ix);
            ix += 1;
        }
        indices
    }

    /// Measured speed in rpm.
    pub fn input(&self) -> Result<u32> {
        self.input.read()
    }

    pub fn label(&self) -> Result<String> {
        self.label.read_line()
    }

    /// Whether the fan is under manual (daemon) control rather than SMC
    /// automatic control.
    pub fn manual(&self) -> Result<bool> {
        self.manual.read_bool()
    }

    pub fn min(&self) -> Result<u32> {
        self.min.read()
    }

    pub fn max(&self) -> Result<u32> {
        self.max.read()
    }

    /// Commanded speed in rpm.
    pub fn output(&self) -> Result<u32> {
        self.output.read()
    }

    pub fn set_manual(&self, value: bool) -> Result<()> {
        self.manual.write(value as u8)
    }

    pub fn set_output(&self, value: u32) -> Result<()> {
        self.output.write(value)
    }
}

/// The SMC ambient light sensor, reported as `(left,right)`.
#[derive(Debug, Clone)]
pub struct AmbientLight {
    obj: Attr,
}

impl AmbientLight {
    pub fn new(dir: &Path) -> Self {
        Self {
            obj: Attr::new(dir.join("light")),
        }
    }

    /// Combined left + right sensor value.
    pub fn value(&self) -> Result<u32> {
        let raw = self.obj.read_line()?;
        let parsed = raw
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .and_then(|s| s.split_once(','))
            .and_then(|(l, r)| Some((l.trim().parse::<u32>().ok()?, r.trim().parse::<u32>().ok()?)));
        match parsed {
            Some((left, right)) => Ok(left + right),
            None => Err(Error::Parse {
                path: self.obj.path().to_path_buf(),
                value: raw,
            }),
        }
    }
}

/// The applesmc device as a whole.
pub struct Smc {
    path: PathBuf,
    fans: Vec<Fan>,
    temps: Vec<TempSensor>,
    temp_labels: HashMap<String, usize>,
    light: AmbientLight,
    kbd_backlight: Led,
}

impl Smc {
    /// Locate the `applesmc` hwmon device under `base` and enumerate fans
    /// and temp sensors. Missing device is fatal.
    pub fn discover(base: &Path) -> Result<Self> {
        let path = sysfs::find_device(base, "applesmc")?;

        let fans = Fan::probe(&path)
            .into_iter()
            .map(|ix| Fan::new(&path, ix))
            .collect();

        let mut temps = Vec::new();
        let mut temp_labels = HashMap::new();
        for ix in TempSensor::probe(&path) {
            let sensor = TempSensor::new(&path, ix);
            if let Ok(label) = sensor.label() {
                temp_labels.insert(label, temps.len());
            }
            temps.push(sensor);
        }

        let light = AmbientLight::new(&path);
        let kbd_backlight = Led::new(&path.join("leds").join("smc::kbd_backlight"));

        Ok(Self {
            path,
            fans,
            temps,
            temp_labels,
            light,
            kbd_backlight,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fans(&self) -> &[Fan] {
        &self.fans
    }

    /// Look up an SMC temp sensor by its four-character label (e.g.
    /// `Ts0P`, the palm rest).
    pub fn temp(&self, label: &str) -> Option<&TempSensor> {
        self.temp_labels.get(label).map(|&ix| &self.temps[ix])
    }

    pub fn ambient_light(&self) -> &AmbientLight {
        &self.light
    }

    pub fn keyboard_backlight(&self) -> &Led {
        &self.kbd_backlight
    }

    /// Drive every fan at `value` rpm. Forces manual mode where needed and
    /// skips the output write when the fan is already commanded to `value`.
    pub fn set_fan_speed(&self, value: u32) -> Result<()> {
        for fan in &self.fans {
            if !fan.manual()? {
                fan.set_manual(true)?;
            }
            if fan.output()? != value {
                fan.set_output(value)?;
            }
        }
        Ok(())
    }

    /// Append fan, palm-rest, ambient-light, and keyboard-backlight status
    /// lines to `out`.
    pub fn render_status(&self, out: &mut String) -> Result<()> {
        for fan in &self.fans {
            let _ = writeln!(
                out,
                "{}: {} rpm ({} rpm) [{}]",
                fan.label()?,
                fan.input()?,
                fan.output()?,
                if fan.manual()? { "MANUAL" } else { "AUTO" }
            );
        }
        if let Some(palm) = self.temp("Ts0P") {
            let _ = writeln!(out, "Palm Rest: {}°C", palm.input()?);
        }
        let _ = writeln!(out, "Ambient Light: {}", self.light.value()?);
        let _ = writeln!(
            out,
            "Keyboard Backlight: {}/{}",
            self.kbd_backlight.brightness()?,
            self.kbd_backlight.max_brightness()?
        );
        Ok(())
    }
}
