//! CPU die temperature sensors (the `coretemp` hwmon device).
//!
//! Each sensor is a `tempN_input`/`tempN_label`/`tempN_max`/`tempN_crit`
//! attribute group, reported by the kernel in millidegrees Celsius.
//! Sensors are enumerated by probing `tempN_label` from N = 1 upward until
//! a gap, the same scheme the kernel uses to number them.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sysfs::{self, Attr};

/// One labeled temperature sensor.
#[derive(Debug, Clone)]
pub struct TempSensor {
    input: Attr,
    label: Attr,
    max: Attr,
    crit: Attr,
}

impl TempSensor {
    pub fn new(dir: &Path, index: usize) -> Self {
        Self {
            input: Attr::new(dir.join(format!("temp{index}_input"))),
            label: Attr::new(dir.join(format!("temp{index}_label"))),
            max: Attr::new(dir.join(format!("temp{index}_max"))),
            crit: Attr::new(dir.join(format!("temp{index}_crit"))),
        }
    }

    /// Probe which sensor indices exist under `dir` (labels are contiguous
    /// from 1).
    pub fn probe(dir: &Path) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut ix = 1;
        while Attr::new(dir.join(format!("temp{ix}_label"))).exists() {
            indices.push(ix);
            ix += 1;
        }
        indices
    }

    /// Current reading in °C.
    pub fn input(&self) -> Result<f64> {
        Ok(1e-3 * self.input.read::<f64>()?)
    }

    /// Vendor maximum in °C.
    pub fn max(&self) -> Result<f64> {
        Ok(1e-3 * self.max.read::<f64>()?)
    }

    /// Critical trip point in °C.
    pub fn crit(&self) -> Result<f64> {
        Ok(1e-3 * self.crit.read::<f64>()?)
    }

    pub fn label(&self) -> Result<String> {
        self.label.read_line()
    }
}

/// The coretemp device: all die sensors of the package.
pub struct CoreTemp {
    path: PathBuf,
    sensors: Vec<TempSensor>,
}

impl CoreTemp {
    /// Locate the `coretemp` hwmon device under `base` and enumerate its
    /// sensors. Missing device is fatal.
    pub fn discover(base: &Path) -> Result<Self> {
        let path = sysfs::find_device(base, "coretemp")?;
        let sensors = TempSensor::probe(&path)
            .into_iter()
            .map(|ix| TempSensor::new(&path, ix))
            .collect();
        Ok(Self { path, sensors })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sensors(&self) -> &[TempSensor] {
        &self.sensors
    }

    /// Hottest current reading across all die sensors, in °C.
    pub fn max_input(&self) -> Result<f64> {
        let mut cur = -300.0_f64;
        for sensor in &self.sensors {
            cur = cur.max(sensor.input()?);
        }
        Ok(cur)
    }

    /// Append one status line per sensor to `out`.
    pub fn render_status(&self, out: &mut String) -> Result<()> {
        for sensor in &self.sensors {
            let _ = writeln!(
                out,
                "{}: {}°C (max: {}°C, crit: {}°C)",
                sensor.label()?,
                sensor.input()?,
                sensor.max()?,
                sensor.crit()?
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fake_coretemp(sensors: &[(&str, u32)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        let dev = dir.path().join("coretemp.0");
        fs::create_dir_all(&dev).unwrap();
        fs::write(dev.join("name"), "coretemp\n").unwrap();
        for (ix, (label, millideg)) in sensors.iter().enumerate() {
            let n = ix + 1;
            fs::write(dev.join(format!("temp{n}_label")), format!("{label}\n")).unwrap();
            fs::write(dev.join(format!("temp{n}_input")), format!("{millideg}\n")).unwrap();
            fs::write(dev.join(format!("temp{n}_max")), "87000\n").unwrap();
            fs::write(dev.join(format!("temp{n}_crit")), "105000\n").unwrap();
        }
        dir
    }

    #[test]
    fn enumerates_contiguous_sensors() {
        let dir = fake_coretemp(&[("Physical id 0", 50000), ("Core 0", 52000), ("Core 1", 47000)]);
        let ct = CoreTemp::discover(dir.path()).unwrap();
        assert_eq!(ct.sensors().len(), 3);
    }

    #[test]
    fn max_input_is_hottest_core() {
        let dir = fake_coretemp(&[("Core 0", 52000), ("Core 1", 61500), ("Core 2", 47000)]);
        let ct = CoreTemp::discover(dir.path()).unwrap();
        assert!((ct.max_input().unwrap() - 61.5).abs() < 1e-9);
    }

    #[test]
    fn missing_device_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(CoreTemp::discover(dir.path()).is_err());
    }

    #[test]
    fn status_lists_each_sensor() {
        let dir = fake_coretemp(&[("Core 0", 52000)]);
        let ct = CoreTemp::discover(dir.path()).unwrap();
        let mut out = String::new();
        ct.render_status(&mut out).unwrap();
        assert!(out.contains("Core 0: 52°C"));
    }
}
