//! Power supply class devices: the AC adapter and the battery.
//!
//! The kernel reports charge/energy in micro-units; readings are converted
//! to Wh / V / W here so the rest of the crate never sees raw sysfs scale.

use std::path::Path;

use crate::error::Result;
use crate::sysfs::Attr;

/// One `/sys/class/power_supply` device.
#[derive(Debug, Clone)]
pub struct PowerSupply {
    online: Attr,
    present: Attr,
    kind: Attr,
    energy_full: Attr,
    energy_full_design: Attr,
    energy_now: Attr,
    voltage_now: Attr,
    power_now: Attr,
}

impl PowerSupply {
    pub fn new(dir: &Path) -> Self {
        Self {
            online: Attr::new(dir.join("online")),
            present: Attr::new(dir.join("present")),
            kind: Attr::new(dir.join("type")),
            energy_full: Attr::new(dir.join("charge_full")),
            energy_full_design: Attr::new(dir.join("charge_full_design")),
            energy_now: Attr::new(dir.join("charge_now")),
            voltage_now: Attr::new(dir.join("voltage_now")),
            power_now: Attr::new(dir.join("power_now")),
        }
    }

    /// AC adapter: whether mains power is plugged in.
    pub fn online(&self) -> Result<bool> {
        self.online.read_bool()
    }

    pub fn present(&self) -> Result<bool> {
        self.present.read_bool()
    }

    /// Device type string (`Mains`, `Battery`).
    pub fn kind(&self) -> Result<String> {
        self.kind.read_line()
    }

    /// Last full capacity in Wh.
    pub fn energy_full(&self) -> Result<f64> {
        Ok(1e-6 * self.energy_full.read::<f64>()?)
    }

    /// Design capacity in Wh.
    pub fn energy_full_design(&self) -> Result<f64> {
        Ok(1e-6 * self.energy_full_design.read::<f64>()?)
    }

    /// Remaining energy in Wh.
    pub fn energy_now(&self) -> Result<f64> {
        Ok(1e-6 * self.energy_now.read::<f64>()?)
    }

    /// Terminal voltage in V.
    pub fn voltage_now(&self) -> Result<f64> {
        Ok(1e-6 * self.voltage_now.read::<f64>()?)
    }

    /// Instantaneous draw in W, as reported by the battery controller.
    pub fn power_now(&self) -> Result<f64> {
        Ok(1e-6 * self.power_now.read::<f64>()?)
    }

    /// Remaining energy as a percentage of last full capacity.
    pub fn energy_percent(&self) -> Result<f64> {
        Ok(100.0 * self.energy_now()? / self.energy_full()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fake_battery(charge_now: u64, charge_full: u64) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("online"), "0\n").unwrap();
        fs::write(dir.path().join("present"), "1\n").unwrap();
        fs::write(dir.path().join("type"), "Battery\n").unwrap();
        fs::write(dir.path().join("charge_now"), format!("{charge_now}\n")).unwrap();
        fs::write(dir.path().join("charge_full"), format!("{charge_full}\n")).unwrap();
        fs::write(dir.path().join("charge_full_design"), "54340000\n").unwrap();
        fs::write(dir.path().join("voltage_now"), "12300000\n").unwrap();
        fs::write(dir.path().join("power_now"), "8500000\n").unwrap();
        dir
    }

    #[test]
    fn micro_units_scaled() {
        let dir = fake_battery(27_000_000, 54_000_000);
        let bat = PowerSupply::new(dir.path());
        assert!((bat.energy_now().unwrap() - 27.0).abs() < 1e-9);
        assert!((bat.energy_full().unwrap() - 54.0).abs() < 1e-9);
        assert!((bat.voltage_now().unwrap() - 12.3).abs() < 1e-9);
        assert!((bat.power_now().unwrap() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn energy_percent_from_full() {
        let dir = fake_battery(13_500_000, 54_000_000);
        let bat = PowerSupply::new(dir.path());
        assert!((bat.energy_percent().unwrap() - 25.0).abs() < 1e-9);
    }
}
