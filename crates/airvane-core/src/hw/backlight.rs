//! LED-class backlight devices (display panel, keyboard backlight).

use std::path::Path;

use crate::error::Result;
use crate::sysfs::Attr;

/// A `/sys/class/backlight`- or `/sys/class/leds`-style device with a
/// writable `brightness` and a read-only `max_brightness`.
#[derive(Debug, Clone)]
pub struct Led {
    actual_brightness: Attr,
    brightness: Attr,
    max_brightness: Attr,
}

impl Led {
    pub fn new(dir: &Path) -> Self {
        Self {
            actual_brightness: Attr::new(dir.join("actual_brightness")),
            brightness: Attr::new(dir.join("brightness")),
            max_brightness: Attr::new(dir.join("max_brightness")),
        }
    }

    /// The level the hardware is actually driving. Falls back to the
    /// requested `brightness` on devices without `actual_brightness`
    /// (keyboard backlights).
    pub fn actual_brightness(&self) -> Result<u32> {
        if self.actual_brightness.exists() {
            self.actual_brightness.read()
        } else {
            self.brightness.read()
        }
    }

    pub fn brightness(&self) -> Result<u32> {
        self.brightness.read()
    }

    pub fn max_brightness(&self) -> Result<u32> {
        self.max_brightness.read()
    }

    pub fn set_brightness(&self, value: u32) -> Result<()> {
        self.brightness.write(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn set_and_read_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("brightness"), "400\n").unwrap();
        fs::write(dir.path().join("actual_brightness"), "400\n").unwrap();
        fs::write(dir.path().join("max_brightness"), "1500\n").unwrap();

        let led = Led::new(dir.path());
        assert_eq!(led.brightness().unwrap(), 400);
        assert_eq!(led.max_brightness().unwrap(), 1500);
        led.set_brightness(900).unwrap();
        assert_eq!(led.brightness().unwrap(), 900);
    }

    #[test]
    fn actual_falls_back_to_brightness() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("brightness"), "2\n").unwrap();
        fs::write(dir.path().join("max_brightness"), "15\n").unwrap();

        let led = Led::new(dir.path());
        assert_eq!(led.actual_brightness().unwrap(), 2);
    }
}
