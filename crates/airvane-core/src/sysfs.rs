//! Single-value sysfs attributes and hwmon device discovery.
//!
//! Everything the daemon senses or actuates is one line of text in one
//! file: a temperature in millidegrees, a fan speed in rpm, a brightness
//! level. [`Attr`] wraps one such file with typed read/write. Devices are
//! located by walking a base directory for an entry whose `name` file
//! matches the wanted hwmon name.

use std::collections::VecDeque;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// One file-backed sysfs attribute.
#[derive(Debug, Clone)]
pub struct Attr {
    path: PathBuf,
}

impl Attr {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the first line of the file, without the trailing newline.
    pub fn read_line(&self) -> Result<String> {
        let contents = fs::read_to_string(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(contents.lines().next().unwrap_or("").to_string())
    }

    /// Read the attribute and parse it as `T`.
    pub fn read<T: FromStr>(&self) -> Result<T> {
        let line = self.read_line()?;
        line.trim().parse().map_err(|_| Error::Parse {
            path: self.path.clone(),
            value: line,
        })
    }

    /// Read a kernel-style boolean attribute (`0` / `1`).
    pub fn read_bool(&self) -> Result<bool> {
        Ok(self.read::<u8>()? != 0)
    }

    /// Overwrite the file with `value` and a trailing newline.
    pub fn write<T: Display>(&self, value: T) -> Result<()> {
        fs::write(&self.path, format!("{value}\n")).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Find a hwmon device directory by the contents of its `name` file.
///
/// Breadth-first walk starting at `base`; directories that cannot be read
/// (permissions, virtual entries) are skipped. The match is the directory
/// containing the `name` file, e.g. `/sys/devices/platform/coretemp.0/hwmon/hwmon2`.
pub fn find_device(base: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
    let mut dirs = VecDeque::new();
    dirs.push_back(base.as_ref().to_path_buf());

    while let Some(path) = dirs.pop_front() {
        if let Ok(found) = Attr::new(path.join("name")).read_line() {
            if found == name {
                return Ok(path);
            }
        }

        if let Ok(entries) = fs::read_dir(&path) {
            for entry in entries.flatten() {
                if entry.path().is_dir() {
                    dirs.push_back(entry.path());
                }
            }
        }
    }

    Err(Error::DeviceNotFound {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // -----------------------------------------------------------------------
    // Attr tests
    // -----------------------------------------------------------------------

    #[test]
    fn read_typed_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("temp1_input");
        fs::write(&path, "48000\n").unwrap();

        let attr = Attr::new(&path);
        assert_eq!(attr.read::<u32>().unwrap(), 48000);
        assert!((attr.read::<f64>().unwrap() - 48000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn read_takes_first_line_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("multi");
        fs::write(&path, "123\n456\n").unwrap();
        assert_eq!(Attr::new(&path).read::<u32>().unwrap(), 123);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let attr = Attr::new("/nonexistent/attr");
        assert!(matches!(attr.read::<u32>(), Err(Error::Io { .. })));
    }

    #[test]
    fn read_garbage_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad");
        fs::write(&path, "not-a-number\n").unwrap();
        match Attr::new(&path).read::<u32>() {
            Err(Error::Parse { value, .. }) => assert_eq!(value, "not-a-number"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn read_bool_zero_one() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("online");
        fs::write(&path, "1\n").unwrap();
        assert!(Attr::new(&path).read_bool().unwrap());
        fs::write(&path, "0\n").unwrap();
        assert!(!Attr::new(&path).read_bool().unwrap());
    }

    #[test]
    fn write_then_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fan1_output");
        fs::write(&path, "0\n").unwrap();

        let attr = Attr::new(&path);
        attr.write(2500u32).unwrap();
        assert_eq!(attr.read::<u32>().unwrap(), 2500);
        assert_eq!(fs::read_to_string(&path).unwrap(), "2500\n");
    }

    #[test]
    fn exists_tracks_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("present");
        let attr = Attr::new(&path);
        assert!(!attr.exists());
        fs::write(&path, "1\n").unwrap();
        assert!(attr.exists());
    }

    // -----------------------------------------------------------------------
    // find_device tests
    // -----------------------------------------------------------------------

    #[test]
    fn find_device_nested() {
        let dir = TempDir::new().unwrap();
        let dev = dir.path().join("platform/coretemp.0/hwmon/hwmon3");
        fs::create_dir_all(&dev).unwrap();
        fs::write(dev.join("name"), "coretemp\n").unwrap();

        // Decoy with a different name at a shallower level.
        let decoy = dir.path().join("platform/applesmc.768");
        fs::create_dir_all(&decoy).unwrap();
        fs::write(decoy.join("name"), "applesmc\n").unwrap();

        assert_eq!(find_device(dir.path(), "coretemp").unwrap(), dev);
        assert_eq!(find_device(dir.path(), "applesmc").unwrap(), decoy);
    }

    #[test]
    fn find_device_missing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            find_device(dir.path(), "nope"),
            Err(Error::DeviceNotFound { .. })
        ));
    }
}
