//! Crate-wide error type.
//!
//! Every fallible operation in airvane-core bottoms out in a sysfs file:
//! the error variants carry the path involved so a log line is enough to
//! find the misbehaving attribute on a real machine.

use std::path::PathBuf;

/// Errors produced by sysfs access and device discovery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a sysfs attribute failed at the I/O level.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An attribute was read but its contents did not parse as the
    /// expected type.
    #[error("{path}: cannot parse {value:?}")]
    Parse { path: PathBuf, value: String },

    /// A hwmon device with the given name was not found under the search
    /// base. Fatal at startup — there is no degraded mode for missing
    /// hardware.
    #[error("cannot find device: {name}")]
    DeviceNotFound { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
