use std::time::Duration;

use crate::gap::BeaconConfig;
use crate::gatt::CharProps;

/// Puck controller configuration. Every field has a default, so configuration
/// files only need to list what they change.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// iBeacon identification fields.
    pub beacon: BeaconConfig,
    /// Device name prefix. The minor value is appended in hex.
    pub name_prefix: String,
    /// Advertising interval in milliseconds.
    pub adv_interval_ms: u64,
    /// Properties used by [`Puck::add_default_characteristic`](crate::Puck).
    pub default_props: CharProps,
}

impl Config {
    /// Returns the advertising interval.
    #[inline]
    #[must_use]
    pub const fn adv_interval(&self) -> Duration {
        Duration::from_millis(self.adv_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            beacon: BeaconConfig::default(),
            name_prefix: "Puck".to_owned(),
            adv_interval_ms: 100,
            default_props: CharProps::default(),
        }
    }
}

#[cfg(feature = "fs")]
mod fs {
    use std::path::Path;
    use std::{fs, io};

    use tracing::debug;

    use super::*;

    impl Config {
        /// Parses a JSON configuration.
        pub fn from_json(s: &str) -> crate::Result<Self> {
            Ok(serde_json::from_str(s)?)
        }

        /// Loads a JSON configuration file. Returns `None` if the file does
        /// not exist.
        pub fn load(path: impl AsRef<Path>) -> crate::Result<Option<Self>> {
            let path = path.as_ref();
            let s = match fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) if matches!(e.kind(), io::ErrorKind::NotFound) => {
                    debug!("No configuration at {}", path.display());
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            debug!("Loaded configuration from {}", path.display());
            Self::from_json(&s).map(Some)
        }
    }
}
