use std::{num::NonZeroU32, path::Path};

use anyhow::{Context, Error};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::device::{DeviceAddress, WRITE_SERVICE};

pub const DEFAULT_CONFIG_PATH: &str = "ledstrip.ron";

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub fade: FadeConfig,
    pub ambilight: AmbilightConfig,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    /// The strip's MAC address. There is no scanning, so this has to be set
    /// here or on the command line.
    pub address: Option<DeviceAddress>,
    pub write_service: Uuid,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: None,
            write_service: WRITE_SERVICE,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FadeConfig {
    pub enabled: bool,
    pub steps: NonZeroU32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            steps: NonZeroU32::new(20).unwrap_or(NonZeroU32::MIN),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AmbilightConfig {
    /// Gray level used instead of black when fading to a black screen.
    pub min_floor: u8,
    /// How many captures in a row may fail before continuous mode gives up.
    pub max_consecutive_capture_failures: u32,
}

impl Default for AmbilightConfig {
    fn default() -> Self {
        Self {
            min_floor: 30,
            max_consecutive_capture_failures: 5,
        }
    }
}

impl Config {
    /// Load the config at `path`. A missing file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let config = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&config).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(config: &str) -> Result<Config, Error> {
        let config: Config = ron::from_str(config)?;
        Ok(config)
    }
}
