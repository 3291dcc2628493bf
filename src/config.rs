//! Storm configuration files.
//!
//! The whole tunable state (wave parameters, water grid, rain pool and
//! thunder) serializes to one JSON document. Every section and field falls
//! back to its default, so a file only needs the values it changes:
//!
//! ```json
//! {
//!   "water": { "big_wave_elevation": 0.35, "depth_color": "#0b3d5c" },
//!   "rain": { "count": 400 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::rain::RainConfig;
use crate::surface::SurfaceConfig;
use crate::thunder::ThunderConfig;
use crate::wave::WaveParameters;

/// Complete configuration of a storm scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StormConfig {
    pub water: WaveParameters,
    pub surface: SurfaceConfig,
    pub rain: RainConfig,
    pub thunder: ThunderConfig,
}

impl StormConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: StormConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.water.validate()?;
        self.surface.validate()?;
        self.rain.validate()?;
        self.thunder.validate()?;
        Ok(())
    }
}

/// Serde adapter for colors: written as `"#rrggbb"`, read from either a hex
/// string or an `[r, g, b]` array of 0-1 floats.
pub mod hex_color {
    use glam::Vec3;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::wave::{rgb_from_hex, rgb_to_hex};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ColorRepr {
        Hex(String),
        Rgb([f32; 3]),
    }

    pub fn serialize<S>(color: &Vec3, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&rgb_to_hex(*color))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Vec3, D::Error>
    where
        D: Deserializer<'de>,
    {
        match ColorRepr::deserialize(d)? {
            ColorRepr::Hex(s) => rgb_from_hex(&s).map_err(D::Error::custom),
            ColorRepr::Rgb(rgb) => Ok(Vec3::from_array(rgb)),
        }
    }
}

/// Serde adapter storing a `Duration` as integer milliseconds.
pub mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
