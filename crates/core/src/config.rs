use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Points per group unless configured otherwise. Stays under the 16-bit
/// index ceiling many renderers impose per draw.
pub const DEFAULT_CAPACITY: u32 = 65_000;

/// Knobs recognised by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Uniform multiplier applied to every raw coordinate.
    pub scale: f32,
    /// Swap the Y and Z axes on read.
    pub invert_yz: bool,
    /// Maximum points per output group.
    pub capacity: u32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            invert_yz: false,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConvertConfig {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.capacity == 0 {
            return Err(ParseError::InvalidCapacity);
        }
        if !self.scale.is_finite() {
            return Err(ParseError::InvalidScale(self.scale));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Raw coordinate triple -> stored position: scale, then optional Y/Z swap.
    pub fn transform(&self, raw: [f64; 3]) -> [f64; 3] {
        let s = self.scale as f64;
        if self.invert_yz {
            [raw[0] * s, raw[2] * s, raw[1] * s]
        } else {
            [raw[0] * s, raw[1] * s, raw[2] * s]
        }
    }
}
