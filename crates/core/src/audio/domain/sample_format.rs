use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::error::WarpError;

/// Storage format the audio was decoded from and will be encoded back to.
///
/// In memory every sample is an `f32` in [-1.0, 1.0] regardless of format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    #[default]
    Int16,
    Int24,
    Int32,
    Float32,
}

impl SampleFormat {
    pub fn bits_per_sample(self) -> u16 {
        match self {
            SampleFormat::Int16 => 16,
            SampleFormat::Int24 => 24,
            SampleFormat::Int32 => 32,
            SampleFormat::Float32 => 32,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, SampleFormat::Float32)
    }

    /// Largest positive integer value for integer formats.
    pub fn int_max(self) -> Option<i32> {
        match self {
            SampleFormat::Int16 => Some(i16::MAX as i32),
            SampleFormat::Int24 => Some((1 << 23) - 1),
            SampleFormat::Int32 => Some(i32::MAX),
            SampleFormat::Float32 => None,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFormat::Int16 => write!(f, "16"),
            SampleFormat::Int24 => write!(f, "24"),
            SampleFormat::Int32 => write!(f, "32"),
            SampleFormat::Float32 => write!(f, "float"),
        }
    }
}

impl FromStr for SampleFormat {
    type Err = WarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "16" => Ok(SampleFormat::Int16),
            "24" => Ok(SampleFormat::Int24),
            "32" => Ok(SampleFormat::Int32),
            "float" | "f32" => Ok(SampleFormat::Float32),
            other => Err(WarpError::invalid(format!(
                "bit depth must be one of 16, 24, 32, float; got '{other}'"
            ))),
        }
    }
}
