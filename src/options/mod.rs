//! Runtime overlay configuration.
//!
//! Hosts surface these in whatever preference UI they have; the crate
//! only defines the record, its defaults, and TOML preset helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::overlay::OverlayMode;

/// Options parsing/serialization failures.
#[derive(Debug)]
pub enum OptionsError {
    /// TOML parse failure.
    Parse(String),
    /// TOML serialization failure.
    Serialize(String),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "options parse error: {msg}"),
            Self::Serialize(msg) => {
                write!(f, "options serialize error: {msg}")
            }
        }
    }
}

impl std::error::Error for OptionsError {}

/// Overlay mode and stroke thickness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// How much of the skeleton to draw.
    pub mode: OverlayMode,
    /// Stroke thickness multiplier applied to every draw width.
    pub thickness: f32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            mode: OverlayMode::Body,
            thickness: 2.0,
        }
    }
}

impl OverlayOptions {
    /// Copy with the thickness clamped to be non-negative; a non-finite
    /// thickness falls back to the default.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !self.thickness.is_finite() {
            self.thickness = Self::default().thickness;
        }
        self.thickness = self.thickness.max(0.0);
        self
    }

    /// Parse options from a TOML preset; missing fields fill from the
    /// defaults.
    ///
    /// # Errors
    ///
    /// [`OptionsError::Parse`] when the TOML is malformed.
    pub fn from_toml(text: &str) -> Result<Self, OptionsError> {
        toml::from_str::<Self>(text)
            .map(Self::sanitized)
            .map_err(|e| OptionsError::Parse(e.to_string()))
    }

    /// Serialize options to a TOML preset.
    ///
    /// # Errors
    ///
    /// [`OptionsError::Serialize`] when serialization fails.
    pub fn to_toml(&self) -> Result<String, OptionsError> {
        toml::to_string_pretty(self)
            .map_err(|e| OptionsError::Serialize(e.to_string()))
    }
}
