#![forbid(unsafe_code)]

//! Tunable parameters for the gesture listeners.
//!
//! [`GestureConfig`] groups the corner-drag and scale-on-press settings so
//! they can be loaded from TOML or JSON at startup (feature `config`).
//!
//! # Loading
//!
//! ```toml
//! [corner_drag]
//! tap_time_ms = 800
//! threshold_velocity_x = 350.0
//! only_corner_click = false
//!
//! [corner_drag.settle]
//! x = { stiffness = 200.0, damping_ratio = 0.75 }
//! y = { stiffness = 50.0, damping_ratio = 0.5 }
//!
//! [scale]
//! scale_type = "grow"
//! ```
//!
//! ```rust,ignore
//! let config = GestureConfig::from_toml_file("floatsnap.toml")?;
//! let config = GestureConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the platform-tuned constants, so
//! `GestureConfig::default()` behaves like an unconfigured listener.
//! Durations are written in milliseconds. A spring tuning table replaces
//! both axes, so `x` and `y` must both be given.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::animation::SpringTuning;
use crate::animation::snap::AxisTunings;

// ---------------------------------------------------------------------------
// Top-level GestureConfig
// ---------------------------------------------------------------------------

/// All listener settings.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GestureConfig {
    /// Draggable corner-snapping element.
    pub corner_drag: CornerDragConfig,
    /// Scale-on-press feedback.
    pub scale: ScaleConfig,
}

impl GestureConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlSer)
    }

    /// Check all fields. Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        self.corner_drag.validate_into(&mut errors);
        self.scale.validate_into(&mut errors);
        errors
    }

    /// `self` if valid, otherwise [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Corner drag
// ---------------------------------------------------------------------------

/// Thresholds and spring tunings for [`CornerDragListener`].
///
/// [`CornerDragListener`]: crate::corner_drag::CornerDragListener
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CornerDragConfig {
    /// Springs while following the finger. Default: HIGH / NO_BOUNCY.
    pub follow: AxisTunings,
    /// Springs while settling into a corner. Default: VERY_LOW / MEDIUM_BOUNCY.
    pub settle: AxisTunings,
    /// Releases shorter than this are clicks, longer are long clicks. Default: 1000ms.
    #[cfg_attr(feature = "config", serde(rename = "tap_time_ms", with = "duration_ms"))]
    pub tap_time: Duration,
    /// Releases shorter than this are fling candidates. Default: 250ms.
    #[cfg_attr(feature = "config", serde(rename = "fling_time_ms", with = "duration_ms"))]
    pub fling_time: Duration,
    /// Extra horizontal px/s over the device minimum for a fling. Default: 400.
    pub threshold_velocity_x: f32,
    /// Extra vertical px/s over the device minimum for a fling. Default: 430.
    pub threshold_velocity_y: f32,
    /// Displacement, in percent of the area extent, for a fling. Default: 1.
    pub fling_distance_pass_percent: f32,
    /// Only accept clicks while the element rests on a corner. Default: true.
    pub only_corner_click: bool,
    /// Let the element follow the finger outside the movement area. Default: true.
    pub allow_move_out_of_area: bool,
    /// Distance (px) from a corner that still counts as "on" it. Default: 5.
    pub corner_click_tolerance: f32,
}

impl Default for CornerDragConfig {
    fn default() -> Self {
        Self {
            follow: AxisTunings::uniform(SpringTuning::FOLLOW),
            settle: AxisTunings::uniform(SpringTuning::SETTLE),
            tap_time: Duration::from_millis(1000),
            fling_time: Duration::from_millis(250),
            threshold_velocity_x: 400.0,
            threshold_velocity_y: 430.0,
            fling_distance_pass_percent: 1.0,
            only_corner_click: true,
            allow_move_out_of_area: true,
            corner_click_tolerance: 5.0,
        }
    }
}

impl CornerDragConfig {
    fn validate_into(&self, errors: &mut Vec<String>) {
        for (name, tuning) in [
            ("corner_drag.follow.x", self.follow.x),
            ("corner_drag.follow.y", self.follow.y),
            ("corner_drag.settle.x", self.settle.x),
            ("corner_drag.settle.y", self.settle.y),
        ] {
            if !(tuning.stiffness > 0.0) {
                errors.push(format!("{name}.stiffness must be > 0, got {}", tuning.stiffness));
            }
            if !(tuning.damping_ratio >= 0.0) {
                errors.push(format!(
                    "{name}.damping_ratio must be >= 0, got {}",
                    tuning.damping_ratio
                ));
            }
        }
        for (name, value) in [
            ("corner_drag.threshold_velocity_x", self.threshold_velocity_x),
            ("corner_drag.threshold_velocity_y", self.threshold_velocity_y),
            ("corner_drag.fling_distance_pass_percent", self.fling_distance_pass_percent),
            ("corner_drag.corner_click_tolerance", self.corner_click_tolerance),
        ] {
            if !(value >= 0.0) {
                errors.push(format!("{name} must be >= 0, got {value}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scale on press
// ---------------------------------------------------------------------------

/// Direction of the press feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum ScaleType {
    Grow,
    #[default]
    Shrink,
}

impl ScaleType {
    /// +1 for grow, -1 for shrink.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            ScaleType::Grow => 1.0,
            ScaleType::Shrink => -1.0,
        }
    }
}

/// Settings for [`ScaleOnPressListener`].
///
/// [`ScaleOnPressListener`]: crate::scale::ScaleOnPressListener
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ScaleConfig {
    /// Default: shrink.
    pub scale_type: ScaleType,
    /// Resting scale. Default: 1.0.
    pub base_scale: f32,
    /// Scale change while pressed. Default: 0.25.
    pub delta_scale: f32,
    /// Extra scale added to the release animation after a tap. Default: 0.2.
    pub tap_boost: f32,
    /// Length of each scale animation. Default: 250ms.
    #[cfg_attr(feature = "config", serde(rename = "duration_ms", with = "duration_ms"))]
    pub duration: Duration,
    /// Click vs long-click boundary. Default: 1000ms.
    #[cfg_attr(feature = "config", serde(rename = "tap_time_ms", with = "duration_ms"))]
    pub tap_time: Duration,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            scale_type: ScaleType::Shrink,
            base_scale: 1.0,
            delta_scale: 0.25,
            tap_boost: 0.2,
            duration: Duration::from_millis(250),
            tap_time: Duration::from_millis(1000),
        }
    }
}

impl ScaleConfig {
    fn validate_into(&self, errors: &mut Vec<String>) {
        if !(self.base_scale > 0.0) {
            errors.push(format!("scale.base_scale must be > 0, got {}", self.base_scale));
        }
        if !(self.delta_scale >= 0.0) {
            errors.push(format!("scale.delta_scale must be >= 0, got {}", self.delta_scale));
        }
        if !(self.tap_boost >= 0.0) {
            errors.push(format!("scale.tap_boost must be >= 0, got {}", self.tap_boost));
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a gesture configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config")]
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

#[cfg(feature = "config")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use web_time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
