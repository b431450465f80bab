//! Simulation settings
//!
//! Loaded from JSON; every field has a default so partial files work.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::ReferenceFrame;

/// Settings load/validation failures
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Reading or writing the settings file failed
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid settings JSON
    #[error("settings JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Offending field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Cannon and integration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rotation rate about +y (rad/s)
    pub angular_velocity: f64,
    /// Muzzle speed in the rotating frame (units/s)
    pub bullet_speed: f64,
    /// Maximum bullets in flight at one time
    pub max_bullets: usize,
    /// Cull radius (units)
    pub max_bullet_distance: f64,
    /// Spawn distance along the barrel from the rotation axis
    pub muzzle_offset: f64,
    /// Integrator calls per tick
    pub substeps: u32,
    /// Playback speed in [0, 1], scales the simulated time per tick
    pub time_scale: f64,

    // === Auto fire ===
    pub auto_fire: bool,
    /// Bullets per second
    pub fire_frequency: f64,

    // === Display ===
    /// Frame used for readouts and the traced path
    pub reference_frame: ReferenceFrame,
    /// Pause the simulation once the current bullet passes this radius
    pub pause_distance: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            angular_velocity: 0.0,
            bullet_speed: 1.0,
            max_bullets: 1,
            max_bullet_distance: 10.0,
            muzzle_offset: 0.5,
            substeps: DEFAULT_SUBSTEPS,
            time_scale: 1.0,

            auto_fire: false,
            fire_frequency: 1.0,

            reference_frame: ReferenceFrame::Rotating,
            pause_distance: None,
        }
    }
}

impl Settings {
    /// Frame angular velocity vector
    #[inline]
    pub fn omega(&self) -> DVec3 {
        DVec3::Y * self.angular_velocity
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Check every value is in range
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<(), SettingsError> {
            Err(SettingsError::Invalid {
                field,
                reason: reason.into(),
            })
        }

        if !self.angular_velocity.is_finite() || self.angular_velocity.abs() > MAX_ANGULAR_VELOCITY {
            return invalid(
                "angular_velocity",
                format!("must be within ±{MAX_ANGULAR_VELOCITY} rad/s, got {}", self.angular_velocity),
            );
        }
        if !(0.0..=MAX_BULLET_SPEED).contains(&self.bullet_speed) {
            return invalid(
                "bullet_speed",
                format!("must be within 0..={MAX_BULLET_SPEED}, got {}", self.bullet_speed),
            );
        }
        if !self.max_bullet_distance.is_finite() || self.max_bullet_distance <= 0.0 {
            return invalid("max_bullet_distance", "must be positive");
        }
        if !self.muzzle_offset.is_finite()
            || self.muzzle_offset < 0.0
            || self.muzzle_offset >= self.max_bullet_distance
        {
            return invalid("muzzle_offset", "must be within [0, max_bullet_distance)");
        }
        if self.substeps == 0 {
            return invalid("substeps", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.time_scale) {
            return invalid("time_scale", format!("must be within 0..=1, got {}", self.time_scale));
        }
        if !self.fire_frequency.is_finite() || self.fire_frequency <= 0.0 {
            return invalid("fire_frequency", "must be positive");
        }
        if let Some(d) = self.pause_distance {
            if !d.is_finite() || d <= 0.0 {
                return invalid("pause_distance", "must be positive");
            }
        }
        Ok(())
    }
}
