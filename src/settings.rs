//! Clock tunables
//!
//! Every knob the simulation and the external renderer read. Stored as JSON
//! so a host can ship presets next to the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ClockError, Result};

/// Simulation and layout tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Population ===
    /// Balls patrolling each lit segment
    pub balls_per_segment: usize,
    /// Balls patrolling each colon dot
    pub balls_per_dot: usize,
    /// Ball radius in layout units
    pub ball_radius: f32,
    /// Fraction of the target radius recovered per second
    pub correction_rate: f32,

    // === Motion ===
    /// Patrol speed along a segment (progress units per second)
    pub target_move_speed: f32,
    /// Velocity damping per second
    pub drag: f32,
    /// Seek acceleration in layout units per second²
    pub acceleration: f32,
    /// Catch distance in ball radii
    pub merge_threshold: f32,
    /// Chaser acceleration per unit of distance to its target
    pub merge_acceleration: f32,

    // === Layout ===
    /// Gap between digits, in units
    pub digit_gap: f32,
    /// Segment end inset, scaled by thickness
    pub digit_round: f32,
    /// Segment stroke thickness handed to the renderer
    pub digit_thickness: f32,

    // === Field evaluation ===
    /// Density threshold in units
    pub pixel_threshold: f32,
    /// Blocks per threshold distance (also the renderer's search range)
    pub block_ratio: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            balls_per_segment: DEFAULT_BALLS_PER_SEGMENT,
            balls_per_dot: DEFAULT_BALLS_PER_DOT,
            ball_radius: 0.05,
            correction_rate: 0.1,

            target_move_speed: 1.0,
            drag: 2.0,
            acceleration: 10.0,
            merge_threshold: 1.0,
            merge_acceleration: 1.0,

            digit_gap: 0.2,
            digit_round: 0.02,
            digit_thickness: 5.0,

            pixel_threshold: 1.0,
            block_ratio: 1,
        }
    }
}

impl Settings {
    /// Reject values that would break the simulation invariants
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: &str) -> Result<()> {
            Err(ClockError::InvalidSettings {
                field,
                reason: reason.to_string(),
            })
        }

        if self.balls_per_segment == 0 {
            return invalid("balls_per_segment", "must be at least 1");
        }
        if !(self.ball_radius > 0.0) {
            return invalid("ball_radius", "must be positive");
        }
        if self.block_ratio == 0 {
            return invalid("block_ratio", "must be at least 1");
        }
        if !(self.pixel_threshold > 0.0) {
            return invalid("pixel_threshold", "must be positive");
        }
        if !(self.digit_gap >= 0.0) {
            return invalid("digit_gap", "must not be negative");
        }
        for (field, value) in [
            ("correction_rate", self.correction_rate),
            ("target_move_speed", self.target_move_speed),
            ("drag", self.drag),
            ("acceleration", self.acceleration),
            ("merge_threshold", self.merge_threshold),
            ("merge_acceleration", self.merge_acceleration),
            ("digit_round", self.digit_round),
            ("digit_thickness", self.digit_thickness),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return invalid(field, "must be a finite, non-negative number");
            }
        }
        Ok(())
    }

    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Side length of a spatial block in pixels for the given layout unit.
    /// Rounded up to a multiple of 8 to match the renderer's workgroup size.
    pub fn block_size(&self, unit: f32) -> u32 {
        let raw = self.pixel_threshold * unit / self.block_ratio.max(1) as f32 / 8.0;
        if !(raw > 0.0) {
            return 0;
        }
        raw.ceil() as u32 * 8
    }
}
