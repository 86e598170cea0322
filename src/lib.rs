//! Metaball Clock - a seven-segment clock drawn with fluid metaballs
//!
//! Core modules:
//! - `sim`: Ball population and kinetics (layout, transitions, merges, motion, buckets)
//! - `render`: GPU-ready frame snapshot for an external density-field evaluator
//! - `settings`: Tunables, JSON presets
//! - `error`: Boundary errors

pub mod error;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::{ClockError, Result};
pub use settings::Settings;

/// Clock configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Digit positions on the clock face (HH:MM)
    pub const DIGIT_COUNT: usize = 4;
    /// Candidate strokes of a seven-segment glyph
    pub const SEGMENTS_PER_DIGIT: usize = 7;
    /// Colon dots between hours and minutes
    pub const DOT_COUNT: usize = 2;

    pub const DEFAULT_BALLS_PER_SEGMENT: usize = 10;
    pub const DEFAULT_BALLS_PER_DOT: usize = 5;

    /// Upper bound of the random speed-up applied to patrol progress each step
    pub const PATROL_JITTER: f32 = 0.1;
    /// Patrol progress period: 0 -> 1 walks u->v, 1 -> 2 walks back
    pub const PATROL_PERIOD: f32 = 2.0;
    /// Dot patrol segments lie on a circle of this many gap-units around the dot centre
    pub const DOT_SPREAD: f32 = 0.25;
}
