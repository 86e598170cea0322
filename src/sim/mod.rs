//! Ball population and kinetics
//!
//! Everything that decides where balls are lives here. Like any frame-driven
//! simulation it must stay free of rendering and platform code:
//! - One `tick` per frame, run to completion
//! - Seeded RNG only
//! - Stable iteration order (rosters, then dots, then chase registry)

pub mod ball;
pub mod geometry;
pub mod merge;
pub mod partition;
pub mod state;
pub mod tick;
pub mod transition;

pub use ball::{BallArena, BallId, BallMode, MetaBall};
pub use geometry::{ClockDigits, ClockLayout, Digit, LayoutKey, LineSegment, SEGMENT_INDICES};
pub use merge::{MergePlan, decompose};
pub use partition::{BallPoint, SpatialBuckets};
pub use state::{ClockState, SegmentGroup};
pub use tick::{TickInput, integrate, tick};
