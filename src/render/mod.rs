//! Renderer-facing output
//!
//! The density-field rasterizer itself lives outside this crate; this module
//! packages a settled frame into GPU-ready buffers for it.

pub mod frame;

pub use frame::{FrameData, Globals, SegmentData};
