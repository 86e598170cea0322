//! Frame snapshot for the density-field evaluator
//!
//! Everything an external rasterizer needs for one frame, laid out for direct
//! upload into storage/uniform buffers.

use bytemuck::{Pod, Zeroable};

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{BallPoint, ClockState, LineSegment, SpatialBuckets};

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2],    // offset 0
    pub block_size: u32,         // offset 8
    pub num_x_blocks: u32,       // offset 12
    pub num_y_blocks: u32,       // offset 16
    pub block_search_range: u32, // offset 20
    pub ball_count: u32,         // offset 24
    pub segment_count: u32,      // offset 28
    pub segment_thickness: f32,  // offset 32
    pub threshold: f32,          // offset 36
    pub _pad: [u32; 2],          // pad to 48 bytes for alignment
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SegmentData {
    pub u: [f32; 2],
    pub v: [f32; 2],
}

impl From<LineSegment> for SegmentData {
    fn from(segment: LineSegment) -> Self {
        Self {
            u: segment.u.to_array(),
            v: segment.v.to_array(),
        }
    }
}

// ============================================================================
// FRAME DATA
// ============================================================================

/// A settled, read-only view of one simulation frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameData {
    pub globals: Globals,
    pub buckets: SpatialBuckets,
    /// All 28 candidate segments, digit-major
    pub segments: Vec<SegmentData>,
}

impl FrameData {
    /// Package the current state. Chasers are included as balls of their own.
    pub fn capture(state: &ClockState, settings: &Settings) -> Self {
        let Some(layout) = state.layout() else {
            return Self::default();
        };

        let points: Vec<BallPoint> = state
            .render_order()
            .map(|ball| BallPoint::new(ball.pos, ball.radius))
            .collect();
        let block_size = settings.block_size(layout.unit);
        let buckets = SpatialBuckets::build(&points, layout.width, layout.height, block_size);
        let segments: Vec<SegmentData> = layout.all_segments().into_iter().map(Into::into).collect();

        let globals = Globals {
            resolution: [layout.width, layout.height],
            block_size: buckets.block_size,
            num_x_blocks: buckets.num_x_blocks,
            num_y_blocks: buckets.num_y_blocks,
            block_search_range: settings.block_ratio,
            ball_count: buckets.balls.len() as u32,
            segment_count: segments.len() as u32,
            segment_thickness: settings.digit_thickness,
            threshold: settings.pixel_threshold * layout.unit,
            _pad: [0; 2],
        };

        Self {
            globals,
            buckets,
            segments,
        }
    }

    pub fn globals_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.globals)
    }

    pub fn ball_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buckets.balls)
    }

    pub fn start_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buckets.start_indices)
    }

    pub fn length_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buckets.lengths)
    }

    pub fn segment_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.segments)
    }

    /// True when nothing is laid out (degenerate viewport)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Expected segment count when laid out
    pub const SEGMENT_COUNT: usize = DIGIT_COUNT * SEGMENTS_PER_DIGIT;
}
