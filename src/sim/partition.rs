//! Spatial bucketing for density-field evaluation
//!
//! Balls are sorted into a row-major grid of square blocks so the field
//! evaluator only has to visit the blocks around each pixel. The block size
//! must leave every ball's influence inside the evaluator's search range.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// A ball as the field evaluator sees it (must match shader layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BallPoint {
    pub pos: [f32; 2],
    pub radius: f32,
}

impl BallPoint {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos: pos.to_array(),
            radius,
        }
    }
}

/// Balls grouped by block, with per-block `(start, length)` ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialBuckets {
    /// Block side in pixels
    pub block_size: u32,
    pub num_x_blocks: u32,
    pub num_y_blocks: u32,
    /// All balls, contiguous per block
    pub balls: Vec<BallPoint>,
    pub start_indices: Vec<u32>,
    pub lengths: Vec<u32>,
}

impl SpatialBuckets {
    /// Counting-sort `points` into blocks covering a `width` x `height` viewport.
    /// Points on or past the far edge land in the last row/column.
    pub fn build(points: &[BallPoint], width: f32, height: f32, block_size: u32) -> Self {
        if block_size == 0 || !(width > 0.0 && height > 0.0) {
            return Self {
                block_size,
                ..Default::default()
            };
        }

        let num_x_blocks = (width / block_size as f32).ceil() as u32;
        let num_y_blocks = (height / block_size as f32).ceil() as u32;
        let block_count = (num_x_blocks * num_y_blocks) as usize;

        let block_of = |p: &BallPoint| -> usize {
            let x = ((p.pos[0].max(0.0) as u32) / block_size).min(num_x_blocks - 1);
            let y = ((p.pos[1].max(0.0) as u32) / block_size).min(num_y_blocks - 1);
            (y * num_x_blocks + x) as usize
        };

        // Count per block
        let mut lengths = vec![0u32; block_count];
        for p in points {
            lengths[block_of(p)] += 1;
        }

        // Prefix sum
        let mut start_indices = vec![0u32; block_count];
        let mut sum = 0;
        for (start, len) in start_indices.iter_mut().zip(&lengths) {
            *start = sum;
            sum += len;
        }

        // Scatter, keeping input order inside a block
        let mut cursor = start_indices.clone();
        let mut balls = vec![BallPoint::zeroed(); points.len()];
        for p in points {
            let block = block_of(p);
            balls[cursor[block] as usize] = *p;
            cursor[block] += 1;
        }

        Self {
            block_size,
            num_x_blocks,
            num_y_blocks,
            balls,
            start_indices,
            lengths,
        }
    }

    pub fn block_count(&self) -> usize {
        self.lengths.len()
    }

    /// Balls in block (x, y)
    pub fn block(&self, x: u32, y: u32) -> &[BallPoint] {
        if x >= self.num_x_blocks || y >= self.num_y_blocks {
            return &[];
        }
        let index = (y * self.num_x_blocks + x) as usize;
        let start = self.start_indices[index] as usize;
        &self.balls[start..start + self.lengths[index] as usize]
    }

    /// Fullest block population, for diagnostics
    pub fn max_occupancy(&self) -> u32 {
        self.lengths.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32) -> BallPoint {
        BallPoint::new(Vec2::new(x, y), 1.0)
    }

    #[test]
    fn test_grid_dimensions_round_up() {
        let buckets = SpatialBuckets::build(&[], 100.0, 50.0, 32);
        assert_eq!(buckets.num_x_blocks, 4);
        assert_eq!(buckets.num_y_blocks, 2);
        assert_eq!(buckets.block_count(), 8);
        assert!(buckets.balls.is_empty());
    }

    #[test]
    fn test_points_land_in_row_major_blocks() {
        let points = [point(5.0, 5.0), point(40.0, 5.0), point(5.0, 40.0), point(10.0, 10.0)];
        let buckets = SpatialBuckets::build(&points, 64.0, 64.0, 32);

        assert_eq!(buckets.lengths, vec![2, 1, 1, 0]);
        assert_eq!(buckets.start_indices, vec![0, 2, 3, 4]);
        assert_eq!(buckets.block(0, 0), &[points[0], points[3]]);
        assert_eq!(buckets.block(1, 0), &[points[1]]);
        assert_eq!(buckets.block(0, 1), &[points[2]]);
        assert!(buckets.block(1, 1).is_empty());
        assert!(buckets.block(5, 5).is_empty());
        assert_eq!(buckets.max_occupancy(), 2);
    }

    #[test]
    fn test_far_edge_is_clamped_into_grid() {
        // Width is an exact multiple of the block size
        let points = [point(64.0, 64.0), point(0.0, 0.0)];
        let buckets = SpatialBuckets::build(&points, 64.0, 64.0, 32);
        assert_eq!(buckets.block(1, 1), &[points[0]]);
        assert_eq!(buckets.balls.len(), 2);
    }

    #[test]
    fn test_ranges_cover_every_ball_once() {
        let points: Vec<BallPoint> = (0..200)
            .map(|i| point((i * 37 % 640) as f32, (i * 91 % 480) as f32))
            .collect();
        let buckets = SpatialBuckets::build(&points, 640.0, 480.0, 48);

        let total: u32 = buckets.lengths.iter().sum();
        assert_eq!(total as usize, points.len());
        for i in 1..buckets.block_count() {
            assert_eq!(
                buckets.start_indices[i],
                buckets.start_indices[i - 1] + buckets.lengths[i - 1]
            );
        }
        for y in 0..buckets.num_y_blocks {
            for x in 0..buckets.num_x_blocks {
                for p in buckets.block(x, y) {
                    assert_eq!(p.pos[0] as u32 / 48, x);
                    assert_eq!(p.pos[1] as u32 / 48, y);
                }
            }
        }
    }

    #[test]
    fn test_zero_block_size_yields_empty_grid() {
        let buckets = SpatialBuckets::build(&[point(1.0, 1.0)], 64.0, 64.0, 0);
        assert_eq!(buckets.block_count(), 0);
        assert!(buckets.balls.is_empty());
    }

    #[test]
    fn test_ball_point_is_three_floats() {
        assert_eq!(std::mem::size_of::<BallPoint>(), 12);
        let points = [point(1.0, 2.0)];
        let bytes: &[u8] = bytemuck::cast_slice(&points);
        assert_eq!(bytes.len(), 12);
    }
}
