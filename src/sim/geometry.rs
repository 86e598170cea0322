//! Seven-segment geometry
//!
//! Coordinates are y-up pixels. Segment indices within a digit:
//! - 0: bottom bar, 3: middle bar, 6: top bar
//! - 1: lower left, 4: upper left
//! - 2: lower right, 5: upper right

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ClockError, Result};
use crate::settings::Settings;

/// Lit segments per digit value, in ball assignment order.
///
/// The order is part of the behaviour: during a transition balls are handed
/// out to segments in this order, which keeps pairings stable.
pub const SEGMENT_INDICES: [&[usize]; 10] = [
    &[6, 5, 2, 0, 1, 4],    // 0
    &[5, 2],                // 1
    &[6, 5, 3, 1, 0],       // 2
    &[6, 5, 3, 2, 0],       // 3
    &[4, 3, 5, 2],          // 4
    &[6, 4, 3, 2, 0],       // 5
    &[6, 4, 3, 1, 2, 0],    // 6
    &[6, 5, 2],             // 7
    &[6, 5, 4, 3, 2, 1, 0], // 8
    &[6, 4, 5, 3, 2],       // 9
];

/// A straight stroke between two points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineSegment {
    pub u: Vec2,
    pub v: Vec2,
}

impl LineSegment {
    pub const fn new(u: Vec2, v: Vec2) -> Self {
        Self { u, v }
    }

    /// Point on the segment for a patrol progress `t` in `[0, 2)`.
    /// Progress folds back so the point travels u -> v -> u.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        let folded = if t < 1.0 { t } else { PATROL_PERIOD - t };
        self.u + folded * (self.v - self.u)
    }

    pub fn length(&self) -> f32 {
        (self.v - self.u).length()
    }
}

/// A validated digit value (0-9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Lit segment indices in assignment order
    pub fn segments(self) -> &'static [usize] {
        SEGMENT_INDICES[self.0 as usize]
    }

    pub fn lit_count(self) -> usize {
        self.segments().len()
    }
}

impl TryFrom<u8> for Digit {
    type Error = ClockError;

    fn try_from(value: u8) -> Result<Self> {
        if value <= 9 {
            Ok(Self(value))
        } else {
            Err(ClockError::InvalidDigit { position: 0, value })
        }
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

/// The four digits on the clock face, hours then minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ClockDigits(pub [Digit; DIGIT_COUNT]);

impl ClockDigits {
    /// Validate raw digit values, reporting the first bad position
    pub fn new(values: [u8; DIGIT_COUNT]) -> Result<Self> {
        let mut digits = [Digit::default(); DIGIT_COUNT];
        for (position, (slot, value)) in digits.iter_mut().zip(values).enumerate() {
            *slot = Digit::try_from(value)
                .map_err(|_| ClockError::InvalidDigit { position, value })?;
        }
        Ok(Self(digits))
    }

    /// Digits for a 24-hour time of day
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(ClockError::InvalidTime { hour, minute });
        }
        Ok(Self([
            Digit((hour / 10) as u8),
            Digit((hour % 10) as u8),
            Digit((minute / 10) as u8),
            Digit((minute % 10) as u8),
        ]))
    }

    pub fn get(&self, position: usize) -> Digit {
        self.0[position]
    }

    /// Positions whose digit differs from `other`
    pub fn changed_positions(&self, other: &ClockDigits) -> Vec<usize> {
        (0..DIGIT_COUNT).filter(|&i| self.0[i] != other.0[i]).collect()
    }

    pub fn values(&self) -> [u8; DIGIT_COUNT] {
        self.0.map(Digit::value)
    }
}

impl std::fmt::Display for ClockDigits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.values();
        write!(f, "{a}{b}:{c}{d}")
    }
}

/// Inputs that determine the layout. Any change rebuilds layout and balls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutKey {
    pub width: f32,
    pub height: f32,
    pub balls_per_segment: usize,
    pub balls_per_dot: usize,
    pub ball_radius: f32,
    pub digit_gap: f32,
    pub digit_round: f32,
    pub digit_thickness: f32,
}

impl LayoutKey {
    pub fn new(width: f32, height: f32, settings: &Settings) -> Self {
        Self {
            width,
            height,
            balls_per_segment: settings.balls_per_segment,
            balls_per_dot: settings.balls_per_dot,
            ball_radius: settings.ball_radius,
            digit_gap: settings.digit_gap,
            digit_round: settings.digit_round,
            digit_thickness: settings.digit_thickness,
        }
    }
}

/// Pixel-space layout of the whole clock face
#[derive(Debug, Clone, PartialEq)]
pub struct ClockLayout {
    pub width: f32,
    pub height: f32,
    /// Digit height is two units, width one
    pub unit: f32,
    pub digits: [[LineSegment; SEGMENTS_PER_DIGIT]; DIGIT_COUNT],
}

impl ClockLayout {
    /// Lay out four digits centred in the viewport.
    /// Returns None for a degenerate viewport.
    pub fn compute(width: f32, height: f32, settings: &Settings) -> Option<Self> {
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        let gap = settings.digit_gap;
        let unit = (width / (4.0 + gap * 10.0)).min(height / (2.0 + gap * 2.0));
        if !(unit > 0.0) || !unit.is_finite() {
            return None;
        }

        let inset = settings.digit_round * unit * settings.digit_thickness;
        let dx = Vec2::new(inset, 0.0);
        let dy = Vec2::new(0.0, inset);
        let pitch = unit * (1.0 + gap * 2.0);

        let digits = std::array::from_fn(|i| {
            let mut center_x = width / 2.0;
            if i <= 1 {
                center_x -= pitch * (2 - i) as f32 - unit * 0.5;
            } else {
                center_x += pitch * (i - 1) as f32 - unit * 0.5;
            }
            let center = Vec2::new(center_x, height / 2.0);

            // Corners: even indices on the left, rows bottom to top
            let p: [Vec2; 6] = std::array::from_fn(|k| {
                let x = if k % 2 == 0 {
                    center.x - unit * 0.5
                } else {
                    center.x + unit * 0.5
                };
                Vec2::new(x, center.y + unit * ((k / 2) as f32 - 1.0))
            });

            [
                LineSegment::new(p[0] + dx, p[1] - dx),
                LineSegment::new(p[0] + dy, p[2] - dy),
                LineSegment::new(p[1] + dy, p[3] - dy),
                LineSegment::new(p[2] + dx, p[3] - dx),
                LineSegment::new(p[2] + dy, p[4] - dy),
                LineSegment::new(p[3] + dy, p[5] - dy),
                LineSegment::new(p[4] + dx, p[5] - dx),
            ]
        });

        Some(Self {
            width,
            height,
            unit,
            digits,
        })
    }

    /// Lit segments of `digit` at `position`, in assignment order, with their indices
    pub fn active_segments(&self, position: usize, digit: Digit) -> Vec<(usize, LineSegment)> {
        digit
            .segments()
            .iter()
            .map(|&index| (index, self.digits[position][index]))
            .collect()
    }

    /// All 28 candidate segments, digit-major
    pub fn all_segments(&self) -> Vec<LineSegment> {
        self.digits.iter().flatten().copied().collect()
    }

    /// Colon dot centres (upper, lower)
    pub fn dot_centers(&self) -> [Vec2; DOT_COUNT] {
        let center = Vec2::new(self.width / 2.0, self.height / 2.0);
        [
            center + Vec2::new(0.0, self.unit * 0.5),
            center - Vec2::new(0.0, self.unit * 0.5),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_table_shape() {
        let lit: Vec<usize> = SEGMENT_INDICES.iter().map(|s| s.len()).collect();
        assert_eq!(lit, vec![6, 2, 5, 5, 4, 5, 6, 3, 7, 5]);
        for segments in SEGMENT_INDICES {
            assert!(segments.iter().all(|&i| i < SEGMENTS_PER_DIGIT));
            let mut sorted = segments.to_vec();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), segments.len(), "duplicate segment in {segments:?}");
        }
    }

    #[test]
    fn test_point_at_folds_back() {
        let seg = LineSegment::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_eq!(seg.point_at(0.0), Vec2::ZERO);
        assert!((seg.point_at(0.5).x - 5.0).abs() < 1e-5);
        assert!((seg.point_at(1.0).x - 10.0).abs() < 1e-5);
        assert!((seg.point_at(1.5).x - 5.0).abs() < 1e-5);
        assert!(seg.point_at(1.99).x < 0.2);
    }

    #[test]
    fn test_digit_rejects_out_of_range() {
        assert!(Digit::try_from(9).is_ok());
        assert!(Digit::try_from(10).is_err());

        let err = ClockDigits::new([1, 2, 13, 4]).unwrap_err();
        assert!(matches!(
            err,
            ClockError::InvalidDigit {
                position: 2,
                value: 13
            }
        ));
    }

    #[test]
    fn test_digits_from_time() {
        let digits = ClockDigits::from_hm(9, 47).unwrap();
        assert_eq!(digits.values(), [0, 9, 4, 7]);
        assert_eq!(digits.to_string(), "09:47");
        assert!(ClockDigits::from_hm(24, 0).is_err());
        assert!(ClockDigits::from_hm(12, 60).is_err());
    }

    #[test]
    fn test_changed_positions() {
        let a = ClockDigits::new([1, 2, 3, 4]).unwrap();
        let b = ClockDigits::new([1, 3, 3, 5]).unwrap();
        assert_eq!(a.changed_positions(&b), vec![1, 3]);
        assert!(a.changed_positions(&a).is_empty());
    }

    #[test]
    fn test_digit_serde_validates() {
        let digits: ClockDigits = serde_json::from_str("[0, 7, 4, 8]").unwrap();
        assert_eq!(digits.values(), [0, 7, 4, 8]);
        assert!(serde_json::from_str::<ClockDigits>("[0, 7, 4, 11]").is_err());
    }

    #[test]
    fn test_layout_degenerate_viewport() {
        let settings = Settings::default();
        assert!(ClockLayout::compute(0.0, 600.0, &settings).is_none());
        assert!(ClockLayout::compute(800.0, 0.0, &settings).is_none());
    }

    #[test]
    fn test_layout_fits_viewport() {
        let settings = Settings::default();
        let layout = ClockLayout::compute(1200.0, 600.0, &settings).unwrap();
        // width-limited: 1200 / 6 = 200, height-limited: 600 / 2.4 = 250
        assert!((layout.unit - 200.0).abs() < 1e-3);

        for seg in layout.all_segments() {
            for p in [seg.u, seg.v] {
                assert!(p.x >= 0.0 && p.x <= 1200.0, "{p:?}");
                assert!(p.y >= 0.0 && p.y <= 600.0, "{p:?}");
            }
        }
        assert_eq!(layout.all_segments().len(), DIGIT_COUNT * SEGMENTS_PER_DIGIT);
    }

    #[test]
    fn test_layout_digits_are_ordered_and_symmetric() {
        let settings = Settings::default();
        let layout = ClockLayout::compute(1200.0, 600.0, &settings).unwrap();
        let centers: Vec<f32> = layout
            .digits
            .iter()
            .map(|d| (d[3].u.x + d[3].v.x) / 2.0)
            .collect();
        assert!(centers.windows(2).all(|w| w[0] < w[1]));
        // Mirror symmetry around the colon
        assert!((600.0 - centers[1] - (centers[2] - 600.0)).abs() < 1e-3);
        assert!((600.0 - centers[0] - (centers[3] - 600.0)).abs() < 1e-3);
    }

    #[test]
    fn test_segment_insets() {
        let settings = Settings::default();
        let layout = ClockLayout::compute(1200.0, 600.0, &settings).unwrap();
        let inset = settings.digit_round * layout.unit * settings.digit_thickness;
        let top = layout.digits[0][6];
        let right = layout.digits[0][5];
        // Horizontal bars shrink along x, vertical bars along y
        assert!((top.length() - (layout.unit - 2.0 * inset)).abs() < 1e-3);
        assert!((right.length() - (layout.unit - 2.0 * inset)).abs() < 1e-3);
        assert_eq!(top.u.y, top.v.y);
        assert_eq!(right.u.x, right.v.x);
        assert!(top.u.y > layout.digits[0][0].u.y);
    }

    #[test]
    fn test_active_segments_follow_table_order() {
        let layout = ClockLayout::compute(1200.0, 600.0, &Settings::default()).unwrap();
        let seven = Digit::try_from(7).unwrap();
        let active = layout.active_segments(2, seven);
        let indices: Vec<usize> = active.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![6, 5, 2]);
        assert_eq!(active[0].1, layout.digits[2][6]);
    }

    #[test]
    fn test_dot_centers() {
        let layout = ClockLayout::compute(1200.0, 600.0, &Settings::default()).unwrap();
        let [upper, lower] = layout.dot_centers();
        assert_eq!(upper.x, 600.0);
        assert!(upper.y > lower.y);
        assert!((upper.y - lower.y - layout.unit).abs() < 1e-3);
    }
}
