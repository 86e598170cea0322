//! Clock simulation state
//!
//! Owns every ball, the per-digit rosters, the chase registry and the RNG.
//! All mutation happens inside [`super::tick`] or a digit transition, so a
//! renderer always reads a settled snapshot.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ball::{BallArena, BallId, MetaBall};
use super::geometry::{ClockDigits, ClockLayout, LayoutKey, LineSegment};
use crate::consts::*;
use crate::settings::Settings;

/// The balls patrolling one lit segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGroup {
    /// Index into the digit's seven candidate segments
    pub segment_index: usize,
    pub segment: LineSegment,
    pub balls: Vec<BallId>,
}

/// Complete clock state
#[derive(Debug, Clone)]
pub struct ClockState {
    /// Seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) settings: Settings,
    /// Digits currently on display
    pub(crate) digits: ClockDigits,
    pub(crate) layout: Option<ClockLayout>,
    layout_key: Option<LayoutKey>,
    pub(crate) arena: BallArena,
    /// Lit segment groups per digit position, in table order
    pub(crate) rosters: [Vec<SegmentGroup>; DIGIT_COUNT],
    /// Colon dot balls, upper dot first
    pub(crate) dots: Vec<BallId>,
    /// Chase registry, in registration order
    pub(crate) chasers: Vec<BallId>,
    /// Simulation frame counter
    pub frames: u64,
    /// Chases resolved since creation
    pub merges: u64,
}

impl ClockState {
    /// Create a state showing `digits`. Balls appear on the first layout refresh.
    pub fn new(seed: u64, settings: Settings, digits: ClockDigits) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            digits,
            layout: None,
            layout_key: None,
            arena: BallArena::new(),
            rosters: Default::default(),
            dots: Vec::new(),
            chasers: Vec::new(),
            frames: 0,
            merges: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the tunables. A change to any layout-relevant tunable regenerates
    /// the population right away on the current viewport, so rosters always
    /// match `balls_per_segment`.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Some(key) = self.layout_key {
            self.refresh_layout(key.width, key.height);
        }
    }

    pub fn digits(&self) -> ClockDigits {
        self.digits
    }

    pub fn layout(&self) -> Option<&ClockLayout> {
        self.layout.as_ref()
    }

    /// Layout unit, or 0 when the viewport is degenerate
    pub fn unit(&self) -> f32 {
        self.layout.as_ref().map_or(0.0, |l| l.unit)
    }

    pub fn rosters(&self, position: usize) -> &[SegmentGroup] {
        &self.rosters[position]
    }

    pub fn dots(&self) -> &[BallId] {
        &self.dots
    }

    pub fn chasers(&self) -> &[BallId] {
        &self.chasers
    }

    pub fn ball(&self, id: BallId) -> Option<&MetaBall> {
        self.arena.get(id)
    }

    /// Every live ball, chasers included
    pub fn ball_count(&self) -> usize {
        self.arena.len()
    }

    /// Patrolling balls assigned to a digit position
    pub fn roster_count(&self, position: usize) -> usize {
        self.rosters[position].iter().map(|g| g.balls.len()).sum()
    }

    /// Roster balls first (digit by digit, segment by segment), then dots, then chasers
    pub fn render_order(&self) -> impl Iterator<Item = &MetaBall> {
        self.rosters
            .iter()
            .flatten()
            .flat_map(|group| group.balls.iter())
            .chain(self.dots.iter())
            .chain(self.chasers.iter())
            .filter_map(|&id| self.arena.get(id))
    }

    /// Summed target radius over all balls
    pub fn total_target_radius(&self) -> f32 {
        self.arena.iter().map(|(_, b)| b.target_radius).sum()
    }

    /// Summed current radius over all balls
    pub fn total_radius(&self) -> f32 {
        self.arena.iter().map(|(_, b)| b.radius).sum()
    }

    /// Recompute the layout when the viewport or layout tunables changed.
    /// A new layout regenerates every ball. Returns true if anything changed.
    pub fn refresh_layout(&mut self, width: f32, height: f32) -> bool {
        let key = LayoutKey::new(width, height, &self.settings);
        if self.layout_key == Some(key) {
            return false;
        }
        self.layout_key = Some(key);
        self.layout = ClockLayout::compute(width, height, &self.settings);

        match &self.layout {
            Some(layout) => log::info!(
                "Layout {}x{} (unit {:.1}), regenerating balls for {}",
                width,
                height,
                layout.unit,
                self.digits
            ),
            None => log::warn!("Degenerate viewport {}x{}, clock hidden", width, height),
        }
        self.generate_balls();
        true
    }

    /// Throw away every ball and scatter a fresh population for the current digits
    pub(crate) fn generate_balls(&mut self) {
        self.arena.clear();
        self.chasers.clear();
        self.dots.clear();
        for roster in &mut self.rosters {
            roster.clear();
        }

        let Some(layout) = self.layout.clone() else {
            return;
        };
        let radius = self.settings.ball_radius * layout.unit;
        let bounds = Vec2::new(layout.width, layout.height);

        for position in 0..DIGIT_COUNT {
            let digit = self.digits.get(position);
            for (segment_index, segment) in layout.active_segments(position, digit) {
                let balls = (0..self.settings.balls_per_segment)
                    .map(|_| {
                        let pos = random_point(&mut self.rng, bounds);
                        let ball = MetaBall::patrolling(pos, segment, radius, &mut self.rng);
                        self.arena.insert(ball)
                    })
                    .collect();
                self.rosters[position].push(SegmentGroup {
                    segment_index,
                    segment,
                    balls,
                });
            }
        }

        let spread = layout.unit * self.settings.digit_gap * DOT_SPREAD;
        for center in layout.dot_centers() {
            for _ in 0..self.settings.balls_per_dot {
                let segment = LineSegment::new(
                    center + random_direction(&mut self.rng) * spread,
                    center + random_direction(&mut self.rng) * spread,
                );
                let pos = random_point(&mut self.rng, bounds);
                let ball = MetaBall::patrolling(pos, segment, radius, &mut self.rng);
                self.dots.push(self.arena.insert(ball));
            }
        }

        log::debug!(
            "Generated {} balls ({} dots)",
            self.arena.len(),
            self.dots.len()
        );
    }

    /// A fresh ball at a random viewport position, patrolling nothing in particular yet
    pub(crate) fn spawn_loose_ball(&mut self) -> Option<BallId> {
        let layout = self.layout.as_ref()?;
        let bounds = Vec2::new(layout.width, layout.height);
        let radius = self.settings.ball_radius * layout.unit;
        let pos = random_point(&mut self.rng, bounds);
        let parking = LineSegment::new(pos, pos);
        let ball = MetaBall::patrolling(pos, parking, radius, &mut self.rng);
        Some(self.arena.insert(ball))
    }
}

/// Uniform point in [0, bounds]
pub(crate) fn random_point(rng: &mut Pcg32, bounds: Vec2) -> Vec2 {
    Vec2::new(
        rng.random::<f32>() * bounds.x,
        rng.random::<f32>() * bounds.y,
    )
}

/// Uniform unit vector
pub(crate) fn random_direction(rng: &mut Pcg32) -> Vec2 {
    Vec2::from_angle(rng.random_range(0.0..std::f32::consts::TAU))
}
