//! Metaballs and the arena that owns them

use glam::Vec2;
use rand::Rng;

use super::geometry::LineSegment;
use crate::consts::*;

/// Stable handle to a ball slot in a [`BallArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(pub u32);

/// What a ball is steering toward
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BallMode {
    /// Oscillating along a segment; `t` in [0, 2) folds to u -> v -> u
    Patrol { segment: LineSegment, t: f32 },
    /// Homing in on another ball to merge with it
    Chase { target: BallId },
}

/// A single blob of the density field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaBall {
    pub pos: Vec2,
    pub vel: Vec2,
    pub target_point: Vec2,
    pub radius: f32,
    pub target_radius: f32,
    pub mode: BallMode,
}

impl MetaBall {
    /// A resting ball patrolling `segment` from a random phase
    pub fn patrolling(pos: Vec2, segment: LineSegment, radius: f32, rng: &mut impl Rng) -> Self {
        let t = rng.random_range(0.0..PATROL_PERIOD);
        Self {
            pos,
            vel: Vec2::ZERO,
            target_point: segment.point_at(t),
            radius,
            target_radius: radius,
            mode: BallMode::Patrol { segment, t },
        }
    }

    /// Start patrolling a segment at a random phase
    pub fn assign_segment(&mut self, segment: LineSegment, rng: &mut impl Rng) {
        let t = rng.random_range(0.0..PATROL_PERIOD);
        self.mode = BallMode::Patrol { segment, t };
        self.target_point = segment.point_at(t);
    }

    /// Drop any patrol and home in on `target`
    pub fn chase(&mut self, target: BallId) {
        self.mode = BallMode::Chase { target };
    }

    pub fn chase_target(&self) -> Option<BallId> {
        match self.mode {
            BallMode::Chase { target } => Some(target),
            BallMode::Patrol { .. } => None,
        }
    }

    pub fn is_patrolling(&self) -> bool {
        matches!(self.mode, BallMode::Patrol { .. })
    }

    /// Advance patrol progress and refresh the target point
    pub fn advance_patrol(&mut self, distance: f32) {
        if let BallMode::Patrol { segment, t } = &mut self.mode {
            *t = (*t + distance).rem_euclid(PATROL_PERIOD);
            self.target_point = segment.point_at(*t);
        }
    }

    /// Halve the ball's mass (used when splitting)
    pub fn halve(&mut self) {
        self.radius /= 2.0;
        self.target_radius /= 2.0;
    }

    /// Seek the target point, damp, integrate and bounce off the viewport edges
    pub fn step(&mut self, bounds: Vec2, acceleration: f32, drag: f32, unit: f32, dt: f32) {
        let dir = (self.target_point - self.pos).normalize_or_zero();
        self.vel += dir * acceleration * unit * dt;
        self.vel *= 1.0 - drag * dt;
        self.pos += self.vel * dt;
        self.reflect(bounds);
    }

    /// Clamp into [0, bounds] and flip the offending velocity component
    pub fn reflect(&mut self, bounds: Vec2) {
        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = -self.vel.x;
        }
        if self.pos.x > bounds.x {
            self.pos.x = bounds.x;
            self.vel.x = -self.vel.x;
        }
        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = -self.vel.y;
        }
        if self.pos.y > bounds.y {
            self.pos.y = bounds.y;
            self.vel.y = -self.vel.y;
        }
    }

    /// Relax the radius toward the target radius without overshooting
    pub fn resize(&mut self, correction_rate: f32, dt: f32) {
        let step = self.target_radius * correction_rate * dt;
        if self.radius > self.target_radius {
            self.radius = (self.radius - step).max(self.target_radius);
        } else if self.radius < self.target_radius {
            self.radius = (self.radius + step).min(self.target_radius);
        }
    }

    /// Fold `other` into this ball: meet halfway and add up the mass
    pub fn absorb(&mut self, other: &MetaBall) {
        self.pos = (self.pos + other.pos) / 2.0;
        self.radius += other.radius;
        self.target_radius += other.target_radius;
    }
}

/// Slot storage with a free list. Handles stay valid until the ball is removed.
#[derive(Debug, Clone, Default)]
pub struct BallArena {
    slots: Vec<Option<MetaBall>>,
    free: Vec<u32>,
    live: usize,
}

impl BallArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ball: MetaBall) -> BallId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(ball);
            BallId(index)
        } else {
            self.slots.push(Some(ball));
            BallId((self.slots.len() - 1) as u32)
        }
    }

    pub fn remove(&mut self, id: BallId) -> Option<MetaBall> {
        let ball = self.slots.get_mut(id.0 as usize)?.take()?;
        self.free.push(id.0);
        self.live -= 1;
        Some(ball)
    }

    pub fn get(&self, id: BallId) -> Option<&MetaBall> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: BallId) -> Option<&mut MetaBall> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn contains(&self, id: BallId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Live balls in slot order
    pub fn iter(&self) -> impl Iterator<Item = (BallId, &MetaBall)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|ball| (BallId(i as u32), ball)))
    }
}
