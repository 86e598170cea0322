//! Per-frame simulation tick
//!
//! One call runs a whole frame to completion: layout refresh, digit change,
//! kinetics for every ball, merge resolution.

use glam::Vec2;
use rand::Rng;

use super::ball::{BallArena, BallId};
use super::geometry::ClockDigits;
use super::state::ClockState;
use crate::consts::*;

/// Host inputs for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Viewport width in pixels
    pub width: f32,
    /// Viewport height in pixels
    pub height: f32,
    /// Digits that should be on display. None keeps the current ones.
    pub digits: Option<ClockDigits>,
}

impl TickInput {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            digits: None,
        }
    }

    pub fn with_digits(mut self, digits: ClockDigits) -> Self {
        self.digits = Some(digits);
        self
    }
}

/// Advance the clock by `dt` seconds
pub fn tick(state: &mut ClockState, input: &TickInput, dt: f32) {
    state.refresh_layout(input.width, input.height);

    if let Some(digits) = input.digits {
        if digits != state.digits {
            state.set_digits(digits);
        }
    }

    state.frames += 1;
    integrate(state, dt);
}

/// Move every ball one step.
///
/// Patrolling balls go first so chasers home in on this frame's positions.
/// Catches are only detected once every chaser has moved, then resolved in
/// registry order.
pub fn integrate(state: &mut ClockState, dt: f32) {
    let Some(layout) = &state.layout else {
        return;
    };
    let unit = layout.unit;
    let bounds = Vec2::new(layout.width, layout.height);
    let settings = &state.settings;
    let arena = &mut state.arena;
    let rng = &mut state.rng;

    // Segment patrols (digits and colon)
    let patrols = state
        .rosters
        .iter()
        .flatten()
        .flat_map(|group| group.balls.iter())
        .chain(state.dots.iter());
    for &id in patrols {
        let Some(ball) = arena.get_mut(id) else {
            continue;
        };
        let jitter = rng.random::<f32>() * PATROL_JITTER;
        ball.advance_patrol(settings.target_move_speed * dt * (1.0 + jitter));
        ball.step(bounds, settings.acceleration, settings.drag, unit, dt);
        ball.resize(settings.correction_rate, dt);
    }

    // Chasers seek their target's current position, slowing on approach
    for &id in &state.chasers {
        let Some(target) = arena.get(id).and_then(|b| b.chase_target()) else {
            continue;
        };
        let Some(target_pos) = arena.get(target).map(|t| t.pos) else {
            continue;
        };
        let Some(ball) = arena.get_mut(id) else {
            continue;
        };
        ball.target_point = target_pos;
        let acceleration = settings
            .acceleration
            .min(ball.pos.distance(target_pos) * settings.merge_acceleration);
        ball.step(bounds, acceleration, settings.drag, unit, dt);
        ball.resize(settings.correction_rate, dt);
    }

    let catch_distance = unit * settings.ball_radius * settings.merge_threshold;
    let caught: Vec<(BallId, BallId)> = state
        .chasers
        .iter()
        .filter_map(|&id| {
            let ball = arena.get(id)?;
            let target = ball.chase_target()?;
            let distance = ball.pos.distance(arena.get(target)?.pos);
            (distance < catch_distance).then_some((id, target))
        })
        .collect();

    state.merges += resolve_catches(arena, &mut state.chasers, &caught) as u64;
}

/// Merge each caught chaser into its target and drop it from the registry.
///
/// Chasers that were following an absorbed ball are handed over to the
/// absorber. A catch whose chaser got handed over earlier in the same pass
/// waits for the next frame. Returns the number of merges applied.
fn resolve_catches(arena: &mut BallArena, chasers: &mut Vec<BallId>, caught: &[(BallId, BallId)]) -> usize {
    let mut merged = 0;
    for &(chaser, target) in caught {
        let still_valid = arena.get(chaser).and_then(|b| b.chase_target()) == Some(target)
            && arena.contains(target);
        if !still_valid {
            continue;
        }
        let Some(ball) = arena.remove(chaser) else {
            continue;
        };
        if let Some(absorber) = arena.get_mut(target) {
            absorber.absorb(&ball);
        }
        for &other in chasers.iter() {
            if let Some(follower) = arena.get_mut(other) {
                if follower.chase_target() == Some(chaser) {
                    follower.chase(target);
                }
            }
        }
        log::trace!("Ball {} merged into {}", chaser.0, target.0);
        merged += 1;
    }
    chasers.retain(|&id| arena.contains(id));
    merged
}
