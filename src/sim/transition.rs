//! Digit transitions
//!
//! When the displayed digits change, the balls of every changed position are
//! pooled and redistributed over the new lit segments. Growing splits
//! existing balls, shrinking sends surplus balls chasing survivors. Balls
//! are never teleported in or deleted outright.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::ball::BallId;
use super::geometry::ClockDigits;
use super::merge::decompose;
use super::state::{ClockState, SegmentGroup};

impl ClockState {
    /// Show `new_digits`, redistributing the balls of every changed position
    pub fn set_digits(&mut self, new_digits: ClockDigits) {
        let changed = self.digits.changed_positions(&new_digits);
        if changed.is_empty() {
            return;
        }
        let Some(layout) = self.layout.clone() else {
            self.digits = new_digits;
            return;
        };
        let per_segment = self.settings.balls_per_segment;

        let mut pool: Vec<BallId> = Vec::new();
        for &position in &changed {
            for group in std::mem::take(&mut self.rosters[position]) {
                pool.extend(group.balls);
            }
        }
        let old_count = pool.len();
        let new_count: usize = changed
            .iter()
            .map(|&position| new_digits.get(position).lit_count() * per_segment)
            .sum();

        log::info!(
            "Digits {} -> {}: {} balls -> {}",
            self.digits,
            new_digits,
            old_count,
            new_count
        );

        if old_count <= new_count {
            self.grow(&mut pool, new_count - old_count);
        } else {
            pool = self.shrink(pool, new_count);
        }

        pool.shuffle(&mut self.rng);
        for &position in &changed {
            for (segment_index, segment) in layout.active_segments(position, new_digits.get(position)) {
                let mut balls = Vec::with_capacity(per_segment);
                for _ in 0..per_segment {
                    let Some(id) = pool.pop() else { break };
                    if let Some(ball) = self.arena.get_mut(id) {
                        ball.assign_segment(segment, &mut self.rng);
                    }
                    balls.push(id);
                }
                self.rosters[position].push(SegmentGroup {
                    segment_index,
                    segment,
                    balls,
                });
            }
        }
        debug_assert!(pool.is_empty(), "{} balls left unassigned", pool.len());

        self.digits = new_digits;
    }

    /// Split `count` random pool balls in half, clones joining the pool.
    /// Parents are always drawn from the balls that were in the pool before growing.
    fn grow(&mut self, pool: &mut Vec<BallId>, count: usize) {
        let originals = pool.len();
        for _ in 0..count {
            let clone = if originals == 0 {
                self.spawn_loose_ball()
            } else {
                let parent = pool[self.rng.random_range(0..originals)];
                self.split(parent)
            };
            pool.extend(clone);
        }
    }

    /// Halve `parent` and add an identical copy. Anything chasing the parent
    /// is split too, its copy chasing the parent's copy, so both halves carry
    /// the same pending mass.
    pub(crate) fn split(&mut self, parent: BallId) -> Option<BallId> {
        let ball = self.arena.get_mut(parent)?;
        ball.halve();
        let copy = *ball;
        let clone = self.arena.insert(copy);

        let followers: Vec<BallId> = self
            .chasers
            .iter()
            .copied()
            .filter(|&id| self.arena.get(id).and_then(|b| b.chase_target()) == Some(parent))
            .collect();
        for follower in followers {
            let Some(chaser) = self.arena.get_mut(follower) else {
                continue;
            };
            chaser.halve();
            let mut copy = *chaser;
            copy.chase(clone);
            let id = self.arena.insert(copy);
            self.chasers.push(id);
        }
        Some(clone)
    }

    /// Pair surplus balls off into chases. Returns the balls that stay on display.
    fn shrink(&mut self, mut merging: Vec<BallId>, new_count: usize) -> Vec<BallId> {
        let plan = decompose(merging.len(), new_count);
        log::debug!(
            "Merge plan: {} doubles, {} triples, {} quads",
            plan.doubles,
            plan.triples,
            plan.quads
        );

        let mut survivors = Vec::with_capacity(new_count);
        for chaser_count in plan.groups() {
            let share = (chaser_count + 1) as f32;

            let survivor = take_random(&mut merging, &mut self.rng);
            if let Some(ball) = self.arena.get_mut(survivor) {
                ball.target_radius /= share;
            }
            survivors.push(survivor);

            for _ in 0..chaser_count {
                let chaser = take_random(&mut merging, &mut self.rng);
                if let Some(ball) = self.arena.get_mut(chaser) {
                    ball.target_radius /= share;
                    ball.chase(survivor);
                }
                self.chasers.push(chaser);
            }
        }

        survivors.append(&mut merging);
        survivors
    }
}

/// Swap-remove a uniformly random element. `items` must not be empty.
fn take_random(items: &mut Vec<BallId>, rng: &mut Pcg32) -> BallId {
    let index = rng.random_range(0..items.len());
    items.swap_remove(index)
}
