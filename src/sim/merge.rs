//! Merge decomposition
//!
//! Splits a ball-count deficit into merge groups of 2, 3 or 4 balls. A group
//! of k balls collapses into one, removing k - 1. Groups are kept as small as
//! possible; four is the cap because larger pile-ups stop looking like a merge.

/// How many merge groups of each size close a count gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergePlan {
    /// Groups of two (one chaser each)
    pub doubles: usize,
    /// Groups of three (two chasers each)
    pub triples: usize,
    /// Groups of four (three chasers each)
    pub quads: usize,
}

impl MergePlan {
    pub fn group_count(&self) -> usize {
        self.doubles + self.triples + self.quads
    }

    /// Balls that disappear once every group has merged
    pub fn balls_removed(&self) -> usize {
        self.doubles + 2 * self.triples + 3 * self.quads
    }

    /// Balls taking part in a merge (survivors included)
    pub fn balls_consumed(&self) -> usize {
        self.balls_removed() + self.group_count()
    }

    /// Chaser count per group: all doubles first, then triples, then quads
    pub fn groups(&self) -> impl Iterator<Item = usize> {
        std::iter::repeat_n(1, self.doubles)
            .chain(std::iter::repeat_n(2, self.triples))
            .chain(std::iter::repeat_n(3, self.quads))
    }
}

/// Plan the merges that take `old_count` balls down to `new_count`.
///
/// # Panics
/// When `new_count > old_count`, or when the gap is too wide for groups of
/// four (`old_count > 4 * new_count`). Both are caller bugs; seven-segment
/// transitions never exceed a 7:2 ratio.
pub fn decompose(old_count: usize, new_count: usize) -> MergePlan {
    assert!(
        new_count <= old_count,
        "merge decomposition cannot grow {old_count} balls to {new_count}"
    );
    assert!(
        old_count <= new_count * 4,
        "cannot merge {old_count} balls into {new_count} with groups of at most four"
    );

    let mut plan = MergePlan::default();
    let (mut old, mut new) = (old_count, new_count);
    loop {
        if new * 2 >= old {
            plan.doubles += old - new;
            return plan;
        } else if new * 3 >= old {
            plan.triples += 1;
            old -= 3;
        } else {
            plan.quads += 1;
            old -= 4;
        }
        new -= 1;
    }
}
