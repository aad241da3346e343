//! Per-call scratch memory for the scoring phase.
//!
//! The arena holds one [`Activation`] slot per category index, each with a
//! preallocated intersection buffer of length 2M. Slot `j` is only ever
//! written by the worker scoring category `j`, so workers never alias.
//! A call borrows the slots through a [`Lease`], which hands them back when
//! dropped: on reinforcement, on commit, and on the read-only path alike.

use std::ops::{Deref, DerefMut};

/// Scoring result for one category within one call.
#[derive(Clone, Debug, PartialEq)]
pub struct Activation {
    /// Fuzzy intersection of the input and the prototype.
    pub fi: Vec<f64>,
    /// L1 norm of `fi`.
    pub fi_norm: f64,
    /// L1 norm of the prototype.
    pub w_norm: f64,
    /// Choice function value: `fi_norm / (alpha + w_norm)`.
    pub activation: f64,
    /// Category index this record describes.
    pub category: usize,
}

impl Activation {
    fn new(width: usize) -> Self {
        Self {
            fi: vec![0.0; width],
            fi_norm: 0.0,
            w_norm: 0.0,
            activation: 0.0,
            category: 0,
        }
    }
}

/// Acquire/release counters. `outstanding` is zero between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScratchStats {
    pub acquired: u64,
    pub released: u64,
    pub outstanding: u64,
    /// Slots allocated so far.
    pub capacity: usize,
}

#[derive(Debug)]
pub struct ScratchArena {
    width: usize,
    slots: Vec<Activation>,
    ranking: Vec<usize>,
    acquired: u64,
    released: u64,
}

impl ScratchArena {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            slots: Vec::new(),
            ranking: Vec::new(),
            acquired: 0,
            released: 0,
        }
    }

    /// Borrow `count` slots, allocating any that do not exist yet.
    pub fn lease(&mut self, count: usize) -> Lease<'_> {
        while self.slots.len() < count {
            self.slots.push(Activation::new(self.width));
        }
        self.ranking.clear();
        self.acquired += count as u64;
        Lease { arena: self, count }
    }

    pub fn stats(&self) -> ScratchStats {
        ScratchStats {
            acquired: self.acquired,
            released: self.released,
            outstanding: self.acquired - self.released,
            capacity: self.slots.len(),
        }
    }
}

/// Scoped borrow of the first `count` arena slots.
///
/// Derefs to the slots in category order. After [`rank`](Self::rank),
/// [`ranked`](Self::ranked) walks them in priority order.
#[derive(Debug)]
pub struct Lease<'a> {
    arena: &'a mut ScratchArena,
    count: usize,
}

impl Lease<'_> {
    /// Order slots by descending activation; equal activations go to the
    /// older (lower-index) category first.
    pub fn rank(&mut self) {
        let arena = &mut *self.arena;
        let slots = &arena.slots[..self.count];
        arena.ranking.clear();
        arena.ranking.extend(0..self.count);
        arena.ranking.sort_unstable_by(|&x, &y| {
            slots[y]
                .activation
                .total_cmp(&slots[x].activation)
                .then(x.cmp(&y))
        });
    }

    /// Slots in priority order. Empty until [`rank`](Self::rank) runs.
    pub fn ranked(&self) -> impl Iterator<Item = &Activation> {
        self.arena.ranking.iter().map(|&j| &self.arena.slots[j])
    }

    /// Highest-priority slot, if any.
    pub fn top(&self) -> Option<&Activation> {
        self.ranked().next()
    }
}

impl Deref for Lease<'_> {
    type Target = [Activation];

    fn deref(&self) -> &[Activation] {
        &self.arena.slots[..self.count]
    }
}

impl DerefMut for Lease<'_> {
    fn deref_mut(&mut self) -> &mut [Activation] {
        &mut self.arena.slots[..self.count]
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.arena.released += self.count as u64;
    }
}
