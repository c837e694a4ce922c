use crate::{
    raptor::{AccessEgress, ArrivalId, ArrivalState, ArrivalView, Profile, arrival::ArrivalEntry},
    repository::Repository,
};
use bitvec::prelude::*;

/// A memory pool for the search state.
///
/// All buffers are sized once for a repository so a long running service can
/// reuse one allocator per thread instead of allocating on every query.
pub struct Allocator {
    /// The Arrival State Store.
    pub(crate) state: ArrivalState,
    /// The earliest boardable position for each pattern in the current round.
    pub(crate) active: Vec<u32>,
    pub(crate) active_mask: BitVec<usize, Lsb0>,
    /// Patterns set in `active_mask`, in activation order.
    pub(crate) active_patterns: Vec<u32>,
    /// Arrivals of the previous round that can board, grouped by stop.
    pub(crate) boarding: Vec<Vec<ArrivalId>>,
    pub(crate) boarding_stops: Vec<u32>,
    /// Egress paths leaving from each stop, as indices into the egress list.
    pub(crate) egress_by_stop: Vec<Vec<u32>>,
    /// Buffer used to batch candidate arrivals before applying them to the state.
    pub(crate) updates: Vec<ArrivalEntry>,
    /// Total number of stops in the associated repository.
    pub(crate) stop_count: usize,
    pub(crate) pattern_count: usize,
}

impl Allocator {
    /// Creates a new allocator sized for the given repository.
    ///
    /// # Warning
    /// The allocator must be used with the repository it was created for,
    /// searches check the sizes and refuse a mismatch.
    pub fn new(repository: &Repository) -> Self {
        let stop_count = repository.stops.len();
        let pattern_count = repository.patterns.len();
        Self {
            state: ArrivalState::new(stop_count),
            active: vec![u32::MAX; pattern_count],
            active_mask: bitvec!(usize, Lsb0; 0; pattern_count),
            active_patterns: Vec::with_capacity(64),
            boarding: vec![vec![]; stop_count],
            boarding_stops: Vec::with_capacity(64),
            egress_by_stop: vec![vec![]; stop_count],
            updates: Vec::with_capacity(1024),
            stop_count,
            pattern_count,
        }
    }

    pub(crate) fn fits(&self, repository: &Repository) -> bool {
        self.stop_count == repository.stops.len() && self.pattern_count == repository.patterns.len()
    }

    /// Resets the internal buffers to their initial state, allowing the allocator
    /// to be reused for a new search without re-allocating memory.
    pub fn reset(&mut self) {
        self.clear_active();
        self.updates.clear();
        self.egress_by_stop
            .iter_mut()
            .for_each(|egress| egress.clear());
    }

    /// Resets and loads a new query.
    pub(crate) fn prepare(
        &mut self,
        profile: Profile,
        rounds: usize,
        access: &[AccessEgress],
        egress: &[AccessEgress],
    ) {
        self.reset();
        self.state.prepare(profile, rounds, access, egress);
        egress.iter().enumerate().for_each(|(egress_idx, path)| {
            self.egress_by_stop[path.stop_idx as usize].push(egress_idx as u32)
        });
    }

    pub(crate) fn clear_active(&mut self) {
        for pattern_idx in self.active_patterns.drain(..) {
            self.active[pattern_idx as usize] = u32::MAX;
        }
        self.active_mask.fill(false);
        for stop_idx in self.boarding_stops.drain(..) {
            self.boarding[stop_idx as usize].clear();
        }
    }

    /// Marks a pattern for scanning from `position` on.
    #[inline(always)]
    pub(crate) fn activate(&mut self, pattern_idx: u32, position: u32) {
        let idx = pattern_idx as usize;
        if !self.active_mask[idx] {
            self.active_mask.set(idx, true);
            self.active_patterns.push(pattern_idx);
        }
        if position < self.active[idx] {
            self.active[idx] = position;
        }
    }

    #[inline(always)]
    pub(crate) fn add_boarding(&mut self, stop_idx: u32, id: ArrivalId) {
        let candidates = &mut self.boarding[stop_idx as usize];
        if candidates.is_empty() {
            self.boarding_stops.push(stop_idx);
        }
        candidates.push(id);
    }

    /// Applies the batched candidates in order. Returns how many were accepted.
    pub(crate) fn run_updates(&mut self) -> usize {
        let mut accepted = 0;
        for update in self.updates.drain(..) {
            if self.state.try_improve(update).is_some() {
                accepted += 1;
            }
        }
        accepted
    }

    pub fn state(&self) -> &ArrivalState {
        &self.state
    }

    /// The destination arrivals of the last search.
    pub fn best_known_arrivals(&self) -> Vec<ArrivalView<'_>> {
        self.state.best_known_arrivals()
    }

    /// Every arrival at a stop retained by the last search.
    pub fn arrivals_at(&self, stop_idx: u32) -> Vec<ArrivalView<'_>> {
        self.state.arrivals_at(stop_idx)
    }
}

pub(crate) struct LazyBuffer<T> {
    buffer: Option<Vec<T>>,
    capacity: usize,
}

impl<T> LazyBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: None,
            capacity,
        }
    }

    pub fn push(&mut self, value: T) {
        if let Some(buffer) = &mut self.buffer {
            buffer.push(value);
        } else {
            let mut buffer = Vec::with_capacity(self.capacity);
            buffer.push(value);
            self.buffer = Some(buffer);
        }
    }

    pub fn swap(&mut self) -> Vec<T> {
        self.buffer.take().unwrap_or_default()
    }
}

/// Converts a (round, stop_index) coordinate into a flat index
/// for the 1D cell arrays.
#[inline(always)] // Hint to compiler to inline for performance
pub(crate) fn flat_matrix(outer: usize, inner: usize, count: usize) -> usize {
    (outer * count) + inner
}

#[test]
fn flat_matrix_test() {
    let a = flat_matrix(0, 0, 10);
    let b = flat_matrix(0, 1, 10);
    assert_eq!(a + 1, b);

    let a = flat_matrix(2, 0, 10);
    let b = flat_matrix(2, 1, 10);
    assert_eq!(a + 1, b);

    let a = flat_matrix(0, 0, 10);
    let b = flat_matrix(1, 0, 10);
    assert_eq!(a + 10, b);
}
