use bitvec::prelude::*;
use std::mem;

use crate::{
    raptor::{
        AccessEgress, ArrivalId, ArrivalView, Dominance, Profile,
        allocator::flat_matrix,
        arrival::ArrivalEntry,
        pareto::{Label, ParetoSet},
    },
    shared::{Time, time},
};

/// Counters reported with every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SearchStats {
    pub iterations: usize,
    pub rounds: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub removed: usize,
}

/// The Arrival State Store.
///
/// Entries live in an append-only arena and are addressed by [`ArrivalId`].
/// For every `(round, stop)` a [`ParetoSet`] indexes the entries still
/// considered optimal. A candidate for round `R` has to qualify against the
/// sets of every round `<= R` of its stop, so arrivals with fewer rides keep
/// dominating later rounds. An accepted arrival prunes what it dominates in
/// its own round and, for range searches, in the later rounds of its stop.
/// Walking arrivals never cover on-board arrivals, which keeps the transit
/// arrival transfers leave from.
pub struct ArrivalState {
    pub(crate) dominance: Dominance,
    stop_count: usize,
    rounds: usize,
    arena: Vec<ArrivalEntry>,
    cells: Vec<ParetoSet>,
    removed: BitVec<usize, Lsb0>,
    destination: ParetoSet,
    destination_best: Time,
    pub(crate) access: Vec<AccessEgress>,
    pub(crate) egress: Vec<AccessEgress>,
    /// Stops improved in the current round.
    pub(crate) marked: BitVec<usize, Lsb0>,
    touched: Vec<ArrivalId>,
    pub(crate) stats: SearchStats,
}

impl ArrivalState {
    pub(crate) fn new(stop_count: usize) -> Self {
        Self {
            dominance: Dominance::ArrivalTime,
            stop_count,
            rounds: 0,
            arena: Vec::with_capacity(1024),
            cells: vec![],
            removed: BitVec::new(),
            destination: ParetoSet::default(),
            destination_best: time::MAX,
            access: vec![],
            egress: vec![],
            marked: bitvec!(usize, Lsb0; 0; stop_count),
            touched: Vec::with_capacity(256),
            stats: SearchStats::default(),
        }
    }

    /// Clears all state and sizes the store for `rounds` transit rounds.
    pub(crate) fn prepare(
        &mut self,
        profile: Profile,
        rounds: usize,
        access: &[AccessEgress],
        egress: &[AccessEgress],
    ) {
        self.dominance = profile.into();
        self.rounds = rounds;
        let cell_count = (rounds + 1) * self.stop_count;
        self.cells.iter_mut().for_each(ParetoSet::clear);
        if self.cells.len() < cell_count {
            self.cells.resize_with(cell_count, ParetoSet::default);
        }
        self.arena.clear();
        self.removed.clear();
        self.destination.clear();
        self.destination_best = time::MAX;
        self.access.clear();
        self.access.extend_from_slice(access);
        self.egress.clear();
        self.egress.extend_from_slice(egress);
        self.marked.fill(false);
        self.touched.clear();
        self.stats = SearchStats::default();
    }

    /// Starts a new round, forgetting which stops were touched.
    pub(crate) fn begin_round(&mut self) {
        self.marked.fill(false);
        self.touched.clear();
    }

    /// Arrivals accepted since the round began, in acceptance order.
    pub(crate) fn touched(&self) -> &[ArrivalId] {
        &self.touched
    }

    pub(crate) fn take_touched(&mut self) -> Vec<ArrivalId> {
        mem::take(&mut self.touched)
    }

    /// Registers the candidate at its `(stop, round)` unless an arrival of
    /// the same or an earlier round covers it.
    pub(crate) fn try_improve(&mut self, candidate: ArrivalEntry) -> Option<ArrivalId> {
        let stop = candidate.stop as usize;
        let round = candidate.round as usize;
        debug_assert!(round <= self.rounds, "round {round} is out of bounds");
        let label = label_of(&candidate);

        let qualifies = (0..=round).all(|r| {
            self.cells[flat_matrix(r, stop, self.stop_count)].qualifies(self.dominance, &label)
        });
        if !qualifies {
            self.stats.rejected += 1;
            return None;
        }

        let id = self.push(candidate);
        let removed = &mut self.removed;
        let stats = &mut self.stats;
        let mut on_removed = |old: ArrivalId| {
            removed.set(old.index(), true);
            stats.removed += 1;
        };
        // Later rounds only hold arrivals of earlier iterations at this point
        for later in round + 1..=self.rounds {
            self.cells[flat_matrix(later, stop, self.stop_count)].remove_dominated(
                self.dominance,
                &label,
                &mut on_removed,
            );
        }
        self.cells[flat_matrix(round, stop, self.stop_count)].insert(
            self.dominance,
            label,
            id,
            &mut on_removed,
        );
        self.stats.accepted += 1;
        self.marked.set(stop, true);
        self.touched.push(id);
        Some(id)
    }

    /// Registers an egress arrival in the destination set.
    pub(crate) fn try_improve_destination(&mut self, candidate: ArrivalEntry) -> Option<ArrivalId> {
        debug_assert!(candidate.is_egress());
        let label = label_of(&candidate);
        if !self.destination.qualifies(self.dominance, &label) {
            self.stats.rejected += 1;
            return None;
        }
        let id = self.push(candidate);
        let removed = &mut self.removed;
        let stats = &mut self.stats;
        self.destination.insert(self.dominance, label, id, |old| {
            removed.set(old.index(), true);
            stats.removed += 1;
        });
        self.stats.accepted += 1;
        self.destination_best = self.destination_best.min(candidate.arrival_time);
        Some(id)
    }

    fn push(&mut self, entry: ArrivalEntry) -> ArrivalId {
        debug_assert!(
            entry
                .previous
                .is_none_or(|previous| self.entry(previous).arrival_time <= entry.arrival_time),
            "arrival times must not decrease along the provenance chain"
        );
        let id = ArrivalId(self.arena.len() as u32);
        self.arena.push(entry);
        self.removed.push(false);
        id
    }

    #[inline(always)]
    pub(crate) fn entry(&self, id: ArrivalId) -> &ArrivalEntry {
        &self.arena[id.index()]
    }

    /// Dominated after it was accepted. It stays in the arena because later
    /// arrivals may still point at it.
    #[inline(always)]
    pub(crate) fn is_removed(&self, id: ArrivalId) -> bool {
        self.removed[id.index()]
    }

    /// Earliest arrival at the destination so far.
    pub(crate) fn destination_best(&self) -> Time {
        self.destination_best
    }

    #[cfg(test)]
    pub(crate) fn arena_len(&self) -> usize {
        self.arena.len()
    }

    pub fn view(&self, id: ArrivalId) -> ArrivalView<'_> {
        ArrivalView::new(self, id)
    }

    /// The destination Pareto set, earliest arrival first.
    pub fn best_known_arrivals(&self) -> Vec<ArrivalView<'_>> {
        let mut arrivals: Vec<_> = self.destination.ids().map(|id| self.view(id)).collect();
        arrivals.sort_by_key(|view| (view.arrival_time(), view.round(), view.c1()));
        arrivals
    }

    /// Every retained arrival at the stop, grouped by round.
    pub fn arrivals_at(&self, stop_idx: u32) -> Vec<ArrivalView<'_>> {
        if self.cells.is_empty() {
            return vec![];
        }
        (0..=self.rounds)
            .flat_map(|round| {
                self.cells[flat_matrix(round, stop_idx as usize, self.stop_count)].ids()
            })
            .map(|id| self.view(id))
            .collect()
    }

    /// Retained arrivals at the stop for exactly one round.
    pub fn arrivals_at_round(&self, stop_idx: u32, round: usize) -> Vec<ArrivalView<'_>> {
        if round > self.rounds || self.cells.is_empty() {
            return vec![];
        }
        self.cells[flat_matrix(round, stop_idx as usize, self.stop_count)]
            .ids()
            .map(|id| self.view(id))
            .collect()
    }
}

#[inline(always)]
fn label_of(entry: &ArrivalEntry) -> Label {
    Label {
        arrival_time: entry.arrival_time,
        c1: entry.c1,
        on_board: entry.is_transit(),
    }
}

#[cfg(test)]
fn transfer_entry(stop: u32, round: u8, arrival_time: u32, c1: u32) -> ArrivalEntry {
    ArrivalEntry {
        stop,
        round,
        arrival_time: Time::from_seconds(arrival_time),
        c1,
        previous: None,
        arrival: crate::raptor::arrival::Arrival::Transfer {
            from_stop: 0,
            transfer_idx: 0,
        },
    }
}

#[test]
fn earlier_rounds_dominate_later_rounds_test() {
    let mut state = ArrivalState::new(3);
    state.prepare(Profile::MultiCriteria, 4, &[], &[]);

    let first = state.try_improve(transfer_entry(1, 2, 100, 50)).unwrap();
    // Worse in round 4, rejected by the round 2 arrival
    assert!(state.try_improve(transfer_entry(1, 4, 110, 60)).is_none());
    // Better in round 4 is kept, the round 2 arrival stays valid
    let better = state.try_improve(transfer_entry(1, 4, 90, 40)).unwrap();
    assert!(!state.is_removed(first));
    assert_eq!(state.arrivals_at(1).len(), 2);

    // Same key pruning
    let best = state.try_improve(transfer_entry(1, 4, 80, 40)).unwrap();
    assert!(state.is_removed(better));
    assert_eq!(state.arrivals_at_round(1, 4)[0].id(), best);
    assert!(state.marked[1]);
    assert_eq!(state.touched().len(), 3);
}

#[test]
fn standard_profile_keeps_one_arrival_test() {
    let mut state = ArrivalState::new(2);
    state.prepare(Profile::Standard, 2, &[], &[]);
    state.try_improve(transfer_entry(0, 1, 100, 0)).unwrap();
    assert!(state.try_improve(transfer_entry(0, 1, 100, 0)).is_none());
    // Cost is ignored, equal arrival time is a tie
    assert!(state.try_improve(transfer_entry(0, 1, 100, 1)).is_none());
    state.try_improve(transfer_entry(0, 1, 99, 500)).unwrap();
    assert_eq!(state.arrivals_at_round(0, 1).len(), 1);
    assert_eq!(state.stats.rejected, 2);
}

#[test]
fn walk_keeps_later_transit_arrival_test() {
    let transit = |round, arrival_time| ArrivalEntry {
        arrival: crate::raptor::arrival::Arrival::Transit {
            pattern_idx: 0,
            trip_idx: 0,
            board_stop: 0,
            board_pos: 0,
            alight_pos: 1,
            board_time: Time::from_seconds(0),
        },
        ..transfer_entry(1, round, arrival_time, 0)
    };
    let mut state = ArrivalState::new(2);
    state.prepare(Profile::Standard, 3, &[], &[]);
    let walk = state.try_improve(transfer_entry(1, 1, 90, 0)).unwrap();
    let ride = state.try_improve(transit(2, 100)).unwrap();
    assert!(!state.is_removed(walk));
    // The earlier walk still covers slower walks
    assert!(state.try_improve(transfer_entry(1, 2, 95, 0)).is_none());
    // A faster ride replaces the slower one
    let faster = state.try_improve(transit(2, 85)).unwrap();
    assert!(state.is_removed(ride));
    assert!(!state.is_removed(walk));
    assert_eq!(state.arrivals_at_round(1, 2)[0].id(), faster);
}

#[test]
fn earlier_round_prunes_later_rounds_test() {
    let mut state = ArrivalState::new(1);
    state.prepare(Profile::MultiCriteria, 3, &[], &[]);
    let slow = state.try_improve(transfer_entry(0, 3, 100, 50)).unwrap();
    let other = state.try_improve(transfer_entry(0, 3, 80, 90)).unwrap();
    // A later range iteration reaches the stop with fewer rides
    state.try_improve(transfer_entry(0, 1, 90, 40)).unwrap();
    assert!(state.is_removed(slow));
    assert!(!state.is_removed(other));
    assert_eq!(state.arrivals_at(0).len(), 2);
    assert_eq!(state.stats.removed, 1);
}

#[test]
fn unprepared_state_is_empty_test() {
    let state = ArrivalState::new(2);
    assert!(state.arrivals_at(1).is_empty());
    assert!(state.arrivals_at_round(1, 0).is_empty());
}
