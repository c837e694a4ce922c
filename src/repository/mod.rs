use std::{collections::HashMap, sync::Arc};

mod builder;
mod entities;
pub use builder::*;
pub use entities::*;

use crate::{
    raptor::{AccessEgress, Raptor},
    shared::time::Time,
};

type IdToIndex = HashMap<Arc<str>, u32>;

/// Immutable, validated snapshot of the transit schedule.
///
/// Built once through [`RepositoryBuilder`] and then shared by reference
/// between any number of concurrent searches.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub stops: Box<[Stop]>,
    pub routes: Box<[Route]>,
    pub patterns: Box<[Pattern]>,
    pub trips: Box<[TripSchedule]>,
    pub transfers: Box<[Transfer]>,

    stop_lookup: IdToIndex,
    trip_lookup: IdToIndex,
    stop_to_patterns: Box<[Box<[u32]>]>,
    stop_to_transfers: Box<[Box<[u32]>]>,
}

impl Repository {
    pub fn builder() -> RepositoryBuilder {
        RepositoryBuilder::new()
    }

    /// Starts a search over this repository.
    pub fn raptor(&self, access: Vec<AccessEgress>, egress: Vec<AccessEgress>) -> Raptor<'_> {
        Raptor::new(self, access, egress)
    }

    /// Get a stop with the given id.
    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let stop_index = self.stop_lookup.get(id)?;
        Some(&self.stops[*stop_index as usize])
    }

    pub fn stop_idx_by_id(&self, id: &str) -> Option<u32> {
        self.stop_lookup.get(id).copied()
    }

    pub fn trip_by_id(&self, id: &str) -> Option<&TripSchedule> {
        let trip_index = self.trip_lookup.get(id)?;
        Some(&self.trips[*trip_index as usize])
    }

    /// Indexes of all patterns that call at the stop.
    pub fn patterns_by_stop(&self, stop_idx: u32) -> &[u32] {
        &self.stop_to_patterns[stop_idx as usize]
    }

    pub fn stop_has_patterns(&self, stop_idx: u32) -> bool {
        !self.stop_to_patterns[stop_idx as usize].is_empty()
    }

    /// First position of the stop within the pattern.
    pub fn index_in_pattern(&self, pattern_idx: u32, stop_idx: u32) -> Option<usize> {
        self.patterns[pattern_idx as usize]
            .stops
            .iter()
            .position(|idx| *idx == stop_idx)
    }

    /// The pattern's trips in timetable order.
    pub fn trips_of_pattern(&self, pattern_idx: u32) -> impl Iterator<Item = &TripSchedule> {
        self.patterns[pattern_idx as usize]
            .trips
            .iter()
            .map(|trip_idx| &self.trips[*trip_idx as usize])
    }

    /// Finds the earliest trip on the pattern leaving position `pos` at or
    /// after `time`. Returns the trip's position in the pattern timetable
    /// together with the trip.
    pub fn earliest_trip_at_or_after(
        &self,
        pattern_idx: u32,
        pos: usize,
        time: Time,
    ) -> Option<(usize, &TripSchedule)> {
        let pattern = &self.patterns[pattern_idx as usize];
        let idx = pattern
            .trips
            .partition_point(|&trip_idx| self.trips[trip_idx as usize].departure(pos) < time);
        pattern
            .trips
            .get(idx)
            .map(|&trip_idx| (idx, &self.trips[trip_idx as usize]))
    }

    /// Trip at a given timetable position of a pattern.
    pub fn trip_in_pattern(&self, pattern_idx: u32, trip_pos: usize) -> &TripSchedule {
        let trip_idx = self.patterns[pattern_idx as usize].trips[trip_pos];
        &self.trips[trip_idx as usize]
    }

    /// All outgoing transfers from the stop.
    pub fn transfers_from(&self, stop_idx: u32) -> impl Iterator<Item = &Transfer> {
        self.stop_to_transfers[stop_idx as usize]
            .iter()
            .map(|transfer_idx| &self.transfers[*transfer_idx as usize])
    }
}
