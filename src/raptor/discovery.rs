use crate::{
    raptor::{AccessEgress, Allocator, ArrivalId, Config, Departures, SearchWindow},
    repository::Repository,
    shared::Time,
};
use tracing::trace;

/// Collects the boarding candidates for the next round from the arrivals of
/// the previous one and activates every pattern serving their stops.
///
/// Activation uses the first position of the stop in a pattern, so a pattern
/// is only scanned once per round even if several of its stops improved.
/// ```text
///  pattern: 0 1 2 3 4 5 6 7 8
///  marked:    ^   ^     ^
///  scanned from 1
/// ```
pub(crate) fn collect_boarding(
    repository: &Repository,
    allocator: &mut Allocator,
    previous: &[ArrivalId],
) {
    allocator.clear_active();
    for id in previous {
        if allocator.state.is_removed(*id) {
            continue;
        }
        let stop_idx = allocator.state.entry(*id).stop;
        if !repository.stop_has_patterns(stop_idx) {
            continue;
        }
        allocator.add_boarding(stop_idx, *id);
        for pattern_idx in repository.patterns_by_stop(stop_idx) {
            if let Some(position) = repository.index_in_pattern(*pattern_idx, stop_idx) {
                allocator.activate(*pattern_idx, position as u32);
            }
        }
    }
    trace!(
        "{} boarding stops activate {} patterns",
        allocator.boarding_stops.len(),
        allocator.active_patterns.len()
    );
}

/// Departure instants at which some trip can just be caught from an access
/// stop, latest first. Both ends of the window are always included.
pub(crate) fn trip_departures(
    repository: &Repository,
    config: &Config,
    window: &SearchWindow,
    access: &[AccessEgress],
) -> Vec<Time> {
    let mut departures: Vec<Time> = access
        .iter()
        .flat_map(|path| {
            repository
                .patterns_by_stop(path.stop_idx)
                .iter()
                .flat_map(move |pattern_idx| {
                    let pattern = &repository.patterns[*pattern_idx as usize];
                    pattern
                        .stops
                        .iter()
                        .enumerate()
                        // Trips can not be boarded at their last stop
                        .filter(move |(pos, stop)| {
                            **stop == path.stop_idx && *pos + 1 < pattern.len()
                        })
                        .flat_map(move |(pos, _)| {
                            repository
                                .trips_of_pattern(*pattern_idx)
                                .map(move |trip| trip.departure(pos))
                        })
                })
                .filter_map(move |departure| {
                    let lead = path.duration + config.slack.board;
                    (departure.as_seconds() >= lead.as_seconds()).then(|| departure - lead)
                })
        })
        .filter(|departure| window.contains(*departure))
        .collect();

    departures.push(window.latest_departure());
    departures.push(window.earliest_departure);
    departures.sort_unstable();
    departures.dedup();
    departures.reverse();
    departures
}

/// Instants iterated by the range search, latest first.
pub(crate) fn departure_instants(
    repository: &Repository,
    config: &Config,
    departure: Time,
    access: &[AccessEgress],
) -> Vec<Time> {
    let window = SearchWindow::new(departure, config.search_window);
    if config.search_window.is_zero() {
        return vec![departure];
    }
    match config.departures {
        Departures::Every { step } => window.every(step),
        Departures::TripDepartures => {
            trip_departures(repository, config, &window, access)
        }
    }
}
