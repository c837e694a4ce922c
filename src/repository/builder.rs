use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::{
    repository::{Pattern, Repository, Route, Stop, StopTime, Transfer, TripSchedule, VehicleType},
    shared::{
        geo::{Coordinate, Distance},
        time::{Duration, Time},
    },
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Stop id {0} is defined more than once")]
    DuplicateStop(String),
    #[error("Route id {0} is defined more than once")]
    DuplicateRoute(String),
    #[error("Trip id {0} is defined more than once")]
    DuplicateTrip(String),
    #[error("Stop id {stop} referenced by {by} does not match any entry")]
    UnknownStop { stop: String, by: String },
    #[error("Route id {route} referenced by trip {trip} does not match any entry")]
    UnknownRoute { route: String, trip: String },
    #[error("Trip {0} needs at least two stop times")]
    TooFewStopTimes(String),
    #[error("Trip {trip} departs before it arrives at position {position}")]
    DepartureBeforeArrival { trip: String, position: usize },
    #[error("Trip {trip} arrives at position {position} before leaving the previous stop")]
    ArrivalBeforePreviousDeparture { trip: String, position: usize },
    #[error("Transfer {from} -> {to} has no duration, distance or coordinates")]
    MissingTransferDuration { from: String, to: String },
}

struct TripRecord {
    id: Arc<str>,
    route_idx: u32,
    stop_times: Vec<StopTime>,
}

struct TransferRecord {
    from: Arc<str>,
    to: Arc<str>,
    min_transfer_time: Option<Duration>,
    distance: Option<Distance>,
}

/// Collects raw schedule records and validates them into a [`Repository`].
///
/// References between records are resolved in [`RepositoryBuilder::build`],
/// so records may be added in any order.
#[derive(Default)]
pub struct RepositoryBuilder {
    stops: Vec<Stop>,
    routes: Vec<Route>,
    trips: Vec<(Arc<str>, Arc<str>, Vec<(Arc<str>, Time, Time)>)>,
    transfers: Vec<TransferRecord>,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_stop(&mut self, id: &str, name: &str) -> &mut Self {
        self.push_stop(id, name, None)
    }

    pub fn add_stop_at(&mut self, id: &str, name: &str, coordinate: Coordinate) -> &mut Self {
        self.push_stop(id, name, Some(coordinate))
    }

    fn push_stop(&mut self, id: &str, name: &str, coordinate: Option<Coordinate>) -> &mut Self {
        self.stops.push(Stop {
            index: self.stops.len() as u32,
            id: id.into(),
            name: name.into(),
            coordinate,
        });
        self
    }

    pub fn add_route(&mut self, id: &str, vehicle_type: VehicleType) -> &mut Self {
        self.routes.push(Route {
            index: self.routes.len() as u32,
            id: id.into(),
            vehicle_type,
        });
        self
    }

    /// Adds a trip as an ordered list of `(stop id, arrival, departure)`.
    pub fn add_trip<S, I>(&mut self, id: &str, route_id: &str, stop_times: I) -> &mut Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, Time, Time)>,
    {
        let stop_times: Vec<(Arc<str>, Time, Time)> = stop_times
            .into_iter()
            .map(|(stop, arrival, departure)| (stop.as_ref().into(), arrival, departure))
            .collect();
        self.trips.push((id.into(), route_id.into(), stop_times));
        self
    }

    /// Adds a transfer. Without a minimum transfer time the duration is the
    /// walking time between the two stops' coordinates.
    pub fn add_transfer(
        &mut self,
        from: &str,
        to: &str,
        min_transfer_time: Option<Duration>,
    ) -> &mut Self {
        self.transfers.push(TransferRecord {
            from: from.into(),
            to: to.into(),
            min_transfer_time,
            distance: None,
        });
        self
    }

    pub fn add_transfer_with_distance(
        &mut self,
        from: &str,
        to: &str,
        distance: Distance,
    ) -> &mut Self {
        self.transfers.push(TransferRecord {
            from: from.into(),
            to: to.into(),
            min_transfer_time: None,
            distance: Some(distance),
        });
        self
    }

    pub fn build(self) -> Result<Repository, Error> {
        let mut stop_lookup = HashMap::with_capacity(self.stops.len());
        for stop in self.stops.iter() {
            if stop_lookup.insert(stop.id.clone(), stop.index).is_some() {
                return Err(Error::DuplicateStop(stop.id.to_string()));
            }
        }

        let mut route_lookup: HashMap<Arc<str>, u32> = HashMap::with_capacity(self.routes.len());
        for route in self.routes.iter() {
            if route_lookup.insert(route.id.clone(), route.index).is_some() {
                return Err(Error::DuplicateRoute(route.id.to_string()));
            }
        }

        let mut records = Vec::with_capacity(self.trips.len());
        let mut seen_trips: HashSet<Arc<str>> = HashSet::with_capacity(self.trips.len());
        for (trip_id, route_id, raw) in self.trips.into_iter() {
            if !seen_trips.insert(trip_id.clone()) {
                return Err(Error::DuplicateTrip(trip_id.to_string()));
            }
            let route_idx = *route_lookup
                .get(&route_id)
                .ok_or_else(|| Error::UnknownRoute {
                    route: route_id.to_string(),
                    trip: trip_id.to_string(),
                })?;
            let stop_times = raw
                .into_iter()
                .map(|(stop_id, arrival_time, departure_time)| {
                    let stop_idx = *stop_lookup.get(&stop_id).ok_or_else(|| Error::UnknownStop {
                        stop: stop_id.to_string(),
                        by: format!("trip {trip_id}"),
                    })?;
                    Ok(StopTime {
                        stop_idx,
                        arrival_time,
                        departure_time,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;
            validate_stop_times(&trip_id, &stop_times)?;
            records.push(TripRecord {
                id: trip_id,
                route_idx,
                stop_times,
            });
        }

        let (patterns, trips) = build_patterns(&self.routes, records);

        let mut stop_to_patterns: Vec<Vec<u32>> = vec![vec![]; self.stops.len()];
        for pattern in patterns.iter() {
            for stop_idx in pattern.stops.iter() {
                let serving = &mut stop_to_patterns[*stop_idx as usize];
                // Loops visit a stop twice, the pattern is listed once
                if serving.last() != Some(&pattern.index) {
                    serving.push(pattern.index);
                }
            }
        }

        let mut transfers: Vec<Transfer> = Vec::with_capacity(self.transfers.len());
        let mut stop_to_transfers: Vec<Vec<u32>> = vec![vec![]; self.stops.len()];
        for record in self.transfers.into_iter() {
            let lookup = |id: &Arc<str>| {
                stop_lookup.get(id).copied().ok_or_else(|| Error::UnknownStop {
                    stop: id.to_string(),
                    by: format!("transfer {} -> {}", record.from, record.to),
                })
            };
            let from_stop_idx = lookup(&record.from)?;
            let to_stop_idx = lookup(&record.to)?;
            if from_stop_idx == to_stop_idx {
                warn!("Dropping self transfer at stop {}", record.from);
                continue;
            }
            let from = &self.stops[from_stop_idx as usize];
            let to = &self.stops[to_stop_idx as usize];
            let distance = record.distance.or_else(|| {
                from.coordinate
                    .zip(to.coordinate)
                    .map(|(a, b)| a.network_distance(&b))
            });
            let duration = match (record.min_transfer_time, distance) {
                (Some(duration), _) => duration,
                (None, Some(distance)) => {
                    let duration = distance.walking_duration();
                    trace!(
                        "Transfer {} -> {} is {distance}, {duration} walking",
                        record.from,
                        record.to
                    );
                    duration
                }
                (None, None) => {
                    return Err(Error::MissingTransferDuration {
                        from: record.from.to_string(),
                        to: record.to.to_string(),
                    });
                }
            };

            let index = transfers.len() as u32;
            stop_to_transfers[from_stop_idx as usize].push(index);
            transfers.push(Transfer {
                index,
                from_stop_idx,
                to_stop_idx,
                duration,
                distance,
            });
        }

        let mut trip_lookup = HashMap::with_capacity(trips.len());
        for trip in trips.iter() {
            trip_lookup.insert(trip.id.clone(), trip.index);
        }

        info!(
            "Built repository with {} stops, {} patterns, {} trips and {} transfers",
            self.stops.len(),
            patterns.len(),
            trips.len(),
            transfers.len()
        );

        Ok(Repository {
            stops: self.stops.into(),
            routes: self.routes.into(),
            patterns: patterns.into(),
            trips: trips.into(),
            transfers: transfers.into(),
            stop_lookup,
            trip_lookup,
            stop_to_patterns: stop_to_patterns.into_iter().map(Into::into).collect(),
            stop_to_transfers: stop_to_transfers.into_iter().map(Into::into).collect(),
        })
    }
}

fn validate_stop_times(trip_id: &str, stop_times: &[StopTime]) -> Result<(), Error> {
    if stop_times.len() < 2 {
        return Err(Error::TooFewStopTimes(trip_id.to_string()));
    }
    for (position, stop_time) in stop_times.iter().enumerate() {
        if stop_time.departure_time < stop_time.arrival_time {
            return Err(Error::DepartureBeforeArrival {
                trip: trip_id.to_string(),
                position,
            });
        }
        if position > 0 && stop_time.arrival_time < stop_times[position - 1].departure_time {
            return Err(Error::ArrivalBeforePreviousDeparture {
                trip: trip_id.to_string(),
                position,
            });
        }
    }
    Ok(())
}

/// Routes do not require their trips to share a stop sequence, patterns do.
/// Each route is split by exact stop sequence, then each group is split again
/// until no trip overtakes another one, so that every pattern timetable is
/// sorted at every position.
fn build_patterns(routes: &[Route], records: Vec<TripRecord>) -> (Vec<Pattern>, Vec<TripSchedule>) {
    let mut groups: HashMap<(u32, Vec<u32>), Vec<TripRecord>> = HashMap::new();
    for record in records.into_iter() {
        let signature: Vec<u32> = record.stop_times.iter().map(|st| st.stop_idx).collect();
        groups
            .entry((record.route_idx, signature))
            .or_default()
            .push(record);
    }

    // Deterministic pattern numbering regardless of hash order
    let mut groups: Vec<_> = groups.into_iter().collect();
    groups.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut patterns: Vec<Pattern> = Vec::new();
    let mut trips: Vec<TripSchedule> = Vec::new();
    for ((route_idx, signature), mut group) in groups.into_iter() {
        group.sort_by(|a, b| {
            a.stop_times[0]
                .departure_time
                .cmp(&b.stop_times[0].departure_time)
                .then_with(|| {
                    let last = a.stop_times.len() - 1;
                    a.stop_times[last]
                        .arrival_time
                        .cmp(&b.stop_times[last].arrival_time)
                })
        });

        let mut timetables: Vec<Vec<TripRecord>> = Vec::new();
        for record in group.into_iter() {
            let slot = timetables.iter().position(|timetable| {
                timetable
                    .last()
                    .is_some_and(|last| !overtakes(last, &record))
            });
            match slot {
                Some(slot) => timetables[slot].push(record),
                None => timetables.push(vec![record]),
            }
        }
        if timetables.len() > 1 {
            debug!(
                "Split stop sequence of route {} into {} patterns",
                routes[route_idx as usize].id,
                timetables.len()
            );
        }

        let stops: Arc<[u32]> = signature.into();
        for timetable in timetables.into_iter() {
            let pattern_idx = patterns.len() as u32;
            let mut trip_indexes = Vec::with_capacity(timetable.len());
            for record in timetable.into_iter() {
                let index = trips.len() as u32;
                trip_indexes.push(index);
                trips.push(TripSchedule {
                    index,
                    id: record.id,
                    route_idx,
                    pattern_idx,
                    stop_times: record.stop_times.into(),
                });
            }
            patterns.push(Pattern {
                index: pattern_idx,
                route_idx,
                vehicle_type: routes[route_idx as usize].vehicle_type,
                stops: stops.clone(),
                trips: trip_indexes.into(),
            });
        }
    }
    (patterns, trips)
}

/// `later` overtakes `earlier` if it is ahead of it anywhere along the stops.
fn overtakes(earlier: &TripRecord, later: &TripRecord) -> bool {
    earlier
        .stop_times
        .iter()
        .zip(later.stop_times.iter())
        .any(|(a, b)| b.departure_time < a.departure_time || b.arrival_time < a.arrival_time)
}

#[test]
fn overtaking_trips_are_split_test() {
    let t = Time::from_seconds;
    let mut builder = RepositoryBuilder::new();
    builder
        .add_stop("A", "A")
        .add_stop("B", "B")
        .add_route("R", VehicleType::Rail)
        .add_trip("slow", "R", [("A", t(0), t(0)), ("B", t(100), t(100))])
        .add_trip("fast", "R", [("A", t(10), t(10)), ("B", t(50), t(50))]);
    let repository = builder.build().unwrap();
    assert_eq!(repository.patterns.len(), 2);
    for pattern in repository.patterns.iter() {
        assert_eq!(pattern.vehicle_type, VehicleType::Rail);
        assert_eq!(pattern.trips.len(), 1);
    }
}

#[test]
fn invalid_stop_times_test() {
    let t = Time::from_seconds;
    let mut builder = RepositoryBuilder::new();
    builder
        .add_stop("A", "A")
        .add_stop("B", "B")
        .add_route("R", VehicleType::Bus)
        .add_trip("bad", "R", [("A", t(10), t(5)), ("B", t(20), t(20))]);
    assert_eq!(
        builder.build().unwrap_err(),
        Error::DepartureBeforeArrival {
            trip: "bad".into(),
            position: 0
        }
    );
}
