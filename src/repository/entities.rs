use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::shared::{
    geo::{Coordinate, Distance},
    time::{Duration, Time},
};

/// Classification of the vehicle serving a route, following the GTFS
/// `route_type` codes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Tram,
    Subway,
    Rail,
    #[default]
    Bus,
    Ferry,
    CableTram,
    AerialLift,
    Funicular,
    Trolleybus,
    Monorail,
    Other(i32),
}

impl From<i32> for VehicleType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Tram,
            1 => Self::Subway,
            2 => Self::Rail,
            3 => Self::Bus,
            4 => Self::Ferry,
            5 => Self::CableTram,
            6 => Self::AerialLift,
            7 => Self::Funicular,
            11 => Self::Trolleybus,
            12 => Self::Monorail,
            other => Self::Other(other),
        }
    }
}

/// A physical point where passengers can board or alight from a vehicle.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    /// Dense index, stable for the lifetime of the repository.
    pub index: u32,
    /// Unique external identifier for the stop.
    pub id: Arc<str>,
    /// Human-readable name (e.g., "Main St & 4th Ave").
    pub name: Arc<str>,
    pub coordinate: Option<Coordinate>,
}

/// A grouping of trips displayed to riders under one name (e.g., "Blue Line").
#[derive(Debug, Default, Clone)]
pub struct Route {
    pub index: u32,
    pub id: Arc<str>,
    pub vehicle_type: VehicleType,
}

/// A vehicle call at a stop within a trip.
#[derive(Debug, Default, Clone, Copy)]
pub struct StopTime {
    pub stop_idx: u32,
    /// Scheduled arrival, seconds since the start of the service day.
    pub arrival_time: Time,
    /// Scheduled departure, seconds since the start of the service day.
    pub departure_time: Time,
}

/// One scheduled run of a vehicle along a [`Pattern`].
///
/// The stop times follow the pattern's stop order exactly and satisfy
/// `arrival[i] <= departure[i] <= arrival[i + 1]`.
#[derive(Debug, Default, Clone)]
pub struct TripSchedule {
    pub index: u32,
    pub id: Arc<str>,
    pub route_idx: u32,
    pub pattern_idx: u32,
    pub stop_times: Arc<[StopTime]>,
}

impl TripSchedule {
    #[inline(always)]
    pub fn arrival(&self, pos: usize) -> Time {
        self.stop_times[pos].arrival_time
    }

    #[inline(always)]
    pub fn departure(&self, pos: usize) -> Time {
        self.stop_times[pos].departure_time
    }

    pub fn stop(&self, pos: usize) -> u32 {
        self.stop_times[pos].stop_idx
    }
}

/// An ordered stop sequence shared by all of its trips.
///
/// Trips are sorted so that departures (and arrivals) are non-decreasing at
/// every position, which makes trip lookup a binary search.
#[derive(Debug, Default, Clone)]
pub struct Pattern {
    pub index: u32,
    /// Pointer back to the display-level [`Route`].
    pub route_idx: u32,
    pub vehicle_type: VehicleType,
    /// Stop indices served by this pattern in order.
    pub stops: Arc<[u32]>,
    /// Trip indices in timetable order.
    pub trips: Arc<[u32]>,
}

impl Pattern {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// A directed walking (or in-station) connection between two stops.
#[derive(Debug, Default, Clone)]
pub struct Transfer {
    pub index: u32,
    pub from_stop_idx: u32,
    pub to_stop_idx: u32,
    pub duration: Duration,
    pub distance: Option<Distance>,
}
