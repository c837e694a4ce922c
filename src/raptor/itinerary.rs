use crate::{
    raptor::{
        ArrivalView, PathLegType,
        location::{Location, Point},
    },
    repository::{Repository, VehicleType},
    shared::time::{Duration, Time},
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct Leg {
    pub from: Location,
    pub to: Location,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub stops: Vec<LegStop>,
    pub leg_type: LegType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LegType {
    Access,
    Transit {
        trip_id: Arc<str>,
        route_id: Arc<str>,
        vehicle_type: VehicleType,
    },
    Transfer,
    Egress,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegStop {
    pub location: Location,
    pub departure_time: Time,
    pub arrival_time: Time,
}

impl LegStop {
    /// The calls of a transit leg from boarding to alighting, both included.
    pub fn generate_stops(view: &ArrivalView, repository: &Repository) -> Vec<Self> {
        if !view.arrived_by_transit() {
            return vec![];
        }
        let transit = view.transit_path();
        let trip = &repository.trips[transit.trip_idx as usize];
        trip.stop_times[transit.board_pos..=transit.alight_pos]
            .iter()
            .map(|stop_time| LegStop {
                location: (&repository.stops[stop_time.stop_idx as usize]).into(),
                departure_time: stop_time.departure_time,
                arrival_time: stop_time.arrival_time,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub departure_time: Time,
    pub arrival_time: Time,
    pub transfers: usize,
    pub c1: u32,
    pub legs: Vec<Leg>,
}

impl Itinerary {
    /// Builds the legs of a path from [`crate::raptor::backtrack`].
    pub fn new(path: &[ArrivalView], repository: &Repository) -> Self {
        let legs: Vec<Leg> = path
            .iter()
            .enumerate()
            .map(|(i, view)| {
                let previous_arrival = i
                    .checked_sub(1)
                    .map(|prev| path[prev].arrival_time())
                    .unwrap_or_else(|| view.arrival_time());
                leg(view, previous_arrival, repository)
            })
            .collect();

        let (departure_time, arrival_time, transfers, c1) = match (path.first(), path.last()) {
            (Some(first), Some(last)) => (
                legs.first()
                    .map(|leg| leg.departure_time)
                    .unwrap_or_else(|| first.arrival_time()),
                last.arrival_time(),
                last.number_of_transfers(),
                last.c1(),
            ),
            _ => (Time::default(), Time::default(), 0, 0),
        };
        Self {
            departure_time,
            arrival_time,
            transfers,
            c1,
            legs,
        }
    }

    pub fn duration(&self) -> Duration {
        self.arrival_time - self.departure_time
    }

    /// Legs spent on board of a vehicle.
    pub fn transit_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs
            .iter()
            .filter(|leg| matches!(leg.leg_type, LegType::Transit { .. }))
    }
}

fn leg(view: &ArrivalView, previous_arrival: Time, repository: &Repository) -> Leg {
    let (from, to, departure_time, leg_type) = match view.arrived_by() {
        PathLegType::Access => {
            let access = view.access_path();
            (
                Point::Origin,
                Point::Stop(view.stop()),
                access.departure_time,
                LegType::Access,
            )
        }
        PathLegType::Transit => {
            let transit = view.transit_path();
            let trip = &repository.trips[transit.trip_idx as usize];
            let route = &repository.routes[trip.route_idx as usize];
            (
                Point::Stop(transit.board_stop),
                Point::Stop(view.stop()),
                transit.board_time,
                LegType::Transit {
                    trip_id: trip.id.clone(),
                    route_id: route.id.clone(),
                    vehicle_type: route.vehicle_type,
                },
            )
        }
        PathLegType::Transfer => (
            Point::Stop(view.transfer_path().from_stop),
            Point::Stop(view.stop()),
            previous_arrival,
            LegType::Transfer,
        ),
        PathLegType::Egress => (
            Point::Stop(view.egress_path().stop_idx),
            Point::Destination,
            previous_arrival,
            LegType::Egress,
        ),
    };
    Leg {
        from: from.to_location(&repository.stops),
        to: to.to_location(&repository.stops),
        departure_time,
        arrival_time: view.arrival_time(),
        stops: LegStop::generate_stops(view, repository),
        leg_type,
    }
}
