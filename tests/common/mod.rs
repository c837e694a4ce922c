#![allow(dead_code)]

use range_raptor::{prelude::*, shared::Coordinate};

pub fn t(seconds: u32) -> Time {
    Time::from_seconds(seconds)
}

pub fn stop(repository: &Repository, id: &str) -> u32 {
    repository.stop_idx_by_id(id).expect("Unknown stop")
}

pub fn path(repository: &Repository, id: &str, seconds: u32) -> AccessEgress {
    AccessEgress::new(stop(repository, id), Duration::from_seconds(seconds))
}

/// One trip X -> Y -> Z.
pub fn scenario_a() -> Repository {
    let mut builder = Repository::builder();
    builder
        .add_stop("X", "X")
        .add_stop("Y", "Y")
        .add_stop("Z", "Z")
        .add_route("slow", VehicleType::Bus)
        .add_trip(
            "slow-1",
            "slow",
            [("X", t(0), t(0)), ("Y", t(10), t(10)), ("Z", t(20), t(20))],
        );
    builder.build().expect("Failed to build repository")
}

/// The direct trip of [`scenario_a`] plus a faster connection from Y.
pub fn scenario_b() -> Repository {
    let mut builder = Repository::builder();
    builder
        .add_stop("X", "X")
        .add_stop("Y", "Y")
        .add_stop("Z", "Z")
        .add_route("slow", VehicleType::Bus)
        .add_route("fast", VehicleType::Bus)
        .add_trip(
            "slow-1",
            "slow",
            [("X", t(0), t(0)), ("Y", t(10), t(10)), ("Z", t(20), t(20))],
        )
        .add_trip("fast-1", "fast", [("Y", t(11), t(11)), ("Z", t(15), t(15))]);
    builder.build().expect("Failed to build repository")
}

/// A direct trip X -> Z and a feeder X -> Y with a long walk Y -> Z.
/// W is not served at all.
pub fn scenario_c() -> Repository {
    let mut builder = Repository::builder();
    builder
        .add_stop("X", "X")
        .add_stop("Y", "Y")
        .add_stop("Z", "Z")
        .add_stop("W", "W")
        .add_route("direct", VehicleType::Bus)
        .add_route("feeder", VehicleType::Bus)
        .add_trip("direct-1", "direct", [("X", t(0), t(0)), ("Z", t(20), t(20))])
        .add_trip("feeder-1", "feeder", [("X", t(0), t(0)), ("Y", t(5), t(5))])
        .add_transfer("Y", "Z", Some(Duration::from_seconds(100)));
    builder.build().expect("Failed to build repository")
}

/// X -> Y -> Z every ten minutes from 08:00 to 08:30, 20 minutes end to end.
pub fn frequent_line() -> Repository {
    let mut builder = Repository::builder();
    builder
        .add_stop("X", "X")
        .add_stop("Y", "Y")
        .add_stop("Z", "Z")
        .add_route("line", VehicleType::Tram);
    for departure in [0, 10, 20, 30] {
        let x = Time::from_hm(8, departure);
        let y = x + Duration::from_minutes(10);
        let z = y + Duration::from_minutes(10);
        builder.add_trip(
            &format!("line-{departure}"),
            "line",
            [("X", x, x), ("Y", y, y), ("Z", z, z)],
        );
    }
    builder.build().expect("Failed to build repository")
}

/// Trip `a` O -> X, then either a walk X -> S or trip `c` X -> S. T can only
/// be reached by walking from S, so the walk to S is faster but a dead end.
pub fn walk_then_ride() -> Repository {
    let mut builder = Repository::builder();
    builder
        .add_stop("O", "O")
        .add_stop("X", "X")
        .add_stop("S", "S")
        .add_stop("T", "T")
        .add_route("a", VehicleType::Bus)
        .add_route("c", VehicleType::Bus)
        .add_trip("a-1", "a", [("O", t(0), t(0)), ("X", t(80), t(80))])
        .add_trip("c-1", "c", [("X", t(81), t(81)), ("S", t(100), t(100))])
        .add_transfer("X", "S", Some(Duration::from_seconds(10)))
        .add_transfer("S", "T", Some(Duration::from_seconds(5)));
    builder.build().expect("Failed to build repository")
}

/// A bus O 08:05 -> D 08:30 and a rail trip O 08:20 -> D 08:40.
pub fn bus_or_rail() -> Repository {
    let mut builder = Repository::builder();
    builder
        .add_stop("O", "O")
        .add_stop("D", "D")
        .add_route("bus", VehicleType::Bus)
        .add_route("rail", VehicleType::Rail)
        .add_trip(
            "bus-1",
            "bus",
            [
                ("O", Time::from_hm(8, 5), Time::from_hm(8, 5)),
                ("D", Time::from_hm(8, 30), Time::from_hm(8, 30)),
            ],
        )
        .add_trip(
            "rail-1",
            "rail",
            [
                ("O", Time::from_hm(8, 20), Time::from_hm(8, 20)),
                ("D", Time::from_hm(8, 40), Time::from_hm(8, 40)),
            ],
        );
    builder.build().expect("Failed to build repository")
}

pub fn grid_stop(row: usize, col: usize) -> String {
    format!("r{row}c{col}")
}

/// `size` x `size` stops with a bus along every row, a tram down every
/// column, a rail line along the diagonal and walking transfers between
/// neighbours.
pub fn grid(size: usize) -> Repository {
    let mut builder = Repository::builder();
    for row in 0..size {
        for col in 0..size {
            let id = grid_stop(row, col);
            let coordinate = Coordinate::from((
                59.0 + row as f64 * 0.003,
                18.0 + col as f64 * 0.005,
            ));
            builder.add_stop_at(&id, &id, coordinate);
        }
    }

    for row in 0..size {
        let route = format!("row{row}");
        builder.add_route(&route, VehicleType::Bus);
        let mut start = Time::from_hm(7, 0) + Duration::from_seconds(row as u32 * 60);
        while start < Time::from_hm(8, 30) {
            let stop_times: Vec<_> = (0..size)
                .map(|col| {
                    let arrival = start + Duration::from_seconds(col as u32 * 140);
                    (grid_stop(row, col), arrival, arrival + Duration::from_seconds(20))
                })
                .collect();
            builder.add_trip(&format!("{route}-{}", start.as_seconds()), &route, stop_times);
            start += Duration::from_minutes(10);
        }
    }

    for col in 0..size {
        let route = format!("col{col}");
        builder.add_route(&route, VehicleType::Tram);
        let mut start = Time::from_hm(7, 0) + Duration::from_seconds(col as u32 * 90);
        while start < Time::from_hm(8, 30) {
            let stop_times: Vec<_> = (0..size)
                .map(|row| {
                    let arrival = start + Duration::from_seconds(row as u32 * 150);
                    (grid_stop(row, col), arrival, arrival)
                })
                .collect();
            builder.add_trip(&format!("{route}-{}", start.as_seconds()), &route, stop_times);
            start += Duration::from_minutes(12);
        }
    }

    builder.add_route("express", VehicleType::Rail);
    let mut start = Time::from_hm(7, 5);
    while start < Time::from_hm(8, 30) {
        let stop_times: Vec<_> = (0..size)
            .step_by(2)
            .enumerate()
            .map(|(hop, i)| {
                let arrival = start + Duration::from_seconds(hop as u32 * 200);
                (grid_stop(i, i), arrival, arrival + Duration::from_seconds(30))
            })
            .collect();
        builder.add_trip(&format!("express-{}", start.as_seconds()), "express", stop_times);
        start += Duration::from_minutes(15);
    }

    for row in 0..size {
        for col in 0..size {
            let from = grid_stop(row, col);
            if col + 1 < size {
                builder.add_transfer(&from, &grid_stop(row, col + 1), None);
                builder.add_transfer(&grid_stop(row, col + 1), &from, None);
            }
            if row + 1 < size {
                builder.add_transfer(&from, &grid_stop(row + 1, col), None);
            }
        }
    }
    builder.build().expect("Failed to build repository")
}
