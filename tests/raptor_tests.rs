mod common;

use common::{path, stop, t};
use range_raptor::{
    prelude::*,
    raptor::{
        self, Departures, GeneralizedCostConfig, LegType, PathLegType, RoundSummary, ZeroCost,
        backtrack,
    },
};

fn leg_types(itinerary: &Itinerary) -> Vec<&'static str> {
    itinerary
        .legs
        .iter()
        .map(|leg| match leg.leg_type {
            LegType::Access => "access",
            LegType::Transit { .. } => "transit",
            LegType::Transfer => "transfer",
            LegType::Egress => "egress",
        })
        .collect()
}

#[test]
fn scenario_a_single_trip_test() {
    let repository = common::scenario_a();
    let mut allocator = Allocator::new(&repository);
    let response = repository
        .raptor(
            vec![path(&repository, "X", 0)],
            vec![path(&repository, "Z", 0)],
        )
        .departure_at(t(0))
        .solve_with_allocator(&mut allocator)
        .unwrap();

    assert_eq!(response.status, SearchStatus::Complete);
    assert_eq!(response.itineraries.len(), 1);
    let itinerary = &response.itineraries[0];
    assert_eq!(itinerary.departure_time, t(0));
    assert_eq!(itinerary.arrival_time, t(20));
    assert_eq!(itinerary.transfers, 0);
    assert_eq!(leg_types(itinerary), vec!["access", "transit", "egress"]);
    assert_eq!(itinerary.legs[1].stops.len(), 3);

    let best = allocator.best_known_arrivals();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].round(), 1);
    assert!(best[0].arrived_at_destination());
    let transit = best[0].previous().unwrap();
    assert_eq!(transit.stop(), stop(&repository, "Z"));
    assert_eq!(
        transit.to_string(),
        "Transit { round: 1, stop: 2, arrival: [00:00:20 C₁0] }"
    );
}

#[test]
fn scenario_b_time_only_keeps_fastest_test() {
    let repository = common::scenario_b();
    let access = vec![path(&repository, "X", 0)];
    let egress = vec![path(&repository, "Z", 0)];

    let standard = repository
        .raptor(access.clone(), egress.clone())
        .departure_at(t(0))
        .solve()
        .unwrap();
    assert_eq!(standard.itineraries.len(), 1);
    assert_eq!(standard.itineraries[0].arrival_time, t(15));
    assert_eq!(standard.itineraries[0].transfers, 1);

    let zero_cost = repository
        .raptor(access, egress)
        .departure_at(t(0))
        .with_config(Config::multi_criteria())
        .with_cost(ZeroCost)
        .solve()
        .unwrap();
    assert_eq!(zero_cost.itineraries.len(), 1);
    assert_eq!(zero_cost.itineraries[0].arrival_time, t(15));
}

#[test]
fn scenario_b_cost_keeps_both_test() {
    let repository = common::scenario_b();
    let response = repository
        .raptor(
            vec![path(&repository, "X", 0)],
            vec![path(&repository, "Z", 0)],
        )
        .departure_at(t(0))
        .with_config(Config::multi_criteria())
        .solve()
        .unwrap();

    assert_eq!(response.itineraries.len(), 2);
    let fast = &response.itineraries[0];
    let direct = &response.itineraries[1];
    assert_eq!(fast.arrival_time, t(15));
    assert_eq!(fast.transfers, 1);
    assert_eq!(
        leg_types(fast),
        vec!["access", "transit", "transit", "egress"]
    );
    assert_eq!(direct.arrival_time, t(20));
    assert_eq!(direct.transfers, 0);
    // Board cost, 20 seconds riding
    assert_eq!(direct.c1, 6000 + 2000);
    // Both boardings, the transfer penalty, a second of waiting and 14 seconds riding
    assert_eq!(fast.c1, 6000 + 1000 + 6000 + 12000 + 100 + 400);
}

#[test]
fn scenario_c_slow_transfer_is_rejected_test() {
    let repository = common::scenario_c();
    let z = stop(&repository, "Z");
    for config in [Config::default(), Config::multi_criteria()] {
        let mut allocator = Allocator::new(&repository);
        let response = repository
            .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
            .departure_at(t(0))
            .with_config(config)
            .solve_with_allocator(&mut allocator)
            .unwrap();

        let at_z = allocator.arrivals_at(z);
        assert_eq!(at_z.len(), 1);
        assert_eq!(at_z[0].arrived_by(), PathLegType::Transit);
        assert_eq!(at_z[0].arrival_time(), t(20));
        assert!(response.stats.rejected >= 1);

        assert_eq!(response.itineraries.len(), 1);
        assert_eq!(leg_types(&response.itineraries[0]), vec!["access", "transit", "egress"]);
    }
}

#[test]
fn scenario_d_cancel_after_first_round_test() {
    let repository = common::scenario_b();
    let token = CancellationToken::new();
    let cancel = token.clone();
    let response = repository
        .raptor(
            vec![path(&repository, "X", 0)],
            vec![path(&repository, "Z", 0)],
        )
        .departure_at(t(0))
        .with_config(Config::multi_criteria())
        .with_cancellation(token)
        .on_round(move |summary: &RoundSummary| {
            if summary.round == 1 {
                cancel.cancel();
            }
        })
        .solve()
        .unwrap();

    assert_eq!(response.status, SearchStatus::Cancelled);
    assert!(response.status.is_partial());
    assert_eq!(response.stats.rounds, 1);
    assert_eq!(response.itineraries.len(), 1);
    assert_eq!(response.itineraries[0].arrival_time, t(20));
    assert_eq!(response.itineraries[0].transfers, 0);
}

#[test]
fn cancelled_before_start_test() {
    let repository = common::scenario_a();
    let token = CancellationToken::new();
    token.cancel();
    let response = repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(t(0))
        .with_cancellation(token)
        .solve()
        .unwrap();
    assert_eq!(response.status, SearchStatus::Cancelled);
    assert!(response.itineraries.is_empty());
}

#[test]
fn unreachable_destination_test() {
    let repository = common::scenario_c();
    let response = repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "W", 0)])
        .departure_at(t(0))
        .solve()
        .unwrap();
    assert_eq!(response.status, SearchStatus::Complete);
    assert!(response.itineraries.is_empty());
}

#[test]
fn round_callback_test() {
    let repository = common::scenario_b();
    let mut rounds = vec![];
    repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(t(0))
        .on_round(|summary: &RoundSummary| rounds.push(*summary))
        .solve()
        .unwrap();

    assert_eq!(rounds[0].round, 1);
    assert_eq!(rounds[0].best_arrival, Some(t(20)));
    assert_eq!(rounds[1].round, 2);
    assert_eq!(rounds[1].best_arrival, Some(t(15)));
}

#[test]
fn access_and_egress_durations_test() {
    let repository = common::scenario_a();
    let response = repository
        .raptor(vec![path(&repository, "X", 60)], vec![path(&repository, "Z", 30)])
        .departure_at(Time::from_hm(23, 59))
        .solve()
        .unwrap();
    // The only trip departs at 00:00:00 of the same service day
    assert!(response.itineraries.is_empty());

    let repository = common::frequent_line();
    let response = repository
        .raptor(vec![path(&repository, "X", 120)], vec![path(&repository, "Z", 30)])
        .departure_at(Time::from_hm(7, 57))
        .solve()
        .unwrap();
    let itinerary = &response.itineraries[0];
    assert_eq!(itinerary.departure_time, Time::from_hm(7, 57));
    assert_eq!(
        itinerary.arrival_time,
        Time::from_hm(8, 20) + Duration::from_seconds(30)
    );
    assert_eq!(itinerary.legs[0].arrival_time, Time::from_hm(7, 59));
}

#[test]
fn access_cost_override_test() {
    let repository = common::frequent_line();
    let solve = |access: AccessEgress| {
        repository
            .raptor(vec![access], vec![path(&repository, "Z", 0)])
            .departure_at(Time::from_hm(7, 57))
            .with_config(Config::multi_criteria())
            .solve()
            .unwrap()
            .itineraries[0]
            .c1
    };
    let walked = solve(path(&repository, "X", 120));
    let free = solve(path(&repository, "X", 120).with_c1(0));
    // Two minutes of walking at the default reluctance
    assert_eq!(walked - free, 120 * 200);
}

#[test]
fn slack_test() {
    let repository = common::frequent_line();
    let mut config = Config::default();
    config.slack.board = Duration::from_minutes(1);
    config.slack.alight = Duration::from_seconds(15);
    let response = repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(Time::from_hm(7, 59) + Duration::from_seconds(30))
        .with_config(config)
        .solve()
        .unwrap();
    // Too late for 08:00 with one minute of board slack
    let itinerary = &response.itineraries[0];
    assert_eq!(
        itinerary.arrival_time,
        Time::from_hm(8, 30) + Duration::from_seconds(15)
    );
}

#[test]
fn range_search_test() {
    let repository = common::frequent_line();
    let config = Config {
        search_window: Duration::from_minutes(30),
        departures: Departures::Every {
            step: Duration::from_minutes(1),
        },
        ..Default::default()
    };
    let response = repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(Time::from_hm(7, 55))
        .with_config(config)
        .solve()
        .unwrap();

    assert_eq!(response.stats.iterations, 31);
    assert_eq!(response.itineraries.len(), 1);
    // The latest departure still reaching the earliest arrival
    assert_eq!(response.itineraries[0].departure_time, Time::from_hm(8, 0));
    assert_eq!(response.itineraries[0].arrival_time, Time::from_hm(8, 20));
}

#[test]
fn range_search_trip_departures_test() {
    let repository = common::frequent_line();
    let config = Config {
        search_window: Duration::from_minutes(30),
        departures: Departures::TripDepartures,
        ..Default::default()
    };
    let response = repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(Time::from_hm(7, 55))
        .with_config(config)
        .solve()
        .unwrap();

    // 08:00, 08:10 and 08:20 fall inside the window, next to its ends
    assert_eq!(response.stats.iterations, 5);
    assert_eq!(response.itineraries.len(), 1);
    assert_eq!(response.itineraries[0].departure_time, Time::from_hm(8, 0));
    assert_eq!(response.itineraries[0].arrival_time, Time::from_hm(8, 20));
}

fn labels(response: &Response) -> Vec<(Time, u32)> {
    let mut labels: Vec<_> = response
        .itineraries
        .iter()
        .map(|itinerary| (itinerary.arrival_time, itinerary.c1))
        .collect();
    labels.sort_unstable();
    labels
}

#[test]
fn transfer_from_later_transit_arrival_test() {
    let repository = common::walk_then_ride();
    for config in [Config::default(), Config::multi_criteria()] {
        let response = repository
            .raptor(vec![path(&repository, "O", 0)], vec![path(&repository, "T", 0)])
            .departure_at(t(0))
            .with_config(config.clone())
            .solve()
            .unwrap();

        // Walking X -> S is faster, but S -> T can only be walked after a ride
        assert_eq!(response.itineraries.len(), 1, "{:?}", config.profile);
        let itinerary = &response.itineraries[0];
        assert_eq!(itinerary.arrival_time, t(105));
        assert_eq!(
            leg_types(itinerary),
            vec!["access", "transit", "transit", "transfer", "egress"]
        );
        if config.profile == Profile::MultiCriteria {
            assert_eq!(itinerary.c1, 35000);
        }
    }
}

#[test]
fn every_and_trip_departures_agree_test() {
    let repository = common::bus_or_rail();
    let solve = |departures| {
        let config = Config {
            search_window: Duration::from_minutes(10),
            departures,
            cost: GeneralizedCostConfig {
                vehicle_reluctance: vec![(VehicleType::Rail, 50)],
                ..Default::default()
            },
            ..Config::multi_criteria()
        };
        repository
            .raptor(vec![path(&repository, "O", 0)], vec![path(&repository, "D", 0)])
            .departure_at(Time::from_hm(8, 0))
            .with_config(config)
            .solve()
            .unwrap()
    };

    let every = solve(Departures::Every {
        step: Duration::from_minutes(1),
    });
    let trips = solve(Departures::TripDepartures);
    // The rail trip only pays off when leaving at the end of the window
    let expected = vec![
        (Time::from_hm(8, 30), 156000),
        (Time::from_hm(8, 40), 126000),
    ];
    assert_eq!(labels(&every), expected);
    assert_eq!(labels(&trips), expected);
    assert!(trips.stats.iterations < every.stats.iterations);

    let repository = common::grid(6);
    let solve = |departures| {
        let config = Config {
            search_window: Duration::from_minutes(20),
            departures,
            ..Default::default()
        };
        repository
            .raptor(
                vec![path(&repository, "r0c0", 60)],
                vec![path(&repository, "r5c5", 60)],
            )
            .departure_at(Time::from_hm(7, 30))
            .with_config(config)
            .solve()
            .unwrap()
    };
    let every = solve(Departures::Every {
        step: Duration::from_minutes(1),
    });
    let trips = solve(Departures::TripDepartures);
    assert!(!every.itineraries.is_empty());
    assert_eq!(labels(&every), labels(&trips));
}

#[test]
fn destination_pruning_is_exact_test() {
    let repository = common::grid(6);
    let solve = |destination_pruning| {
        let config = Config {
            search_window: Duration::from_minutes(20),
            destination_pruning,
            ..Default::default()
        };
        repository
            .raptor(
                vec![path(&repository, "r0c0", 60)],
                vec![path(&repository, "r5c5", 60), path(&repository, "r4c5", 240)],
            )
            .departure_at(Time::from_hm(7, 30))
            .with_config(config)
            .solve()
            .unwrap()
    };
    let pruned = solve(true);
    let full = solve(false);
    assert!(!pruned.itineraries.is_empty());
    assert_eq!(labels(&pruned), labels(&full));
    assert!(pruned.stats.accepted <= full.stats.accepted);

    let walk_then_ride = common::walk_then_ride();
    let arrivals: Vec<_> = [true, false]
        .into_iter()
        .map(|destination_pruning| {
            let config = Config {
                destination_pruning,
                ..Default::default()
            };
            let response = walk_then_ride
                .raptor(
                    vec![path(&walk_then_ride, "O", 0)],
                    vec![path(&walk_then_ride, "T", 0)],
                )
                .departure_at(t(0))
                .with_config(config)
                .solve()
                .unwrap();
            labels(&response)
        })
        .collect();
    assert_eq!(arrivals[0], arrivals[1]);
}

#[test]
fn non_dominance_test() {
    let repository = common::grid(6);
    let config = Config {
        search_window: Duration::from_minutes(20),
        ..Config::multi_criteria()
    };
    let mut allocator = Allocator::new(&repository);
    repository
        .raptor(
            vec![AccessEgress::new(stop(&repository, "r0c0"), Duration::from_seconds(60))],
            vec![AccessEgress::new(stop(&repository, "r5c5"), Duration::from_seconds(60))],
        )
        .departure_at(Time::from_hm(7, 30))
        .with_config(config)
        .solve_with_allocator(&mut allocator)
        .unwrap();

    // Only an on-board arrival can dominate another on-board arrival
    let dominates = |a: &raptor::ArrivalView, b: &raptor::ArrivalView| {
        (a.arrived_on_board() || !b.arrived_on_board())
            && a.arrival_time() <= b.arrival_time()
            && a.c1() <= b.c1()
            && (a.arrival_time() < b.arrival_time()
                || a.c1() < b.c1()
                || a.arrived_on_board() != b.arrived_on_board())
    };
    for stop_idx in 0..repository.stops.len() as u32 {
        let arrivals = allocator.arrivals_at(stop_idx);
        for a in arrivals.iter() {
            assert!(!a.is_removed());
            for b in arrivals.iter() {
                if a.id() != b.id() && a.round() <= b.round() {
                    assert!(!dominates(a, b), "{a} dominates {b}");
                }
            }
        }
    }

    let destination = allocator.best_known_arrivals();
    assert!(!destination.is_empty());
    for a in destination.iter() {
        for b in destination.iter() {
            assert!(a.id() == b.id() || !dominates(a, b), "{a} dominates {b}");
        }
    }
}

#[test]
fn more_rounds_never_worsen_test() {
    let repository = common::grid(6);
    let access = vec![AccessEgress::new(stop(&repository, "r0c0"), Duration::ZERO)];
    let egress = vec![AccessEgress::new(stop(&repository, "r5c4"), Duration::ZERO)];

    let mut previous: Option<Vec<(Time, u32)>> = None;
    let mut previous_standard = None;
    for max_transfers in 0..4 {
        let config = Config {
            max_transfers,
            ..Config::multi_criteria()
        };
        let mut allocator = Allocator::new(&repository);
        repository
            .raptor(access.clone(), egress.clone())
            .departure_at(Time::from_hm(7, 30))
            .with_config(config)
            .solve_with_allocator(&mut allocator)
            .unwrap();
        let labels: Vec<(Time, u32)> = allocator
            .best_known_arrivals()
            .iter()
            .map(|view| (view.arrival_time(), view.c1()))
            .collect();
        if let Some(previous) = previous {
            for (time, c1) in previous {
                assert!(
                    labels.iter().any(|(t, c)| *t <= time && *c <= c1),
                    "{time} C₁{c1} got lost with {max_transfers} transfers"
                );
            }
        }
        previous = Some(labels);

        let standard = repository
            .raptor(access.clone(), egress.clone())
            .departure_at(Time::from_hm(7, 30))
            .with_config(Config {
                max_transfers,
                ..Default::default()
            })
            .solve()
            .unwrap();
        let best = standard.itineraries.first().map(|itinerary| itinerary.arrival_time);
        if let Some(Some(previous_best)) = previous_standard {
            assert!(best.is_some_and(|best| best <= previous_best));
        }
        previous_standard = Some(best);
    }
}

#[test]
fn path_validity_test() {
    let repository = common::grid(6);
    let mut config = Config {
        search_window: Duration::from_minutes(20),
        ..Config::multi_criteria()
    };
    config.slack.board = Duration::from_seconds(30);
    config.slack.alight = Duration::from_seconds(10);
    config.slack.transfer = Duration::from_seconds(60);
    let slack = config.slack;

    let mut allocator = Allocator::new(&repository);
    let response = repository
        .raptor(
            vec![
                AccessEgress::new(stop(&repository, "r0c0"), Duration::from_seconds(30)),
                AccessEgress::new(stop(&repository, "r0c1"), Duration::from_seconds(240)),
            ],
            vec![AccessEgress::new(stop(&repository, "r5c5"), Duration::from_seconds(30))],
        )
        .departure_at(Time::from_hm(7, 20))
        .with_config(config)
        .solve_with_allocator(&mut allocator)
        .unwrap();
    assert!(!response.itineraries.is_empty());

    for arrival in allocator.best_known_arrivals() {
        let path = backtrack(arrival);
        assert!(path[0].arrived_by_access());
        assert!(path.last().unwrap().arrived_at_destination());
        for pair in path.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            assert!(previous.arrival_time() <= current.arrival_time());
            match current.arrived_by() {
                PathLegType::Transit => {
                    let transit = current.transit_path();
                    let mut required = previous.arrival_time() + slack.board;
                    if previous.most_recent_transit_arrival().is_some() {
                        required += slack.transfer;
                    }
                    assert!(transit.board_time >= required);
                    assert_eq!(transit.board_stop, previous.stop());
                    let trip = &repository.trips[transit.trip_idx as usize];
                    assert_eq!(
                        current.arrival_time(),
                        trip.arrival(transit.alight_pos) + slack.alight
                    );
                    assert_eq!(current.round(), previous.round() + 1);
                }
                PathLegType::Transfer => {
                    assert!(previous.arrived_by_transit());
                    assert_eq!(current.transfer_path().from_stop, previous.stop());
                    assert_eq!(current.round(), previous.round());
                }
                PathLegType::Egress => {
                    assert_eq!(current.egress_path().stop_idx, previous.stop());
                }
                PathLegType::Access => panic!("access in the middle of {current}"),
            }
        }
    }

    for itinerary in response.itineraries.iter() {
        assert!(itinerary.departure_time <= itinerary.arrival_time);
        for leg in itinerary.transit_legs() {
            assert!(leg.stops.len() >= 2);
        }
    }
}

#[test]
fn most_recent_transit_arrival_test() {
    let repository = common::scenario_c();
    let config = Config {
        max_transfers: 0,
        ..Default::default()
    };
    let mut allocator = Allocator::new(&repository);
    repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(t(0))
        .with_config(config)
        .solve_with_allocator(&mut allocator)
        .unwrap();

    let destination = allocator.best_known_arrivals()[0];
    let transit = destination.most_recent_transit_arrival().unwrap();
    assert_eq!(transit.stop, stop(&repository, "Z"));
    assert_eq!(transit.arrival_time, t(20));
    assert_eq!(
        repository.trips[transit.trip_idx as usize].id.as_ref(),
        "direct-1"
    );

    let access = backtrack(destination)[0];
    assert!(access.is_first_round());
    assert!(access.most_recent_transit_arrival().is_none());
    assert_eq!(access.access_path().departure_time, t(0));
}

#[test]
#[should_panic]
fn mismatched_accessor_panics_test() {
    let repository = common::scenario_a();
    let mut allocator = Allocator::new(&repository);
    repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(t(0))
        .solve_with_allocator(&mut allocator)
        .unwrap();
    let destination = allocator.best_known_arrivals()[0];
    let _ = destination.previous().unwrap().transfer_path();
}

#[test]
#[should_panic]
fn egress_has_no_stop_test() {
    let repository = common::scenario_a();
    let mut allocator = Allocator::new(&repository);
    repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(t(0))
        .solve_with_allocator(&mut allocator)
        .unwrap();
    let _ = allocator.best_known_arrivals()[0].stop();
}

#[test]
fn allocator_reuse_test() {
    let repository = common::grid(5);
    let mut allocator = Allocator::new(&repository);
    let solve = |allocator: &mut Allocator, departure: Time| {
        repository
            .raptor(
                vec![AccessEgress::new(stop(&repository, "r0c0"), Duration::ZERO)],
                vec![AccessEgress::new(stop(&repository, "r4c4"), Duration::ZERO)],
            )
            .departure_at(departure)
            .with_config(Config::multi_criteria())
            .solve_with_allocator(allocator)
            .unwrap()
    };
    let first = solve(&mut allocator, Time::from_hm(7, 10));
    solve(&mut allocator, Time::from_hm(8, 0));
    let again = solve(&mut allocator, Time::from_hm(7, 10));
    let fresh = repository
        .raptor(
            vec![AccessEgress::new(stop(&repository, "r0c0"), Duration::ZERO)],
            vec![AccessEgress::new(stop(&repository, "r4c4"), Duration::ZERO)],
        )
        .departure_at(Time::from_hm(7, 10))
        .with_config(Config::multi_criteria())
        .solve()
        .unwrap();

    let summary = |response: &Response| -> Vec<(Time, u32)> {
        response
            .itineraries
            .iter()
            .map(|itinerary| (itinerary.arrival_time, itinerary.c1))
            .collect()
    };
    assert_eq!(summary(&first), summary(&again));
    assert_eq!(summary(&first), summary(&fresh));
    assert_eq!(first.stats, again.stats);
}

#[test]
fn batch_search_test() {
    let repository = common::scenario_b();
    let request = |config: Config| raptor::Request {
        access: vec![path(&repository, "X", 0)],
        egress: vec![path(&repository, "Z", 0)],
        departure: t(0),
        config,
    };
    let requests = vec![
        request(Config::default()),
        request(Config::multi_criteria()),
        raptor::Request {
            access: vec![],
            ..request(Config::default())
        },
    ];
    let responses = raptor::solve_all(&repository, &requests);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].as_ref().unwrap().itineraries.len(), 1);
    assert_eq!(responses[1].as_ref().unwrap().itineraries.len(), 2);
    assert_eq!(
        responses[2].as_ref().unwrap_err(),
        &raptor::Error::MissingAccess
    );
}

#[test]
fn invalid_request_test() {
    let repository = common::scenario_a();
    let x = path(&repository, "X", 0);
    let z = path(&repository, "Z", 0);

    let error = repository.raptor(vec![], vec![z]).solve().unwrap_err();
    assert_eq!(error, raptor::Error::MissingAccess);

    let error = repository.raptor(vec![x], vec![]).solve().unwrap_err();
    assert_eq!(error, raptor::Error::MissingEgress);

    let error = repository
        .raptor(vec![AccessEgress::new(99, Duration::ZERO)], vec![z])
        .solve()
        .unwrap_err();
    assert_eq!(error, raptor::Error::InvalidStop(99));

    let error = repository
        .raptor(vec![x], vec![z])
        .with_config(Config {
            max_transfers: 300,
            ..Default::default()
        })
        .solve()
        .unwrap_err();
    assert!(matches!(error, raptor::Error::InvalidConfig(_)));

    let other = common::grid(3);
    let mut allocator = Allocator::new(&other);
    let error = repository
        .raptor(vec![x], vec![z])
        .solve_with_allocator(&mut allocator)
        .unwrap_err();
    assert_eq!(error, raptor::Error::AllocatorMismatch);
}

#[test]
fn itinerary_serialize_test() {
    let repository = common::scenario_a();
    let response = repository
        .raptor(vec![path(&repository, "X", 0)], vec![path(&repository, "Z", 0)])
        .departure_at(t(0))
        .solve()
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "Complete");
    assert_eq!(json["itineraries"][0]["arrival_time"], 20);
    assert_eq!(json["itineraries"][0]["legs"][1]["leg_type"]["Transit"]["trip_id"], "slow-1");
    assert_eq!(json["itineraries"][0]["legs"][0]["from"], "Origin");
}
