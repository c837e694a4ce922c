use crate::{
    raptor::{
        Allocator, ArrivalId, ArrivalState, Config, CostCalculator, CostEvent, LazyBuffer,
        Profile,
        arrival::{Arrival, ArrivalEntry},
        discovery::collect_boarding,
    },
    repository::{Pattern, Repository, TripSchedule},
    shared::Time,
};
use rayon::prelude::*;
use tracing::debug;

/// Everything a round reads but never writes.
#[derive(Clone, Copy)]
pub(crate) struct Context<'a> {
    pub repository: &'a Repository,
    pub config: &'a Config,
    pub cost: &'a dyn CostCalculator,
}

impl Context<'_> {
    /// Candidates that can not beat the destination are dropped.
    #[inline(always)]
    fn pruned_by_destination(&self, state: &ArrivalState, arrival_time: Time) -> bool {
        self.config.prunes_by_destination() && arrival_time >= state.destination_best()
    }
}

/// A rider on board of a trip while a pattern is scanned.
#[derive(Debug, Clone, Copy)]
struct Ride {
    trip_pos: usize,
    trip_idx: u32,
    board_pos: usize,
    board_stop: u32,
    board_time: Time,
    /// c1 right after boarding.
    board_c1: u32,
    previous: ArrivalId,
}

impl Ride {
    /// c1 of still sitting on the trip when it departs from `pos`.
    #[inline(always)]
    fn c1_at_departure(&self, ctx: &Context, pattern: &Pattern, trip: &TripSchedule, pos: usize) -> u32 {
        self.board_c1.saturating_add(ctx.cost.cost(&CostEvent::Ride {
            vehicle_type: pattern.vehicle_type,
            duration: trip.departure(pos) - self.board_time,
        }))
    }
}

/// Runs one transit round: scans the patterns boardable from `previous`,
/// relaxes transfers from the new transit arrivals, then egress from every
/// arrival accepted in the round. Returns the accepted stop arrivals.
pub(crate) fn run_round(
    ctx: &Context,
    allocator: &mut Allocator,
    round: u8,
    previous: &[ArrivalId],
) -> Vec<ArrivalId> {
    allocator.state.begin_round();
    collect_boarding(ctx.repository, allocator, previous);
    if allocator.active_patterns.is_empty() {
        return vec![];
    }

    explore_routes(ctx, allocator, round);
    let rides = allocator.run_updates();

    let transit = allocator.state.touched().to_vec();
    explore_transfers(ctx, allocator, round, &transit);
    let walks = allocator.run_updates();

    let touched = allocator.state.take_touched();
    debug!(
        "Round {round}: {} boarding stops, {} patterns, accepted {rides} transit and {walks} transfer arrivals",
        allocator.boarding_stops.len(),
        allocator.active_patterns.len()
    );
    explore_egress(ctx, allocator, round, &touched);
    touched
}

/// Scans all active patterns and adds transit candidates to the update buffer.
pub(crate) fn explore_routes(ctx: &Context, allocator: &mut Allocator, round: u8) {
    let state = &allocator.state;
    let boarding = &allocator.boarding;
    let active = &allocator.active;
    let updates = allocator
        .active_patterns
        .par_iter()
        .map_init(
            || (LazyBuffer::new(32), Vec::<Ride>::with_capacity(8)),
            |(buffer, rides), pattern_idx| {
                rides.clear();
                let pattern = &ctx.repository.patterns[*pattern_idx as usize];
                let start = active[*pattern_idx as usize] as usize;

                for (pos, stop_idx) in pattern.stops.iter().enumerate().skip(start) {
                    // PART A
                    // Alight every rider on board at this stop
                    for ride in rides.iter() {
                        let trip = &ctx.repository.trips[ride.trip_idx as usize];
                        let arrival_time = trip.arrival(pos) + ctx.config.slack.alight;
                        if ctx.pruned_by_destination(state, arrival_time) {
                            continue;
                        }
                        let ride_cost = ctx.cost.cost(&CostEvent::Ride {
                            vehicle_type: pattern.vehicle_type,
                            duration: trip.arrival(pos) - ride.board_time,
                        });
                        let alight_cost = ctx.cost.cost(&CostEvent::Alighting {
                            stop_idx: *stop_idx,
                        });
                        buffer.push(ArrivalEntry {
                            stop: *stop_idx,
                            round,
                            arrival_time,
                            c1: ride
                                .board_c1
                                .saturating_add(ride_cost)
                                .saturating_add(alight_cost),
                            previous: Some(ride.previous),
                            arrival: Arrival::Transit {
                                pattern_idx: *pattern_idx,
                                trip_idx: ride.trip_idx,
                                board_stop: ride.board_stop,
                                board_pos: ride.board_pos as u32,
                                alight_pos: pos as u32,
                                board_time: ride.board_time,
                            },
                        });
                    }

                    // PART B
                    // Board from the previous round, never at the last stop
                    if pos + 1 == pattern.len() {
                        break;
                    }
                    for id in &boarding[*stop_idx as usize] {
                        if let Some(ride) = board(ctx, state, pattern, pos, *stop_idx, *id) {
                            add_ride(ctx, pattern, rides, ride, pos);
                        }
                    }
                }
                buffer.swap()
            },
        )
        .flatten();
    allocator.updates.par_extend(updates);
}

/// The earliest trip the arrival can catch at `pos`.
fn board(
    ctx: &Context,
    state: &ArrivalState,
    pattern: &Pattern,
    pos: usize,
    stop_idx: u32,
    id: ArrivalId,
) -> Option<Ride> {
    let view = state.view(id);
    let first_boarding = view.most_recent_transit_arrival().is_none();
    let mut slack = ctx.config.slack.board;
    if !first_boarding {
        slack += ctx.config.slack.transfer;
    }
    let ready = view.arrival_time() + slack;
    let (trip_pos, trip) = ctx
        .repository
        .earliest_trip_at_or_after(pattern.index, pos, ready)?;

    let board_time = trip.departure(pos);
    let board_cost = ctx.cost.cost(&CostEvent::Boarding {
        stop_idx,
        wait: board_time - view.arrival_time(),
        first_boarding,
        vehicle_type: pattern.vehicle_type,
    });
    Some(Ride {
        trip_pos,
        trip_idx: trip.index,
        board_pos: pos,
        board_stop: stop_idx,
        board_time,
        board_c1: view.c1().saturating_add(board_cost),
        previous: id,
    })
}

/// Adds a boarding to the riders of a pattern scan.
///
/// The standard profile keeps a single rider on the earliest trip. The
/// multi-criteria profile keeps one rider per trip and cost, a rider only
/// retires another on the same trip whose c1 at `pos` is not lower. Ride cost
/// is additive, so that comparison holds for every later stop as well.
fn add_ride(ctx: &Context, pattern: &Pattern, rides: &mut Vec<Ride>, ride: Ride, pos: usize) {
    match ctx.config.profile {
        Profile::Standard => match rides.first() {
            Some(current) if current.trip_pos <= ride.trip_pos => {}
            _ => {
                rides.clear();
                rides.push(ride);
            }
        },
        Profile::MultiCriteria => {
            let trip = &ctx.repository.trips[ride.trip_idx as usize];
            let covered = rides.iter().any(|other| {
                other.trip_idx == ride.trip_idx
                    && other.c1_at_departure(ctx, pattern, trip, pos) <= ride.board_c1
            });
            if covered {
                return;
            }
            rides.retain(|other| {
                other.trip_idx != ride.trip_idx
                    || other.c1_at_departure(ctx, pattern, trip, pos) < ride.board_c1
            });
            rides.push(ride);
        }
    }
}

/// Relaxes the transfers leaving from this round's transit arrivals.
pub(crate) fn explore_transfers(
    ctx: &Context,
    allocator: &mut Allocator,
    round: u8,
    transit: &[ArrivalId],
) {
    let state = &allocator.state;
    let updates = transit
        .par_iter()
        .filter(|id| !state.is_removed(**id))
        .map_init(
            || LazyBuffer::<ArrivalEntry>::new(8),
            |buffer, id| {
                let entry = state.entry(*id);
                ctx.repository
                    .transfers_from(entry.stop)
                    .filter(|transfer| transfer.to_stop_idx != entry.stop)
                    .for_each(|transfer| {
                        let arrival_time = entry.arrival_time + transfer.duration;
                        if ctx.pruned_by_destination(state, arrival_time) {
                            return;
                        }
                        let cost = ctx.cost.cost(&CostEvent::Transfer {
                            duration: transfer.duration,
                            distance: transfer.distance,
                        });
                        buffer.push(ArrivalEntry {
                            stop: transfer.to_stop_idx,
                            round,
                            arrival_time,
                            c1: entry.c1.saturating_add(cost),
                            previous: Some(*id),
                            arrival: Arrival::Transfer {
                                from_stop: entry.stop,
                                transfer_idx: transfer.index,
                            },
                        });
                    });
                buffer.swap()
            },
        )
        .flatten();
    allocator.updates.par_extend(updates);
}

/// Registers destination arrivals for every egress path leaving from a stop
/// touched in this round.
pub(crate) fn explore_egress(
    ctx: &Context,
    allocator: &mut Allocator,
    round: u8,
    touched: &[ArrivalId],
) {
    for id in touched {
        if allocator.state.is_removed(*id) {
            continue;
        }
        let entry = *allocator.state.entry(*id);
        for egress_idx in &allocator.egress_by_stop[entry.stop as usize] {
            let egress = allocator.state.egress[*egress_idx as usize];
            let c1 = egress.c1.unwrap_or_else(|| {
                ctx.cost.cost(&CostEvent::Egress {
                    duration: egress.duration,
                })
            });
            allocator.state.try_improve_destination(ArrivalEntry {
                stop: entry.stop,
                round,
                arrival_time: entry.arrival_time + egress.duration,
                c1: entry.c1.saturating_add(c1),
                previous: Some(*id),
                arrival: Arrival::Egress {
                    egress_idx: *egress_idx,
                },
            });
        }
    }
}

#[cfg(test)]
fn line(multi_criteria: bool) -> (Repository, Config) {
    let mut builder = Repository::builder();
    builder
        .add_stop("A", "A")
        .add_stop("B", "B")
        .add_stop("C", "C")
        .add_route("R", crate::repository::VehicleType::Bus)
        .add_trip(
            "T1",
            "R",
            [
                ("A", Time::from_seconds(100), Time::from_seconds(100)),
                ("B", Time::from_seconds(200), Time::from_seconds(210)),
                ("C", Time::from_seconds(300), Time::from_seconds(300)),
            ],
        )
        .add_transfer("B", "C", Some(crate::shared::Duration::from_seconds(200)));
    let config = if multi_criteria {
        Config::multi_criteria()
    } else {
        Config::default()
    };
    (builder.build().unwrap(), config)
}

#[test]
fn round_after_convergence_is_a_no_op_test() {
    use crate::raptor::{AccessEgress, ZeroCost};
    use crate::shared::Duration;

    for multi_criteria in [false, true] {
        let (repository, config) = line(multi_criteria);
        let ctx = Context {
            repository: &repository,
            config: &config,
            cost: &ZeroCost,
        };
        let mut allocator = Allocator::new(&repository);
        let access = [AccessEgress::new(0, Duration::ZERO)];
        let egress = [AccessEgress::new(2, Duration::ZERO)];
        allocator.prepare(config.profile, config.max_rounds(), &access, &egress);

        allocator.state.begin_round();
        allocator.state.try_improve(ArrivalEntry::access(
            0,
            Time::from_seconds(50),
            0,
            0,
            Time::from_seconds(50),
        ));
        let mut previous = allocator.state.take_touched();
        let mut round = 1;
        while !previous.is_empty() {
            previous = run_round(&ctx, &mut allocator, round, &previous);
            round += 1;
        }
        assert_eq!(round, 3);

        let stored = allocator.state.arena_len();
        let touched = run_round(&ctx, &mut allocator, round, &previous);
        assert!(touched.is_empty());
        assert_eq!(allocator.state.arena_len(), stored);

        let best = allocator.best_known_arrivals();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].arrival_time(), Time::from_seconds(300));
    }
}
