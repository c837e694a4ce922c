mod allocator;
mod arrival;
mod cancel;
mod config;
mod cost;
mod discovery;
mod explorer;
pub mod itinerary;
pub mod location;
mod pareto;
pub mod path;
mod request;
pub mod state;
pub mod view;

pub use allocator::Allocator;
pub use arrival::ArrivalId;
pub use cancel::*;
pub use config::*;
pub use cost::*;
pub use itinerary::*;
pub use location::*;
pub use pareto::Dominance;
pub use path::backtrack;
pub use request::*;
pub use state::*;
pub use view::*;

pub(crate) use allocator::LazyBuffer;

use crate::{
    raptor::{
        arrival::ArrivalEntry,
        cancel::Interrupt,
        discovery::departure_instants,
        explorer::{Context, run_round},
    },
    repository::Repository,
    shared::time::{self, Time},
};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Stop index {0} does not match any entry")]
    InvalidStop(u32),
    #[error("At least one access path is required")]
    MissingAccess,
    #[error("At least one egress path is required")]
    MissingEgress,
    #[error("Allocator was created for a different repository")]
    AllocatorMismatch,
    #[error("Invalid search config: {0}")]
    InvalidConfig(String),
}

/// Handed to the round callback after every transit round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub iteration: usize,
    pub departure: Time,
    pub round: usize,
    /// Stop arrivals accepted in the round.
    pub touched: usize,
    /// Earliest destination arrival so far, over all iterations.
    pub best_arrival: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status: SearchStatus,
    /// One itinerary per destination arrival, earliest arrival first.
    pub itineraries: Vec<Itinerary>,
    pub stats: SearchStats,
}

type RoundCallback<'a> = Box<dyn FnMut(&RoundSummary) + 'a>;

pub struct Raptor<'a> {
    repository: &'a Repository,
    access: Vec<AccessEgress>,
    egress: Vec<AccessEgress>,
    departure: Time,
    config: Config,
    cost: Option<Box<dyn CostCalculator + 'a>>,
    cancellation: Option<CancellationToken>,
    on_round: Option<RoundCallback<'a>>,
}

impl<'a> Raptor<'a> {
    pub fn new(
        repository: &'a Repository,
        access: Vec<AccessEgress>,
        egress: Vec<AccessEgress>,
    ) -> Self {
        Self {
            repository,
            access,
            egress,
            departure: Time::now(),
            config: Config::default(),
            cost: None,
            cancellation: None,
            on_round: None,
        }
    }

    /// Start of the search window.
    pub fn departure_at(mut self, departure: Time) -> Self {
        self.departure = departure;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the profile's default cost calculator. The standard profile
    /// defaults to [`ZeroCost`], multi-criteria to [`GeneralizedCost`].
    pub fn with_cost<C>(mut self, cost: C) -> Self
    where
        C: CostCalculator + 'a,
    {
        self.cost = Some(Box::new(cost));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn on_round<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&RoundSummary) + 'a,
    {
        self.on_round = Some(Box::new(callback));
        self
    }

    pub fn solve(self) -> Result<Response, self::Error> {
        let mut allocator = Allocator::new(self.repository);
        self.solve_with_allocator(&mut allocator)
    }

    /// Runs the search reusing the buffers of `allocator`. The arrivals stay in
    /// the allocator until its next search.
    pub fn solve_with_allocator(self, allocator: &mut Allocator) -> Result<Response, self::Error> {
        self.validate(allocator)?;
        let Self {
            repository,
            access,
            egress,
            departure,
            config,
            cost,
            cancellation,
            mut on_round,
        } = self;

        let cost = cost.unwrap_or_else(|| -> Box<dyn CostCalculator + 'a> {
            match config.profile {
                Profile::Standard => Box::new(ZeroCost),
                Profile::MultiCriteria => Box::new(GeneralizedCost::new(&config.cost)),
            }
        });
        let ctx = Context {
            repository,
            config: &config,
            cost: cost.as_ref(),
        };
        let interrupt = Interrupt::new(
            cancellation,
            config
                .timeout
                .map(|timeout| Instant::now() + std::time::Duration::from(timeout)),
        );

        let max_rounds = config.max_rounds();
        allocator.prepare(config.profile, max_rounds, &access, &egress);
        let departures = departure_instants(repository, &config, departure, &access);
        debug!(
            "Searching {} departures from {departure} with {:?}, {} access and {} egress paths",
            departures.len(),
            config.profile,
            access.len(),
            egress.len()
        );

        let mut status = SearchStatus::Complete;
        'iterations: for (iteration, departure) in departures.iter().enumerate() {
            if let Some(interrupted) = interrupt.check() {
                status = interrupted;
                break;
            }
            allocator.state.stats.iterations += 1;

            let mut previous = seed_access(&ctx, allocator, &access, *departure);
            trace!("Iteration {iteration} at {departure} seeded {} stops", previous.len());

            for round in 1..=max_rounds {
                if previous.is_empty() {
                    break;
                }
                previous = run_round(&ctx, allocator, round as u8, &previous);
                allocator.state.stats.rounds += 1;

                if let Some(callback) = on_round.as_mut() {
                    let best = allocator.state.destination_best();
                    callback(&RoundSummary {
                        iteration,
                        departure: *departure,
                        round,
                        touched: previous.len(),
                        best_arrival: (best != time::MAX).then_some(best),
                    });
                }
                if let Some(interrupted) = interrupt.check() {
                    status = interrupted;
                    break 'iterations;
                }
            }
        }

        if status.is_partial() {
            warn!(
                "Search stopped early ({status:?}) after {} iterations",
                allocator.state.stats.iterations
            );
        }

        let itineraries: Vec<Itinerary> = allocator
            .best_known_arrivals()
            .into_iter()
            .map(|arrival| Itinerary::new(&backtrack(arrival), repository))
            .collect();
        let stats = allocator.state.stats;
        debug!(
            "Found {} itineraries in {} rounds, {} arrivals accepted and {} rejected",
            itineraries.len(),
            stats.rounds,
            stats.accepted,
            stats.rejected
        );
        Ok(Response {
            status,
            itineraries,
            stats,
        })
    }

    fn validate(&self, allocator: &Allocator) -> Result<(), self::Error> {
        self.config.validate()?;
        if !allocator.fits(self.repository) {
            return Err(self::Error::AllocatorMismatch);
        }
        if self.access.is_empty() {
            return Err(self::Error::MissingAccess);
        }
        if self.egress.is_empty() {
            return Err(self::Error::MissingEgress);
        }
        let stop_count = self.repository.stops.len() as u32;
        match self
            .access
            .iter()
            .chain(self.egress.iter())
            .find(|path| path.stop_idx >= stop_count)
        {
            Some(path) => Err(self::Error::InvalidStop(path.stop_idx)),
            None => Ok(()),
        }
    }
}

/// Round 0, walking from the origin to every access stop.
fn seed_access(
    ctx: &Context,
    allocator: &mut Allocator,
    access: &[AccessEgress],
    departure: Time,
) -> Vec<ArrivalId> {
    allocator.state.begin_round();
    for (access_idx, path) in access.iter().enumerate() {
        let c1 = path.c1.unwrap_or_else(|| {
            ctx.cost.cost(&CostEvent::Access {
                duration: path.duration,
            })
        });
        allocator.state.try_improve(ArrivalEntry::access(
            path.stop_idx,
            departure + path.duration,
            c1,
            access_idx as u32,
            departure,
        ));
    }
    allocator.state.take_touched()
}

/// Runs independent searches in parallel, one allocator per worker thread.
pub fn solve_all(
    repository: &Repository,
    requests: &[Request],
) -> Vec<Result<Response, self::Error>> {
    requests
        .par_iter()
        .map_init(
            || Allocator::new(repository),
            |allocator, request| {
                Raptor::new(repository, request.access.clone(), request.egress.clone())
                    .departure_at(request.departure)
                    .with_config(request.config.clone())
                    .solve_with_allocator(allocator)
            },
        )
        .collect()
}
