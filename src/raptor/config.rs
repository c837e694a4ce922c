use serde::Deserialize;

use crate::{
    raptor::{self, GeneralizedCostConfig},
    shared::Duration,
};

/// Rounds are stored as `u8`, round 0 being the access round.
pub const MAX_TRANSFERS: usize = 250;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Earliest arrival only. A stop and round keeps its earliest arrival
    /// and, when a walk got there first, its earliest on-board arrival.
    #[default]
    Standard,
    /// Pareto sets over arrival time, c1 and arriving on board.
    MultiCriteria,
}

/// Which departure instants of the search window are iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Departures {
    /// Every `step` from the end of the window back to its start.
    Every { step: Duration },
    /// The instants at which a trip can just be caught at an access stop,
    /// plus both ends of the window.
    TripDepartures,
}

impl Default for Departures {
    fn default() -> Self {
        Self::Every {
            step: Duration::from_minutes(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Slack {
    /// Minimum time between arriving at a stop and boarding there.
    pub board: Duration,
    /// Added to the vehicle's arrival before the rider is at the stop.
    pub alight: Duration,
    /// Extra boarding margin once the rider has already used a vehicle.
    pub transfer: Duration,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub profile: Profile,
    /// Transit rounds are `max_transfers + 1`.
    pub max_transfers: usize,
    pub search_window: Duration,
    pub departures: Departures,
    pub slack: Slack,
    pub cost: GeneralizedCostConfig,
    /// Skip stop arrivals that can not beat the best destination arrival.
    /// Exact, and only applied, in the standard profile.
    pub destination_pruning: bool,
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Default::default(),
            max_transfers: 5,
            search_window: Duration::ZERO,
            departures: Default::default(),
            slack: Default::default(),
            cost: Default::default(),
            destination_pruning: true,
            timeout: None,
        }
    }
}

impl Config {
    pub fn multi_criteria() -> Self {
        Self {
            profile: Profile::MultiCriteria,
            ..Default::default()
        }
    }

    /// Number of transit rounds.
    pub fn max_rounds(&self) -> usize {
        self.max_transfers + 1
    }

    pub fn validate(&self) -> Result<(), raptor::Error> {
        if self.max_transfers > MAX_TRANSFERS {
            return Err(raptor::Error::InvalidConfig(format!(
                "max_transfers {} exceeds {MAX_TRANSFERS}",
                self.max_transfers
            )));
        }
        if let Departures::Every { step } = self.departures
            && step.is_zero()
            && !self.search_window.is_zero()
        {
            return Err(raptor::Error::InvalidConfig(
                "departure step must be positive when searching a window".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn prunes_by_destination(&self) -> bool {
        self.destination_pruning && self.profile == Profile::Standard
    }
}
