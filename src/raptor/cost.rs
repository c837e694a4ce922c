use serde::Deserialize;

use crate::{
    repository::VehicleType,
    shared::{Distance, Duration},
};

/// The c1 value of "no cost".
pub const ZERO_COST: u32 = 0;

/// A priced step of a journey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostEvent {
    Access {
        duration: Duration,
    },
    Boarding {
        stop_idx: u32,
        wait: Duration,
        /// `false` when the rider already used a vehicle, i.e. a transfer.
        first_boarding: bool,
        vehicle_type: VehicleType,
    },
    /// Riding one trip, from boarding to the current stop.
    Ride {
        vehicle_type: VehicleType,
        duration: Duration,
    },
    Alighting {
        stop_idx: u32,
    },
    Transfer {
        duration: Duration,
        distance: Option<Distance>,
    },
    Egress {
        duration: Duration,
    },
}

/// Maps journey steps to the auxiliary c1 criterion.
///
/// Implementations must be pure. The multi-criteria route scan compares riders
/// on the same trip at intermediate stops, which is only exact if
/// [`CostEvent::Ride`] is additive in its duration.
pub trait CostCalculator: Send + Sync {
    fn cost(&self, event: &CostEvent) -> u32;
}

impl<F> CostCalculator for F
where
    F: Fn(&CostEvent) -> u32 + Send + Sync,
{
    fn cost(&self, event: &CostEvent) -> u32 {
        self(event)
    }
}

/// Cost disabled, every event is [`ZERO_COST`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCost;

impl CostCalculator for ZeroCost {
    fn cost(&self, _: &CostEvent) -> u32 {
        ZERO_COST
    }
}

/// Weights for [`GeneralizedCost`]. Reluctance factors are in hundredths,
/// so `100` weighs a second of that activity as one second.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneralizedCostConfig {
    pub board_cost: Duration,
    pub transfer_cost: Duration,
    pub wait_reluctance: u32,
    pub walk_reluctance: u32,
    pub transit_reluctance: u32,
    /// Overrides `transit_reluctance` for specific vehicle types.
    pub vehicle_reluctance: Vec<(VehicleType, u32)>,
}

impl Default for GeneralizedCostConfig {
    fn default() -> Self {
        Self {
            board_cost: Duration::from_minutes(1),
            transfer_cost: Duration::from_minutes(2),
            wait_reluctance: 100,
            walk_reluctance: 200,
            transit_reluctance: 100,
            vehicle_reluctance: vec![],
        }
    }
}

/// Generalized cost in centi-seconds.
#[derive(Debug, Clone)]
pub struct GeneralizedCost {
    board_cost: u32,
    transfer_cost: u32,
    wait_reluctance: u32,
    walk_reluctance: u32,
    transit_reluctance: u32,
    vehicle_reluctance: Vec<(VehicleType, u32)>,
}

impl GeneralizedCost {
    pub fn new(config: &GeneralizedCostConfig) -> Self {
        Self {
            board_cost: config.board_cost.as_seconds().saturating_mul(100),
            transfer_cost: config.transfer_cost.as_seconds().saturating_mul(100),
            wait_reluctance: config.wait_reluctance,
            walk_reluctance: config.walk_reluctance,
            transit_reluctance: config.transit_reluctance,
            vehicle_reluctance: config.vehicle_reluctance.clone(),
        }
    }

    fn transit_reluctance(&self, vehicle_type: VehicleType) -> u32 {
        self.vehicle_reluctance
            .iter()
            .find(|(vehicle, _)| *vehicle == vehicle_type)
            .map(|(_, reluctance)| *reluctance)
            .unwrap_or(self.transit_reluctance)
    }
}

impl Default for GeneralizedCost {
    fn default() -> Self {
        Self::new(&GeneralizedCostConfig::default())
    }
}

#[inline(always)]
fn weighted(duration: Duration, reluctance: u32) -> u32 {
    duration.as_seconds().saturating_mul(reluctance)
}

impl CostCalculator for GeneralizedCost {
    fn cost(&self, event: &CostEvent) -> u32 {
        match *event {
            CostEvent::Access { duration } | CostEvent::Egress { duration } => {
                weighted(duration, self.walk_reluctance)
            }
            CostEvent::Boarding {
                wait,
                first_boarding,
                ..
            } => {
                let transfer = if first_boarding {
                    ZERO_COST
                } else {
                    self.transfer_cost
                };
                self.board_cost
                    .saturating_add(transfer)
                    .saturating_add(weighted(wait, self.wait_reluctance))
            }
            CostEvent::Ride {
                vehicle_type,
                duration,
            } => weighted(duration, self.transit_reluctance(vehicle_type)),
            CostEvent::Alighting { .. } => ZERO_COST,
            CostEvent::Transfer { duration, .. } => weighted(duration, self.walk_reluctance),
        }
    }
}

#[test]
fn generalized_cost_test() {
    let cost = GeneralizedCost::new(&GeneralizedCostConfig {
        vehicle_reluctance: vec![(VehicleType::Rail, 80)],
        ..Default::default()
    });
    let boarding = |first_boarding| CostEvent::Boarding {
        stop_idx: 0,
        wait: Duration::from_seconds(30),
        first_boarding,
        vehicle_type: VehicleType::Bus,
    };
    assert_eq!(cost.cost(&boarding(true)), 6000 + 3000);
    assert_eq!(cost.cost(&boarding(false)), 6000 + 12000 + 3000);
    assert_eq!(
        cost.cost(&CostEvent::Ride {
            vehicle_type: VehicleType::Rail,
            duration: Duration::from_seconds(100),
        }),
        8000
    );
    assert_eq!(
        cost.cost(&CostEvent::Transfer {
            duration: Duration::from_seconds(10),
            distance: None,
        }),
        2000
    );
    assert_eq!(ZeroCost.cost(&boarding(false)), ZERO_COST);
}

#[test]
fn ride_cost_is_additive_test() {
    let cost = GeneralizedCost::default();
    let ride = |secs| {
        cost.cost(&CostEvent::Ride {
            vehicle_type: VehicleType::Bus,
            duration: Duration::from_seconds(secs),
        })
    };
    assert_eq!(ride(70), ride(30) + ride(40));
}
