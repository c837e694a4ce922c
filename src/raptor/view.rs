use std::fmt::Display;

use serde::Serialize;

use crate::{
    raptor::{AccessEgress, ArrivalId, ArrivalState, arrival::Arrival},
    shared::Time,
};

/// How the rider got to an arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PathLegType {
    Access,
    Transit,
    Transfer,
    Egress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPathView {
    pub access_idx: u32,
    pub access: AccessEgress,
    /// When the rider leaves the origin.
    pub departure_time: Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitPathView {
    pub pattern_idx: u32,
    pub trip_idx: u32,
    pub board_stop: u32,
    pub board_pos: usize,
    pub alight_pos: usize,
    pub board_time: Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPathView {
    pub from_stop: u32,
    pub transfer_idx: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EgressPathView {
    pub egress_idx: u32,
    pub egress: AccessEgress,
    /// The stop the egress path leaves from.
    pub stop_idx: u32,
}

/// The transit arrival closest to the tail of a provenance chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitArrival {
    pub id: ArrivalId,
    pub stop: u32,
    pub arrival_time: Time,
    pub trip_idx: u32,
}

/// Read only handle on a stored arrival.
///
/// Accessors of a leg kind other than [`ArrivalView::arrived_by`] panic,
/// calling them is a programming error.
#[derive(Clone, Copy)]
pub struct ArrivalView<'a> {
    state: &'a ArrivalState,
    id: ArrivalId,
}

impl<'a> ArrivalView<'a> {
    pub(crate) fn new(state: &'a ArrivalState, id: ArrivalId) -> Self {
        Self { state, id }
    }

    pub fn id(&self) -> ArrivalId {
        self.id
    }

    /// The stop reached. Egress arrivals sit at the destination and have none.
    pub fn stop(&self) -> u32 {
        let entry = self.state.entry(self.id);
        if entry.is_egress() {
            self.mismatch("stop")
        }
        entry.stop
    }

    pub fn round(&self) -> usize {
        self.state.entry(self.id).round as usize
    }

    pub fn number_of_transfers(&self) -> usize {
        self.round().saturating_sub(1)
    }

    pub fn is_first_round(&self) -> bool {
        self.round() == 0
    }

    pub fn arrival_time(&self) -> Time {
        self.state.entry(self.id).arrival_time
    }

    pub fn c1(&self) -> u32 {
        self.state.entry(self.id).c1
    }

    /// Dominated after it was stored, still reachable through later chains.
    pub fn is_removed(&self) -> bool {
        self.state.is_removed(self.id)
    }

    pub fn previous(&self) -> Option<ArrivalView<'a>> {
        self.state
            .entry(self.id)
            .previous
            .map(|id| ArrivalView::new(self.state, id))
    }

    pub fn arrived_by(&self) -> PathLegType {
        match self.state.entry(self.id).arrival {
            Arrival::Access { .. } => PathLegType::Access,
            Arrival::Transit { .. } => PathLegType::Transit,
            Arrival::Transfer { .. } => PathLegType::Transfer,
            Arrival::Egress { .. } => PathLegType::Egress,
        }
    }

    pub fn arrived_by_access(&self) -> bool {
        self.arrived_by() == PathLegType::Access
    }

    pub fn arrived_by_transit(&self) -> bool {
        self.arrived_by() == PathLegType::Transit
    }

    pub fn arrived_by_transfer(&self) -> bool {
        self.arrived_by() == PathLegType::Transfer
    }

    pub fn arrived_at_destination(&self) -> bool {
        self.arrived_by() == PathLegType::Egress
    }

    /// The rider is still on the vehicle, only true for transit arrivals.
    pub fn arrived_on_board(&self) -> bool {
        self.arrived_by_transit()
    }

    pub fn access_path(&self) -> AccessPathView {
        match self.state.entry(self.id).arrival {
            Arrival::Access {
                access_idx,
                departure_time,
            } => AccessPathView {
                access_idx,
                access: self.state.access[access_idx as usize],
                departure_time,
            },
            _ => self.mismatch("access_path"),
        }
    }

    pub fn transit_path(&self) -> TransitPathView {
        match self.state.entry(self.id).arrival {
            Arrival::Transit {
                pattern_idx,
                trip_idx,
                board_stop,
                board_pos,
                alight_pos,
                board_time,
            } => TransitPathView {
                pattern_idx,
                trip_idx,
                board_stop,
                board_pos: board_pos as usize,
                alight_pos: alight_pos as usize,
                board_time,
            },
            _ => self.mismatch("transit_path"),
        }
    }

    pub fn transfer_path(&self) -> TransferPathView {
        match self.state.entry(self.id).arrival {
            Arrival::Transfer {
                from_stop,
                transfer_idx,
            } => TransferPathView {
                from_stop,
                transfer_idx,
            },
            _ => self.mismatch("transfer_path"),
        }
    }

    pub fn egress_path(&self) -> EgressPathView {
        let entry = self.state.entry(self.id);
        match entry.arrival {
            Arrival::Egress { egress_idx } => EgressPathView {
                egress_idx,
                egress: self.state.egress[egress_idx as usize],
                stop_idx: entry.stop,
            },
            _ => self.mismatch("egress_path"),
        }
    }

    /// Walks the provenance chain, starting at this arrival, until a transit
    /// arrival. `None` once the access arrival is reached.
    pub fn most_recent_transit_arrival(&self) -> Option<TransitArrival> {
        let mut current = Some(*self);
        while let Some(view) = current {
            let entry = self.state.entry(view.id);
            if let Arrival::Transit { trip_idx, .. } = entry.arrival {
                return Some(TransitArrival {
                    id: view.id,
                    stop: entry.stop,
                    arrival_time: entry.arrival_time,
                    trip_idx,
                });
            }
            current = view.previous();
        }
        None
    }

    fn mismatch(&self, accessor: &str) -> ! {
        panic!(
            "{accessor} called on {:?} arrival {}",
            self.arrived_by(),
            self.id
        )
    }
}

impl std::fmt::Debug for ArrivalView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for ArrivalView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entry = self.state.entry(self.id);
        write!(f, "{:?} {{ round: {}, ", self.arrived_by(), entry.round)?;
        if !entry.is_egress() {
            write!(f, "stop: {}, ", entry.stop)?;
        }
        write!(f, "arrival: [{} C₁{}] }}", entry.arrival_time, entry.c1)
    }
}
