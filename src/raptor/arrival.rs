use std::fmt::Display;

use crate::shared::Time;

/// Handle to an [`ArrivalEntry`] in the search arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrivalId(pub(crate) u32);

impl ArrivalId {
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for ArrivalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an arrival was reached, with the data needed to rebuild the leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arrival {
    Access {
        access_idx: u32,
        departure_time: Time,
    },
    Transit {
        pattern_idx: u32,
        trip_idx: u32,
        board_stop: u32,
        board_pos: u32,
        alight_pos: u32,
        board_time: Time,
    },
    Transfer {
        from_stop: u32,
        transfer_idx: u32,
    },
    Egress {
        egress_idx: u32,
    },
}

/// Immutable record of one stop (or destination) arrival.
///
/// `previous` points at the entry this one was derived from and is `None`
/// only for access arrivals.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArrivalEntry {
    /// Not meaningful for egress arrivals, which sit at the destination.
    pub stop: u32,
    pub round: u8,
    pub arrival_time: Time,
    pub c1: u32,
    pub previous: Option<ArrivalId>,
    pub arrival: Arrival,
}

impl ArrivalEntry {
    pub fn access(stop: u32, arrival_time: Time, c1: u32, access_idx: u32, departure: Time) -> Self {
        Self {
            stop,
            round: 0,
            arrival_time,
            c1,
            previous: None,
            arrival: Arrival::Access {
                access_idx,
                departure_time: departure,
            },
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.arrival, Arrival::Transit { .. })
    }

    pub fn is_egress(&self) -> bool {
        matches!(self.arrival, Arrival::Egress { .. })
    }
}
