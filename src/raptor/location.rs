use serde::Serialize;
use std::sync::Arc;

use crate::repository::Stop;

/// An endpoint of a leg as handed out in itineraries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Location {
    Origin,
    Destination,
    Stop { id: Arc<str>, name: Arc<str> },
}

impl From<&Stop> for Location {
    fn from(value: &Stop) -> Self {
        Self::Stop {
            id: value.id.clone(),
            name: value.name.clone(),
        }
    }
}

/// Index level endpoint used while rebuilding a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Point {
    Origin,
    Destination,
    Stop(u32),
}

impl From<u32> for Point {
    fn from(value: u32) -> Self {
        Self::Stop(value)
    }
}

impl Point {
    pub fn to_location(self, stops: &[Stop]) -> Location {
        match self {
            Point::Origin => Location::Origin,
            Point::Destination => Location::Destination,
            Point::Stop(idx) => (&stops[idx as usize]).into(),
        }
    }
}
