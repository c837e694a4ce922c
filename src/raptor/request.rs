use crate::{
    raptor::Config,
    shared::{Duration, Time},
};

/// A precomputed street path between the origin (or destination) and a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessEgress {
    pub stop_idx: u32,
    pub duration: Duration,
    /// Overrides the cost calculator's price for this path.
    pub c1: Option<u32>,
}

impl AccessEgress {
    pub fn new(stop_idx: u32, duration: Duration) -> Self {
        Self {
            stop_idx,
            duration,
            c1: None,
        }
    }

    pub fn with_c1(mut self, c1: u32) -> Self {
        self.c1 = Some(c1);
        self
    }
}

/// Departure instants considered by one range search, latest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub earliest_departure: Time,
    pub length: Duration,
}

impl SearchWindow {
    pub fn new(earliest_departure: Time, length: Duration) -> Self {
        Self {
            earliest_departure,
            length,
        }
    }

    pub fn latest_departure(&self) -> Time {
        self.earliest_departure + self.length
    }

    pub fn contains(&self, time: Time) -> bool {
        time >= self.earliest_departure && time <= self.latest_departure()
    }

    /// Every `step` from the end of the window back to its start.
    pub fn every(&self, step: Duration) -> Vec<Time> {
        if step.is_zero() {
            return vec![self.earliest_departure];
        }
        let latest = self.latest_departure();
        let count = self.length.as_seconds() / step.as_seconds();
        (0..=count)
            .map(|i| latest - Duration::from_seconds(i * step.as_seconds()))
            .collect()
    }
}

/// An owned query, used for batch searches.
#[derive(Debug, Clone)]
pub struct Request {
    pub access: Vec<AccessEgress>,
    pub egress: Vec<AccessEgress>,
    pub departure: Time,
    pub config: Config,
}

#[test]
fn window_every_test() {
    let window = SearchWindow::new(Time::from_seconds(100), Duration::from_seconds(150));
    let departures: Vec<_> = window
        .every(Duration::from_seconds(60))
        .into_iter()
        .map(|t| t.as_seconds())
        .collect();
    // The window end is always searched, the start only when on a step
    assert_eq!(departures, vec![250, 190, 130]);

    let window = SearchWindow::new(Time::from_seconds(100), Duration::from_seconds(120));
    let departures: Vec<_> = window
        .every(Duration::from_seconds(60))
        .into_iter()
        .map(|t| t.as_seconds())
        .collect();
    assert_eq!(departures, vec![220, 160, 100]);
    assert!(window.contains(Time::from_seconds(250)));
    assert!(!window.contains(Time::from_seconds(251)));
}
