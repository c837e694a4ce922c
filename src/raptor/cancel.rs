use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use serde::Serialize;

/// How a search ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SearchStatus {
    /// Every departure of the window was searched until convergence or the
    /// round limit.
    #[default]
    Complete,
    /// Stopped through a [`CancellationToken`], results are partial.
    Cancelled,
    /// Stopped by the configured timeout, results are partial.
    TimedOut,
}

impl SearchStatus {
    pub fn is_partial(&self) -> bool {
        !matches!(self, SearchStatus::Complete)
    }
}

/// Cheap to clone handle that stops a running search at its next iteration
/// or round boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub(crate) struct Interrupt {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Interrupt {
    pub fn new(token: Option<CancellationToken>, deadline: Option<Instant>) -> Self {
        Self { token, deadline }
    }

    pub fn check(&self) -> Option<SearchStatus> {
        if self.token.as_ref().is_some_and(|token| token.is_cancelled()) {
            return Some(SearchStatus::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(SearchStatus::TimedOut);
        }
        None
    }
}

#[test]
fn cancellation_test() {
    let token = CancellationToken::new();
    let interrupt = Interrupt::new(Some(token.clone()), None);
    assert_eq!(interrupt.check(), None);
    token.cancel();
    assert_eq!(interrupt.check(), Some(SearchStatus::Cancelled));

    let expired = Interrupt::new(None, Some(Instant::now()));
    assert_eq!(expired.check(), Some(SearchStatus::TimedOut));
}
