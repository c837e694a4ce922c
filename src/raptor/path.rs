use tracing::trace;

use crate::raptor::ArrivalView;

/// Follows the provenance chain from `tail` back to its access arrival.
/// The returned path starts at the access arrival and ends with `tail`.
pub fn backtrack(tail: ArrivalView<'_>) -> Vec<ArrivalView<'_>> {
    let mut path = Vec::with_capacity(tail.round() * 2 + 2);
    let mut current = Some(tail);
    while let Some(view) = current {
        trace!("Backtracking through {view}");
        path.push(view);
        current = view.previous();
    }
    path.reverse();
    debug_assert!(
        path.first().is_some_and(|view| view.arrived_by_access()),
        "path must start with an access arrival"
    );
    debug_assert!(
        path.windows(2)
            .all(|pair| pair[0].arrival_time() <= pair[1].arrival_time()),
        "arrival times must not decrease along a path"
    );
    path
}
