use crate::{
    raptor::{ArrivalId, Profile},
    shared::Time,
};

/// The criteria an arrival is compared on.
///
/// Arrivals still on board of a vehicle form their own class: only another
/// on-board arrival can cover them, so transfers always leave from the best
/// transit arrival at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Label {
    pub arrival_time: Time,
    pub c1: u32,
    pub on_board: bool,
}

/// Comparator arity of a [`ParetoSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Arrival time only.
    ArrivalTime,
    /// Arrival time and c1.
    ArrivalTimeAndCost,
}

impl From<Profile> for Dominance {
    fn from(value: Profile) -> Self {
        match value {
            Profile::Standard => Self::ArrivalTime,
            Profile::MultiCriteria => Self::ArrivalTimeAndCost,
        }
    }
}

impl Dominance {
    /// `a` is no worse than `b` on every criterion.
    #[inline(always)]
    pub(crate) fn covers(&self, a: &Label, b: &Label) -> bool {
        if b.on_board && !a.on_board {
            return false;
        }
        match self {
            Dominance::ArrivalTime => a.arrival_time <= b.arrival_time,
            Dominance::ArrivalTimeAndCost => a.arrival_time <= b.arrival_time && a.c1 <= b.c1,
        }
    }

    /// `a` is no worse than `b` on every criterion and better on at least one.
    #[inline(always)]
    pub(crate) fn dominates(&self, a: &Label, b: &Label) -> bool {
        self.covers(a, b) && !self.covers(b, a)
    }
}

/// A set of mutually non-dominated arrivals.
///
/// Candidates that only tie an existing element are rejected, so the first
/// arrival reaching a given label is the one kept.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParetoSet {
    items: Vec<(Label, ArrivalId)>,
}

impl ParetoSet {
    /// Whether no element of the set covers `label`.
    #[inline(always)]
    pub fn qualifies(&self, dominance: Dominance, label: &Label) -> bool {
        !self
            .items
            .iter()
            .any(|(existing, _)| dominance.covers(existing, label))
    }

    /// Inserts a qualified element and removes everything it dominates.
    /// Removed ids are handed to `on_removed`.
    pub fn insert<F>(&mut self, dominance: Dominance, label: Label, id: ArrivalId, on_removed: F)
    where
        F: FnMut(ArrivalId),
    {
        self.remove_dominated(dominance, &label, on_removed);
        self.items.push((label, id));
    }

    /// Removes the elements `label` dominates.
    pub fn remove_dominated<F>(&mut self, dominance: Dominance, label: &Label, mut on_removed: F)
    where
        F: FnMut(ArrivalId),
    {
        self.items.retain(|(existing, existing_id)| {
            if dominance.dominates(label, existing) {
                on_removed(*existing_id);
                false
            } else {
                true
            }
        });
    }

    pub fn ids(&self) -> impl Iterator<Item = ArrivalId> + '_ {
        self.items.iter().map(|(_, id)| *id)
    }

    pub fn clear(&mut self) {
        self.items.clear()
    }
}

#[cfg(test)]
fn label(arrival_time: u32, c1: u32) -> Label {
    Label {
        arrival_time: Time::from_seconds(arrival_time),
        c1,
        on_board: false,
    }
}

#[test]
fn dominance_test() {
    let mc = Dominance::ArrivalTimeAndCost;
    assert!(mc.dominates(&label(10, 5), &label(10, 6)));
    assert!(mc.dominates(&label(9, 5), &label(10, 5)));
    assert!(!mc.dominates(&label(9, 7), &label(10, 5)));
    assert!(!mc.dominates(&label(10, 5), &label(10, 5)));
    assert!(mc.covers(&label(10, 5), &label(10, 5)));

    let standard = Dominance::ArrivalTime;
    assert!(standard.dominates(&label(9, 100), &label(10, 0)));
    assert!(!standard.dominates(&label(10, 0), &label(10, 100)));
    assert!(standard.covers(&label(10, 100), &label(10, 0)));
}

#[test]
fn pareto_set_test() {
    let mc = Dominance::ArrivalTimeAndCost;
    let mut set = ParetoSet::default();
    let mut removed = vec![];

    set.insert(mc, label(20, 10), ArrivalId(0), |id| removed.push(id));
    assert!(set.qualifies(mc, &label(15, 30)));
    set.insert(mc, label(15, 30), ArrivalId(1), |id| removed.push(id));
    assert_eq!(set.ids().count(), 2);

    // Ties and dominated labels are rejected
    assert!(!set.qualifies(mc, &label(20, 10)));
    assert!(!set.qualifies(mc, &label(21, 31)));

    set.insert(mc, label(14, 10), ArrivalId(2), |id| removed.push(id));
    assert_eq!(set.ids().collect::<Vec<_>>(), vec![ArrivalId(2)]);
    assert_eq!(removed, vec![ArrivalId(0), ArrivalId(1)]);
}

#[test]
fn on_board_dominance_test() {
    let on_board = |arrival_time, c1| Label {
        on_board: true,
        ..label(arrival_time, c1)
    };
    for dominance in [Dominance::ArrivalTime, Dominance::ArrivalTimeAndCost] {
        // An earlier walk does not cover a later transit arrival
        assert!(!dominance.covers(&label(90, 5), &on_board(100, 10)));
        assert!(!dominance.dominates(&on_board(100, 10), &label(90, 5)));
        // A transit arrival covers walks that are no better
        assert!(dominance.dominates(&on_board(90, 5), &label(90, 5)));
        assert!(dominance.dominates(&on_board(80, 5), &on_board(90, 5)));
    }

    let mut set = ParetoSet::default();
    let standard = Dominance::ArrivalTime;
    set.insert(standard, label(90, 0), ArrivalId(0), |_| {});
    assert!(set.qualifies(standard, &on_board(100, 0)));
    set.insert(standard, on_board(100, 0), ArrivalId(1), |_| {});
    assert!(!set.qualifies(standard, &label(95, 0)));
    assert_eq!(set.ids().count(), 2);
}
