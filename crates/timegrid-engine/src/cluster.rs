//! Conflict clustering.
//!
//! Groups events into connected components of the overlap relation: two
//! events share a cluster when a chain of pairwise overlaps links them.
//! Components are built with a union-find over events visited in
//! `(start, id)` order; a union only happens when [`overlaps`] holds, so
//! events that merely share a window never end up grouped.
//!
//! [`overlaps`]: crate::interval::overlaps

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::event::Event;
use crate::interval::Interval;

/// A maximal set of transitively overlapping events.
///
/// Members are stored normalized, in visiting order. Rendering order is
/// decided by the layout, not by this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    events: Vec<Event>,
}

impl Cluster {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn earliest_start(&self) -> Option<NaiveDateTime> {
        self.events.iter().map(|e| e.start).min()
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.events.iter().any(|e| e.id == event_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.id.as_str())
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

/// Split `events` into conflict clusters.
///
/// Clusters come out ordered by their earliest member (ties by `id`). The
/// result is independent of input order except between events that are
/// identical in `start`, `id` and `end`.
///
/// # Examples
///
/// ```
/// use timegrid_engine::{cluster, Event};
///
/// let events = vec![
///     Event::parse("a", "2026-03-16T09:00", "2026-03-16T10:30", "").unwrap(),
///     Event::parse("b", "2026-03-16T10:00", "2026-03-16T11:00", "").unwrap(),
///     Event::parse("c", "2026-03-16T11:00", "2026-03-16T12:00", "").unwrap(),
/// ];
/// let clusters = cluster(&events);
/// assert_eq!(clusters.len(), 2);
/// assert_eq!(clusters[0].ids().collect::<Vec<_>>(), vec!["a", "b"]);
/// ```
pub fn cluster(events: &[Event]) -> Vec<Cluster> {
    let intervals: Vec<Interval> = events.iter().map(Event::interval).collect();
    let order = visit_order(events);
    let mut sets = DisjointSet::new(events.len());

    // Events still running at the current start. Anything that ended at or
    // before it cannot overlap it or any later-starting event.
    let mut active: Vec<usize> = Vec::new();
    for &i in &order {
        let current = intervals[i];
        active.retain(|&j| intervals[j].end > current.start);
        for &j in &active {
            if intervals[j].overlaps(&current) {
                sets.union(j, i);
            }
        }
        active.push(i);
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<Event>> = Vec::new();
    for &i in &order {
        let root = sets.find(i);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(events[i].normalized());
    }

    tracing::debug!(
        events = events.len(),
        clusters = groups.len(),
        "clustered events"
    );

    groups
        .into_iter()
        .map(|events| Cluster { events })
        .collect()
}

/// Indices of `events` sorted by start, then id, then end, then position.
pub(crate) fn visit_order(events: &[Event]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..events.len()).collect();
    order.sort_by(|&a, &b| compare_events(&events[a], &events[b]).then(a.cmp(&b)));
    order
}

fn compare_events(a: &Event, b: &Event) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.interval().end.cmp(&b.interval().end))
}

// ── Union-find ──────────────────────────────────────────────────────────────

/// Disjoint-set forest with union by rank and path halving.
#[derive(Debug)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Returns `false` when both were already in the same set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            Ordering::Less => self.parent[ra] = rb,
            Ordering::Greater => self.parent[rb] = ra,
            Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ev(id: &str, start: (u32, u32), end: (u32, u32)) -> Event {
        let day = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        Event::new(
            id,
            day.and_hms_opt(start.0, start.1, 0).unwrap(),
            day.and_hms_opt(end.0, end.1, 0).unwrap(),
            "owner",
        )
    }

    fn ids(clusters: &[Cluster]) -> Vec<Vec<&str>> {
        clusters.iter().map(|c| c.ids().collect()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster(&[]).is_empty());
    }

    #[test]
    fn test_back_to_back_events_are_separate() {
        let events = vec![ev("a", (9, 0), (10, 0)), ev("b", (10, 0), (11, 0))];
        assert_eq!(ids(&cluster(&events)), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_three_way_conflict() {
        let events = vec![
            ev("a", (9, 0), (10, 30)),
            ev("b", (10, 0), (11, 0)),
            ev("c", (10, 15), (10, 45)),
        ];
        assert_eq!(ids(&cluster(&events)), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_transitive_chain_forms_one_cluster() {
        // a and c never overlap but both overlap b.
        let events = vec![
            ev("c", (10, 30), (12, 0)),
            ev("a", (9, 0), (10, 0)),
            ev("b", (9, 30), (11, 0)),
        ];
        assert_eq!(ids(&cluster(&events)), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_unrelated_events_are_not_grouped() {
        let events = vec![
            ev("morning", (8, 0), (9, 0)),
            ev("lunch", (12, 0), (13, 0)),
            ev("evening", (18, 0), (19, 0)),
        ];
        assert_eq!(cluster(&events).len(), 3);
    }

    #[test]
    fn test_clusters_ordered_by_earliest_start() {
        let events = vec![
            ev("late", (15, 0), (16, 0)),
            ev("early-b", (9, 0), (10, 0)),
            ev("early-a", (9, 0), (9, 30)),
        ];
        let clusters = cluster(&events);
        assert_eq!(ids(&clusters), vec![vec!["early-a", "early-b"], vec!["late"]]);
        assert!(clusters[0].earliest_start() < clusters[1].earliest_start());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut events = vec![
            ev("a", (9, 0), (10, 0)),
            ev("b", (9, 0), (10, 0)),
            ev("c", (9, 30), (11, 0)),
            ev("d", (13, 0), (14, 0)),
        ];
        let forward = cluster(&events);
        events.reverse();
        assert_eq!(cluster(&events), forward);
    }

    #[test]
    fn test_zero_length_event_at_boundary() {
        let events = vec![
            ev("meeting", (9, 0), (10, 0)),
            ev("reminder", (10, 0), (10, 0)),
        ];
        assert_eq!(cluster(&events).len(), 2);

        let events = vec![
            ev("meeting", (9, 0), (11, 0)),
            ev("reminder", (10, 0), (10, 0)),
        ];
        assert_eq!(cluster(&events).len(), 1);
    }

    #[test]
    fn test_zero_length_at_container_start_is_separate() {
        let events = vec![
            ev("meeting", (9, 0), (11, 0)),
            ev("reminder", (9, 0), (9, 0)),
        ];
        assert_eq!(cluster(&events).len(), 2);
    }

    #[test]
    fn test_malformed_event_is_normalized_in_cluster() {
        let events = vec![ev("bad", (11, 0), (9, 0))];
        let clusters = cluster(&events);
        let member = &clusters[0].events()[0];
        assert_eq!(member.start, member.end);
    }

    #[test]
    fn test_disjoint_set_union() {
        let mut sets = DisjointSet::new(4);
        assert!(sets.union(0, 1));
        assert!(sets.union(2, 3));
        assert!(!sets.union(1, 0));
        assert_ne!(sets.find(0), sets.find(2));
        assert!(sets.union(1, 3));
        assert_eq!(sets.find(0), sets.find(2));
    }
}
