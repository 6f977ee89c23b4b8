use crate::network::{Network, StationId};
use log::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Station sequence from start to end, both inclusive.
pub type Path = Vec<StationId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Plain Dijkstra on hop count.
    Uniform,
    /// Hop count plus Manhattan distance to the end station.
    Heuristic,
}

/// Stations claimed as interior hops by the routes accepted so far in one
/// allocation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    claimed: Vec<bool>,
}

impl Occupancy {
    pub fn new(num_stations: usize) -> Self {
        Occupancy {
            claimed: vec![false; num_stations],
        }
    }

    pub fn is_claimed(&self, id: StationId) -> bool {
        self.claimed[id]
    }

    pub fn claim(&mut self, id: StationId) {
        self.claimed[id] = true;
    }

    pub fn count(&self) -> usize {
        self.claimed.iter().filter(|c| **c).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub start: StationId,
    pub end: StationId,
    pub mode: SearchMode,
    /// The direct start-end connection was already handed out in this pass,
    /// so a two-station result is skipped.
    pub direct_taken: bool,
    /// Set for probe passes: candidates of exactly this many stations are
    /// skipped.
    pub baseline_len: Option<usize>,
}

impl Query {
    pub fn new(start: StationId, end: StationId, mode: SearchMode) -> Self {
        Query {
            start,
            end,
            mode,
            direct_taken: false,
            baseline_len: None,
        }
    }

    /// In repeat-allowing searches the end station is relaxed from every
    /// expanded neighbour, whatever its current score.
    fn end_always_open(&self) -> bool {
        self.direct_taken || self.baseline_len.is_some()
    }
}

/// Shortest path from `query.start` to `query.end` avoiding claimed stations.
/// The interior stations of a returned path are claimed in `occupancy`; a
/// failed search leaves it untouched.
pub fn find_path(network: &Network, query: &Query, occupancy: &mut Occupancy) -> Option<Path> {
    let (start, end) = (query.start, query.end);
    let n = network.len();
    let mut g_score = vec![u64::MAX; n];
    let mut came_from: Vec<Option<StationId>> = vec![None; n];
    let mut queued = vec![false; n];

    // Entries are (priority, insertion counter, station); the counter breaks
    // ties in favour of the earliest push.
    let mut open = BinaryHeap::new();
    let mut counter = 0u64;
    g_score[start] = 0;
    open.push(Reverse((0u64, counter, start)));
    queued[start] = true;

    while let Some(Reverse((_, _, current))) = open.pop() {
        queued[current] = false;

        if current == end {
            if query.direct_taken && came_from[end] == Some(start) {
                trace!("Skipping direct connection already in use");
                continue;
            }
            let path = reconstruct_path(&came_from, end);
            if query.baseline_len == Some(path.len()) {
                trace!("Skipping candidate as long as the baseline route");
                continue;
            }
            for id in path.iter().skip(1).take(path.len().saturating_sub(2)) {
                occupancy.claim(*id);
            }
            return Some(path);
        }

        for &next in network.neighbours(current) {
            let tentative = g_score[current] + 1;
            let improves = tentative < g_score[next] && !occupancy.is_claimed(next);
            if improves || (next == end && query.end_always_open()) {
                came_from[next] = Some(current);
                g_score[next] = tentative;
                if !queued[next] {
                    counter += 1;
                    let priority = match query.mode {
                        SearchMode::Uniform => tentative,
                        SearchMode::Heuristic => tentative + network.manhattan(next, end),
                    };
                    open.push(Reverse((priority, counter, next)));
                    queued[next] = true;
                }
            }
        }
    }

    trace!(
        "No path from {} to {} with {} stations claimed",
        network.name(start),
        network.name(end),
        occupancy.count()
    );
    None
}

fn reconstruct_path(came_from: &[Option<StationId>], end: StationId) -> Path {
    let mut path = vec![end];
    let mut current = end;
    while let Some(prev) = came_from[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
