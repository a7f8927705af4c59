//! Resumable A* search state.
//!
//! A [`Search`] holds everything one query needs (frontier, per-node
//! records, counters) and advances in bounded increments through
//! [`Search::step`]. Running it to completion in one call is the blocking
//! mode; calling `step` with a small expansion count from a host loop is the
//! cooperative mode. Both walk exactly the same expansion sequence.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use crate::path::Path;
use crate::pathfinder::BusyGuard;
use crate::traits::AstarPather;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Lifecycle of a search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    /// No search has run yet.
    Idle,
    /// Frontier still has work.
    Computing,
    /// The goal was reached.
    Completed,
    /// The frontier emptied without reaching the goal.
    Unreachable,
    /// The expansion budget ran out first.
    Exhausted,
    /// Abandoned before finishing.
    Cancelled,
}

/// Why a search produced no path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SearchFailure {
    Unreachable,
    Exhausted,
    Cancelled,
    /// The search had already finished when it was stepped.
    NotRunning,
}

/// Result of one [`Search::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStep<N> {
    /// The step budget ran out; call `step` again.
    InProgress,
    /// The goal was reached.
    Done(Path<N>),
    /// The search ended without a path.
    Failed(SearchFailure),
}

impl<N> SearchStep<N> {
    /// Whether the search has ended.
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// The path, with failures mapped to the empty path.
    ///
    /// # Panics
    /// Panics on [`InProgress`](Self::InProgress).
    pub fn into_path(self) -> Path<N> {
        match self {
            Self::Done(p) => p,
            Self::Failed(_) => Path::empty(),
            Self::InProgress => panic!("into_path called on an unfinished search step"),
        }
    }
}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct Record<N> {
    g: f32,
    parent: Option<N>,
    closed: bool,
}

/// Frontier entry, ordered for `BinaryHeap` so the lowest `f` pops first.
/// Equal `f` pops the most recently pushed entry first.
#[derive(Clone, Copy, Debug)]
struct OpenEntry<N> {
    f: OrderedFloat<f32>,
    g: f32,
    seq: u64,
    node: N,
}

impl<N> Ord for OpenEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse on f so the max-heap pops the smallest f first.
        other.f.cmp(&self.f).then(self.seq.cmp(&other.seq))
    }
}

impl<N> PartialOrd for OpenEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> PartialEq for OpenEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N> Eq for OpenEntry<N> {}

/// Reusable frontier and record storage. Cleared between searches; the
/// allocations are kept.
#[derive(Debug)]
pub(crate) struct Scratch<N> {
    open: BinaryHeap<OpenEntry<N>>,
    records: FxHashMap<N, Record<N>>,
}

impl<N> Default for Scratch<N> {
    fn default() -> Self {
        Self {
            open: BinaryHeap::new(),
            records: FxHashMap::default(),
        }
    }
}

impl<N> Scratch<N> {
    fn clear(&mut self) {
        self.open.clear();
        self.records.clear();
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.records.capacity()
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// One A* query in flight.
///
/// Created by [`PathFinder`](crate::PathFinder). Finite and not restartable:
/// once it reports a terminal [`SearchStep`] further steps return
/// [`SearchFailure::NotRunning`]. Dropping an unfinished search cancels it
/// and frees its engine for the next query.
#[derive(Debug)]
pub struct Search<N> {
    start: N,
    goal: N,
    budget: usize,
    expansions: usize,
    seq: u64,
    status: SearchStatus,
    scratch: Scratch<N>,
    busy: Option<BusyGuard>,
}

impl<N: Copy + Eq + Hash> Search<N> {
    pub(crate) fn new(start: N, goal: N, budget: usize, mut scratch: Scratch<N>, busy: BusyGuard) -> Self {
        scratch.clear();
        scratch.records.insert(
            start,
            Record {
                g: 0.0,
                parent: None,
                closed: false,
            },
        );
        scratch.open.push(OpenEntry {
            f: OrderedFloat(0.0),
            g: 0.0,
            seq: 0,
            node: start,
        });
        Self {
            start,
            goal,
            budget,
            expansions: 0,
            seq: 1,
            status: SearchStatus::Computing,
            scratch,
            busy: Some(busy),
        }
    }

    pub fn start(&self) -> N {
        self.start
    }

    pub fn goal(&self) -> N {
        self.goal
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Whether the search can still make progress.
    pub fn is_running(&self) -> bool {
        self.status == SearchStatus::Computing
    }

    /// Nodes expanded so far.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Maximum number of expansions before the search gives up.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Abandon the search. Does nothing once it has finished.
    pub fn cancel(&mut self) {
        if self.is_running() {
            self.finish(SearchStatus::Cancelled);
        }
    }

    /// Run until the search finishes.
    pub fn run<G: AstarPather<Node = N>>(&mut self, graph: &mut G) -> SearchStep<N> {
        self.step(graph, usize::MAX)
    }

    /// Expand at most `max_expansions` nodes (at least one), then return.
    ///
    /// An expansion pops a frontier node and evaluates all its neighbours;
    /// it is never split across two calls.
    pub fn step<G: AstarPather<Node = N>>(&mut self, graph: &mut G, max_expansions: usize) -> SearchStep<N> {
        if !self.is_running() {
            return SearchStep::Failed(SearchFailure::NotRunning);
        }
        let max_expansions = max_expansions.max(1);
        let mut done = 0;

        loop {
            if done >= max_expansions {
                log::trace!("search paused after {} expansions", self.expansions);
                return SearchStep::InProgress;
            }

            let Some(current) = self.scratch.open.pop() else {
                self.finish(SearchStatus::Unreachable);
                return SearchStep::Failed(SearchFailure::Unreachable);
            };

            let ci = current.node;
            let Some(rec) = self.scratch.records.get(&ci).copied() else {
                continue;
            };
            // Skip stale entries.
            if rec.closed || current.g > rec.g {
                continue;
            }

            if ci == self.goal {
                let path = self.reconstruct();
                self.finish(SearchStatus::Completed);
                return SearchStep::Done(path);
            }

            if self.expansions >= self.budget {
                self.finish(SearchStatus::Exhausted);
                return SearchStep::Failed(SearchFailure::Exhausted);
            }

            if let Some(r) = self.scratch.records.get_mut(&ci) {
                r.closed = true;
            }
            self.expansions += 1;
            done += 1;

            for slot in 0..graph.neighbor_count(ci) {
                let ni = graph.neighbor(ci, slot);
                let known = self.scratch.records.get(&ni).copied();
                if known.is_some_and(|r| r.closed) {
                    continue;
                }
                if !graph.is_passable(ni) {
                    continue;
                }
                let cost = graph.neighbor_cost(ci, slot);
                if !cost.is_finite() {
                    continue;
                }

                let tentative_g = rec.g + cost;
                if known.is_some_and(|r| tentative_g >= r.g) {
                    continue;
                }

                self.scratch.records.insert(
                    ni,
                    Record {
                        g: tentative_g,
                        parent: Some(ci),
                        closed: false,
                    },
                );
                self.scratch.open.push(OpenEntry {
                    f: OrderedFloat(tentative_g + graph.estimate(ni, self.goal)),
                    g: tentative_g,
                    seq: self.seq,
                    node: ni,
                });
                self.seq += 1;
            }
        }
    }

    /// Walk predecessor links from the goal back to the start.
    fn reconstruct(&self) -> Path<N> {
        let cost = self.scratch.records.get(&self.goal).map_or(0.0, |r| r.g);
        let mut nodes = Vec::new();
        let mut cur = Some(self.goal);
        while let Some(n) = cur {
            nodes.push(n);
            cur = self.scratch.records.get(&n).and_then(|r| r.parent);
        }
        Path::new(nodes, cost)
    }

    fn finish(&mut self, status: SearchStatus) {
        log::debug!(
            "search finished: {:?} after {} expansions ({} nodes touched)",
            status,
            self.expansions,
            self.scratch.records.len()
        );
        self.status = status;
        self.scratch.clear();
        self.busy = None;
    }

    /// Take the scratch storage so its allocations can be reused.
    pub(crate) fn take_scratch(&mut self) -> Scratch<N> {
        std::mem::take(&mut self.scratch)
    }
}
