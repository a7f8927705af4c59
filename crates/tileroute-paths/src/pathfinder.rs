use std::cell::Cell;
use std::hash::Hash;
use std::rc::Rc;

use crate::path::Path;
use crate::search::{Scratch, Search, SearchStatus, SearchStep};
use crate::traits::AstarPather;

/// Marks an engine busy for as long as it is alive.
#[derive(Debug)]
pub(crate) struct BusyGuard {
    flag: Rc<Cell<bool>>,
}

impl BusyGuard {
    fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.get() {
            return None;
        }
        flag.set(true);
        Some(Self { flag: Rc::clone(flag) })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// A* engine.
///
/// `PathFinder` owns the persistent search settings and the frontier storage
/// reused between queries, so repeated searches stop allocating after
/// warm-up. At most one search is in flight per engine: requests made while
/// another search runs are refused with a warning.
#[derive(Debug)]
pub struct PathFinder<N> {
    max_iterations: i32,
    busy: Rc<Cell<bool>>,
    last_status: SearchStatus,
    scratch: Scratch<N>,
}

impl<N: Copy + Eq + Hash> Default for PathFinder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Copy + Eq + Hash> PathFinder<N> {
    /// An idle engine with no iteration limit.
    pub fn new() -> Self {
        Self {
            max_iterations: 0,
            busy: Rc::new(Cell::new(false)),
            last_status: SearchStatus::Idle,
            scratch: Scratch::default(),
        }
    }

    /// Persistent cap on expansions per search. `<= 0` means unlimited.
    pub fn max_iterations(&self) -> i32 {
        self.max_iterations
    }

    /// Set the persistent expansion cap. `<= 0` means unlimited.
    ///
    /// Searches that fail to reach an unreachable goal stop only at this cap
    /// or at the per-call budget, so leaving both unlimited on an unbounded
    /// graph never terminates.
    pub fn set_max_iterations(&mut self, max_iterations: i32) {
        self.max_iterations = max_iterations;
    }

    /// Whether a synchronous search is running or an incremental one is
    /// alive and unfinished.
    pub fn is_computing(&self) -> bool {
        self.busy.get()
    }

    /// How the last synchronous search ended.
    pub fn last_status(&self) -> SearchStatus {
        self.last_status
    }

    fn budget(&self, max_expansions: usize) -> usize {
        if self.max_iterations > 0 {
            max_expansions.min(self.max_iterations as usize)
        } else {
            max_expansions
        }
    }

    /// Search from `start` to `goal`, blocking until done.
    ///
    /// Returns the path goal first, or an empty path when the goal is
    /// unreachable, the budget of `max_expansions` (further capped by
    /// [`max_iterations`](Self::max_iterations)) runs out, or another search
    /// is in flight.
    pub fn compute_sync<G: AstarPather<Node = N>>(
        &mut self,
        graph: &mut G,
        start: N,
        goal: N,
        max_expansions: usize,
    ) -> Path<N> {
        let Some(mut search) = self.begin(start, goal, max_expansions) else {
            return Path::empty();
        };
        let step = search.run(graph);
        self.last_status = search.status();
        self.scratch = search.take_scratch();
        match step {
            SearchStep::Done(path) => path,
            _ => Path::empty(),
        }
    }

    /// Start an incremental search from `start` to `goal`.
    ///
    /// Drive it with [`Search::step`]. Returns `None` when another search is
    /// in flight.
    pub fn compute_async(&mut self, start: N, goal: N, max_expansions: usize) -> Option<Search<N>> {
        self.begin(start, goal, max_expansions)
    }

    /// Return a finished search's storage to the engine. An unfinished
    /// search is cancelled first.
    pub fn recycle(&mut self, mut search: Search<N>) {
        search.cancel();
        self.scratch = search.take_scratch();
    }

    fn begin(&mut self, start: N, goal: N, max_expansions: usize) -> Option<Search<N>> {
        let Some(busy) = BusyGuard::acquire(&self.busy) else {
            log::warn!("path finder is already computing; search request ignored");
            return None;
        };
        let budget = self.budget(max_expansions);
        let scratch = std::mem::take(&mut self.scratch);
        Some(Search::new(start, goal, budget, scratch, busy))
    }
}
