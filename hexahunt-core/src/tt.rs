//! Transposition table for caching search results
//!
//! Entries are keyed by a [`PositionKey`]: the canonical edge-ownership vector
//! (one byte per edge, in edge-index order) together with everything else the
//! value of a subtree depends on: scores, artifact trackers and the side the
//! search is maximizing for. Keys compare structurally, so hashing never
//! depends on container iteration order.
//!
//! A table is only meaningful for one board topology. Keep one per match.

use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::board::EdgeId;
use crate::game::{GameState, Owner, Player, PlayerItems};

/// How a stored value relates to the true minimax value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// The search completed inside its window
    Exact,
    /// True value >= stored value (beta cutoff)
    Lower,
    /// True value <= stored value (failed low)
    Upper,
}

/// Transposition table entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub value: i32,
    pub best_move: Option<EdgeId>,
    /// Remaining depth the value was searched to
    pub depth: u32,
    pub bound: Bound,
}

impl Entry {
    /// Value usable for a search at `depth` with window `(alpha, beta)`.
    ///
    /// Only entries searched at least as deep qualify; bounds qualify only
    /// when they already decide the window.
    pub fn usable(&self, depth: u32, alpha: i32, beta: i32) -> Option<(i32, Option<EdgeId>)> {
        if self.depth < depth {
            return None;
        }

        match self.bound {
            Bound::Exact => Some((self.value, self.best_move)),
            Bound::Lower if self.value >= beta => Some((self.value, self.best_move)),
            Bound::Upper if self.value <= alpha => Some((self.value, self.best_move)),
            _ => None,
        }
    }
}

/// Canonical identity of a search node
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PositionKey {
    edges: Box<[u8]>,
    score: [i32; 2],
    items: [PlayerItems; 2],
    maximizing: bool,
}

impl PositionKey {
    pub fn new(state: &GameState, maximizing: bool) -> Self {
        let edges = state.edge_owners().iter().map(|&o| owner_code(o)).collect();
        let items = Player::ALL.map(|p| *state.player_items(p));

        Self {
            edges,
            score: state.score(),
            items,
            maximizing,
        }
    }
}

fn owner_code(owner: Owner) -> u8 {
    match owner {
        None => 0,
        Some(player) => player.index() as u8 + 1,
    }
}

// ============================================================================
// TABLE INTERFACE
// ============================================================================

/// Storage the search reads from and writes to
pub trait SearchTable {
    /// A cached result usable at `depth` within `(alpha, beta)`, if any
    fn lookup(&mut self, key: &PositionKey, depth: u32, alpha: i32, beta: i32) -> Option<(i32, Option<EdgeId>)>;

    fn store(&mut self, key: PositionKey, entry: Entry);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hash-map backed table with an optional size cap
#[derive(Clone, Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<PositionKey, Entry>,
    capacity: Option<usize>,
}

impl TranspositionTable {
    /// Unbounded table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table that is flushed whenever a new entry would exceed `capacity`
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn get(&self, key: &PositionKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Forget everything (e.g. when a new match starts on another board)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl SearchTable for TranspositionTable {
    fn lookup(&mut self, key: &PositionKey, depth: u32, alpha: i32, beta: i32) -> Option<(i32, Option<EdgeId>)> {
        self.entries.get(key)?.usable(depth, alpha, beta)
    }

    fn store(&mut self, key: PositionKey, entry: Entry) {
        if let Some(cap) = self.capacity {
            if self.entries.len() >= cap && !self.entries.contains_key(&key) {
                tracing::debug!(entries = self.entries.len(), "transposition table full, flushing");
                self.entries.clear();
            }
        }
        self.entries.insert(key, entry);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// INSTRUMENTATION
// ============================================================================

/// Counters collected around a search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes the search had to expand or evaluate
    pub positions_evaluated: u64,
    /// Nodes answered from the table
    pub cache_hits: u64,
    /// Table entries after the search
    pub table_size: usize,
    pub elapsed: Duration,
}

impl SearchStats {
    /// Share of visited nodes answered from the table, in percent
    pub fn hit_rate(&self) -> f64 {
        let visited = self.positions_evaluated + self.cache_hits;
        if visited == 0 {
            0.0
        } else {
            self.cache_hits as f64 / visited as f64 * 100.0
        }
    }
}

/// Wraps a table and counts how the search used it
pub struct InstrumentedTable<'a, T: SearchTable> {
    inner: &'a mut T,
    stats: SearchStats,
}

impl<'a, T: SearchTable> InstrumentedTable<'a, T> {
    pub fn new(inner: &'a mut T) -> Self {
        Self {
            inner,
            stats: SearchStats::default(),
        }
    }

    pub fn finish(self, elapsed: Duration) -> SearchStats {
        SearchStats {
            table_size: self.inner.len(),
            elapsed,
            ..self.stats
        }
    }
}

impl<T: SearchTable> SearchTable for InstrumentedTable<'_, T> {
    fn lookup(&mut self, key: &PositionKey, depth: u32, alpha: i32, beta: i32) -> Option<(i32, Option<EdgeId>)> {
        let hit = self.inner.lookup(key, depth, alpha, beta);
        if hit.is_some() {
            self.stats.cache_hits += 1;
        } else {
            self.stats.positions_evaluated += 1;
        }
        hit
    }

    fn store(&mut self, key: PositionKey, entry: Entry) {
        self.inner.store(key, entry);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
