//! Minimax AI with alpha-beta pruning and a transposition table

use std::cmp::Reverse;
use std::time::Instant;

use crate::board::{CellId, EdgeId};
use crate::error::{GameError, Result};
use crate::eval::{evaluate, is_terminal};
use crate::game::{GameState, Player};
use crate::items::treasure_value;
use crate::tt::{Bound, Entry, InstrumentedTable, PositionKey, SearchStats, SearchTable, TranspositionTable};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Window bounds for a root search
pub const NEG_INF: i32 = i32::MIN;
pub const POS_INF: i32 = i32::MAX;

/// Ordering bonus for a move that encloses a cell
const CAPTURE_BONUS: i32 = 100;

/// Ordering bonus for a move that leaves a cell one side short
const NEAR_CAPTURE_BONUS: i32 = 50;

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Score a move for ordering (higher = more forcing)
fn move_score(state: &GameState, mv: EdgeId) -> i32 {
    let topology = state.topology();
    let mut score = 0;

    for cell in topology.edge_cells(mv) {
        if state.cell_owner(cell).is_some() {
            continue;
        }
        // Sides drawn once this edge is played
        match state.edges_drawn(cell) + 1 {
            6 => score += CAPTURE_BONUS,
            5 => score += NEAR_CAPTURE_BONUS,
            _ => {}
        }
    }

    score
}

/// Order moves so alpha-beta sees the most forcing ones first: descending
/// for the maximizer, ascending for the minimizer. Ties keep input order.
pub fn order_moves(state: &GameState, moves: Vec<EdgeId>, maximizing: bool) -> Vec<EdgeId> {
    let mut scored: Vec<(EdgeId, i32)> = moves.into_iter().map(|mv| (mv, move_score(state, mv))).collect();

    if maximizing {
        scored.sort_by_key(|&(_, score)| Reverse(score));
    } else {
        scored.sort_by_key(|&(_, score)| score);
    }

    scored.into_iter().map(|(mv, _)| mv).collect()
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

/// Depth-limited minimax over `score[1] - score[0]`.
///
/// `maximizing` selects the side to move: Blue maximizes, Red minimizes. A
/// move that earns an extra turn keeps the same side at the next ply; every
/// ply costs one unit of depth either way. Returns the backed-up value and
/// the first move reaching it, or `None` at a leaf.
pub fn minimax<T: SearchTable>(
    state: &GameState,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    table: &mut T,
) -> (i32, Option<EdgeId>) {
    let key = PositionKey::new(state, maximizing);
    if let Some(hit) = table.lookup(&key, depth, alpha, beta) {
        return hit;
    }

    if depth == 0 || is_terminal(state) {
        let value = evaluate(state);
        table.store(
            key,
            Entry {
                value,
                best_move: None,
                depth,
                bound: Bound::Exact,
            },
        );
        return (value, None);
    }

    let player = if maximizing { Player::Blue } else { Player::Red };
    let moves = order_moves(state, state.possible_moves(), maximizing);
    let (alpha_in, beta_in) = (alpha, beta);

    let mut best_value = if maximizing { NEG_INF } else { POS_INF };
    let mut best_move = None;

    for &mv in &moves {
        let Ok((child, extra_turn)) = state.apply_move(mv, player) else {
            continue;
        };
        let next_maximizing = if extra_turn { maximizing } else { !maximizing };
        let (value, _) = minimax(&child, depth - 1, alpha, beta, next_maximizing, table);

        if maximizing {
            if value > best_value {
                best_value = value;
                best_move = Some(mv);
            }
            alpha = alpha.max(value);
        } else {
            if value < best_value {
                best_value = value;
                best_move = Some(mv);
            }
            beta = beta.min(value);
        }

        if beta <= alpha {
            break;
        }
    }

    // Never hand back "no move" while moves exist
    if best_move.is_none() {
        best_move = moves.first().copied();
    }

    let bound = if best_value <= alpha_in {
        Bound::Upper
    } else if best_value >= beta_in {
        Bound::Lower
    } else {
        Bound::Exact
    };
    table.store(
        key,
        Entry {
            value: best_value,
            best_move,
            depth,
            bound,
        },
    );

    (best_value, best_move)
}

// ============================================================================
// ARTIFACT PLANNING
// ============================================================================

/// Opponent cell whose compass swap gains the most points, if any gains anything
pub fn best_compass_target(state: &GameState, player: Player) -> Option<CellId> {
    let source = state.player_items(player).compass_cell?;
    let source_value = treasure_value(state.cell_content(source));

    state
        .topology()
        .cells()
        .filter(|&cell| state.can_use_compass(player, cell))
        .map(|cell| (cell, treasure_value(state.cell_content(cell)) - source_value))
        .filter(|&(_, gain)| gain > 0)
        .max_by_key(|&(cell, gain)| (gain, Reverse(cell)))
        .map(|(cell, _)| cell)
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Result of one AI search
#[derive(Clone, Copy, Debug)]
pub struct SearchOutcome {
    pub value: i32,
    pub best_move: Option<EdgeId>,
    pub stats: SearchStats,
}

/// Alpha-beta AI player. Its table persists across turns of one match.
pub struct AlphaBetaAI {
    pub depth: u32,
    table: TranspositionTable,
}

impl AlphaBetaAI {
    /// Rejects negative depths
    pub fn new(depth: i32) -> Result<Self> {
        let depth = u32::try_from(depth).map_err(|_| GameError::InvalidDepth(depth))?;
        Ok(Self {
            depth,
            table: TranspositionTable::new(),
        })
    }

    /// Same, with a table flushed once it holds `capacity` entries
    pub fn with_table_capacity(depth: i32, capacity: usize) -> Result<Self> {
        let mut ai = Self::new(depth)?;
        ai.table = TranspositionTable::with_capacity(capacity);
        Ok(ai)
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Drop cached results, e.g. before a match on a different board
    pub fn reset(&mut self) {
        self.table.clear();
    }

    /// Search for `player`, collecting statistics
    pub fn search(&mut self, state: &GameState, player: Player) -> SearchOutcome {
        let start = Instant::now();
        let mut table = InstrumentedTable::new(&mut self.table);
        let (value, best_move) = minimax(state, self.depth, NEG_INF, POS_INF, player == Player::Blue, &mut table);
        let stats = table.finish(start.elapsed());

        tracing::debug!(
            ?player,
            value,
            best_move = ?best_move,
            evaluated = stats.positions_evaluated,
            hits = stats.cache_hits,
            table = stats.table_size,
            "search finished"
        );

        SearchOutcome { value, best_move, stats }
    }

    /// Get best move for `player` in the current position
    pub fn best_move(&mut self, state: &GameState, player: Player) -> Option<EdgeId> {
        self.search(state, player).best_move
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Hex, Topology};
    use crate::items::{Artifact, Item, Treasure};
    use std::sync::Arc;

    fn radius_one(contents: Vec<(Hex, Item)>) -> GameState {
        let topology = Arc::new(Topology::new(1));
        let mut placed = vec![None; topology.cell_count()];
        for (hex, item) in contents {
            placed[topology.cell_at(hex).unwrap().index()] = Some(item);
        }
        GameState::new(topology, placed)
    }

    /// Plain minimax without pruning or caching
    fn exhaustive(state: &GameState, depth: u32, maximizing: bool) -> i32 {
        if depth == 0 || is_terminal(state) {
            return evaluate(state);
        }
        let player = if maximizing { Player::Blue } else { Player::Red };
        let values = state.possible_moves().into_iter().map(|mv| {
            let (child, extra) = state.apply_move(mv, player).unwrap();
            exhaustive(&child, depth - 1, if extra { maximizing } else { !maximizing })
        });
        if maximizing {
            values.max().unwrap()
        } else {
            values.min().unwrap()
        }
    }

    /// Play `count` edges in index order, skipping any that would enclose a cell
    fn quiet_prefix(state: &GameState, count: usize) -> GameState {
        let mut s = state.clone();
        let mut played = 0;
        for mv in state.possible_moves() {
            if played == count {
                break;
            }
            if move_score(&s, mv) >= CAPTURE_BONUS {
                continue;
            }
            let player = s.turn();
            s = s.apply_move(mv, player).unwrap().0;
            played += 1;
        }
        s
    }

    #[test]
    fn test_move_ordering() {
        let s = radius_one(vec![]);
        let center = s.topology().cell_at(Hex::new(0, 0)).unwrap();
        let sides = *s.topology().cell_edges(center);

        let mut setup = s.clone();
        for &e in &sides[..5] {
            setup = setup.apply_move(e, Player::Red).unwrap().0;
        }

        assert_eq!(move_score(&setup, sides[5]), CAPTURE_BONUS);
        let max_order = order_moves(&setup, setup.possible_moves(), true);
        assert_eq!(max_order[0], sides[5]);
        let min_order = order_moves(&setup, setup.possible_moves(), false);
        assert_eq!(*min_order.last().unwrap(), sides[5]);
    }

    #[test]
    fn test_ordering_is_stable() {
        let s = radius_one(vec![]);
        // Fresh board: every score is zero, so order is untouched
        assert_eq!(order_moves(&s, s.possible_moves(), true), s.possible_moves());
        assert_eq!(order_moves(&s, s.possible_moves(), false), s.possible_moves());
    }

    #[test]
    fn test_leaf_returns_no_move() {
        let s = radius_one(vec![]);
        let mut table = TranspositionTable::new();
        assert_eq!(minimax(&s, 0, NEG_INF, POS_INF, true, &mut table), (0, None));
    }

    #[test]
    fn test_ai_takes_capture() {
        let s = radius_one(vec![(Hex::new(0, 0), Item::Treasure(Treasure::Diamond))]);
        let center = s.topology().cell_at(Hex::new(0, 0)).unwrap();
        let sides = *s.topology().cell_edges(center);
        let mut setup = s;
        for &e in &sides[..5] {
            setup = setup.apply_move(e, Player::Red).unwrap().0;
        }

        let mut ai = AlphaBetaAI::new(2).unwrap();
        assert_eq!(ai.best_move(&setup, Player::Blue), Some(sides[5]));
        assert_eq!(ai.best_move(&setup, Player::Red), Some(sides[5]));
    }

    #[test]
    fn test_alpha_beta_matches_exhaustive() {
        let s = radius_one(vec![
            (Hex::new(0, 0), Item::Treasure(Treasure::Gold)),
            (Hex::new(1, 0), Item::Artifact(Artifact::Hourglass)),
            (Hex::new(0, 1), Item::Treasure(Treasure::Silver)),
        ]);
        let position = quiet_prefix(&s, 20);

        for depth in 1..=4 {
            for maximizing in [true, false] {
                let mut table = TranspositionTable::new();
                let (value, mv) = minimax(&position, depth, NEG_INF, POS_INF, maximizing, &mut table);
                assert_eq!(value, exhaustive(&position, depth, maximizing), "depth {}", depth);
                assert!(mv.is_some());
            }
        }
    }

    #[test]
    fn test_alpha_beta_matches_exhaustive_endgame() {
        let s = radius_one(vec![(Hex::new(-1, 0), Item::Treasure(Treasure::Platinum))]);
        let position = quiet_prefix(&s, 23);
        let depth = (position.possible_moves().len() as u32).min(6);

        let mut table = TranspositionTable::new();
        let (value, _) = minimax(&position, depth, NEG_INF, POS_INF, false, &mut table);
        assert_eq!(value, exhaustive(&position, depth, false));
    }

    #[test]
    fn test_prepopulated_table_same_value() {
        let s = radius_one(vec![(Hex::new(0, 0), Item::Treasure(Treasure::Gold))]);
        let position = quiet_prefix(&s, 18);

        let mut table = TranspositionTable::new();
        let (first, _) = minimax(&position, 3, NEG_INF, POS_INF, true, &mut table);
        assert!(!table.is_empty());
        let (second, _) = minimax(&position, 3, NEG_INF, POS_INF, true, &mut table);
        assert_eq!(first, second);

        let mut fresh = TranspositionTable::new();
        assert_eq!(minimax(&position, 3, NEG_INF, POS_INF, true, &mut fresh).0, first);
    }

    #[test]
    fn test_deeper_table_substitutes() {
        let s = radius_one(vec![
            (Hex::new(0, 0), Item::Treasure(Treasure::Gold)),
            (Hex::new(0, -1), Item::Artifact(Artifact::Hourglass)),
        ]);
        let position = quiet_prefix(&s, 18);

        for maximizing in [true, false] {
            let mut deep = TranspositionTable::new();
            let (deep_value, _) = minimax(&position, 4, NEG_INF, POS_INF, maximizing, &mut deep);
            assert_eq!(deep_value, exhaustive(&position, 4, maximizing));

            // A shallower query is answered by the deeper result
            let (reused, mv) = minimax(&position, 3, NEG_INF, POS_INF, maximizing, &mut deep);
            assert_eq!(reused, deep_value);
            assert!(mv.is_some());
        }
    }

    #[test]
    fn test_deeper_table_same_value_near_end() {
        let mut position = radius_one(vec![(Hex::new(1, -1), Item::Treasure(Treasure::Silver))]);
        while position.possible_moves().len() > 3 {
            let mv = position.possible_moves()[0];
            let player = position.turn();
            position = position.apply_move(mv, player).unwrap().0;
        }
        let maximizing = position.turn() == Player::Blue;

        let mut deep = TranspositionTable::new();
        minimax(&position, 4, NEG_INF, POS_INF, maximizing, &mut deep);
        let (reused, _) = minimax(&position, 3, NEG_INF, POS_INF, maximizing, &mut deep);
        let (cold, _) = minimax(&position, 3, NEG_INF, POS_INF, maximizing, &mut TranspositionTable::new());
        assert_eq!(reused, cold);
        assert_eq!(cold, exhaustive(&position, 3, maximizing));
    }

    #[test]
    fn test_search_is_deterministic() {
        let s = radius_one(vec![(Hex::new(1, -1), Item::Treasure(Treasure::Copper))]);
        let position = quiet_prefix(&s, 10);
        let a = minimax(&position, 3, NEG_INF, POS_INF, true, &mut TranspositionTable::new());
        let b = minimax(&position, 3, NEG_INF, POS_INF, true, &mut TranspositionTable::new());
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_does_not_mutate_state() {
        let s = radius_one(vec![]);
        let before = s.clone();
        let mut ai = AlphaBetaAI::new(2).unwrap();
        let outcome = ai.search(&s, Player::Blue);
        assert_eq!(s, before);
        assert!(outcome.best_move.is_some());
        assert!(outcome.stats.positions_evaluated > 0);
        assert_eq!(outcome.stats.table_size, ai.table().len());
    }

    #[test]
    fn test_fallback_move_on_closed_window() {
        // An empty window fails every child; a move must still come back
        let s = radius_one(vec![]);
        let mut table = TranspositionTable::new();
        let (_, mv) = minimax(&s, 2, 5, 5, true, &mut table);
        assert!(mv.is_some());
    }

    #[test]
    fn test_negative_depth_rejected() {
        assert!(matches!(AlphaBetaAI::new(-1), Err(GameError::InvalidDepth(-1))));
        assert!(AlphaBetaAI::new(0).is_ok());
    }

    #[test]
    fn test_best_compass_target() {
        let topology = Arc::new(Topology::new(1));
        let center = topology.cell_at(Hex::new(0, 0)).unwrap();
        let copper = topology.cell_at(Hex::new(1, 0)).unwrap();
        let gold = topology.cell_at(Hex::new(-1, 0)).unwrap();
        let mut contents = vec![None; topology.cell_count()];
        contents[center.index()] = Some(Item::Artifact(Artifact::Compass));
        contents[copper.index()] = Some(Item::Treasure(Treasure::Copper));
        contents[gold.index()] = Some(Item::Treasure(Treasure::Gold));

        let mut s = GameState::new(Arc::clone(&topology), contents);
        for cell in [copper, gold] {
            for &e in topology.cell_edges(cell) {
                if s.is_available(e) {
                    s = s.apply_move(e, Player::Blue).unwrap().0;
                }
            }
        }
        assert_eq!(best_compass_target(&s, Player::Red), None);

        for &e in topology.cell_edges(center) {
            if s.is_available(e) {
                s = s.apply_move(e, Player::Red).unwrap().0;
            }
        }
        assert_eq!(best_compass_target(&s, Player::Red), Some(gold));
    }
}
