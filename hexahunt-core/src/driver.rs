//! Match driver: one board, one AI, and the record of everything played

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::{best_compass_target, AlphaBetaAI, SearchOutcome};
use crate::board::{build_board, CellId, EdgeId, Topology};
use crate::config::MatchConfig;
use crate::error::{GameError, Result};
use crate::eval::{is_terminal, result, GameResult};
use crate::game::{GameState, Player};

/// One committed action, in play order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move {
        player: Player,
        edge: EdgeId,
        extra_turn: bool,
    },
    Gauntlet {
        player: Player,
        stolen: i32,
    },
    Compass {
        player: Player,
        source: CellId,
        target: CellId,
    },
}

impl Action {
    pub fn player(&self) -> Player {
        match *self {
            Action::Move { player, .. } | Action::Gauntlet { player, .. } | Action::Compass { player, .. } => player,
        }
    }
}

/// Everything the AI did on one call to [`Match::commit_ai`]
#[derive(Clone, Debug)]
pub struct AiTurn {
    pub player: Player,
    /// Artifact actions taken before moving
    pub actions: Vec<Action>,
    /// `None` when the game was already over
    pub edge: Option<EdgeId>,
    pub extra_turn: bool,
    pub search: Option<SearchOutcome>,
}

/// A running match
pub struct Match {
    topology: Arc<Topology>,
    state: GameState,
    ai: AlphaBetaAI,
    history: Vec<Action>,
}

impl Match {
    /// Build a board and AI from `config`. Seeded configs are reproducible.
    pub fn new(config: &MatchConfig) -> Result<Self> {
        config.validate()?;
        if config.is_unusual() {
            tracing::warn!(
                radius = config.radius,
                depth = config.depth,
                "settings outside the recommended range, AI turns may be slow"
            );
        }

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let (_, state) = build_board(config.radius, &mut rng)?;

        Self::from_state(state, config)
    }

    /// Continue from an existing position, using the search settings of `config`
    pub fn from_state(state: GameState, config: &MatchConfig) -> Result<Self> {
        let ai = match config.table_capacity {
            Some(capacity) => AlphaBetaAI::with_table_capacity(config.depth, capacity)?,
            None => AlphaBetaAI::new(config.depth)?,
        };

        tracing::info!(
            radius = state.topology().radius(),
            depth = ai.depth,
            difficulty = ?config.difficulty(),
            "match ready"
        );

        Ok(Self {
            topology: Arc::clone(state.topology()),
            state,
            ai,
            history: Vec::new(),
        })
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn ai(&self) -> &AlphaBetaAI {
        &self.ai
    }

    pub fn is_over(&self) -> bool {
        is_terminal(&self.state)
    }

    pub fn result(&self) -> GameResult {
        result(&self.state)
    }

    /// Play `edge` for the player to move. Returns whether they move again.
    pub fn commit_human(&mut self, edge: EdgeId) -> Result<bool> {
        if !self.state.possible_moves().contains(&edge) {
            return Err(GameError::InvalidMove { edge });
        }
        self.commit(edge)
    }

    /// Spend the mover's gauntlet. Returns the points stolen, or `None` if
    /// nothing happened.
    pub fn use_gauntlet(&mut self, amount: Option<i32>) -> Option<i32> {
        let player = self.state.turn();
        let stolen = self.state.gauntlet_steal_amount(player, amount);
        let next = self.state.use_gauntlet_amount(player, amount);
        if next == self.state {
            return None;
        }

        self.state = next;
        self.history.push(Action::Gauntlet { player, stolen });
        Some(stolen)
    }

    /// Swap the mover's compass cell with `target`. Returns whether it happened.
    pub fn use_compass(&mut self, target: CellId) -> bool {
        let player = self.state.turn();
        let Some(source) = self.state.player_items(player).compass_cell else {
            return false;
        };
        if !self.state.can_use_compass(player, target) {
            return false;
        }

        self.state = self.state.use_compass(player, target);
        self.history.push(Action::Compass { player, source, target });
        true
    }

    /// Let the AI act for the player to move.
    ///
    /// A held gauntlet is fired whenever it steals something, and a compass
    /// whenever a swap gains points. Then the search picks the edge.
    pub fn commit_ai(&mut self) -> Result<AiTurn> {
        let player = self.state.turn();
        let mut turn = AiTurn {
            player,
            actions: Vec::new(),
            edge: None,
            extra_turn: false,
            search: None,
        };

        if self.is_over() {
            return Ok(turn);
        }

        if self.state.gauntlet_steal_amount(player, None) > 0 && self.use_gauntlet(None).is_some() {
            turn.actions.extend(self.history.last().copied());
        }
        if let Some(target) = best_compass_target(&self.state, player) {
            if self.use_compass(target) {
                turn.actions.extend(self.history.last().copied());
            }
        }

        let outcome = self.ai.search(&self.state, player);
        let edge = match outcome.best_move {
            Some(edge) => edge,
            None => {
                let fallback = self.state.possible_moves().first().copied();
                tracing::warn!(?player, ?fallback, "search returned no move, using first available");
                fallback.ok_or(GameError::InvalidMove { edge: EdgeId(u32::MAX) })?
            }
        };

        turn.extra_turn = self.commit(edge)?;
        turn.edge = Some(edge);
        turn.search = Some(outcome);
        Ok(turn)
    }

    /// Let the AI play both seats until the board is full
    pub fn play_ai_vs_ai(&mut self) -> Result<GameResult> {
        while !self.is_over() {
            self.commit_ai()?;
        }

        let result = self.result();
        tracing::info!(?result, score = ?self.state.score(), moves = self.history.len(), "match finished");
        Ok(result)
    }

    fn commit(&mut self, edge: EdgeId) -> Result<bool> {
        let player = self.state.turn();
        let (next, extra_turn) = self.state.apply_move(edge, player)?;
        self.state = next;
        self.history.push(Action::Move {
            player,
            edge,
            extra_turn,
        });
        Ok(extra_turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Hex;
    use crate::items::{Artifact, Item, Treasure};

    fn seeded(radius: i32, depth: i32) -> Match {
        Match::new(&MatchConfig::new(radius, depth).with_seed(7)).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(Match::new(&MatchConfig::new(0, 2)), Err(GameError::InvalidRadius(0))));
        assert!(matches!(Match::new(&MatchConfig::new(1, -3)), Err(GameError::InvalidDepth(-3))));
    }

    #[test]
    fn test_seed_reproducible_board() {
        let a = seeded(2, 1);
        let b = seeded(2, 1);
        assert_eq!(a.state(), b.state());
        assert_eq!(a.topology().cell_count(), 19);
    }

    #[test]
    fn test_commit_human() {
        let mut m = seeded(1, 1);
        let edge = m.state().possible_moves()[0];
        assert!(!m.commit_human(edge).unwrap());
        assert_eq!(m.state().turn(), Player::Blue);
        assert!(matches!(m.commit_human(edge), Err(GameError::InvalidMove { .. })));
        assert!(m.commit_human(EdgeId(9_999)).is_err());
        assert_eq!(m.history().len(), 1);
    }

    #[test]
    fn test_ai_vs_ai_fills_board() {
        let mut m = seeded(1, 2);
        let result = m.play_ai_vs_ai().unwrap();
        assert_ne!(result, GameResult::Ongoing);
        assert!(m.is_over());

        let moves = m.history().iter().filter(|a| matches!(a, Action::Move { .. })).count();
        assert_eq!(moves, m.topology().edge_count());

        // Nothing left to do
        let turn = m.commit_ai().unwrap();
        assert!(turn.edge.is_none());
    }

    #[test]
    fn test_ai_fires_gauntlet_first() {
        let topology = Arc::new(Topology::new(1));
        let center = topology.cell_at(Hex::new(0, 0)).unwrap();
        let ring = topology.cell_at(Hex::new(1, 0)).unwrap();
        let mut contents = vec![None; topology.cell_count()];
        contents[center.index()] = Some(Item::Artifact(Artifact::Gauntlet));
        contents[ring.index()] = Some(Item::Treasure(Treasure::Silver));
        let mut s = GameState::new(Arc::clone(&topology), contents);

        // Red claims the silver, Blue claims the gauntlet
        for &e in topology.cell_edges(ring) {
            if s.is_available(e) {
                s = s.apply_move(e, Player::Red).unwrap().0;
            }
        }
        for &e in topology.cell_edges(center) {
            if s.is_available(e) {
                s = s.apply_move(e, Player::Blue).unwrap().0;
            }
        }
        assert_eq!(s.turn(), Player::Blue);
        let red_before = s.score_of(Player::Red);

        let mut m = Match::from_state(s, &MatchConfig::new(1, 1)).unwrap();
        let turn = m.commit_ai().unwrap();

        assert_eq!(turn.actions, vec![Action::Gauntlet { player: Player::Blue, stolen: 3 }]);
        assert_eq!(m.state().score_of(Player::Red), red_before - 3);
        assert!(turn.edge.is_some());
    }

    #[test]
    fn test_use_artifacts_without_holding() {
        let mut m = seeded(1, 1);
        assert_eq!(m.use_gauntlet(None), None);
        assert!(!m.use_compass(CellId(0)));
        assert!(m.history().is_empty());
    }
}
