//! Position evaluation and game outcome

use serde::{Deserialize, Serialize};

use crate::game::{GameState, Player};

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Win(Player),
    Tie,
}

/// Score difference from Blue's point of view: `score[1] - score[0]`
pub fn evaluate(state: &GameState) -> i32 {
    let [red, blue] = state.score();
    blue - red
}

/// The game ends once every edge is drawn
pub fn is_terminal(state: &GameState) -> bool {
    state.edge_owners().iter().all(|owner| owner.is_some())
}

/// Outcome by final score; `Ongoing` until the board is full
pub fn result(state: &GameState) -> GameResult {
    if !is_terminal(state) {
        return GameResult::Ongoing;
    }

    match evaluate(state) {
        v if v > 0 => GameResult::Win(Player::Blue),
        v if v < 0 => GameResult::Win(Player::Red),
        _ => GameResult::Tie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Topology;
    use std::sync::Arc;

    fn fresh() -> GameState {
        let topology = Arc::new(Topology::new(1));
        let cells = topology.cell_count();
        GameState::new(topology, vec![None; cells])
    }

    fn filled() -> GameState {
        let mut s = fresh();
        while let Some(&mv) = s.possible_moves().first() {
            let player = s.turn();
            s = s.apply_move(mv, player).unwrap().0;
        }
        s
    }

    #[test]
    fn test_fresh_board_not_terminal() {
        let s = fresh();
        assert!(!is_terminal(&s));
        assert_eq!(evaluate(&s), 0);
        assert_eq!(result(&s), GameResult::Ongoing);
    }

    #[test]
    fn test_terminal_evaluation() {
        let mut s = filled();
        s.set_score([3, 5]);
        assert!(is_terminal(&s));
        assert_eq!(evaluate(&s), 2);
        assert_eq!(result(&s), GameResult::Win(Player::Blue));
        assert!(s.possible_moves().is_empty());
    }

    #[test]
    fn test_result_tie_and_red_win() {
        let mut s = filled();
        s.set_score([4, 4]);
        assert_eq!(result(&s), GameResult::Tie);
        s.set_score([6, 2]);
        assert_eq!(result(&s), GameResult::Win(Player::Red));
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let s = fresh();
        let before = s.clone();
        assert_eq!(s.possible_moves(), s.possible_moves());
        assert_eq!(is_terminal(&s), is_terminal(&s));
        assert_eq!(evaluate(&s), evaluate(&s));
        assert_eq!(s, before);
    }
}
