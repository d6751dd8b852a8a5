//! HexaHunt Core - Game engine and AI
//!
//! This crate provides the core game logic for HexaHunt, a two-player
//! edge-drawing game on a hexagonal board:
//! - Board geometry (hex disk with axial coordinates, shared edges)
//! - Hidden treasures and artifacts
//! - Game state, move application and artifact effects
//! - Score-difference evaluation
//! - Alpha-beta AI with a transposition table
//! - Match configuration and a match driver

pub mod board;
pub mod items;
pub mod game;
pub mod eval;
pub mod tt;
pub mod ai;
pub mod config;
pub mod driver;
pub mod error;

// Re-exports for convenient access
pub use board::{build_board, CellId, Edge, EdgeId, Hex, Point, Topology, DIRECTIONS};
pub use items::{Artifact, Item, Treasure};
pub use game::{GameState, Owner, Player, PlayerItems, GAUNTLET_LIFESPAN};
pub use eval::{evaluate, is_terminal, result, GameResult};
pub use tt::{Bound, Entry, PositionKey, SearchStats, SearchTable, TranspositionTable};
pub use ai::{minimax, order_moves, AlphaBetaAI, SearchOutcome, NEG_INF, POS_INF};
pub use config::{Difficulty, MatchConfig};
pub use driver::{Action, AiTurn, Match};
pub use error::{GameError, Result};
