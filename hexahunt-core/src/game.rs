//! Game state, move application and artifact effects

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{CellId, EdgeId, Topology};
use crate::error::{GameError, Result};
use crate::items::{treasure_value, Artifact, Item};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Moves a picked-up gauntlet survives before it expires unused
pub const GAUNTLET_LIFESPAN: u8 = 5;

/// Points for completing a cell, before any treasure
pub const CELL_POINTS: i32 = 1;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player seat. Red moves first (the human seat), Blue second (the AI seat).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Red = 0,
    Blue = 1,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Red, Player::Blue];

    pub fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Blue,
            Player::Blue => Player::Red,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Ownership of a cell or edge; `None` is unclaimed
pub type Owner = Option<Player>;

/// Per-player artifact trackers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerItems {
    pub gauntlet_available: bool,
    /// Moves left before an unused gauntlet expires
    pub gauntlet_timer: u8,
    pub gauntlet_cell: Option<CellId>,
    /// Banked hourglass turns
    pub hourglass_bonus: u32,
    pub compass_available: bool,
    pub compass_cell: Option<CellId>,
    /// Value of the most recent treasure this player collected; an opposing
    /// gauntlet steals against it
    pub last_treasure_value: i32,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (every operation returns a new value)
///
/// The topology is shared by `Arc`; item maps are shared until a claim
/// touches them, so a plain move copies only the owner vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    topology: Arc<Topology>,
    cells: Vec<Owner>,
    edges: Vec<Owner>,
    turn: Player,
    score: [i32; 2],
    last_move: Option<EdgeId>,
    /// Items still on the board, by cell
    contents: Arc<Vec<Option<Item>>>,
    /// Items revealed by claiming, by cell
    claimed_items: Arc<Vec<Option<Item>>>,
    items: [PlayerItems; 2],
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh state: nothing drawn, Red to move.
    ///
    /// `contents` is indexed by cell and padded/truncated to the board size.
    pub fn new(topology: Arc<Topology>, mut contents: Vec<Option<Item>>) -> Self {
        let cell_count = topology.cell_count();
        let edge_count = topology.edge_count();
        contents.resize(cell_count, None);

        Self {
            topology,
            cells: vec![None; cell_count],
            edges: vec![None; edge_count],
            turn: Player::Red,
            score: [0, 0],
            last_move: None,
            contents: Arc::new(contents),
            claimed_items: Arc::new(vec![None; cell_count]),
            items: [PlayerItems::default(); 2],
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Player to move
    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn score(&self) -> [i32; 2] {
        self.score
    }

    pub fn score_of(&self, player: Player) -> i32 {
        self.score[player.index()]
    }

    pub fn last_move(&self) -> Option<EdgeId> {
        self.last_move
    }

    pub fn cell_owner(&self, cell: CellId) -> Owner {
        self.cells.get(cell.index()).copied().flatten()
    }

    pub fn edge_owner(&self, edge: EdgeId) -> Owner {
        self.edges.get(edge.index()).copied().flatten()
    }

    /// Ownership of every edge, indexed by `EdgeId`
    pub fn edge_owners(&self) -> &[Owner] {
        &self.edges
    }

    /// Ownership of every cell, indexed by `CellId`
    pub fn cell_owners(&self) -> &[Owner] {
        &self.cells
    }

    /// Item still placed on a cell (hidden until claimed)
    pub fn cell_content(&self, cell: CellId) -> Option<Item> {
        self.contents.get(cell.index()).copied().flatten()
    }

    /// Item revealed when the cell was claimed
    pub fn claimed_item(&self, cell: CellId) -> Option<Item> {
        self.claimed_items.get(cell.index()).copied().flatten()
    }

    pub fn player_items(&self, player: Player) -> &PlayerItems {
        &self.items[player.index()]
    }

    /// Number of drawn sides of a cell
    pub fn edges_drawn(&self, cell: CellId) -> usize {
        self.topology
            .cell_edges(cell)
            .iter()
            .filter(|e| self.edges[e.index()].is_some())
            .count()
    }

    /// Cells owned by a player
    pub fn cells_owned(&self, player: Player) -> usize {
        self.cells.iter().filter(|o| **o == Some(player)).count()
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// All undrawn edges, in edge-index order
    pub fn possible_moves(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.is_none())
            .map(|(i, _)| EdgeId(i as u32))
            .collect()
    }

    pub fn is_available(&self, edge: EdgeId) -> bool {
        matches!(self.edges.get(edge.index()), Some(None))
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Draw `edge` for `player`, returning the successor and whether the same
    /// player moves again.
    ///
    /// Fails with [`GameError::InvalidMove`] if the edge is already drawn or
    /// not on this board. `self` is never modified.
    pub fn apply_move(&self, edge: EdgeId, player: Player) -> Result<(GameState, bool)> {
        if !self.is_available(edge) {
            return Err(GameError::InvalidMove { edge });
        }

        let mut next = self.clone();
        next.tick_gauntlet(player);

        next.edges[edge.index()] = Some(player);
        next.last_move = Some(edge);

        let topology = Arc::clone(&next.topology);
        let mut extra_turn = false;
        for cell in topology.edge_cells(edge) {
            if next.cells[cell.index()].is_none() && next.edges_drawn(cell) == 6 {
                next.claim_cell(cell, player);
                extra_turn = true;
            }
        }

        // A banked hourglass turn only covers a move that earned nothing itself
        let bank = &mut next.items[player.index()];
        if !extra_turn && bank.hourglass_bonus > 0 {
            bank.hourglass_bonus -= 1;
            extra_turn = true;
            tracing::debug!(?player, remaining = bank.hourglass_bonus, "hourglass bonus turn spent");
        }

        next.turn = if extra_turn { player } else { player.opponent() };

        Ok((next, extra_turn))
    }

    /// Count down a held gauntlet; it expires when the timer reaches zero
    fn tick_gauntlet(&mut self, player: Player) {
        let held = &mut self.items[player.index()];
        if !held.gauntlet_available || held.gauntlet_timer == 0 {
            return;
        }

        held.gauntlet_timer -= 1;
        if held.gauntlet_timer == 0 {
            held.gauntlet_available = false;
            if let Some(cell) = held.gauntlet_cell.take() {
                self.clear_item_markers(cell);
            }
            tracing::debug!(?player, "gauntlet expired");
        }
    }

    fn claim_cell(&mut self, cell: CellId, player: Player) {
        let p = player.index();
        self.cells[cell.index()] = Some(player);
        self.score[p] += CELL_POINTS;

        let Some(item) = self.contents[cell.index()] else {
            return;
        };
        Arc::make_mut(&mut self.claimed_items)[cell.index()] = Some(item);

        match item {
            Item::Treasure(treasure) => {
                let value = treasure.value();
                self.score[p] += value;
                self.items[p].last_treasure_value = value;
                tracing::debug!(?player, %cell, treasure = treasure.name(), value, "treasure claimed");
            }
            Item::Artifact(artifact) => {
                self.pick_up(artifact, cell, player);
                tracing::debug!(?player, %cell, artifact = artifact.name(), "artifact claimed");
            }
        }
    }

    fn pick_up(&mut self, artifact: Artifact, cell: CellId, player: Player) {
        let held = &mut self.items[player.index()];
        match artifact {
            Artifact::Hourglass => {
                held.hourglass_bonus += 1;
            }
            Artifact::Gauntlet => {
                held.gauntlet_available = true;
                held.gauntlet_timer = GAUNTLET_LIFESPAN;
                held.gauntlet_cell = Some(cell);
                // Carried from now on, no longer shown on the board
                Arc::make_mut(&mut self.contents)[cell.index()] = None;
            }
            Artifact::Compass => {
                held.compass_available = true;
                held.compass_cell = Some(cell);
            }
        }
    }

    /// Drop the on-board and revealed markers of an artifact cell
    fn clear_item_markers(&mut self, cell: CellId) {
        let i = cell.index();
        if matches!(self.contents[i], Some(Item::Artifact(_))) {
            Arc::make_mut(&mut self.contents)[i] = None;
        }
        if matches!(self.claimed_items[i], Some(Item::Artifact(_))) {
            Arc::make_mut(&mut self.claimed_items)[i] = None;
        }
    }

    // ========================================================================
    // ARTIFACT ACTIONS
    // ========================================================================

    /// Points a gauntlet would steal right now when asking for `amount`
    /// (`None` asks for the maximum). Zero when there is nothing to steal.
    pub fn gauntlet_steal_amount(&self, player: Player, amount: Option<i32>) -> i32 {
        let opponent = player.opponent();
        if !self.items[player.index()].gauntlet_available {
            return 0;
        }

        let last_value = self.items[opponent.index()].last_treasure_value;
        if last_value <= 0 {
            return 0;
        }

        amount
            .unwrap_or(last_value)
            .min(last_value)
            .min(self.score[opponent.index()])
            .max(0)
    }

    /// Steal the opponent's most recent treasure gain with a held gauntlet
    pub fn use_gauntlet(&self, player: Player) -> GameState {
        self.use_gauntlet_amount(player, None)
    }

    /// Like [`use_gauntlet`](Self::use_gauntlet), asking for at most `amount`.
    ///
    /// No-op without a gauntlet or when the opponent has no treasure gain on
    /// record. Otherwise the gauntlet is consumed, even if the clamped steal
    /// is smaller than requested. No score ever goes negative.
    pub fn use_gauntlet_amount(&self, player: Player, amount: Option<i32>) -> GameState {
        let opponent = player.opponent();
        let held = &self.items[player.index()];
        if !held.gauntlet_available || self.items[opponent.index()].last_treasure_value <= 0 {
            return self.clone();
        }

        let steal = self.gauntlet_steal_amount(player, amount);
        let mut next = self.clone();
        next.score[opponent.index()] -= steal;
        next.score[player.index()] += steal;

        let held = &mut next.items[player.index()];
        held.gauntlet_available = false;
        held.gauntlet_timer = 0;
        if let Some(cell) = held.gauntlet_cell.take() {
            next.clear_item_markers(cell);
        }

        tracing::debug!(?player, steal, score = ?next.score, "gauntlet used");
        next
    }

    /// Whether `use_compass(player, target)` would change anything
    pub fn can_use_compass(&self, player: Player, target: CellId) -> bool {
        let held = &self.items[player.index()];
        let Some(source) = held.compass_cell else {
            return false;
        };

        held.compass_available && source != target && self.cell_owner(target) == Some(player.opponent())
    }

    /// Swap ownership of the compass cell with an opponent-owned `target`.
    ///
    /// Treasure points follow the cells. No-op unless the player holds a
    /// compass and `target` is another cell owned by the opponent. The source
    /// goes to the opponent even if it was already taken from the player.
    pub fn use_compass(&self, player: Player, target: CellId) -> GameState {
        if !self.can_use_compass(player, target) {
            return self.clone();
        }
        let Some(source) = self.items[player.index()].compass_cell else {
            return self.clone();
        };

        let opponent = player.opponent();
        let (p, o) = (player.index(), opponent.index());
        let source_value = treasure_value(self.cell_content(source));
        let target_value = treasure_value(self.cell_content(target));

        let mut next = self.clone();
        next.cells[source.index()] = Some(opponent);
        next.cells[target.index()] = Some(player);

        next.score[p] += target_value - source_value;
        next.score[o] += source_value - target_value;

        next.clear_item_markers(source);
        let held = &mut next.items[p];
        held.compass_available = false;
        held.compass_cell = None;

        tracing::debug!(?player, %source, %target, score = ?next.score, "compass used");
        next
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: [i32; 2]) {
        self.score = score;
    }
}

// ============================================================================
// TESTS
// ============================================================================
