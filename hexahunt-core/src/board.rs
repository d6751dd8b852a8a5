//! Hex board geometry with axial coordinates
//!
//! Cells are pointy-top hexagons addressed by axial `(q, r)`. Vertices live on
//! an integer lattice (x in units of `sqrt(3)/2 * size`, y in units of
//! `size / 2`), so two neighbouring cells compute bit-identical endpoints for
//! the side they share and the canonical [`Edge`] key needs no rounding.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::game::GameState;
use crate::items::place_items;

// ============================================================================
// COORDINATES
// ============================================================================

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube coordinate
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Distance from center (0,0)
    pub fn distance_to_center(&self) -> i32 {
        self.q.abs().max(self.r.abs()).max(self.s().abs())
    }

    /// Check if this hex lies on a disk of the given radius
    pub fn is_within(&self, radius: i32) -> bool {
        self.distance_to_center() <= radius
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: u8) -> Hex {
        let (dq, dr) = DIRECTIONS[direction as usize % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// Hexagon center on the vertex lattice
    pub fn center(&self) -> Point {
        Point::new(2 * self.q + self.r, 3 * self.r)
    }

    /// The six corners, clockwise from the upper-right one (screen y grows down)
    pub fn vertices(&self) -> [Point; 6] {
        let c = self.center();
        VERTEX_OFFSETS.map(|(dx, dy)| Point::new(c.x + dx, c.y + dy))
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Direction vectors in axial coordinates (dq, dr)
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// Corner offsets at angles -30, 30, 90, 150, 210 and 270 degrees
const VERTEX_OFFSETS: [(i32, i32); 6] = [(1, -1), (1, 1), (0, 2), (-1, 1), (-1, -1), (0, -2)];

/// A hexagon corner on the integer vertex lattice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Canonical edge identity: its two endpoints in sorted order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub a: Point,
    pub b: Point,
}

impl Edge {
    pub fn new(v1: Point, v2: Point) -> Self {
        if v1 <= v2 {
            Self { a: v1, b: v2 }
        } else {
            Self { a: v2, b: v1 }
        }
    }
}

// ============================================================================
// INDICES
// ============================================================================

/// Dense index of a cell within its [`Topology`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

/// Dense index of an edge within its [`Topology`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl CellId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// ============================================================================
// TOPOLOGY
// ============================================================================

/// Static cell/edge adjacency for one board, shared read-only by every state of a match
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    radius: i32,
    cells: Vec<Hex>,
    edges: Vec<Edge>,
    cell_index: FxHashMap<Hex, CellId>,
    edge_index: FxHashMap<Edge, EdgeId>,
    cell_edges: Vec<[EdgeId; 6]>,
    /// Boundary edges have no second cell
    edge_cells: Vec<(CellId, Option<CellId>)>,
}

impl Topology {
    /// Build the hex-disk topology. Callers validate `radius >= 1`.
    pub fn new(radius: u32) -> Self {
        let radius = radius as i32;
        let mut topology = Self {
            radius,
            cells: Vec::new(),
            edges: Vec::new(),
            cell_index: FxHashMap::default(),
            edge_index: FxHashMap::default(),
            cell_edges: Vec::new(),
            edge_cells: Vec::new(),
        };

        for q in -radius..=radius {
            for r in -radius..=radius {
                let hex = Hex::new(q, r);
                if hex.is_within(radius) {
                    topology.add_cell(hex);
                }
            }
        }

        topology
    }

    fn add_cell(&mut self, hex: Hex) {
        let cell = CellId(self.cells.len() as u32);
        self.cells.push(hex);
        self.cell_index.insert(hex, cell);

        let vertices = hex.vertices();
        let mut sides = [EdgeId(0); 6];
        for (i, side) in sides.iter_mut().enumerate() {
            let key = Edge::new(vertices[i], vertices[(i + 1) % 6]);
            *side = match self.edge_index.get(&key) {
                Some(&existing) => {
                    let slot = &mut self.edge_cells[existing.index()];
                    if slot.0 != cell && slot.1.is_none() {
                        slot.1 = Some(cell);
                    }
                    existing
                }
                None => {
                    let id = EdgeId(self.edges.len() as u32);
                    self.edges.push(key);
                    self.edge_index.insert(key, id);
                    self.edge_cells.push((cell, None));
                    id
                }
            };
        }
        self.cell_edges.push(sides);
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All cells in build order
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        (0..self.cells.len() as u32).map(CellId)
    }

    /// All edges in build order
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len() as u32).map(EdgeId)
    }

    pub fn hex(&self, cell: CellId) -> Hex {
        self.cells[cell.index()]
    }

    pub fn edge(&self, edge: EdgeId) -> Edge {
        self.edges[edge.index()]
    }

    pub fn cell_at(&self, hex: Hex) -> Option<CellId> {
        self.cell_index.get(&hex).copied()
    }

    pub fn edge_id(&self, edge: &Edge) -> Option<EdgeId> {
        self.edge_index.get(edge).copied()
    }

    /// The six sides of a cell, in vertex order
    pub fn cell_edges(&self, cell: CellId) -> &[EdgeId; 6] {
        &self.cell_edges[cell.index()]
    }

    /// The one or two cells bounded by an edge
    pub fn edge_cells(&self, edge: EdgeId) -> impl Iterator<Item = CellId> {
        let (first, second) = self.edge_cells[edge.index()];
        std::iter::once(first).chain(second)
    }

    pub fn is_boundary(&self, edge: EdgeId) -> bool {
        self.edge_cells[edge.index()].1.is_none()
    }
}

// ============================================================================
// BOARD BUILDER
// ============================================================================

/// Build the topology and initial state for a match.
///
/// Rejects `radius < 1`. Item placement draws from `rng`, everything else is
/// deterministic.
pub fn build_board<R: Rng>(radius: i32, rng: &mut R) -> Result<(Arc<Topology>, GameState)> {
    if radius < 1 {
        return Err(GameError::InvalidRadius(radius));
    }

    let topology = Arc::new(Topology::new(radius as u32));
    let contents = place_items(topology.cell_count(), rng);
    let state = GameState::new(Arc::clone(&topology), contents);

    tracing::debug!(
        radius,
        cells = topology.cell_count(),
        edges = topology.edge_count(),
        "board built"
    );

    Ok((topology, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_hex_disk_sizes() {
        // 3r^2 + 3r + 1 cells, 9r^2 + 15r + 6 edges
        for radius in 1..=4u32 {
            let t = Topology::new(radius);
            let r = radius as usize;
            assert_eq!(t.cell_count(), 3 * r * r + 3 * r + 1);
            assert_eq!(t.edge_count(), 9 * r * r + 15 * r + 6);
        }
    }

    #[test]
    fn test_shared_edges() {
        let t = Topology::new(1);
        let center = t.cell_at(Hex::new(0, 0)).unwrap();

        // Every side of the center cell borders a ring cell
        for &edge in t.cell_edges(center) {
            let cells: Vec<_> = t.edge_cells(edge).collect();
            assert_eq!(cells.len(), 2);
            assert!(cells.contains(&center));
            assert!(!t.is_boundary(edge));
        }
    }

    #[test]
    fn test_neighbors_share_exactly_one_edge() {
        let t = Topology::new(2);
        let origin = Hex::new(0, 0);
        let a = t.cell_at(origin).unwrap();

        for dir in 0..6 {
            let b = t.cell_at(origin.neighbor(dir)).unwrap();
            let shared = t
                .cell_edges(a)
                .iter()
                .filter(|e| t.cell_edges(b).contains(e))
                .count();
            assert_eq!(shared, 1, "direction {}", dir);
        }
    }

    #[test]
    fn test_edge_canonical() {
        let p = Point::new(1, -1);
        let q = Point::new(1, 1);
        assert_eq!(Edge::new(p, q), Edge::new(q, p));
    }

    #[test]
    fn test_edge_id_round_trip() {
        let t = Topology::new(2);
        for id in t.edges() {
            assert_eq!(t.edge_id(&t.edge(id)), Some(id));
        }

        // Lookup from a cell's own corners, in either winding
        let cell = t.cell_at(Hex::new(1, -1)).unwrap();
        let v = t.hex(cell).vertices();
        for i in 0..6 {
            let side = t.edge_id(&Edge::new(v[(i + 1) % 6], v[i])).unwrap();
            assert!(t.cell_edges(cell).contains(&side));
        }

        let far = Edge::new(Point::new(100, 0), Point::new(100, 2));
        assert_eq!(t.edge_id(&far), None);
    }

    #[test]
    fn test_hex_validity() {
        assert!(Hex::new(0, 0).is_within(1));
        assert!(Hex::new(1, -1).is_within(1));
        assert!(!Hex::new(1, 1).is_within(1)); // s = -2
        assert_eq!(Hex::new(2, -1).distance_to_center(), 2);
    }

    #[test]
    fn test_build_board_rejects_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(build_board(0, &mut rng), Err(GameError::InvalidRadius(0))));
        assert!(matches!(build_board(-3, &mut rng), Err(GameError::InvalidRadius(-3))));
    }

    #[test]
    fn test_build_board_initial_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (topology, state) = build_board(2, &mut rng).unwrap();
        assert_eq!(state.possible_moves().len(), topology.edge_count());
        assert_eq!(state.score(), [0, 0]);
        assert_eq!(state.turn(), crate::game::Player::Red);
        assert!(state.last_move().is_none());
    }
}
