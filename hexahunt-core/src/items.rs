//! Treasure and artifact catalog, plus random placement at build time

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Share of cells that hide a treasure
pub const TREASURE_SHARE: (usize, usize) = (6, 10);

/// Share of cells that hide an artifact
pub const ARTIFACT_SHARE: (usize, usize) = (1, 10);

/// Treasure kinds with fixed point values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Treasure {
    Copper,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl Treasure {
    pub const ALL: [Treasure; 5] = [
        Treasure::Copper,
        Treasure::Silver,
        Treasure::Gold,
        Treasure::Platinum,
        Treasure::Diamond,
    ];

    pub const fn value(self) -> i32 {
        match self {
            Treasure::Copper => 1,
            Treasure::Silver => 3,
            Treasure::Gold => 5,
            Treasure::Platinum => 8,
            Treasure::Diamond => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Treasure::Copper => "copper",
            Treasure::Silver => "silver",
            Treasure::Gold => "gold",
            Treasure::Platinum => "platinum",
            Treasure::Diamond => "diamond",
        }
    }
}

/// One-shot pickups with a lasting ability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Artifact {
    /// Banks one bonus turn
    Hourglass,
    /// Steals the opponent's latest treasure gain, expires if unused
    Gauntlet,
    /// Swaps ownership of its own cell with an opponent cell
    Compass,
}

impl Artifact {
    pub const ALL: [Artifact; 3] = [Artifact::Hourglass, Artifact::Gauntlet, Artifact::Compass];

    pub const fn name(self) -> &'static str {
        match self {
            Artifact::Hourglass => "hourglass",
            Artifact::Gauntlet => "gauntlet",
            Artifact::Compass => "compass",
        }
    }
}

/// What a cell hides. A cell carries at most one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    Treasure(Treasure),
    Artifact(Artifact),
}

impl Item {
    /// Points this item is worth on its own (artifacts score nothing directly)
    pub const fn value(self) -> i32 {
        match self {
            Item::Treasure(t) => t.value(),
            Item::Artifact(_) => 0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Item::Treasure(t) => t.name(),
            Item::Artifact(a) => a.name(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Treasure value of an optional cell content
pub fn treasure_value(content: Option<Item>) -> i32 {
    match content {
        Some(Item::Treasure(t)) => t.value(),
        _ => 0,
    }
}

/// Assign items to a shuffled subset of `cell_count` cells.
///
/// The first 60% of the shuffled cells (rounded down) get a uniformly random
/// treasure, the next 10% a uniformly random artifact, the rest nothing.
pub fn place_items<R: Rng>(cell_count: usize, rng: &mut R) -> Vec<Option<Item>> {
    let mut order: Vec<usize> = (0..cell_count).collect();
    order.shuffle(rng);

    let treasure_count = cell_count * TREASURE_SHARE.0 / TREASURE_SHARE.1;
    let artifact_count = cell_count * ARTIFACT_SHARE.0 / ARTIFACT_SHARE.1;

    let mut contents = vec![None; cell_count];
    for &cell in &order[..treasure_count] {
        let kind = Treasure::ALL[rng.gen_range(0..Treasure::ALL.len())];
        contents[cell] = Some(Item::Treasure(kind));
    }
    for &cell in &order[treasure_count..treasure_count + artifact_count] {
        let kind = Artifact::ALL[rng.gen_range(0..Artifact::ALL.len())];
        contents[cell] = Some(Item::Artifact(kind));
    }

    contents
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_treasure_values() {
        let values: Vec<_> = Treasure::ALL.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec![1, 3, 5, 8, 8]);
        assert_eq!(Item::Artifact(Artifact::Compass).value(), 0);
    }

    #[test]
    fn test_place_items_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // Radius 2 board: 19 cells -> 11 treasures, 1 artifact
        let contents = place_items(19, &mut rng);
        let treasures = contents.iter().filter(|c| matches!(c, Some(Item::Treasure(_)))).count();
        let artifacts = contents.iter().filter(|c| matches!(c, Some(Item::Artifact(_)))).count();
        assert_eq!(treasures, 11);
        assert_eq!(artifacts, 1);
        assert_eq!(contents.iter().filter(|c| c.is_none()).count(), 7);
    }

    #[test]
    fn test_place_items_deterministic() {
        let a = place_items(37, &mut ChaCha8Rng::seed_from_u64(11));
        let b = place_items(37, &mut ChaCha8Rng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_small_board_has_no_artifacts() {
        let contents = place_items(7, &mut ChaCha8Rng::seed_from_u64(5));
        assert!(contents.iter().all(|c| !matches!(c, Some(Item::Artifact(_)))));
    }
}
