//! Match configuration

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Difficulty label for a search depth
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Custom,
}

impl Difficulty {
    pub fn from_depth(depth: i32) -> Self {
        match depth {
            2 => Difficulty::Easy,
            3 => Difficulty::Medium,
            4 => Difficulty::Hard,
            _ => Difficulty::Custom,
        }
    }

    pub fn depth(self) -> Option<i32> {
        match self {
            Difficulty::Easy => Some(2),
            Difficulty::Medium => Some(3),
            Difficulty::Hard => Some(4),
            Difficulty::Custom => None,
        }
    }
}

/// Board size and AI strength for one match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Hex-disk radius, at least 1
    pub radius: i32,
    /// AI search depth in plies, at least 0
    pub depth: i32,
    /// Seed for item placement; `None` draws from entropy
    pub seed: Option<u64>,
    /// Flush the AI's transposition table beyond this many entries
    pub table_capacity: Option<usize>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            depth: 3,
            seed: None,
            table_capacity: None,
        }
    }
}

impl MatchConfig {
    /// Radii that stay playable and searchable in interactive use
    pub const RADIUS_RANGE: RangeInclusive<i32> = 1..=4;
    /// Depths that keep interactive AI turns responsive
    pub const DEPTH_RANGE: RangeInclusive<i32> = 2..=4;

    pub fn new(radius: i32, depth: i32) -> Self {
        Self {
            radius,
            depth,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        if let Some(depth) = difficulty.depth() {
            self.depth = depth;
        }
        self
    }

    pub fn with_table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = Some(capacity);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_depth(self.depth)
    }

    /// Reject settings no match can be built from
    pub fn validate(&self) -> Result<()> {
        if self.radius < 1 {
            return Err(GameError::InvalidRadius(self.radius));
        }
        if self.depth < 0 {
            return Err(GameError::InvalidDepth(self.depth));
        }
        Ok(())
    }

    /// Valid, but outside the recommended interactive ranges
    pub fn is_unusual(&self) -> bool {
        !Self::RADIUS_RANGE.contains(&self.radius) || !Self::DEPTH_RANGE.contains(&self.depth)
    }

    /// Load and validate from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MatchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
