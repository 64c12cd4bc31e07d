use serde::{Deserialize, Serialize};

/// A single board tile as seen by the presentation layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Mines among the in-bounds neighbors, always 0 on a mine.
    pub adjacent_mine_count: u8,
    pub is_mine: bool,
    pub is_revealed: bool,
    /// Only toggled while hidden. A flood that opens a flagged safe tile clears the flag,
    /// so revealed and flagged never hold together during play.
    pub is_flagged: bool,
    /// Only the mine that ended the game.
    pub is_exploded: bool,
}

impl Tile {
    pub const fn safe(adjacent_mine_count: u8) -> Self {
        Self {
            adjacent_mine_count,
            is_mine: false,
            is_revealed: false,
            is_flagged: false,
            is_exploded: false,
        }
    }

    pub const fn mine() -> Self {
        Self {
            adjacent_mine_count: 0,
            is_mine: true,
            is_revealed: false,
            is_flagged: false,
            is_exploded: false,
        }
    }

    /// Hidden and unflagged, so a direct reveal is allowed.
    pub const fn is_closed(self) -> bool {
        !self.is_revealed && !self.is_flagged
    }

    /// Revealed safe tile with no adjacent mines, the seed of a flood.
    pub const fn is_empty_opening(self) -> bool {
        self.is_revealed && !self.is_mine && self.adjacent_mine_count == 0
    }
}
