#![no_std]

extern crate alloc;

use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use tile::*;
pub use types::*;

mod board;
mod engine;
mod error;
mod generator;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub height: Coord,
    pub width: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(height: Coord, width: Coord, mines: CellCount) -> Self {
        Self {
            height,
            width,
            mines,
        }
    }

    pub fn new(height: Coord, width: Coord, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(height, width, mines);
        config.validate()?;
        Ok(config)
    }

    /// Rejects empty boards and boards with no safe tile left.
    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(ConfigError::EmptyBoard.into());
        }

        let tiles = self.total_tiles();
        if self.mines >= tiles {
            return Err(ConfigError::TooManyMines {
                mines: self.mines,
                tiles,
            }
            .into());
        }

        Ok(())
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked(9, 9, 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked(16, 16, 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked(16, 30, 99)
    }

    pub const fn size(&self) -> Coord2 {
        (self.height, self.width)
    }

    pub const fn total_tiles(&self) -> CellCount {
        mult(self.height, self.width)
    }

    pub const fn safe_tiles(&self) -> CellCount {
        self.total_tiles().saturating_sub(self.mines)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(8, 8, 8)
    }
}

/// Where the mines are, independent of anything the player has done.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Builds a layout from a mask, the mask shape is the board size.
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (height, width) = mine_mask.dim();
        let height = Coord::try_from(height).map_err(|_| GameError::InvalidCoords)?;
        let width = Coord::try_from(width).map_err(|_| GameError::InvalidCoords)?;
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;

        GameConfig::new(height, width, mine_count)?;
        Ok(Self {
            mine_mask,
            mine_count,
        })
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            if mine_mask[coords.to_nd_index()] {
                log::warn!("Mine at {:?} listed more than once", coords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn game_config(&self) -> GameConfig {
        let (height, width) = self.size();
        GameConfig::new_unchecked(height, width, self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        let (height, width) = self.mine_mask.dim();
        // dimensions were checked against `Coord` on construction
        (height as Coord, width as Coord)
    }

    pub fn safe_tile_count(&self) -> CellCount {
        self.total_tiles() - self.mine_count
    }

    pub fn total_tiles(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.mine_mask[(row as usize, col as usize)]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

/// Used to merge outcomes when revealing several tiles in one move
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_empty_board() {
        assert_eq!(
            GameConfig::new(0, 5, 1),
            Err(GameError::InvalidConfiguration(ConfigError::EmptyBoard))
        );
        assert_eq!(
            GameConfig::new(5, 0, 0),
            Err(GameError::InvalidConfiguration(ConfigError::EmptyBoard))
        );
    }

    #[test]
    fn config_requires_one_safe_tile() {
        assert_eq!(
            GameConfig::new(2, 2, 4),
            Err(GameError::InvalidConfiguration(ConfigError::TooManyMines {
                mines: 4,
                tiles: 4
            }))
        );
        assert!(GameConfig::new(2, 2, 3).is_ok());
        assert!(GameConfig::new(1, 1, 0).is_ok());
    }

    #[test]
    fn presets_are_valid() {
        for config in [
            GameConfig::default(),
            GameConfig::beginner(),
            GameConfig::intermediate(),
            GameConfig::expert(),
        ] {
            assert_eq!(config.validate(), Ok(()));
        }
        assert_eq!(GameConfig::default().size(), (8, 8));
        assert_eq!(GameConfig::default().safe_tiles(), 56);
    }

    #[test]
    fn layout_counts_neighbors_in_bounds() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.safe_tile_count(), 7);
        assert_eq!(layout.adjacent_mine_count((1, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((0, 2)), 0);
        assert_eq!(layout.adjacent_mine_count((2, 1)), 1);
    }

    #[test]
    fn layout_rejects_out_of_bounds_mine() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn layout_rejects_full_board() {
        assert!(matches!(
            MineLayout::from_mine_coords((1, 2), &[(0, 0), (0, 1)]),
            Err(GameError::InvalidConfiguration(ConfigError::TooManyMines { .. }))
        ));
    }

    #[test]
    fn duplicate_mine_coords_collapse() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(1, 1), (1, 1)]).unwrap();

        assert_eq!(layout.mine_count(), 1);
    }

    #[test]
    fn hit_mine_dominates_merged_outcomes() {
        use RevealOutcome::*;

        assert_eq!(Won | HitMine, HitMine);
        assert_eq!(Revealed | Won, Won);
        assert_eq!(NoChange | Revealed, Revealed);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
