use alloc::collections::VecDeque;
use core::ops::{BitOr, Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Full player-visible state of one game: tiles, counters and status.
///
/// Mutation goes through [`GameEngine`], which hands out snapshots of this type behind an
/// `Arc` and copies on write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    tiles: Array2<Tile>,
    mine_count: CellCount,
    hidden_count: CellCount,
    flag_count: CellCount,
    status: GameStatus,
    exploded_tile: Option<Coord2>,
}

impl Board {
    /// Places mines with `generator` and builds a fresh, in-progress board.
    pub fn generate(config: GameConfig, generator: impl MinefieldGenerator) -> Result<Self> {
        config.validate()?;
        let layout = generator.generate(config)?;
        Ok(Self::from_layout(&layout))
    }

    pub fn from_layout(layout: &MineLayout) -> Self {
        let size = layout.size();
        let tiles = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            let coords = (row as Coord, col as Coord);
            if layout.contains_mine(coords) {
                Tile::mine()
            } else {
                Tile::safe(layout.adjacent_mine_count(coords))
            }
        });

        Self {
            tiles,
            mine_count: layout.mine_count(),
            hidden_count: layout.total_tiles(),
            flag_count: 0,
            status: GameStatus::InProgress,
            exploded_tile: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn size(&self) -> Coord2 {
        let (height, width) = self.tiles.dim();
        (height as Coord, width as Coord)
    }

    pub fn height(&self) -> Coord {
        self.size().0
    }

    pub fn width(&self) -> Coord {
        self.size().1
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    /// Tiles not revealed yet, flagged ones included.
    pub fn hidden_count(&self) -> CellCount {
        self.hidden_count
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    /// How many mines have not been flagged yet, negative when over-flagged
    pub fn mines_left(&self) -> isize {
        (self.mine_count as isize) - (self.flag_count as isize)
    }

    pub fn exploded_tile(&self) -> Option<Coord2> {
        self.exploded_tile
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn tile_at(&self, coords: Coord2) -> Option<Tile> {
        self.tiles.get(coords.to_nd_index()).copied()
    }

    /// Row-major iteration over every tile with its coordinates.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (Coord2, Tile)> + '_ {
        self.tiles
            .indexed_iter()
            .map(|((row, col), &tile)| ((row as Coord, col as Coord), tile))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    pub fn can_reveal(&self, coords: Coord2) -> bool {
        !self.is_finished() && self.tile_at(coords).is_some_and(Tile::is_closed)
    }

    pub fn can_toggle_flag(&self, coords: Coord2) -> bool {
        !self.is_finished() && self.tile_at(coords).is_some_and(|tile| !tile.is_revealed)
    }

    /// Revealed tile with at least as many flagged neighbors as adjacent mines.
    pub fn can_chord(&self, coords: Coord2) -> bool {
        if self.is_finished() {
            return false;
        }

        match self.tile_at(coords) {
            Some(tile) if tile.is_revealed => {
                self.count_flagged_neighbors(coords) >= tile.adjacent_mine_count
            }
            _ => false,
        }
    }

    pub(crate) fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.can_reveal(coords) {
            log::trace!("Ignoring reveal at {:?}", coords);
            return RevealOutcome::NoChange;
        }

        if self[coords].is_mine {
            self.explode(coords);
            self.end_game(GameStatus::Lost);
            return RevealOutcome::HitMine;
        }

        self.reveal_safe(coords);
        self.check_won()
    }

    pub(crate) fn chord_reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.can_chord(coords) {
            log::trace!("Ignoring chord at {:?}", coords);
            return RevealOutcome::NoChange;
        }

        let outcome = self
            .iter_neighbors(coords)
            .map(|pos| self.chord_neighbor(pos))
            .fold(RevealOutcome::NoChange, BitOr::bitor);

        match outcome {
            RevealOutcome::HitMine => {
                self.end_game(GameStatus::Lost);
                RevealOutcome::HitMine
            }
            RevealOutcome::NoChange => RevealOutcome::NoChange,
            _ => self.check_won(),
        }
    }

    /// Opens one neighbor during a chord.
    ///
    /// Once a mine went off in this chord the remaining neighbors are only uncovered: no
    /// flood and no second exploded mine.
    fn chord_neighbor(&mut self, pos: Coord2) -> RevealOutcome {
        let tile = self[pos];
        if tile.is_flagged || tile.is_revealed {
            return RevealOutcome::NoChange;
        }

        if self.exploded_tile.is_some() {
            self.mark_revealed(pos);
            return if tile.is_mine {
                RevealOutcome::HitMine
            } else {
                RevealOutcome::Revealed
            };
        }

        if tile.is_mine {
            self.explode(pos);
            RevealOutcome::HitMine
        } else {
            self.reveal_safe(pos);
            RevealOutcome::Revealed
        }
    }

    pub(crate) fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        if !self.can_toggle_flag(coords) {
            log::trace!("Ignoring flag at {:?}", coords);
            return MarkOutcome::NoChange;
        }

        let tile = &mut self[coords];
        tile.is_flagged = !tile.is_flagged;
        if tile.is_flagged {
            self.flag_count += 1;
        } else {
            self.flag_count -= 1;
        }
        MarkOutcome::Changed
    }

    /// Reveals a safe tile and flood-fills from it when it has no adjacent mines.
    fn reveal_safe(&mut self, coords: Coord2) {
        self.mark_revealed(coords);
        if self[coords].adjacent_mine_count != 0 {
            return;
        }

        let mut to_visit = VecDeque::from([coords]);
        log::trace!("Starting flood-fill from {:?}", coords);

        while let Some(visit_coords) = to_visit.pop_front() {
            for pos in self.iter_neighbors(visit_coords) {
                let tile = self[pos];
                // flags do not stop the flood, mines are never part of it
                if tile.is_revealed || tile.is_mine {
                    continue;
                }

                self.mark_revealed(pos);
                log::trace!(
                    "Flood revealed tile at {:?}, mine count: {}",
                    pos,
                    tile.adjacent_mine_count
                );

                if self[pos].is_empty_opening() {
                    to_visit.push_back(pos);
                }
            }
        }
    }

    fn mark_revealed(&mut self, coords: Coord2) {
        let tile = &mut self[coords];
        if tile.is_revealed {
            return;
        }

        tile.is_revealed = true;
        if tile.is_flagged {
            tile.is_flagged = false;
            self.flag_count -= 1;
        }
        self.hidden_count -= 1;
    }

    fn explode(&mut self, coords: Coord2) {
        self.mark_revealed(coords);
        self[coords].is_exploded = true;
        self.exploded_tile = Some(coords);
        log::debug!("Mine exploded at {:?}", coords);
    }

    fn check_won(&mut self) -> RevealOutcome {
        if self.hidden_count == self.mine_count {
            self.end_game(GameStatus::Won);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    fn end_game(&mut self, status: GameStatus) {
        if self.status.is_terminal() {
            return;
        }

        self.status = status;
        log::debug!("Game ended: {:?}", status);
        self.reveal_mines();
    }

    /// Shows the whole mine layout once the game is over.
    fn reveal_mines(&mut self) {
        let mut revealed = 0;
        for tile in self.tiles.iter_mut().filter(|tile| tile.is_mine && !tile.is_revealed) {
            tile.is_revealed = true;
            revealed += 1;
        }
        self.hidden_count -= revealed;
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self[pos].is_flagged)
            .count() as u8
    }
}

impl Index<Coord2> for Board {
    type Output = Tile;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.tiles[(row as usize, col as usize)]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, (row, col): Coord2) -> &mut Self::Output {
        &mut self.tiles[(row as usize, col as usize)]
    }
}
