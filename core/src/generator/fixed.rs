use alloc::vec::Vec;

use super::*;

/// Places mines at exactly the given coordinates, for scripted games and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMinefieldGenerator {
    mines: Vec<Coord2>,
}

impl FixedMinefieldGenerator {
    pub fn new(mines: impl Into<Vec<Coord2>>) -> Self {
        Self {
            mines: mines.into(),
        }
    }
}

impl MinefieldGenerator for FixedMinefieldGenerator {
    /// The mine count of `config` is ignored, the listed coordinates decide it.
    fn generate(self, config: GameConfig) -> Result<MineLayout> {
        let layout = MineLayout::from_mine_coords(config.size(), &self.mines)?;
        if layout.mine_count() != config.mines {
            log::debug!(
                "Fixed layout has {} mines, config asked for {}",
                layout.mine_count(),
                config.mines
            );
        }
        Ok(layout)
    }
}
