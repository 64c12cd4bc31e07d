use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Uniform placement by rejection sampling over every tile of the board.
#[derive(Clone, Debug)]
pub struct RandomMinefieldGenerator<R = SmallRng> {
    rng: R,
}

impl RandomMinefieldGenerator<SmallRng> {
    /// Same seed and config always give the same layout.
    pub fn new(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomMinefieldGenerator<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> MinefieldGenerator for RandomMinefieldGenerator<R> {
    fn generate(mut self, config: GameConfig) -> Result<MineLayout> {
        config.validate()?;

        let total_tiles = config.total_tiles();
        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        let mut mines_placed: CellCount = 0;
        let mut draws: u64 = 0;

        // terminates because validation leaves at least one safe tile
        while mines_placed < config.mines {
            let index: CellCount = self.rng.random_range(0..total_tiles);
            let coords = linear_index_to_coords(index, config.width);
            draws += 1;

            let tile = &mut mine_mask[coords.to_nd_index()];
            if !*tile {
                *tile = true;
                mines_placed += 1;
            }
        }

        log::debug!(
            "Placed {} mines on {}x{} board in {} draws",
            mines_placed,
            config.height,
            config.width,
            draws
        );
        MineLayout::from_mine_mask(mine_mask)
    }
}
