use alloc::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    /// Game has ended and no moves can be made anymore
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Board snapshot after a reveal or chord, with what the move did.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealResult {
    pub board: Arc<Board>,
    pub status: GameStatus,
    pub outcome: RevealOutcome,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlagResult {
    pub board: Arc<Board>,
    pub outcome: MarkOutcome,
}

/// Owns one game session and hands out immutable board snapshots.
///
/// Every mutating call copies the board first if a previous snapshot is still held
/// elsewhere, so snapshots never change after they are returned.
#[derive(Clone, Debug)]
pub struct GameEngine {
    config: GameConfig,
    board: Arc<Board>,
}

impl GameEngine {
    pub fn generate(config: GameConfig, generator: impl MinefieldGenerator) -> Result<Self> {
        config.validate()?;
        let layout = generator.generate(config)?;
        log::debug!(
            "New {}x{} game with {} mines",
            config.height,
            config.width,
            layout.mine_count()
        );

        Ok(Self {
            config: layout.game_config(),
            board: Arc::new(Board::from_layout(&layout)),
        })
    }

    /// Random game whose layout is fully determined by `seed`.
    pub fn with_seed(height: Coord, width: Coord, mines: CellCount, seed: u64) -> Result<Self> {
        let config = GameConfig::new(height, width, mines)?;
        Self::generate(config, RandomMinefieldGenerator::new(seed))
    }

    /// Replaces the board with a freshly generated one of the same configuration.
    pub fn new_game(&mut self, generator: impl MinefieldGenerator) -> Result<Arc<Board>> {
        *self = Self::generate(self.config, generator)?;
        Ok(self.board())
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    pub fn can_reveal(&self, coords: Coord2) -> bool {
        self.board.can_reveal(coords)
    }

    pub fn can_chord(&self, coords: Coord2) -> bool {
        self.board.can_chord(coords)
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.board.validate_coords(coords)?;

        let outcome = if self.board.can_reveal(coords) {
            Arc::make_mut(&mut self.board).reveal(coords)
        } else {
            log::trace!("Ignoring reveal at {:?}", coords);
            RevealOutcome::NoChange
        };
        Ok(self.reveal_result(outcome))
    }

    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.board.validate_coords(coords)?;

        let outcome = if self.board.can_chord(coords) {
            Arc::make_mut(&mut self.board).chord_reveal(coords)
        } else {
            log::trace!("Ignoring chord at {:?}", coords);
            RevealOutcome::NoChange
        };
        Ok(self.reveal_result(outcome))
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagResult> {
        let coords = self.board.validate_coords(coords)?;

        let outcome = if self.board.can_toggle_flag(coords) {
            Arc::make_mut(&mut self.board).toggle_flag(coords)
        } else {
            log::trace!("Ignoring flag at {:?}", coords);
            MarkOutcome::NoChange
        };
        Ok(FlagResult {
            board: self.board(),
            outcome,
        })
    }

    fn reveal_result(&self, outcome: RevealOutcome) -> RevealResult {
        RevealResult {
            board: self.board(),
            status: self.status(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(size: Coord2, mines: &[Coord2]) -> GameEngine {
        let config = GameConfig::new_unchecked(size.0, size.1, mines.len() as CellCount);
        GameEngine::generate(config, FixedMinefieldGenerator::new(mines)).unwrap()
    }

    #[test]
    fn generate_rejects_bad_config() {
        assert_eq!(
            GameEngine::with_seed(3, 3, 9, 1).unwrap_err(),
            GameError::InvalidConfiguration(ConfigError::TooManyMines { mines: 9, tiles: 9 })
        );
        assert_eq!(
            GameEngine::with_seed(0, 3, 1, 1).unwrap_err(),
            GameError::InvalidConfiguration(ConfigError::EmptyBoard)
        );
    }

    #[test]
    fn seeded_games_are_reproducible() {
        let a = GameEngine::with_seed(9, 9, 10, 1234).unwrap();
        let b = GameEngine::with_seed(9, 9, 10, 1234).unwrap();

        assert_eq!(a.board(), b.board());
        assert_eq!(a.status(), GameStatus::InProgress);
    }

    #[test]
    fn reveal_hits_mine_and_ends_game() {
        let mut engine = engine((2, 2), &[(0, 0), (1, 1)]);

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::HitMine);
        assert_eq!(result.status, GameStatus::Lost);
        assert!(result.board[(0, 0)].is_exploded);
        assert!(result.board[(1, 1)].is_revealed);
        assert!(!result.board[(1, 1)].is_exploded);

        let after = engine.reveal((0, 1)).unwrap();
        assert_eq!(after.outcome, RevealOutcome::NoChange);
        assert!(Arc::ptr_eq(&after.board, &result.board));
    }

    #[test]
    fn snapshots_are_not_changed_by_later_moves() {
        let mut engine = engine((3, 3), &[(1, 1)]);
        let before = engine.board();

        let result = engine.reveal((0, 0)).unwrap();

        assert!(!before[(0, 0)].is_revealed);
        assert!(result.board[(0, 0)].is_revealed);

        let flagged = engine.toggle_flag((2, 2)).unwrap();
        assert!(!result.board[(2, 2)].is_flagged);
        assert!(flagged.board[(2, 2)].is_flagged);
    }

    #[test]
    fn noop_does_not_copy_board() {
        let mut engine = engine((3, 3), &[(1, 1)]);
        let first = engine.reveal((0, 0)).unwrap();

        let again = engine.reveal((0, 0)).unwrap();

        assert_eq!(again.outcome, RevealOutcome::NoChange);
        assert!(Arc::ptr_eq(&first.board, &again.board));
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        assert_eq!(engine.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.chord_reveal((0, 2)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((9, 9)), Err(GameError::InvalidCoords));
        assert_eq!(engine.board().hidden_count(), 4);
    }

    #[test]
    fn flag_toggles_and_blocks_reveal() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        let flagged = engine.toggle_flag((1, 1)).unwrap();
        assert_eq!(flagged.outcome, MarkOutcome::Changed);
        assert!(!engine.can_reveal((1, 1)));
        assert_eq!(engine.reveal((1, 1)).unwrap().outcome, RevealOutcome::NoChange);

        let unflagged = engine.toggle_flag((1, 1)).unwrap();
        assert!(!unflagged.board[(1, 1)].is_flagged);
        assert!(engine.can_reveal((1, 1)));
    }

    #[test]
    fn chord_reveal_uses_flagged_neighbors() {
        let mut engine = engine((3, 3), &[(0, 1), (2, 1)]);

        engine.reveal((1, 1)).unwrap();
        assert!(!engine.can_chord((1, 1)));
        engine.toggle_flag((0, 1)).unwrap();
        engine.toggle_flag((2, 1)).unwrap();
        assert!(engine.can_chord((1, 1)));

        let result = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.status, GameStatus::Won);
        assert_eq!(engine.status(), GameStatus::Won);
    }

    #[test]
    fn new_game_replaces_finished_board() {
        let mut engine = engine((1, 2), &[(0, 1)]);
        engine.reveal((0, 0)).unwrap();
        let finished = engine.board();
        assert_eq!(finished.status(), GameStatus::Won);

        let fresh = engine
            .new_game(FixedMinefieldGenerator::new([(0, 0)]))
            .unwrap();

        assert_eq!(fresh.status(), GameStatus::InProgress);
        assert_eq!(fresh.hidden_count(), 2);
        assert!(fresh[(0, 0)].is_mine);
        assert_eq!(finished.status(), GameStatus::Won);
        assert_eq!(engine.config(), GameConfig::new_unchecked(1, 2, 1));
    }

    #[test]
    fn board_snapshot_serializes() {
        let mut engine = engine((2, 3), &[(0, 0)]);
        engine.reveal((1, 2)).unwrap();

        let json = serde_json::to_string(engine.board().as_ref()).unwrap();
        let board: Board = serde_json::from_str(&json).unwrap();

        assert_eq!(&board, engine.board().as_ref());
    }
}
