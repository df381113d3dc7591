use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - NotStarted -> Won
/// - NotStarted -> Lost
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and no moves are accepted anymore.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Exploded,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Exploded => true,
            Won => true,
        }
    }
}

/// Represents a game from start to finish.
///
/// Mines are placed lazily on the first reveal so the starting cell can be
/// excluded from placement; until then `minefield` is empty and every cell is
/// hidden. All methods take `&mut self` and run to completion, flood fill
/// included; callers that drive the engine from several threads must
/// serialize access themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    seed: u64,
    minefield: Option<Minefield>,
    grid: Array2<Cell>,
    revealed_count: CellCount,
    flag_count: CellCount,
    state: GameState,
    detonated: Option<Coord2>,
}

impl Game {
    /// Starts a first-click-safe game: the minefield is generated on the
    /// first reveal, with the revealed cell excluded from placement.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            seed,
            minefield: None,
            grid: Array2::default(config.size.to_nd_index()),
            revealed_count: 0,
            flag_count: 0,
            state: Default::default(),
            detonated: None,
        })
    }

    /// Starts a game over an already-placed minefield, used for reproducible
    /// fixtures and for boards built from explicit mine lists.
    pub fn from_minefield(minefield: Minefield) -> Self {
        let config = minefield.game_config();
        Self {
            config,
            seed: 0,
            minefield: Some(minefield),
            grid: Array2::default(config.size.to_nd_index()),
            revealed_count: 0,
            flag_count: 0,
            state: Default::default(),
            detonated: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// How many mines have not been flagged yet; negative when over-flagged.
    pub fn mines_left(&self) -> i64 {
        i64::from(self.config.mines) - i64::from(self.flag_count)
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.grid[coords.to_nd_index()]
    }

    /// The mine that ended the game, if it ended in a loss.
    pub fn detonated(&self) -> Option<Coord2> {
        self.detonated
    }

    pub(crate) fn has_mine_at(&self, coords: Coord2) -> bool {
        self.minefield
            .as_ref()
            .is_some_and(|field| field.contains_mine(coords))
    }

    /// Reveals a hidden cell.
    ///
    /// No-op once the game is finished and on flagged or already-revealed
    /// cells; repeated reveals of the same cell never change state again.
    /// Out-of-bounds coordinates are an error, not a no-op.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.state.is_finished() || !matches!(self.cell_at(coords), Cell::Hidden) {
            return Ok(RevealOutcome::NoChange);
        }

        self.place_mines_if_needed(coords)?;
        self.mark_started();
        Ok(self.reveal_hidden_cell(coords))
    }

    /// Toggles a cell between hidden and flagged.
    ///
    /// No-op once the game is finished and on revealed cells. The flag count
    /// is advisory and never clamped; over-flagging is allowed. Flagging is
    /// permitted before the first reveal.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        use FlagOutcome::*;

        let coords = self.validate_coords(coords)?;

        if self.state.is_finished() {
            return Ok(NoChange);
        }

        Ok(match self.grid[coords.to_nd_index()] {
            Cell::Hidden => {
                self.grid[coords.to_nd_index()] = Cell::Flagged;
                self.flag_count += 1;
                Changed
            }
            Cell::Flagged => {
                self.grid[coords.to_nd_index()] = Cell::Hidden;
                self.flag_count -= 1;
                Changed
            }
            Cell::Revealed(_) => NoChange,
        })
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.config.size.0 && coords.1 < self.config.size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Generates the minefield on the first reveal, keeping the start cell
    /// and, when the board has room, its whole neighborhood mine-free.
    fn place_mines_if_needed(&mut self, start: Coord2) -> Result<()> {
        if self.minefield.is_some() {
            return Ok(());
        }

        let safe_start = if self.config.mines + 9 <= self.config.total_cells() {
            SafeStart::SafeZone
        } else {
            log::warn!("Not enough room for a safe zone, only the start cell is kept clear");
            SafeStart::SafeCell
        };

        // Config validation bounds mines below the total cell count, so a
        // single-cell exclusion always fits and this cannot fail mid-game.
        let field = RandomGenerator::new(self.seed, start, safe_start).generate(self.config)?;
        self.minefield = Some(field);
        Ok(())
    }

    fn reveal_hidden_cell(&mut self, coords: Coord2) -> RevealOutcome {
        let Some(field) = self.minefield.take() else {
            return RevealOutcome::NoChange;
        };
        let outcome = self.reveal_in_field(&field, coords);
        self.minefield = Some(field);
        outcome
    }

    fn reveal_in_field(&mut self, field: &Minefield, coords: Coord2) -> RevealOutcome {
        if field.contains_mine(coords) {
            self.detonated = Some(coords);
            self.end_game(false);
            return RevealOutcome::Exploded;
        }

        let count = field.adjacent_mine_count(coords);
        self.grid[coords.to_nd_index()] = Cell::Revealed(count);
        self.revealed_count += 1;
        log::debug!("Revealed cell at {:?}, adjacent mines: {}", coords, count);

        if count == 0 {
            self.flood_fill(field, coords);
        }

        if self.revealed_count == field.safe_cell_count() {
            self.end_game(true);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Opens the connected zero region around `origin` with an explicit work
    /// list; each cell is revealed at most once, so the pass is bounded by
    /// the board size. Flagged cells are skipped and left untouched.
    fn flood_fill(&mut self, field: &Minefield, origin: Coord2) {
        let mut to_visit: VecDeque<Coord2> = field.iter_neighbors(origin).collect();
        log::trace!("Starting flood fill from {:?}", origin);

        while let Some(visit) = to_visit.pop_front() {
            // Skips flagged and revealed cells, and queue duplicates.
            if !matches!(self.grid[visit.to_nd_index()], Cell::Hidden) {
                continue;
            }

            // Neighbors of a zero cell are never mines.
            let count = field.adjacent_mine_count(visit);
            self.grid[visit.to_nd_index()] = Cell::Revealed(count);
            self.revealed_count += 1;
            log::trace!("Flood fill revealed {:?}, adjacent mines: {}", visit, count);

            if count == 0 {
                to_visit.extend(
                    field
                        .iter_neighbors(visit)
                        .filter(|&pos| matches!(self.grid[pos.to_nd_index()], Cell::Hidden)),
                );
            }
        }
    }

    fn mark_started(&mut self) {
        if self.state.is_initial() {
            self.state = GameState::InProgress;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won {
            GameState::Won
        } else {
            GameState::Lost
        };
        if won {
            self.detonated = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(size: Coord2, mines: &[Coord2]) -> Game {
        Game::from_minefield(Minefield::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn new_game_validates_config() {
        assert_eq!(
            Game::new(GameConfig::new_unchecked((0, 5), 1), 0),
            Err(GameError::InvalidSize)
        );
        assert_eq!(
            Game::new(GameConfig::new_unchecked((1, 1), 0), 0),
            Err(GameError::InvalidMineCount)
        );
    }

    #[test]
    fn reveal_hits_mine_and_records_detonated_cell() {
        let mut game = game((2, 2), &[(0, 0)]);

        let outcome = game.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Exploded);
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.detonated(), Some((0, 0)));
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut game = game((4, 4), &[(3, 3)]);

        let outcome = game.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(game.cell_at((0, 0)), Cell::Revealed(0));
        assert_eq!(game.cell_at((2, 2)), Cell::Revealed(1));
        assert_eq!(game.cell_at((3, 3)), Cell::Hidden);
    }

    #[test]
    fn flood_fill_stops_at_numbered_frontier() {
        // Mine in the top-right corner; revealing the opposite corner floods
        // the zero region but leaves the mine hidden behind its numbered ring.
        let mut game = game((5, 5), &[(4, 0)]);

        game.reveal((0, 4)).unwrap();

        assert_eq!(game.cell_at((3, 0)), Cell::Revealed(1));
        assert_eq!(game.cell_at((3, 1)), Cell::Revealed(1));
        assert_eq!(game.cell_at((4, 0)), Cell::Hidden);
        assert_eq!(game.state(), GameState::Won);
    }

    #[test]
    fn second_reveal_of_same_cell_is_a_no_op() {
        let mut game = game((3, 3), &[(0, 0), (2, 2)]);

        assert_eq!(game.reveal((2, 0)).unwrap(), RevealOutcome::Revealed);
        let before = game.clone();
        let outcome = game.reveal((2, 0)).unwrap();
        assert_eq!(outcome, RevealOutcome::NoChange);
        assert!(!outcome.has_update());
        assert_eq!(game, before);
    }

    #[test]
    fn flag_blocks_reveal_and_flood_fill() {
        let mut game = game((4, 4), &[(3, 3)]);

        game.toggle_flag((0, 1)).unwrap();
        assert_eq!(game.reveal((0, 1)).unwrap(), RevealOutcome::NoChange);

        game.reveal((0, 0)).unwrap();

        assert_eq!(game.cell_at((0, 1)), Cell::Flagged);
        assert_eq!(game.state(), GameState::InProgress);
    }

    #[test]
    fn flag_toggle_round_trip_restores_count() {
        let mut game = game((3, 3), &[(1, 1)]);
        assert_eq!(game.mines_left(), 1);

        let outcome = game.toggle_flag((0, 0)).unwrap();
        assert_eq!(outcome, FlagOutcome::Changed);
        assert!(outcome.has_update());
        assert_eq!(game.mines_left(), 0);
        assert_eq!(game.cell_at((0, 0)), Cell::Flagged);

        assert_eq!(game.toggle_flag((0, 0)).unwrap(), FlagOutcome::Changed);
        assert_eq!(game.mines_left(), 1);
        assert_eq!(game.cell_at((0, 0)), Cell::Hidden);
    }

    #[test]
    fn over_flagging_goes_negative_without_clamping() {
        let mut game = game((3, 3), &[(1, 1)]);

        game.toggle_flag((0, 0)).unwrap();
        game.toggle_flag((2, 0)).unwrap();

        assert_eq!(game.mines_left(), -1);
    }

    #[test]
    fn winning_on_last_safe_cell() {
        let mut game = game((2, 1), &[(0, 0)]);

        assert_eq!(game.reveal((1, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(game.state(), GameState::Won);
        assert!(game.is_finished());
    }

    #[test]
    fn single_safe_cell_board_wins_in_one_reveal() {
        let mines = [
            (0, 0),
            (1, 0),
            (2, 0),
            (0, 1),
            (2, 1),
            (0, 2),
            (1, 2),
            (2, 2),
        ];
        let mut game = game((3, 3), &mines);

        assert_eq!(game.reveal((1, 1)).unwrap(), RevealOutcome::Won);
        assert_eq!(game.cell_at((1, 1)), Cell::Revealed(8));
    }

    #[test]
    fn finished_game_accepts_no_further_moves() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.reveal((0, 0)).unwrap();
        let frozen = game.clone();

        assert_eq!(game.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(game.toggle_flag((1, 1)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(game, frozen);
    }

    #[test]
    fn win_clears_detonated_marker() {
        let mut game = game((2, 1), &[(0, 0)]);
        game.reveal((1, 0)).unwrap();
        assert_eq!(game.detonated(), None);
    }

    #[test]
    fn out_of_bounds_moves_are_errors() {
        let mut game = game((3, 3), &[(1, 1)]);
        assert_eq!(game.reveal((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.toggle_flag((0, 7)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn first_reveal_is_never_a_mine() {
        let config = GameConfig::new((8, 8), 10).unwrap();

        for seed in 0..24 {
            let mut game = Game::new(config, seed).unwrap();
            let outcome = game.reveal((0, 0)).unwrap();
            assert_ne!(outcome, RevealOutcome::Exploded, "seed {seed}");
            assert_ne!(game.state(), GameState::Lost, "seed {seed}");
        }
    }

    #[test]
    fn first_reveal_on_seed_42_opens_a_zero_zone() {
        let config = GameConfig::new((8, 8), 10).unwrap();
        let mut game = Game::new(config, 42).unwrap();

        game.reveal((0, 0)).unwrap();

        assert_eq!(game.cell_at((0, 0)), Cell::Revealed(0));
        assert!(!game.has_mine_at((0, 0)));
        assert!(!game.has_mine_at((1, 0)));
        assert!(!game.has_mine_at((0, 1)));
        assert!(!game.has_mine_at((1, 1)));
    }

    #[test]
    fn tight_board_degrades_to_safe_cell_start() {
        // 2x2 with 3 mines cannot host a safe zone; the start cell alone is
        // excluded and the first reveal still never explodes.
        let config = GameConfig::new_unchecked((2, 2), 3);
        for seed in 0..8 {
            let mut game = Game::new(config, seed).unwrap();
            assert_ne!(
                game.reveal((1, 1)).unwrap(),
                RevealOutcome::Exploded,
                "seed {seed}"
            );
        }
    }

    #[test]
    fn flagging_before_first_reveal_is_allowed() {
        let config = GameConfig::new((4, 4), 2).unwrap();
        let mut game = Game::new(config, 5).unwrap();

        assert_eq!(game.toggle_flag((1, 1)).unwrap(), FlagOutcome::Changed);
        assert_eq!(game.state(), GameState::NotStarted);
        assert_eq!(game.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
    }
}
