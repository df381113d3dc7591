use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Render-relevant tag for one cell.
///
/// While a game is running only `Hidden`, `Flagged` and `Revealed` occur;
/// the remaining tags appear once the game has ended and mines may be shown.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellTag {
    Hidden,
    Flagged,
    Revealed(u8),
    /// The mine that was revealed and ended the game.
    Exploded,
    /// Any other mine, shown after a loss.
    Mine,
    /// A flag that turned out to sit on a safe cell, shown after a loss.
    WrongFlag,
}

/// Read-only projection of a [`Game`] for the presentation layer.
///
/// Built fresh on every call, never a live reference into the engine: as
/// long as the game is running, no tag depends on where the mines are, so a
/// renderer (or anything else holding a snapshot) cannot peek.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: GameState,
    pub size: Coord2,
    pub total_mines: CellCount,
    pub mines_left: i64,
    cells: Array2<CellTag>,
}

impl Snapshot {
    pub fn cell_at(&self, coords: Coord2) -> CellTag {
        self.cells[coords.to_nd_index()]
    }

    /// Row-major pass over every cell tag with its coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, CellTag)> + '_ {
        CoordIter::new(self.size).map(|coords| (coords, self.cell_at(coords)))
    }
}

impl Game {
    pub fn snapshot(&self) -> Snapshot {
        let size = self.size();
        let state = self.state();
        let mut cells = Array2::from_elem(size.to_nd_index(), CellTag::Hidden);

        for coords in CoordIter::new(size) {
            cells[coords.to_nd_index()] = self.tag_at(coords);
        }

        let mines_left = match state {
            GameState::Won => 0,
            _ => self.mines_left(),
        };

        Snapshot {
            state,
            size,
            total_mines: self.total_mines(),
            mines_left,
            cells,
        }
    }

    fn tag_at(&self, coords: Coord2) -> CellTag {
        let cell = self.cell_at(coords);

        match self.state() {
            GameState::Lost => {
                if self.detonated() == Some(coords) {
                    CellTag::Exploded
                } else if self.has_mine_at(coords) {
                    CellTag::Mine
                } else {
                    match cell {
                        Cell::Hidden => CellTag::Hidden,
                        Cell::Flagged => CellTag::WrongFlag,
                        Cell::Revealed(count) => CellTag::Revealed(count),
                    }
                }
            }
            // Every safe cell is revealed on a win; leftover mines get the
            // flag treatment whether the player marked them or not.
            GameState::Won if self.has_mine_at(coords) => CellTag::Flagged,
            _ => match cell {
                Cell::Hidden => CellTag::Hidden,
                Cell::Flagged => CellTag::Flagged,
                Cell::Revealed(count) => CellTag::Revealed(count),
            },
        }
    }
}
