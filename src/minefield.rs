use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Ground truth of one game: which cells hold mines, plus the per-cell
/// adjacent-mine counts derived from the mask.
///
/// Both the mask and the counts are fixed at construction and never mutate
/// afterwards; the grid shape is likewise fixed for the lifetime of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    mines: Array2<bool>,
    counts: Array2<u8>,
    mine_count: CellCount,
}

impl Minefield {
    pub fn from_mine_mask(mines: Array2<bool>) -> Self {
        let mine_count = mines
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap();

        let dim = mines.dim();
        let bounds: Coord2 = (dim.0.try_into().unwrap(), dim.1.try_into().unwrap());
        let mut counts: Array2<u8> = Array2::default(dim);
        for coords in CoordIter::new(bounds) {
            counts[coords.to_nd_index()] = NeighborIter::new(coords, bounds)
                .filter(|&pos| mines[pos.to_nd_index()])
                .count()
                .try_into()
                .unwrap();
        }

        Self {
            mines,
            counts,
            mine_count,
        }
    }

    /// Builds a minefield with an explicit mine list, mainly for fixtures.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mines[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mines))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
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
        let dim = self.mines.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len().try_into().unwrap()
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.counts[coords.to_nd_index()]
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// Row-major pass over every coordinate of the grid.
    pub fn iter_cells(&self) -> CoordIter {
        CoordIter::new(self.size())
    }
}

impl Index<Coord2> for Minefield {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mines[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_mine_coords_rejects_out_of_bounds() {
        let result = Minefield::from_mine_coords((3, 3), &[(3, 0)]);
        assert_eq!(result, Err(GameError::InvalidCoords));
    }

    #[test]
    fn counts_match_mined_neighbors_for_every_cell() {
        let field = Minefield::from_mine_coords((4, 3), &[(0, 0), (1, 1), (3, 2)]).unwrap();

        for coords in field.iter_cells() {
            let expected: u8 = field
                .iter_neighbors(coords)
                .filter(|&pos| field.contains_mine(pos))
                .count()
                .try_into()
                .unwrap();
            assert_eq!(field.adjacent_mine_count(coords), expected, "at {coords:?}");
        }
    }

    #[test]
    fn center_mine_gives_all_neighbors_count_one() {
        let field = Minefield::from_mine_coords((3, 3), &[(1, 1)]).unwrap();

        assert_eq!(field.adjacent_mine_count((1, 1)), 0);
        for pos in field.iter_neighbors((1, 1)) {
            assert_eq!(field.adjacent_mine_count(pos), 1);
        }
    }

    #[test]
    fn mine_count_and_safe_count_partition_the_board() {
        let field = Minefield::from_mine_coords((5, 4), &[(0, 0), (4, 3)]).unwrap();

        assert_eq!(field.mine_count(), 2);
        assert_eq!(field.safe_cell_count(), 18);
        assert_eq!(field.total_cells(), 20);
    }

    #[test]
    fn iter_cells_visits_whole_board_in_row_major_order() {
        let field = Minefield::from_mine_coords((2, 2), &[]).unwrap();
        let coords: Vec<_> = field.iter_cells().collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn validate_coords_bounds() {
        let field = Minefield::from_mine_coords((3, 2), &[(0, 0)]).unwrap();
        assert_eq!(field.validate_coords((2, 1)), Ok((2, 1)));
        assert_eq!(field.validate_coords((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(field.validate_coords((0, 2)), Err(GameError::InvalidCoords));
    }
}
