use ndarray::Array2;
use rand::prelude::*;

use crate::*;

pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> Result<Minefield>;
}

/// How much of the board around the starting cell is kept mine-free.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SafeStart {
    /// No exclusion; the first reveal may hit a mine.
    Anywhere,
    /// The starting cell itself never holds a mine.
    SafeCell,
    /// Neither the starting cell nor any of its neighbors holds a mine, so
    /// the first reveal always opens a zero and cascades.
    SafeZone,
}

/// Uniform random placement from an explicit seed.
///
/// Every free position is equally likely to receive a mine; positions are
/// drawn without replacement. The same seed, start, and policy always produce
/// the same minefield, which is what test fixtures rely on.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomGenerator {
    seed: u64,
    start: Coord2,
    safe_start: SafeStart,
}

impl RandomGenerator {
    pub fn new(seed: u64, start: Coord2, safe_start: SafeStart) -> Self {
        Self {
            seed,
            start,
            safe_start,
        }
    }
}

impl MinefieldGenerator for RandomGenerator {
    fn generate(self, config: GameConfig) -> Result<Minefield> {
        let (size_x, size_y) = config.size;
        let mines_wanted: usize = config.mines.try_into().unwrap();

        let mut excluded: Array2<bool> = Array2::default(config.size.to_nd_index());
        match self.safe_start {
            SafeStart::Anywhere => {}
            SafeStart::SafeCell | SafeStart::SafeZone => {
                if self.start.0 >= size_x || self.start.1 >= size_y {
                    return Err(GameError::InvalidCoords);
                }
                excluded[self.start.to_nd_index()] = true;
                if self.safe_start == SafeStart::SafeZone {
                    for pos in NeighborIter::new(self.start, config.size) {
                        excluded[pos.to_nd_index()] = true;
                    }
                }
            }
        }

        let mut free: Vec<Coord2> = CoordIter::new(config.size)
            .filter(|&pos| !excluded[pos.to_nd_index()])
            .collect();
        if free.len() < mines_wanted {
            return Err(GameError::ExclusionTooTight);
        }

        log::debug!(
            "Placing {} mines on a {}x{} board, seed {}, safe start {:?}",
            mines_wanted,
            size_x,
            size_y,
            self.seed,
            self.safe_start
        );

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let (chosen, _) = free.partial_shuffle(&mut rng, mines_wanted);

        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        for &pos in chosen.iter() {
            mines[pos.to_nd_index()] = true;
        }

        Ok(Minefield::from_mine_mask(mines))
    }
}
