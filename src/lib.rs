use serde::{Deserialize, Serialize};

pub use cell::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use minefield::*;
pub use snapshot::*;
pub use types::*;

mod cell;
mod error;
mod game;
mod generator;
mod minefield;
mod snapshot;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validating constructor: both dimensions must be at least 1 and the
    /// mine count must satisfy `1 <= mines < width * height`, so at least
    /// one cell is safe and at least one is mined.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.size.0 < 1 || self.size.1 < 1 {
            return Err(GameError::InvalidSize);
        }
        if self.mines < 1 || self.mines >= self.total_cells() {
            return Err(GameError::InvalidMineCount);
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((30, 16), 99)
    }
}
