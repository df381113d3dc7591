use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must both be at least 1")]
    InvalidSize,
    #[error("Mine count must be at least 1 and below the total cell count")]
    InvalidMineCount,
    #[error("Safe-start exclusion leaves fewer free cells than mines")]
    ExclusionTooTight,
    #[error("Invalid coordinates")]
    InvalidCoords,
}

pub type Result<T> = core::result::Result<T, GameError>;
