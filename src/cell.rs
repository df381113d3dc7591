use serde::{Deserialize, Serialize};

/// Canonical player-visible state stored by the gameplay engine.
///
/// `Revealed` only ever holds a safe cell; a detonated mine is tracked by the
/// engine separately and never enters the grid as `Revealed`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Hidden,
    Revealed(u8),
    Flagged,
}

impl Cell {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrevealed_covers_hidden_and_flagged() {
        assert!(Cell::Hidden.is_unrevealed());
        assert!(Cell::Flagged.is_unrevealed());
        assert!(!Cell::Revealed(3).is_unrevealed());
    }
}
