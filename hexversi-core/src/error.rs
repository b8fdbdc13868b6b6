//! Error types surfaced to game drivers

use crate::board::Coord;
use crate::game::Player;

/// Everything that can go wrong while setting up or playing a game.
///
/// None of these are fatal: drivers either retry with new input
/// ([`GameError::is_retryable`]) or rebuild the game.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    #[error("game has not been started")]
    NotStarted,

    #[error("game has already been started")]
    AlreadyStarted,

    #[error("game is over")]
    GameFinished,

    #[error("it is {expected:?}'s turn, not {actual:?}'s")]
    WrongPlayer { expected: Player, actual: Player },

    #[error("cell {0} is already occupied")]
    OccupiedTarget(Coord),

    #[error("placing a disc at {0} captures nothing")]
    IllegalMove(Coord),

    #[error("{0} is not an empty cell on this board")]
    InvalidTarget(Coord),
}

impl GameError {
    /// True for rejections caused by the chosen input rather than the game
    /// itself; the driver should ask for another cell (or pass).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GameError::WrongPlayer { .. }
                | GameError::OccupiedTarget(_)
                | GameError::IllegalMove(_)
                | GameError::InvalidTarget(_)
        )
    }
}
