//! Error types for the engine.

use chain_reaction_protocol::{PlayerId, Position};

/// Reasons the engine rejects an operation.
///
/// Every variant is raised during validation, before the state is
/// touched, so a rejected call leaves the game exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The game already seats the maximum number of active players.
    #[error("game is full ({max} active players)")]
    Capacity { max: usize },

    /// Not enough active players to deal the opening dots.
    #[error("need at least {required} active players to start, have {found}")]
    InsufficientPlayers { required: usize, found: usize },

    /// Dots have already been dealt.
    #[error("game has already started")]
    AlreadyStarted,

    /// The game has ended; no further moves or starts are accepted.
    #[error("game is over")]
    GameOver,

    /// The mover is not the player whose turn it is.
    #[error("not {player}'s turn")]
    TurnOrder { player: PlayerId },

    /// The target cell belongs to another player.
    #[error("cannot place a dot on opponent's cell {position}")]
    IllegalCell { position: Position },

    /// The target cell is not on the board.
    #[error("position {position} is off the board")]
    OutOfBounds { position: Position },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_reason() {
        let err = EngineError::TurnOrder {
            player: PlayerId::from("bob"),
        };
        assert_eq!(err.to_string(), "not bob's turn");

        let err = EngineError::IllegalCell {
            position: Position::new(1, 2),
        };
        assert!(err.to_string().contains("(1, 2)"));

        let err = EngineError::InsufficientPlayers {
            required: 2,
            found: 1,
        };
        assert_eq!(
            err.to_string(),
            "need at least 2 active players to start, have 1"
        );
    }
}
