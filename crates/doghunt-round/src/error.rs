//! Error types for round setup.

/// Why a round could not be started.
///
/// Every variant is raised before the first mutation, so a failed start
/// leaves participants and world untouched. The messages are user-facing:
/// the command layer returns them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// The caller lacks the privilege to start a round.
    #[error("You do not have permission to run this command.")]
    Unauthorized,

    /// Fewer distinct participants than a round needs.
    #[error("Not enough players to start Dog Hunt!")]
    InsufficientPlayers { found: usize, required: usize },

    /// No hunter could be chosen (empty pool).
    #[error("Failed to select SCP-939!")]
    SelectionFailed,

    /// Another round is being set up, or a countdown is running and the
    /// overlap policy is `Reject`.
    #[error("A Dog Hunt round is already in progress!")]
    AlreadyInProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_mentions_permission() {
        assert!(StartError::Unauthorized.to_string().contains("permission"));
    }

    #[test]
    fn test_insufficient_players_message() {
        let err = StartError::InsufficientPlayers { found: 1, required: 2 };
        assert_eq!(err.to_string(), "Not enough players to start Dog Hunt!");
    }
}
