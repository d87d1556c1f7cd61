//! Unified error type for DogHunt.

use doghunt_round::StartError;

/// Top-level error for the command surface.
///
/// Host failures never reach here: round setup logs and skips them.
#[derive(Debug, thiserror::Error)]
pub enum DogHuntError {
    /// A round could not be started.
    #[error(transparent)]
    Start(#[from] StartError),

    /// The command was built outside a tokio runtime, so the countdown has
    /// nowhere to run.
    #[error("no tokio runtime available to drive the countdown")]
    NoRuntime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_start_error() {
        let err: DogHuntError = StartError::Unauthorized.into();
        assert!(matches!(err, DogHuntError::Start(StartError::Unauthorized)));
        assert!(err.to_string().contains("permission"));
    }

    #[test]
    fn test_start_error_message_is_passed_through() {
        let err: DogHuntError = StartError::InsufficientPlayers { found: 1, required: 2 }.into();
        assert_eq!(err.to_string(), "Not enough players to start Dog Hunt!");
    }

    #[test]
    fn test_no_runtime_message() {
        assert!(DogHuntError::NoRuntime.to_string().contains("runtime"));
    }
}
