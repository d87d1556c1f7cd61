//! The `DogHunt` remote-admin command.

use std::sync::Arc;

use doghunt_host::{CommandSender, Host};
use doghunt_round::{RoundConfig, RoundOrchestrator, RoundStarted};
use serde::Serialize;
use tokio::runtime::Handle;

use crate::DogHuntError;

/// What the host prints back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    pub response: String,
}

impl CommandResponse {
    fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: response.into(),
        }
    }

    fn failed(response: impl Into<String>) -> Self {
        Self {
            success: false,
            response: response.into(),
        }
    }
}

/// Starts a Dog Hunt round for everyone currently connected.
pub struct DogHuntCommand<H: Host> {
    rounds: RoundOrchestrator<H>,
}

impl<H: Host> DogHuntCommand<H> {
    pub const NAME: &'static str = "DogHunt";
    pub const ALIASES: &'static [&'static str] = &["doghunt"];
    pub const DESCRIPTION: &'static str = "Starts a Dog Hunt round: SCP-939 hunts Chaos in Heavy Containment.";

    /// Builds the command on an explicit runtime handle.
    pub fn new(host: Arc<H>, config: RoundConfig, runtime: Handle) -> Self {
        Self {
            rounds: RoundOrchestrator::new(host, config, runtime),
        }
    }

    /// Builds the command on the runtime the caller is running in.
    pub fn try_new(host: Arc<H>, config: RoundConfig) -> Result<Self, DogHuntError> {
        let runtime = Handle::try_current().map_err(|_| DogHuntError::NoRuntime)?;
        Ok(Self::new(host, config, runtime))
    }

    /// Whether `name` invokes this command. Case sensitive, like the host's
    /// own command table.
    pub fn matches(name: &str) -> bool {
        name == Self::NAME || Self::ALIASES.contains(&name)
    }

    pub fn rounds(&self) -> &RoundOrchestrator<H> {
        &self.rounds
    }

    /// Starts a round for the current roster.
    pub fn start<S: CommandSender + ?Sized>(&self, sender: &S) -> Result<RoundStarted, DogHuntError> {
        let participants = self.rounds.host().participants();
        Ok(self.rounds.start_round(&participants, sender)?)
    }

    /// Runs the command. Arguments are accepted and ignored.
    pub fn execute<S: CommandSender + ?Sized>(&self, args: &[&str], sender: &S) -> CommandResponse {
        if !args.is_empty() {
            tracing::debug!(ignored = args.len(), "DogHunt takes no arguments");
        }
        match self.start(sender) {
            Ok(started) => CommandResponse::ok(started.message()),
            Err(e) => {
                tracing::info!(sender = sender.name(), error = %e, "DogHunt command failed");
                CommandResponse::failed(e.to_string())
            }
        }
    }
}
