//! # DogHunt
//!
//! A minigame round for an SCP facility server: one participant becomes
//! SCP-939, everyone else is scattered across heavy containment as Chaos
//! Insurgency, and a two minute countdown holds the dog back before release.
//!
//! The host server is reached only through the traits in [`doghunt_host`],
//! so the whole round can run against [`InMemoryHost`] in tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use doghunt::prelude::*;
//!
//! # async fn run(host: Arc<impl Host>, sender: &impl CommandSender) -> Result<(), DogHuntError> {
//! doghunt::logging::init();
//! let command = DogHuntCommand::try_new(host, RoundConfig::default())?;
//! let response = command.execute(&[], sender);
//! println!("{}", response.response);
//! # Ok(())
//! # }
//! ```
//!
//! [`InMemoryHost`]: doghunt_host::memory::InMemoryHost

mod command;
mod error;
pub mod logging;
mod plugin;

pub use command::{CommandResponse, DogHuntCommand};
pub use error::DogHuntError;
pub use plugin::{PluginInfo, PLUGIN};

pub use doghunt_countdown as countdown;
pub use doghunt_host as host;
pub use doghunt_round as round;

pub mod prelude {
    pub use crate::{CommandResponse, DogHuntCommand, DogHuntError, PluginInfo, PLUGIN};
    pub use doghunt_countdown::{CountdownConfig, CountdownState, CountdownStatus};
    pub use doghunt_host::{
        CommandSender, Host, HostError, Messenger, ParticipantControl, Permission, PlayerId,
        Position, Role, Roster, WorldControl,
    };
    pub use doghunt_round::{
        OverlapPolicy, RoundConfig, RoundOrchestrator, RoundStarted, StartError, ZoneCatalog,
    };
}
