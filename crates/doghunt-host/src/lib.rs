//! Host-facing types and collaborator traits for DogHunt.
//!
//! DogHunt runs inside a game server it does not control. This crate is the
//! boundary: the value types both sides agree on, and the traits the server
//! implements so a round can read the roster, move players, and reset doors
//! and items.
//!
//! ```text
//! Round logic (above)  ← sequences reset, selection, assignment, countdown
//!     ↕
//! Host boundary (this crate)  ← Roster, Messenger, ParticipantControl, WorldControl
//!     ↕
//! Game server  ← owns players, doors, items
//! ```
//!
//! With the `memory` feature, [`memory::InMemoryHost`] provides a complete
//! in-process host for tests and demos.

mod error;
mod host;
mod types;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use error::{HostError, ObjectRef};
pub use host::{
    CommandSender, Host, Messenger, ParticipantControl, Roster, WorldControl,
};
pub use types::{
    Broadcast, Door, DoorId, DoorKind, EffectKind, LockReason, Permission,
    PickupId, PlayerId, Position, Role, StatusEffect,
};
