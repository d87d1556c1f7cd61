//! Collaborator traits implemented by the host environment.
//!
//! DogHunt doesn't own players, doors, or items. The game server does. The
//! round logic reaches them only through the narrow capabilities below, so
//! a real server, the in-memory host, and test fakes are interchangeable.
//!
//! All methods are synchronous: round setup runs to completion inside a
//! single command invocation. The countdown task reads the roster and
//! broadcasts from another task, hence the `Send + Sync + 'static` bounds.

use crate::{
    Broadcast, Door, DoorId, HostError, LockReason, Permission, PickupId,
    PlayerId, Position, Role, StatusEffect,
};

/// Read access to the live participant roster.
pub trait Roster: Send + Sync + 'static {
    /// Lists the currently connected participants.
    ///
    /// Called again on each countdown tick, so the answer may change between
    /// calls as people join and leave.
    fn participants(&self) -> Vec<PlayerId>;
}

/// Delivers on-screen broadcasts to individual participants.
pub trait Messenger: Roster {
    /// Sends `message` to `player`.
    ///
    /// Returns `Err(HostError::PlayerGone)` if the player left in the
    /// meantime. Callers treat that as a per-recipient failure.
    fn broadcast(&self, player: PlayerId, message: &Broadcast) -> Result<(), HostError>;
}

/// Mutations on a participant's in-game state.
pub trait ParticipantControl: Messenger {
    fn role(&self, player: PlayerId) -> Result<Role, HostError>;

    fn set_role(&self, player: PlayerId, role: Role) -> Result<(), HostError>;

    fn set_position(&self, player: PlayerId, position: Position) -> Result<(), HostError>;

    fn clear_inventory(&self, player: PlayerId) -> Result<(), HostError>;

    fn apply_effect(&self, player: PlayerId, effect: StatusEffect) -> Result<(), HostError>;
}

/// Enumeration and mutation of world objects.
pub trait WorldControl: Send + Sync + 'static {
    /// Lists every door the host currently knows about.
    ///
    /// The list is a snapshot. Entries may refer to doors destroyed since,
    /// and acting on them yields `HostError::ObjectGone`.
    fn doors(&self) -> Vec<Door>;

    /// Sets the state a door moves towards: `true` = open.
    fn set_door_target_state(&self, door: DoorId, open: bool) -> Result<(), HostError>;

    /// Sets or clears a lock flag on a door.
    fn set_door_lock(&self, door: DoorId, reason: LockReason, locked: bool) -> Result<(), HostError>;

    /// Lists every loose item currently in the world.
    fn pickups(&self) -> Vec<PickupId>;

    fn destroy_pickup(&self, pickup: PickupId) -> Result<(), HostError>;

    /// Starts the environmental decontamination event. Fire-and-forget.
    fn trigger_decontamination(&self);

    /// Position of the first door carrying `name`, if any.
    fn door_position(&self, name: &str) -> Option<Position> {
        self.doors()
            .into_iter()
            .find(|door| door.name == name)
            .map(|door| door.position)
    }
}

/// Everything a round needs from its host.
///
/// Blanket-implemented, so implementing the component traits is enough.
pub trait Host: ParticipantControl + WorldControl {}

impl<T: ParticipantControl + WorldControl> Host for T {}

/// Whoever invoked a command.
pub trait CommandSender {
    /// Display name for logs.
    fn name(&self) -> &str;

    fn has_permission(&self, permission: Permission) -> bool;
}
