//! Core types shared between the round logic and the host environment.
//!
//! Everything here is a plain value: identifiers, roles, positions, and the
//! small descriptors the host hands back when the round logic enumerates the
//! world. None of these types own host state; they only name it.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected participant.
///
/// Newtype over the host's numeric player id, so a `PlayerId` can never be
/// confused with a [`DoorId`] or [`PickupId`] in a signature.
///
/// `#[serde(transparent)]` serializes a `PlayerId(42)` as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// `tracing::info!(%player, "...")` prints "P-42".
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier for a door in the live world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoorId(pub u64);

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D-{}", self.0)
    }
}

/// Identifier for a loose item lying in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickupId(pub u64);

impl fmt::Display for PickupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Roles and permissions
// ---------------------------------------------------------------------------

/// The role a participant currently plays.
///
/// The host may know many more roles than these; the round logic only ever
/// reads or writes these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Neutral, not taking part in the round. Every participant is forced
    /// here before a new round is set up.
    #[default]
    Spectator,
    /// The single pursuing role (the dog).
    Hunter,
    /// The hunted faction.
    Hunted,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spectator => write!(f, "Spectator"),
            Self::Hunter => write!(f, "Hunter"),
            Self::Hunted => write!(f, "Hunted"),
        }
    }
}

/// Privileges the host can check on a command sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Elevated privilege required to start a round.
    FacilityManagement,
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// The world origin. Used as the null position when clearing state and
    /// as the fallback whenever a lookup comes up empty.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns this position raised by `dy` on the vertical axis.
    pub fn lifted(self, dy: f32) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// World objects
// ---------------------------------------------------------------------------

/// Door subtypes the reset actions distinguish between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    /// An ordinary door.
    Standard,
    /// A checkpoint chokepoint between zones.
    Checkpoint,
    /// An elevator gate. Disabled by target state, not by lock.
    Elevator,
}

/// Why a door is locked. The host may track several lock reasons at once;
/// round setup only ever touches the administrative one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockReason {
    AdminCommand,
}

/// A door as reported by the host when the world is enumerated.
///
/// This is a descriptor, not a live reference: by the time the round logic
/// acts on it the door may already be gone, in which case the host answers
/// with [`HostError::ObjectGone`](crate::HostError::ObjectGone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    /// The host's name tag, e.g. `"HCZ_ARMORY"`. Zones are anchored on it.
    pub name: String,
    pub kind: DoorKind,
    pub position: Position,
}

// ---------------------------------------------------------------------------
// Participant-directed output
// ---------------------------------------------------------------------------

/// A broadcast shown on a participant's screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    pub text: String,
    /// How long the host keeps the message on screen.
    pub display: Duration,
}

impl Broadcast {
    pub fn new(text: impl Into<String>, display: Duration) -> Self {
        Self {
            text: text.into(),
            display,
        }
    }
}

/// Status effects applied to a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Reduced visibility.
    Flashed,
    /// Reduced movement speed.
    Slowness,
}

/// A timed status effect with an intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub intensity: u8,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(42).to_string(), "P-42");
        assert_eq!(DoorId(7).to_string(), "D-7");
        assert_eq!(PickupId(3).to_string(), "I-3");
    }

    #[test]
    fn test_player_id_serializes_transparently() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_position_lifted_only_moves_y() {
        let p = Position::new(1.0, 2.0, 3.0).lifted(1.0);
        assert_eq!(p, Position::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn test_role_default_is_spectator() {
        assert_eq!(Role::default(), Role::Spectator);
        assert_eq!(Role::Hunter.to_string(), "Hunter");
    }
}
