//! Error types for host interactions.

use crate::{DoorId, PickupId, PlayerId};

/// Errors the host can report when the round logic acts on it.
///
/// None of these are fatal to a round. Reset actions and participant
/// mutations log them and move on to the next object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The participant disconnected or otherwise no longer exists.
    #[error("player {0} is gone")]
    PlayerGone(PlayerId),

    /// A world object was destroyed between enumeration and use.
    #[error("world object {0} is gone")]
    ObjectGone(ObjectRef),

    /// The host refused the operation for its own reasons.
    #[error("host rejected the operation: {0}")]
    Rejected(String),
}

/// Names the world object a [`HostError::ObjectGone`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef {
    Door(DoorId),
    Pickup(PickupId),
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Door(id) => write!(f, "{id}"),
            Self::Pickup(id) => write!(f, "{id}"),
        }
    }
}

impl From<DoorId> for ObjectRef {
    fn from(id: DoorId) -> Self {
        Self::Door(id)
    }
}

impl From<PickupId> for ObjectRef {
    fn from(id: PickupId) -> Self {
        Self::Pickup(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_gone_message_names_the_object() {
        let err = HostError::ObjectGone(DoorId(9).into());
        assert_eq!(err.to_string(), "world object D-9 is gone");
    }
}
