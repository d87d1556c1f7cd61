//! In-memory host used by the demo binary and by tests.
//!
//! Enabled with the `memory` feature. It models just enough of a game server
//! for a round: players with a role, position, inventory and received
//! broadcasts; doors with open/lock state; loose items. Objects can be
//! destroyed while still listed, which is what a stale host enumeration
//! looks like from the round logic's point of view.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::{
    Broadcast, CommandSender, Door, DoorId, DoorKind, HostError, LockReason,
    Messenger, ParticipantControl, Permission, PickupId, PlayerId, Position,
    Role, Roster, StatusEffect, WorldControl,
};

/// Observable state of one player.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerRecord {
    pub role: Role,
    pub position: Position,
    pub inventory: Vec<String>,
    pub effects: Vec<StatusEffect>,
    pub broadcasts: Vec<Broadcast>,
}

/// Observable state of one door.
#[derive(Debug, Clone, Serialize)]
pub struct DoorRecord {
    pub door: Door,
    pub open: bool,
    pub admin_locked: bool,
    pub destroyed: bool,
}

/// Per-operation call counters, for asserting which collaborators ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub set_role: usize,
    pub set_position: usize,
    pub clear_inventory: usize,
    pub apply_effect: usize,
    pub broadcast: usize,
    pub door_target: usize,
    pub door_lock: usize,
    pub destroy_pickup: usize,
    pub decontamination: usize,
}

impl CallCounts {
    /// Sum of every mutation counter (broadcasts are output, not mutation).
    pub fn mutations(&self) -> usize {
        self.set_role
            + self.set_position
            + self.clear_inventory
            + self.apply_effect
            + self.door_target
            + self.door_lock
            + self.destroy_pickup
            + self.decontamination
    }
}

/// One successful host mutation or broadcast, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    SetRole(PlayerId, Role),
    SetPosition(PlayerId),
    ClearInventory(PlayerId),
    ApplyEffect(PlayerId),
    Broadcast(PlayerId),
    DoorTarget(DoorId),
    DoorLock(DoorId),
    DestroyPickup(PickupId),
    Decontamination,
}

impl HostCall {
    /// Door and item resets, as opposed to participant updates.
    pub fn is_world_reset(&self) -> bool {
        matches!(
            self,
            Self::DoorTarget(_) | Self::DoorLock(_) | Self::DestroyPickup(_)
        )
    }
}

#[derive(Default)]
struct Ledger {
    counts: CallCounts,
    log: Vec<HostCall>,
}

impl Ledger {
    fn record(&mut self, call: HostCall) {
        let counter = match call {
            HostCall::SetRole(..) => &mut self.counts.set_role,
            HostCall::SetPosition(_) => &mut self.counts.set_position,
            HostCall::ClearInventory(_) => &mut self.counts.clear_inventory,
            HostCall::ApplyEffect(_) => &mut self.counts.apply_effect,
            HostCall::Broadcast(_) => &mut self.counts.broadcast,
            HostCall::DoorTarget(_) => &mut self.counts.door_target,
            HostCall::DoorLock(_) => &mut self.counts.door_lock,
            HostCall::DestroyPickup(_) => &mut self.counts.destroy_pickup,
            HostCall::Decontamination => &mut self.counts.decontamination,
        };
        *counter += 1;
        self.log.push(call);
    }
}

#[derive(Default)]
struct Inner {
    order: Vec<PlayerId>,
    players: HashMap<PlayerId, PlayerRecord>,
    doors: Vec<DoorRecord>,
    pickups: Vec<(PickupId, bool)>,
    calls: Ledger,
    next_object_id: u64,
}

/// A thread-safe, in-process stand-in for the game server.
#[derive(Default)]
pub struct InMemoryHost {
    inner: Mutex<Inner>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connects a player. Connecting an id twice is a no-op.
    pub fn add_player(&self, player: PlayerId) {
        let mut inner = self.lock();
        if inner.players.contains_key(&player) {
            return;
        }
        inner.order.push(player);
        inner.players.insert(player, PlayerRecord::default());
    }

    /// Connects a player already holding `role` with some inventory.
    pub fn add_player_with(&self, player: PlayerId, role: Role, inventory: &[&str]) {
        self.add_player(player);
        if let Some(record) = self.lock().players.get_mut(&player) {
            record.role = role;
            record.inventory = inventory.iter().map(|s| (*s).to_string()).collect();
        }
    }

    /// Disconnects a player. Their record is dropped.
    pub fn remove_player(&self, player: PlayerId) {
        let mut inner = self.lock();
        inner.order.retain(|p| *p != player);
        inner.players.remove(&player);
    }

    /// Adds a door and returns its id.
    pub fn add_door(&self, name: &str, kind: DoorKind, position: Position) -> DoorId {
        let mut inner = self.lock();
        inner.next_object_id += 1;
        let id = DoorId(inner.next_object_id);
        inner.doors.push(DoorRecord {
            door: Door {
                id,
                name: name.to_string(),
                kind,
                position,
            },
            open: false,
            admin_locked: false,
            destroyed: false,
        });
        id
    }

    /// Marks a door destroyed while leaving it in the enumeration.
    pub fn destroy_door(&self, door: DoorId) {
        if let Some(record) = self.lock().doors.iter_mut().find(|d| d.door.id == door) {
            record.destroyed = true;
        }
    }

    pub fn add_pickup(&self) -> PickupId {
        let mut inner = self.lock();
        inner.next_object_id += 1;
        let id = PickupId(inner.next_object_id);
        inner.pickups.push((id, false));
        id
    }

    /// Marks a pickup destroyed while leaving it in the enumeration.
    pub fn vanish_pickup(&self, pickup: PickupId) {
        if let Some(entry) = self.lock().pickups.iter_mut().find(|(id, _)| *id == pickup) {
            entry.1 = true;
        }
    }

    pub fn player(&self, player: PlayerId) -> Option<PlayerRecord> {
        self.lock().players.get(&player).cloned()
    }

    /// All connected players with their state, in connection order.
    pub fn snapshot(&self) -> Vec<(PlayerId, PlayerRecord)> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|p| inner.players.get(p).map(|r| (*p, r.clone())))
            .collect()
    }

    pub fn door(&self, door: DoorId) -> Option<DoorRecord> {
        self.lock().doors.iter().find(|d| d.door.id == door).cloned()
    }

    /// Pickups that have not been destroyed.
    pub fn live_pickups(&self) -> Vec<PickupId> {
        self.lock()
            .pickups
            .iter()
            .filter(|(_, gone)| !gone)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls.counts
    }

    /// Every successful call so far, oldest first.
    pub fn call_log(&self) -> Vec<HostCall> {
        self.lock().calls.log.clone()
    }

    /// Texts of every broadcast `player` has received, oldest first.
    pub fn broadcast_texts(&self, player: PlayerId) -> Vec<String> {
        self.lock()
            .players
            .get(&player)
            .map(|r| r.broadcasts.iter().map(|b| b.text.clone()).collect())
            .unwrap_or_default()
    }

    fn with_player<T>(
        &self,
        player: PlayerId,
        f: impl FnOnce(&mut PlayerRecord, &mut Ledger) -> T,
    ) -> Result<T, HostError> {
        let mut inner = self.lock();
        let Inner { players, calls, .. } = &mut *inner;
        let record = players.get_mut(&player).ok_or(HostError::PlayerGone(player))?;
        Ok(f(record, calls))
    }

    fn with_door(
        &self,
        door: DoorId,
        f: impl FnOnce(&mut DoorRecord, &mut Ledger),
    ) -> Result<(), HostError> {
        let mut inner = self.lock();
        let Inner { doors, calls, .. } = &mut *inner;
        match doors.iter_mut().find(|d| d.door.id == door) {
            Some(record) if !record.destroyed => {
                f(record, calls);
                Ok(())
            }
            _ => Err(HostError::ObjectGone(door.into())),
        }
    }
}

impl Roster for InMemoryHost {
    fn participants(&self) -> Vec<PlayerId> {
        self.lock().order.clone()
    }
}

impl Messenger for InMemoryHost {
    fn broadcast(&self, player: PlayerId, message: &Broadcast) -> Result<(), HostError> {
        self.with_player(player, |record, calls| {
            calls.record(HostCall::Broadcast(player));
            record.broadcasts.push(message.clone());
        })
    }
}

impl ParticipantControl for InMemoryHost {
    fn role(&self, player: PlayerId) -> Result<Role, HostError> {
        self.with_player(player, |record, _| record.role)
    }

    fn set_role(&self, player: PlayerId, role: Role) -> Result<(), HostError> {
        self.with_player(player, |record, calls| {
            calls.record(HostCall::SetRole(player, role));
            record.role = role;
            // A role change drops any effects, as on a real server.
            record.effects.clear();
        })
    }

    fn set_position(&self, player: PlayerId, position: Position) -> Result<(), HostError> {
        self.with_player(player, |record, calls| {
            calls.record(HostCall::SetPosition(player));
            record.position = position;
        })
    }

    fn clear_inventory(&self, player: PlayerId) -> Result<(), HostError> {
        self.with_player(player, |record, calls| {
            calls.record(HostCall::ClearInventory(player));
            record.inventory.clear();
        })
    }

    fn apply_effect(&self, player: PlayerId, effect: StatusEffect) -> Result<(), HostError> {
        self.with_player(player, |record, calls| {
            calls.record(HostCall::ApplyEffect(player));
            record.effects.retain(|e| e.kind != effect.kind);
            record.effects.push(effect);
        })
    }
}

impl WorldControl for InMemoryHost {
    fn doors(&self) -> Vec<Door> {
        self.lock().doors.iter().map(|d| d.door.clone()).collect()
    }

    fn set_door_target_state(&self, door: DoorId, open: bool) -> Result<(), HostError> {
        self.with_door(door, |record, calls| {
            calls.record(HostCall::DoorTarget(door));
            record.open = open;
        })
    }

    fn set_door_lock(&self, door: DoorId, reason: LockReason, locked: bool) -> Result<(), HostError> {
        self.with_door(door, |record, calls| {
            calls.record(HostCall::DoorLock(door));
            match reason {
                LockReason::AdminCommand => record.admin_locked = locked,
            }
        })
    }

    fn pickups(&self) -> Vec<PickupId> {
        self.lock().pickups.iter().map(|(id, _)| *id).collect()
    }

    fn destroy_pickup(&self, pickup: PickupId) -> Result<(), HostError> {
        let mut inner = self.lock();
        let Inner { pickups, calls, .. } = &mut *inner;
        match pickups.iter_mut().find(|(id, _)| *id == pickup) {
            Some(entry) if !entry.1 => {
                calls.record(HostCall::DestroyPickup(pickup));
                entry.1 = true;
                Ok(())
            }
            _ => Err(HostError::ObjectGone(pickup.into())),
        }
    }

    fn trigger_decontamination(&self) {
        self.lock().calls.record(HostCall::Decontamination);
        tracing::debug!("decontamination triggered");
    }
}

/// A command sender with a fixed name and privilege.
#[derive(Debug, Clone)]
pub struct StaticSender {
    pub name: String,
    pub privileged: bool,
}

impl StaticSender {
    pub fn admin() -> Self {
        Self {
            name: "admin".to_string(),
            privileged: true,
        }
    }

    pub fn guest() -> Self {
        Self {
            name: "guest".to_string(),
            privileged: false,
        }
    }
}

impl CommandSender for StaticSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: Permission) -> bool {
        match permission {
            Permission::FacilityManagement => self.privileged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroyed_door_is_still_listed_but_rejects_ops() {
        let host = InMemoryHost::new();
        let door = host.add_door("HCZ_ARMORY", DoorKind::Standard, Position::ORIGIN);
        host.destroy_door(door);

        assert_eq!(host.doors().len(), 1);
        assert!(matches!(
            host.set_door_target_state(door, true),
            Err(HostError::ObjectGone(_))
        ));
    }

    #[test]
    fn test_broadcast_to_removed_player_fails() {
        let host = InMemoryHost::new();
        host.add_player(PlayerId(1));
        host.remove_player(PlayerId(1));

        let msg = Broadcast::new("hi", std::time::Duration::from_secs(1));
        assert_eq!(
            host.broadcast(PlayerId(1), &msg),
            Err(HostError::PlayerGone(PlayerId(1)))
        );
    }

    #[test]
    fn test_add_player_twice_keeps_one_entry() {
        let host = InMemoryHost::new();
        host.add_player(PlayerId(1));
        host.add_player(PlayerId(1));
        assert_eq!(host.participants(), vec![PlayerId(1)]);
    }

    #[test]
    fn test_call_log_records_successes_in_order() {
        let host = InMemoryHost::new();
        host.add_player(PlayerId(1));
        let door = host.add_door("096", DoorKind::Standard, Position::ORIGIN);

        host.set_door_target_state(door, true).unwrap();
        host.set_role(PlayerId(1), Role::Hunted).unwrap();
        assert!(host.set_role(PlayerId(2), Role::Hunted).is_err());
        host.trigger_decontamination();

        assert_eq!(
            host.call_log(),
            vec![
                HostCall::DoorTarget(door),
                HostCall::SetRole(PlayerId(1), Role::Hunted),
                HostCall::Decontamination,
            ]
        );
        assert_eq!(host.calls().set_role, 1);
    }

    #[test]
    fn test_door_position_finds_by_name() {
        let host = InMemoryHost::new();
        host.add_door("939_CRYO", DoorKind::Standard, Position::new(5.0, 0.0, 5.0));
        assert_eq!(host.door_position("939_CRYO"), Some(Position::new(5.0, 0.0, 5.0)));
        assert_eq!(host.door_position("missing"), None);
    }
}
