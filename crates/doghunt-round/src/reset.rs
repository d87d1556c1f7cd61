//! World reset actions run before roles are handed out.
//!
//! Every action walks the full current list of objects and is idempotent:
//! running it twice leaves the world as running it once. Objects that
//! vanished between enumeration and use are logged and skipped. They never
//! stop the rest of the batch or the actions that follow.

use doghunt_host::{Door, DoorKind, HostError, LockReason, Position, WorldControl};
use serde::Serialize;

/// Outcome of one reset action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    /// Objects the action was applied to.
    pub affected: usize,
    /// Objects skipped because the host rejected the operation.
    pub failed: usize,
}

impl ActionReport {
    fn record(&mut self, result: Result<(), HostError>, action: &'static str) {
        match result {
            Ok(()) => self.affected += 1,
            Err(e) => {
                self.failed += 1;
                tracing::debug!(action, error = %e, "reset skipped an object");
            }
        }
    }
}

/// Outcome of [`WorldResetter::reset_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub doors_opened: ActionReport,
    pub checkpoints_locked: ActionReport,
    pub elevators_disabled: ActionReport,
    pub pickups_cleared: ActionReport,
}

impl ResetReport {
    pub fn failed(&self) -> usize {
        self.doors_opened.failed
            + self.checkpoints_locked.failed
            + self.elevators_disabled.failed
            + self.pickups_cleared.failed
    }
}

/// Applies the reset actions to a world.
pub struct WorldResetter<'a, W: ?Sized> {
    world: &'a W,
    hunter_zone: &'a str,
}

impl<'a, W: WorldControl + ?Sized> WorldResetter<'a, W> {
    pub fn new(world: &'a W, hunter_zone: &'a str) -> Self {
        Self { world, hunter_zone }
    }

    /// Runs every mutating action. Order doesn't matter; this is the order
    /// they have always run in.
    pub fn reset_all(&self) -> ResetReport {
        let report = ResetReport {
            doors_opened: self.open_heavy_doors(),
            checkpoints_locked: self.lock_checkpoints(),
            elevators_disabled: self.lock_elevators(),
            pickups_cleared: self.clear_pickups(),
        };
        tracing::info!(
            doors = report.doors_opened.affected,
            checkpoints = report.checkpoints_locked.affected,
            elevators = report.elevators_disabled.affected,
            pickups = report.pickups_cleared.affected,
            failed = report.failed(),
            "world reset"
        );
        report
    }

    /// Opens every door and pins it open with the administrative lock.
    pub fn open_heavy_doors(&self) -> ActionReport {
        let mut report = ActionReport::default();
        for door in self.world.doors() {
            let result = self
                .world
                .set_door_target_state(door.id, true)
                .and_then(|()| self.world.set_door_lock(door.id, LockReason::AdminCommand, true));
            report.record(result, "open_heavy_doors");
        }
        report
    }

    /// Applies the administrative lock to checkpoint doors.
    pub fn lock_checkpoints(&self) -> ActionReport {
        let mut report = ActionReport::default();
        for door in self.doors_of(DoorKind::Checkpoint) {
            let result = self.world.set_door_lock(door.id, LockReason::AdminCommand, true);
            report.record(result, "lock_checkpoints");
        }
        report
    }

    /// Sends elevator gates to the closed state. Elevators are disabled by
    /// target state, not by lock.
    pub fn lock_elevators(&self) -> ActionReport {
        let mut report = ActionReport::default();
        for door in self.doors_of(DoorKind::Elevator) {
            let result = self.world.set_door_target_state(door.id, false);
            report.record(result, "lock_elevators");
        }
        report
    }

    /// Destroys every loose item.
    pub fn clear_pickups(&self) -> ActionReport {
        let mut report = ActionReport::default();
        for pickup in self.world.pickups() {
            report.record(self.world.destroy_pickup(pickup), "clear_pickups");
        }
        report
    }

    /// Anchor of the hunter's start zone, or origin if the zone isn't in
    /// the current world. Pure lookup.
    pub fn find_hunter_spawn(&self) -> Position {
        match self.world.door_position(self.hunter_zone) {
            Some(position) => position,
            None => {
                tracing::warn!(zone = self.hunter_zone, "hunter spawn zone missing, using origin");
                Position::ORIGIN
            }
        }
    }

    fn doors_of(&self, kind: DoorKind) -> impl Iterator<Item = Door> {
        self.world.doors().into_iter().filter(move |door| door.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use doghunt_host::memory::InMemoryHost;

    use super::*;

    fn world() -> (InMemoryHost, [doghunt_host::DoorId; 3]) {
        let host = InMemoryHost::new();
        let standard = host.add_door("HCZ_ARMORY", DoorKind::Standard, Position::ORIGIN);
        let checkpoint = host.add_door("CHECKPOINT_EZ_HCA_A", DoorKind::Checkpoint, Position::ORIGIN);
        let elevator = host.add_door("ELEV_A", DoorKind::Elevator, Position::ORIGIN);
        (host, [standard, checkpoint, elevator])
    }

    #[test]
    fn test_open_heavy_doors_opens_and_locks_every_door() {
        let (host, doors) = world();
        let report = WorldResetter::new(&host, "939_CRYO").open_heavy_doors();

        assert_eq!(report, ActionReport { affected: 3, failed: 0 });
        for id in doors {
            let door = host.door(id).unwrap();
            assert!(door.open);
            assert!(door.admin_locked);
        }
    }

    #[test]
    fn test_lock_checkpoints_only_touches_checkpoints() {
        let (host, [standard, checkpoint, _]) = world();
        let report = WorldResetter::new(&host, "939_CRYO").lock_checkpoints();

        assert_eq!(report.affected, 1);
        assert!(host.door(checkpoint).unwrap().admin_locked);
        assert!(!host.door(standard).unwrap().admin_locked);
    }

    #[test]
    fn test_lock_elevators_closes_without_locking() {
        let (host, [_, _, elevator]) = world();
        let resetter = WorldResetter::new(&host, "939_CRYO");
        resetter.open_heavy_doors();
        host.set_door_lock(elevator, LockReason::AdminCommand, false).unwrap();

        let report = resetter.lock_elevators();

        assert_eq!(report.affected, 1);
        let door = host.door(elevator).unwrap();
        assert!(!door.open);
        assert!(!door.admin_locked);
    }

    #[test]
    fn test_destroyed_door_does_not_stop_the_batch() {
        let (host, [standard, checkpoint, elevator]) = world();
        host.destroy_door(standard);

        let report = WorldResetter::new(&host, "939_CRYO").open_heavy_doors();

        assert_eq!(report, ActionReport { affected: 2, failed: 1 });
        assert!(host.door(checkpoint).unwrap().open);
        assert!(host.door(elevator).unwrap().open);
    }

    #[test]
    fn test_clear_pickups_skips_vanished_items() {
        let host = InMemoryHost::new();
        host.add_pickup();
        let b = host.add_pickup();
        host.add_pickup();
        host.vanish_pickup(b);

        let report = WorldResetter::new(&host, "939_CRYO").clear_pickups();

        assert_eq!(report, ActionReport { affected: 2, failed: 1 });
        assert!(host.live_pickups().is_empty());
    }

    #[test]
    fn test_reset_all_is_idempotent() {
        let (host, doors) = world();
        host.add_pickup();
        let resetter = WorldResetter::new(&host, "939_CRYO");

        resetter.reset_all();
        let first: Vec<_> = doors.iter().map(|d| host.door(*d).unwrap()).collect();
        let second_report = resetter.reset_all();
        let second: Vec<_> = doors.iter().map(|d| host.door(*d).unwrap()).collect();

        for (a, b) in first.iter().zip(&second) {
            assert_eq!((a.open, a.admin_locked), (b.open, b.admin_locked));
        }
        assert_eq!(second_report.pickups_cleared.affected, 0);
    }

    #[test]
    fn test_find_hunter_spawn_falls_back_to_origin() {
        let host = InMemoryHost::new();
        let resetter = WorldResetter::new(&host, "939_CRYO");
        assert_eq!(resetter.find_hunter_spawn(), Position::ORIGIN);

        host.add_door("939_CRYO", DoorKind::Standard, Position::new(10.0, 2.0, -4.0));
        assert_eq!(resetter.find_hunter_spawn(), Position::new(10.0, 2.0, -4.0));
        assert_eq!(host.calls().mutations(), 0);
    }
}
