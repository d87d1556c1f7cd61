//! Round orchestration: the entry point that turns a roster into a running
//! round.
//!
//! The sequence inside [`RoundOrchestrator::start_round`] is:
//!   1. Validate: permission, live roster size, overlap policy
//!   2. Clear prior state: everyone to spectator at origin
//!   3. Reset the world (doors, elevators, loose items)
//!   4. Select the hunter and the hunted faction
//!   5. Place and debuff the hunter
//!   6. Scatter the hunted faction across the zone catalog
//!   7. Clear inventories, trigger decontamination
//!   8. Launch the countdown and return without waiting for it
//!
//! Step 1 fails closed. Participants the host no longer knows are dropped
//! before counting, and again if they leave during step 2, so every later
//! step works on players that were connected when prior state was cleared.
//! From step 3 on there is no rollback: host failures are logged per
//! participant or object and setup carries on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use doghunt_countdown::{CountdownStatus, CountdownTimer};
use doghunt_host::{
    Broadcast, CommandSender, EffectKind, Host, HostError, Permission,
    PlayerId, Position, Role, StatusEffect,
};
use tokio::runtime::Handle;

use crate::assign::{ZoneAssigner, ZoneAssignment};
use crate::catalog::ZoneCatalog;
use crate::reset::{ResetReport, WorldResetter};
use crate::selector::{distinct, RoundSelector};
use crate::{OverlapPolicy, RoundConfig, StartError};

/// Personal broadcast sent to the hunter once placed.
pub const HUNTER_GREETING: &str = "Now go catch the Chaos";

/// Response text for a successful start.
pub const STARTED_MESSAGE: &str =
    "Dog Hunt has started! SCP-939 is hunting for Chaos Insurgents in Heavy Containment.";

/// What a successful [`RoundOrchestrator::start_round`] produced.
#[derive(Debug, Clone)]
pub struct RoundStarted {
    pub hunter: PlayerId,
    pub hunter_spawn: Position,
    pub placements: ZoneAssignment,
    pub reset: ResetReport,
    /// Observer for the countdown launched by this round.
    pub countdown: CountdownStatus,
}

impl RoundStarted {
    pub fn message(&self) -> &'static str {
        STARTED_MESSAGE
    }
}

/// Releases the round-in-progress flag when setup exits, however it exits.
struct SetupGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SetupGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SetupGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Owns the countdown slot and runs round setup against a host.
pub struct RoundOrchestrator<H: Host> {
    host: Arc<H>,
    config: RoundConfig,
    catalog: ZoneCatalog,
    timer: CountdownTimer,
    setup_in_progress: AtomicBool,
    active_hunter: Mutex<Option<PlayerId>>,
}

impl<H: Host> RoundOrchestrator<H> {
    /// Creates an orchestrator whose countdowns run on `runtime`.
    pub fn new(host: Arc<H>, config: RoundConfig, runtime: Handle) -> Self {
        Self {
            host,
            config: config.validated(),
            catalog: ZoneCatalog::default(),
            timer: CountdownTimer::new(runtime),
            setup_in_progress: AtomicBool::new(false),
            active_hunter: Mutex::new(None),
        }
    }

    /// Replaces the zone catalog the hunted faction is scattered across.
    pub fn with_catalog(mut self, catalog: ZoneCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Sets up a round and starts its countdown.
    ///
    /// Returns as soon as setup is done. The countdown keeps running in the
    /// background; observe it through [`RoundStarted::countdown`].
    pub fn start_round<S: CommandSender + ?Sized>(
        &self,
        participants: &[PlayerId],
        sender: &S,
    ) -> Result<RoundStarted, StartError> {
        // --- Step 1: Validate ---
        if !sender.has_permission(Permission::FacilityManagement) {
            tracing::info!(sender = sender.name(), "round start refused: unauthorized");
            return Err(StartError::Unauthorized);
        }

        let roster = self.connected(participants);
        self.require_players(roster.len())?;

        let Some(_guard) = SetupGuard::acquire(&self.setup_in_progress) else {
            tracing::warn!("round start refused: another setup is in flight");
            return Err(StartError::AlreadyInProgress);
        };
        if self.config.overlap == OverlapPolicy::Reject && self.timer.is_running() {
            tracing::info!("round start refused: countdown still running");
            return Err(StartError::AlreadyInProgress);
        }

        tracing::info!(
            sender = sender.name(),
            participants = roster.len(),
            "starting round"
        );

        // --- Step 2: Clear prior state ---
        let roster = self.clear_prior_state(&roster);
        if let Err(e) = self.require_players(roster.len()) {
            tracing::warn!("participants left while clearing prior state");
            return Err(e);
        }

        // --- Step 3: Reset the world ---
        let host = self.host.as_ref();
        let resetter = WorldResetter::new(host, &self.config.hunter_spawn_zone);
        let reset = resetter.reset_all();

        // --- Step 4: Select ---
        let selection =
            RoundSelector::select(&roster, |p| host.role(p).ok(), &mut rand::rng())?;

        // --- Step 5: Hunter ---
        let hunter = selection.hunter;
        let hunter_spawn = resetter.find_hunter_spawn();
        self.prepare_hunter(hunter, hunter_spawn);

        // --- Step 6: Hunted faction ---
        let placements = ZoneAssigner::new(&self.catalog, self.config.spawn_lift).assign(
            &selection.hunted,
            host,
            &mut rand::rng(),
        );
        for placement in placements.placements() {
            self.log_failure("set_role", placement.player, host.set_role(placement.player, Role::Hunted));
            self.log_failure(
                "set_position",
                placement.player,
                host.set_position(placement.player, placement.position),
            );
        }

        // --- Step 7: Inventories and decontamination ---
        for &player in &roster {
            self.log_failure("clear_inventory", player, host.clear_inventory(player));
        }
        host.trigger_decontamination();

        // --- Step 8: Countdown ---
        let countdown = self
            .timer
            .start(Arc::clone(&self.host), self.config.countdown);

        tracing::info!(
            %hunter,
            hunted = placements.len(),
            unzoned = placements.unzoned().count(),
            countdown = %countdown.id(),
            "round started"
        );

        Ok(RoundStarted {
            hunter,
            hunter_spawn,
            placements,
            reset,
            countdown,
        })
    }

    /// The hunter of the current round, if a round was started.
    pub fn active_hunter(&self) -> Option<PlayerId> {
        *self.active_hunter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Observer for the most recent countdown.
    pub fn countdown(&self) -> Option<CountdownStatus> {
        self.timer.current()
    }

    /// Cancels the running countdown. Returns `true` if one was running.
    pub fn cancel_countdown(&self) -> bool {
        self.timer.cancel()
    }

    /// Cancels the countdown and waits for its task to exit.
    pub async fn shutdown(&self) {
        self.timer.shutdown().await;
    }

    /// Distinct participants the host still knows about.
    fn connected(&self, participants: &[PlayerId]) -> Vec<PlayerId> {
        distinct(participants)
            .into_iter()
            .filter(|&player| match self.host.role(player) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(%player, error = %e, "dropping departed participant");
                    false
                }
            })
            .collect()
    }

    fn require_players(&self, found: usize) -> Result<(), StartError> {
        let required = self.config.min_participants;
        if found < required {
            tracing::info!(found, required, "round start refused: not enough players");
            return Err(StartError::InsufficientPlayers { found, required });
        }
        Ok(())
    }

    /// Moves everyone to spectator at origin. Returns the participants whose
    /// role was actually reset; anyone else has left.
    fn clear_prior_state(&self, roster: &[PlayerId]) -> Vec<PlayerId> {
        self.set_active_hunter(None);
        roster
            .iter()
            .copied()
            .filter(|&player| {
                if let Err(e) = self.host.set_role(player, Role::Spectator) {
                    tracing::debug!(%player, error = %e, "dropping departed participant");
                    return false;
                }
                self.log_failure("set_position", player, self.host.set_position(player, Position::ORIGIN));
                true
            })
            .collect()
    }

    fn prepare_hunter(&self, hunter: PlayerId, spawn: Position) {
        let host = self.host.as_ref();
        // Role first: a role change may move the player to the role's default spawn.
        self.log_failure("set_role", hunter, host.set_role(hunter, Role::Hunter));
        self.log_failure("set_position", hunter, host.set_position(hunter, spawn));
        self.set_active_hunter(Some(hunter));

        let hold = self.config.hunter_hold();
        for (kind, intensity) in [
            (EffectKind::Flashed, self.config.flash_intensity),
            (EffectKind::Slowness, self.config.slowness_intensity),
        ] {
            let effect = StatusEffect {
                kind,
                intensity,
                duration: hold,
            };
            self.log_failure("apply_effect", hunter, host.apply_effect(hunter, effect));
        }

        let greeting = Broadcast::new(HUNTER_GREETING, self.config.hunter_greeting_display);
        self.log_failure("broadcast", hunter, host.broadcast(hunter, &greeting));
    }

    fn set_active_hunter(&self, hunter: Option<PlayerId>) {
        *self.active_hunter.lock().unwrap_or_else(PoisonError::into_inner) = hunter;
    }

    fn log_failure(&self, action: &'static str, player: PlayerId, result: Result<(), HostError>) {
        if let Err(e) = result {
            tracing::debug!(action, %player, error = %e, "participant update skipped");
        }
    }
}
