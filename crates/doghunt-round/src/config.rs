//! Round configuration.

use std::time::Duration;

use doghunt_countdown::CountdownConfig;
use serde::{Deserialize, Serialize};

use crate::catalog::HUNTER_SPAWN_ZONE;

// ---------------------------------------------------------------------------
// OverlapPolicy
// ---------------------------------------------------------------------------

/// What `start_round` does while a previous countdown is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Cancel the running countdown and start the new round.
    #[default]
    CancelPrevious,
    /// Refuse with `StartError::AlreadyInProgress`.
    Reject,
}

// ---------------------------------------------------------------------------
// RoundConfig
// ---------------------------------------------------------------------------

/// Settings for one round.
///
/// The zone catalog is not part of the config: it is fixed at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Minimum distinct participants. Never below 2: one hunter plus at
    /// least one hunted.
    pub min_participants: usize,

    pub countdown: CountdownConfig,

    pub overlap: OverlapPolicy,

    /// Vertical offset added to a zone anchor when placing a hunted
    /// participant, so nobody spawns inside the floor.
    pub spawn_lift: f32,

    /// Name of the zone the hunter starts in.
    pub hunter_spawn_zone: String,

    /// Intensity of the hunter's reduced-visibility effect.
    pub flash_intensity: u8,

    /// Intensity of the hunter's reduced-speed effect.
    pub slowness_intensity: u8,

    /// On-screen time of the hunter's personal start broadcast.
    pub hunter_greeting_display: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            min_participants: Self::MIN_PARTICIPANTS,
            countdown: CountdownConfig::default(),
            overlap: OverlapPolicy::default(),
            spawn_lift: 1.0,
            hunter_spawn_zone: HUNTER_SPAWN_ZONE.to_string(),
            flash_intensity: 255,
            slowness_intensity: 100,
            hunter_greeting_display: Duration::from_secs(5),
        }
    }
}

impl RoundConfig {
    pub const MIN_PARTICIPANTS: usize = 2;

    /// Clamp out-of-range values.
    ///
    /// - `min_participants` raised to [`Self::MIN_PARTICIPANTS`].
    /// - A non-finite or negative `spawn_lift` falls back to the default.
    /// - The countdown interval is clamped like the tick scheduler's.
    pub fn validated(mut self) -> Self {
        self.countdown = self.countdown.validated();
        if self.min_participants < Self::MIN_PARTICIPANTS {
            tracing::warn!(
                min_participants = self.min_participants,
                "min_participants below 2, clamping"
            );
            self.min_participants = Self::MIN_PARTICIPANTS;
        }
        if !self.spawn_lift.is_finite() || self.spawn_lift < 0.0 {
            tracing::warn!(spawn_lift = self.spawn_lift, "invalid spawn_lift, using default");
            self.spawn_lift = Self::default().spawn_lift;
        }
        self
    }

    /// How long the hunter's debuffs last: the whole countdown.
    pub fn hunter_hold(&self) -> Duration {
        self.countdown.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RoundConfig::default();
        assert_eq!(config.min_participants, 2);
        assert_eq!(config.countdown.duration_secs, 120);
        assert_eq!(config.overlap, OverlapPolicy::CancelPrevious);
        assert_eq!(config.spawn_lift, 1.0);
        assert_eq!(config.hunter_spawn_zone, "939_CRYO");
        assert_eq!(config.hunter_hold(), Duration::from_secs(120));
    }

    #[test]
    fn test_validated_clamps_min_participants() {
        let config = RoundConfig {
            min_participants: 0,
            ..RoundConfig::default()
        }
        .validated();
        assert_eq!(config.min_participants, 2);
    }

    #[test]
    fn test_validated_rejects_nan_lift() {
        let config = RoundConfig {
            spawn_lift: f32::NAN,
            ..RoundConfig::default()
        }
        .validated();
        assert_eq!(config.spawn_lift, 1.0);
    }

    #[test]
    fn test_hunter_hold_follows_clamped_interval() {
        let config = RoundConfig {
            countdown: CountdownConfig {
                interval: Duration::ZERO,
                ..CountdownConfig::with_duration(30)
            },
            ..RoundConfig::default()
        }
        .validated();
        assert_eq!(config.hunter_hold(), Duration::from_millis(30));
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = RoundConfig {
            overlap: OverlapPolicy::Reject,
            ..RoundConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: RoundConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
