//! Round orchestration for DogHunt.
//!
//! One participant becomes the hunter, everyone else joins the hunted
//! faction and is scattered across heavy containment, the world is reset,
//! and a countdown holds the hunter back before release.
//!
//! # Key types
//!
//! - [`RoundOrchestrator`] — validates and sequences a round start
//! - [`WorldResetter`] — best-effort, idempotent door and item resets
//! - [`RoundSelector`] — uniform hunter pick, hunted partition
//! - [`ZoneAssigner`] — zone draws without replacement
//! - [`ZoneCatalog`] — the fixed list of zones
//! - [`RoundConfig`] — round settings, including the overlap policy

mod assign;
mod catalog;
mod config;
mod error;
mod orchestrator;
mod reset;
mod selector;

pub use assign::{Placement, ZoneAssigner, ZoneAssignment};
pub use catalog::{ZoneCatalog, HUNTER_SPAWN_ZONE};
pub use config::{OverlapPolicy, RoundConfig};
pub use error::StartError;
pub use orchestrator::{RoundOrchestrator, RoundStarted, HUNTER_GREETING, STARTED_MESSAGE};
pub use reset::{ActionReport, ResetReport, WorldResetter};
pub use selector::{RoundSelector, Selection};
