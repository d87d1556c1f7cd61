//! Release countdown for DogHunt.
//!
//! Once a round is set up, the hunter is held back while every participant
//! sees a per-second countdown. This crate provides:
//!
//! - [`TickScheduler`] — a fixed-cadence tick source with overrun handling
//! - [`CountdownTimer`] — a single slot running at most one countdown task
//! - [`CountdownStatus`] — an observer for one run (state, ticks, completion)
//!
//! The countdown runs on its own Tokio task. Starting it never blocks the
//! caller, and cancelling it is cooperative: the task notices at its next
//! tick or wait and stops without sending the release broadcast.

mod scheduler;
mod timer;

pub use scheduler::{TickConfig, TickInfo, TickPolicy, TickScheduler};
pub use timer::{
    tick_text, CountdownConfig, CountdownId, CountdownState, CountdownStatus,
    CountdownTimer, RELEASE_TEXT,
};
