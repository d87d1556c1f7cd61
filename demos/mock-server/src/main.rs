//! Runs one Dog Hunt round against an in-memory facility and prints where
//! everyone ended up.

use std::sync::Arc;
use std::time::Duration;

use doghunt::prelude::*;
use doghunt_host::memory::{InMemoryHost, StaticSender};
use doghunt_host::DoorKind;

// ---------------------------------------------------------------------------
// Facility
// ---------------------------------------------------------------------------

fn facility() -> InMemoryHost {
    let host = InMemoryHost::new();
    let zones = [
        ("096", Position::new(12.0, -998.0, 40.0)),
        ("HCZ_ARMORY", Position::new(-20.0, -998.0, 61.5)),
        ("HID_CHAMBER", Position::new(33.0, -998.0, -8.0)),
        ("HID_UPPER", Position::new(36.0, -994.0, -8.0)),
        ("HID_LOWER", Position::new(36.0, -1002.0, -8.0)),
        ("CHECKPOINT_EZ_HCA_A", Position::new(80.0, -998.0, 0.0)),
    ];
    for (name, position) in zones {
        let kind = if name.starts_with("CHECKPOINT") {
            DoorKind::Checkpoint
        } else {
            DoorKind::Standard
        };
        host.add_door(name, kind, position);
    }
    host.add_door("939_CRYO", DoorKind::Standard, Position::new(-5.0, -998.0, 25.0));
    host.add_door("ELEV_HCZ_A", DoorKind::Elevator, Position::new(0.0, -998.0, 90.0));

    for id in 1..=5 {
        host.add_player_with(PlayerId(id), Role::Spectator, &["keycard", "flashlight"]);
    }
    for _ in 0..8 {
        host.add_pickup();
    }
    host
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    doghunt::logging::init();
    tracing::info!(plugin = PLUGIN.name, version = PLUGIN.version, "loading");

    let host = Arc::new(facility());
    let config = RoundConfig {
        countdown: CountdownConfig {
            duration_secs: 5,
            interval: Duration::from_millis(200),
            ..CountdownConfig::default()
        },
        ..RoundConfig::default()
    };
    let command = DogHuntCommand::try_new(Arc::clone(&host), config)?;

    let response = command.execute(&[], &StaticSender::admin());
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(mut countdown) = command.rounds().countdown() {
        // Someone connects mid-countdown and still hears the release.
        tokio::time::sleep(Duration::from_millis(500)).await;
        host.add_player(PlayerId(6));

        let state = countdown.finished().await;
        tracing::info!(%state, "countdown finished");
    }
    command.rounds().shutdown().await;

    println!("{}", serde_json::to_string_pretty(&host.snapshot())?);
    Ok(())
}
