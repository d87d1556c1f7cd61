//! Scattering the hunted faction across the zone catalog.

use doghunt_host::{PlayerId, Position, WorldControl};
use rand::Rng;
use serde::Serialize;

use crate::catalog::{Anchors, ZoneCatalog};

/// Where one hunted participant goes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub player: PlayerId,
    /// The zone drawn for this participant. `None` once the pool ran dry.
    pub zone: Option<&'static str>,
    /// Lifted zone anchor, or origin when there is no zone or the zone's
    /// anchor is missing from the world.
    pub position: Position,
}

/// Placements for the whole hunted faction, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZoneAssignment {
    placements: Vec<Placement>,
}

impl ZoneAssignment {
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn position_of(&self, player: PlayerId) -> Option<Position> {
        self.find(player).map(|p| p.position)
    }

    pub fn zone_of(&self, player: PlayerId) -> Option<&'static str> {
        self.find(player).and_then(|p| p.zone)
    }

    /// Participants who got the fallback because the pool was exhausted.
    pub fn unzoned(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.placements
            .iter()
            .filter(|p| p.zone.is_none())
            .map(|p| p.player)
    }

    fn find(&self, player: PlayerId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.player == player)
    }
}

/// Draws zones without replacement.
pub struct ZoneAssigner<'a> {
    catalog: &'a ZoneCatalog,
    lift: f32,
}

impl<'a> ZoneAssigner<'a> {
    pub fn new(catalog: &'a ZoneCatalog, lift: f32) -> Self {
        Self { catalog, lift }
    }

    /// Assigns each of `hunted`, in order, a zone drawn uniformly from the
    /// zones not yet drawn. Once the pool is empty the rest get origin.
    pub fn assign<W, R>(&self, hunted: &[PlayerId], world: &W, rng: &mut R) -> ZoneAssignment
    where
        W: WorldControl + ?Sized,
        R: Rng,
    {
        let anchors = Anchors::resolve(world);

        let mut pool: Vec<&'static str> = Vec::with_capacity(self.catalog.len());
        for &name in self.catalog.names() {
            if !pool.contains(&name) {
                pool.push(name);
            }
        }

        let placements = hunted
            .iter()
            .map(|&player| {
                if pool.is_empty() {
                    tracing::debug!(%player, "zone pool exhausted, using fallback position");
                    return Placement {
                        player,
                        zone: None,
                        position: Position::ORIGIN,
                    };
                }

                let zone = pool.swap_remove(rng.random_range(0..pool.len()));
                let position = match anchors.get(zone) {
                    Some(anchor) => anchor.lifted(self.lift),
                    None => {
                        tracing::warn!(%player, zone, "zone anchor missing, using fallback position");
                        Position::ORIGIN
                    }
                };
                Placement {
                    player,
                    zone: Some(zone),
                    position,
                }
            })
            .collect();

        ZoneAssignment { placements }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use doghunt_host::memory::InMemoryHost;
    use doghunt_host::DoorKind;

    use super::*;

    fn world_with_catalog() -> InMemoryHost {
        let host = InMemoryHost::new();
        for (i, name) in ZoneCatalog::HEAVY_CONTAINMENT.names().iter().enumerate() {
            host.add_door(name, DoorKind::Standard, Position::new(i as f32 * 10.0, 0.0, 0.0));
        }
        host
    }

    fn ids(n: u64) -> Vec<PlayerId> {
        (1..=n).map(PlayerId).collect()
    }

    #[test]
    fn test_up_to_catalog_size_gets_distinct_zones() {
        let host = world_with_catalog();
        let catalog = ZoneCatalog::default();
        let assigner = ZoneAssigner::new(&catalog, 1.0);

        for n in 0..=6 {
            let out = assigner.assign(&ids(n), &host, &mut rand::rng());
            assert_eq!(out.len(), n as usize);
            let zones: HashSet<_> = out.placements().iter().map(|p| p.zone.unwrap()).collect();
            assert_eq!(zones.len(), n as usize);
            assert!(zones.iter().all(|z| catalog.contains(z)));
        }
    }

    #[test]
    fn test_overflow_gets_fallback_in_input_order() {
        let host = world_with_catalog();
        let catalog = ZoneCatalog::default();
        let hunted = ids(9);

        let out = ZoneAssigner::new(&catalog, 1.0).assign(&hunted, &host, &mut rand::rng());

        let zoned: Vec<_> = out.placements().iter().filter(|p| p.zone.is_some()).map(|p| p.player).collect();
        assert_eq!(zoned, hunted[..6].to_vec());
        let unzoned: Vec<_> = out.unzoned().collect();
        assert_eq!(unzoned, hunted[6..].to_vec());
        for p in &hunted[6..] {
            assert_eq!(out.position_of(*p), Some(Position::ORIGIN));
        }
    }

    #[test]
    fn test_positions_are_lifted_anchors() {
        let host = world_with_catalog();
        let catalog = ZoneCatalog::default();

        let out = ZoneAssigner::new(&catalog, 1.0).assign(&ids(6), &host, &mut rand::rng());

        for placement in out.placements() {
            let anchor = host.door_position(placement.zone.unwrap()).unwrap();
            assert_eq!(placement.position, anchor.lifted(1.0));
        }
    }

    #[test]
    fn test_missing_anchor_falls_back_but_consumes_zone() {
        let host = InMemoryHost::new();
        let catalog = ZoneCatalog::default();

        let out = ZoneAssigner::new(&catalog, 1.0).assign(&ids(6), &host, &mut rand::rng());

        let zones: HashSet<_> = out.placements().iter().filter_map(|p| p.zone).collect();
        assert_eq!(zones.len(), 6);
        assert!(out.placements().iter().all(|p| p.position == Position::ORIGIN));
    }

    #[test]
    fn test_duplicate_catalog_names_are_drawn_once() {
        static DUPES: &[&str] = &["A", "A", "B"];
        let catalog = ZoneCatalog::new(DUPES);
        let host = InMemoryHost::new();

        let out = ZoneAssigner::new(&catalog, 1.0).assign(&ids(3), &host, &mut rand::rng());

        let zones: Vec<_> = out.placements().iter().filter_map(|p| p.zone).collect();
        assert_eq!(zones.len(), 2);
        assert_ne!(zones[0], zones[1]);
    }

    #[test]
    fn test_first_participant_sees_every_zone_over_many_trials() {
        let host = world_with_catalog();
        let catalog = ZoneCatalog::default();
        let assigner = ZoneAssigner::new(&catalog, 1.0);
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for _ in 0..1000 {
            let out = assigner.assign(&ids(1), &host, &mut rand::rng());
            *counts.entry(out.zone_of(PlayerId(1)).unwrap()).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
    }
}
