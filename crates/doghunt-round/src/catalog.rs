//! The fixed zone catalog.
//!
//! A zone is a named region of the map. Its anchor is the position of the
//! door carrying the same name in the live world, so a catalog entry names
//! the zone and the world supplies the coordinates.

use std::collections::HashMap;

use doghunt_host::{Position, WorldControl};

/// Zone reserved for the hunter's start point.
pub const HUNTER_SPAWN_ZONE: &str = "939_CRYO";

/// Heavy containment zones the hunted faction is scattered across.
const HEAVY_CONTAINMENT: &[&str] = &[
    "096",
    "HCZ_ARMORY",
    "HID_CHAMBER",
    "HID_UPPER",
    "HID_LOWER",
    "CHECKPOINT_EZ_HCA_A",
];

/// An immutable list of zone names, defined at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneCatalog {
    zones: &'static [&'static str],
}

impl ZoneCatalog {
    /// The default catalog: six zones in heavy containment.
    pub const HEAVY_CONTAINMENT: Self = Self::new(HEAVY_CONTAINMENT);

    pub const fn new(zones: &'static [&'static str]) -> Self {
        Self { zones }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.zones.contains(&name)
    }
}

impl Default for ZoneCatalog {
    fn default() -> Self {
        Self::HEAVY_CONTAINMENT
    }
}

/// Anchor positions of the zones present in the current world.
///
/// Built from a single door enumeration. The first door carrying a name
/// wins, matching how the host resolves names.
pub(crate) struct Anchors {
    by_name: HashMap<String, Position>,
}

impl Anchors {
    pub(crate) fn resolve<W: WorldControl + ?Sized>(world: &W) -> Self {
        let mut by_name = HashMap::new();
        for door in world.doors() {
            by_name.entry(door.name).or_insert(door.position);
        }
        Self { by_name }
    }

    pub(crate) fn get(&self, zone: &str) -> Option<Position> {
        self.by_name.get(zone).copied()
    }
}
