use serde::Serialize;

/// Metadata the host shows in its plugin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

pub const PLUGIN: PluginInfo = PluginInfo {
    name: "DogHunt",
    version: env!("CARGO_PKG_VERSION"),
    description: "Dog searches for players around heavy",
};
