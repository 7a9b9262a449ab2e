//! Effect registry
//!
//! Maps effect type names to constructors. A registry is built wholesale by
//! [`discover`]-ing a list of plugin sources and is immutable afterwards;
//! refreshing means building a new one and swapping it in (see [`global`]).
//!
//! Sources are scanned in order and the last registration of a name wins.

pub mod global;
mod plugin;
mod snapshot;

pub use plugin::{
    discover, read_definitions, Discovery, DiscoveryReport, LoadedEffect, OverriddenEffect,
    PluginDefinition, PluginSource, SkippedCandidate,
};
pub use snapshot::EffectRegistry;
