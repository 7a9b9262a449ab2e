//! Plugin discovery
//!
//! A plugin source is either the compiled-in effect set or a directory of
//! JSON definition files. Each definition derives a new effect type from an
//! already known one (`base`) with its own default parameters:
//!
//! ```json
//! { "type": "StrongBlur", "base": "BlurEffect",
//!   "parameters": { "blur_limit": 15 }, "probability": 0.8 }
//! ```
//!
//! Every candidate is probed once when it is loaded: the base is
//! constructed, the parameters are applied strictly and the transform must
//! build. The probed instance becomes the prototype for every later
//! `construct` call.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::snapshot::{EffectRegistry, Factory};
use crate::effects::{builtin_constructors, builtin_kernel, Effect, ParamMap, PresetEffect, RESERVED_KEYS};
use crate::error::{AugError, Result};

/// Where effect types come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginSource {
    /// The compiled-in effect set
    Builtin,
    /// A directory of `*.json` definition files, walked recursively
    Directory(PathBuf),
}

impl fmt::Display for PluginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginSource::Builtin => write!(f, "builtin"),
            PluginSource::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One effect type declared in a plugin file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginDefinition {
    #[serde(rename = "type")]
    pub type_name: String,
    pub base: String,
    #[serde(default)]
    pub parameters: ParamMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PluginFile {
    One(PluginDefinition),
    Many(Vec<PluginDefinition>),
}

impl PluginFile {
    fn into_definitions(self) -> Vec<PluginDefinition> {
        match self {
            PluginFile::One(def) => vec![def],
            PluginFile::Many(defs) => defs,
        }
    }
}

/// A type that made it into the snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedEffect {
    pub name: String,
    pub source: String,
}

/// A candidate that was skipped, with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub source: String,
    pub reason: String,
}

/// A type registered more than once; the later source won
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverriddenEffect {
    pub name: String,
    pub previous_source: String,
    pub source: String,
}

/// Aggregated outcome of a discovery pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveryReport {
    pub loaded: Vec<LoadedEffect>,
    pub skipped: Vec<SkippedCandidate>,
    pub overridden: Vec<OverriddenEffect>,
}

impl DiscoveryReport {
    fn skip(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        let skipped = SkippedCandidate {
            source: source.into(),
            reason: reason.into(),
        };
        log::warn!("Skipping plugin candidate {}: {}", skipped.source, skipped.reason);
        self.skipped.push(skipped);
    }

    /// Names of the loaded types, in registration order
    pub fn loaded_names(&self) -> Vec<&str> {
        self.loaded.iter().map(|l| l.name.as_str()).collect()
    }

    /// True when nothing was skipped
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A registry snapshot together with how it was built
#[derive(Debug, Clone)]
pub struct Discovery {
    pub registry: EffectRegistry,
    pub report: DiscoveryReport,
}

/// Build a fresh registry snapshot from `sources`, scanned in order
///
/// Never fails: bad candidates are recorded in the report and skipped.
pub fn discover(sources: &[PluginSource]) -> Discovery {
    let mut discovery = Discovery {
        registry: EffectRegistry::new(),
        report: DiscoveryReport::default(),
    };

    for source in sources {
        match source {
            PluginSource::Builtin => register_builtin(&mut discovery),
            PluginSource::Directory(dir) => scan_directory(&mut discovery, dir),
        }
    }

    log::info!(
        "Discovered {} effect types ({} candidates skipped, {} overridden)",
        discovery.registry.len(),
        discovery.report.skipped.len(),
        discovery.report.overridden.len()
    );
    discovery
}

fn register(discovery: &mut Discovery, name: &str, source: &str, factory: Factory) {
    if let Some(previous_source) = discovery.registry.insert(name, source, factory) {
        log::info!("Effect type '{}' from {} overrides {}", name, source, previous_source);
        discovery.report.overridden.push(OverriddenEffect {
            name: name.to_string(),
            previous_source,
            source: source.to_string(),
        });
    }
    log::debug!("Registered effect type '{}' from {}", name, source);
    discovery.report.loaded.push(LoadedEffect {
        name: name.to_string(),
        source: source.to_string(),
    });
}

fn register_builtin(discovery: &mut Discovery) {
    let source = PluginSource::Builtin.to_string();
    for (name, construct) in builtin_constructors() {
        let factory: Factory = Arc::new(construct);
        register(discovery, name, &source, factory);
    }
}

fn scan_directory(discovery: &mut Discovery, dir: &Path) {
    if !dir.is_dir() {
        discovery
            .report
            .skip(dir.display().to_string(), "not a directory");
        return;
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let source = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| dir.display().to_string());
                discovery.report.skip(source, e.to_string());
                continue;
            }
        };
        if entry.file_type().is_file() && is_definition_file(entry.path()) {
            load_file(discovery, entry.path());
        }
    }
}

fn is_definition_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Parse a definition file without registering anything
pub fn read_definitions(path: &Path) -> Result<Vec<PluginDefinition>> {
    let text = fs::read_to_string(path).map_err(|e| AugError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: PluginFile =
        serde_json::from_str(&text).map_err(|e| AugError::InvalidPlugin {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(file.into_definitions())
}

fn load_file(discovery: &mut Discovery, path: &Path) {
    let file_source = path.display().to_string();
    let definitions = match read_definitions(path) {
        Ok(defs) => defs,
        Err(e) => {
            discovery.report.skip(file_source, e.to_string());
            return;
        }
    };

    for def in definitions {
        let source = format!("{}#{}", file_source, def.type_name);
        match probe(&discovery.registry, &def) {
            Ok(prototype) => {
                let factory: Factory = Arc::new(move || prototype.box_clone());
                register(discovery, &def.type_name, &file_source, factory);
            }
            Err(e) => discovery.report.skip(source, e.to_string()),
        }
    }
}

/// Capability probe: the definition must yield a working effect
fn probe(registry: &EffectRegistry, def: &PluginDefinition) -> Result<Box<dyn Effect>> {
    if def.type_name.trim().is_empty() {
        return Err(AugError::InvalidPlugin {
            source_name: def.base.clone(),
            reason: "empty type name".to_string(),
        });
    }

    let mut effect = registry
        .construct_default(&def.base)
        .or_else(|| builtin_kernel(&def.base))
        .ok_or_else(|| AugError::UnknownEffect {
            effect_type: def.base.clone(),
        })?;

    for (name, value) in &def.parameters {
        if RESERVED_KEYS.contains(&name.as_str()) {
            return Err(AugError::InvalidPlugin {
                source_name: def.type_name.clone(),
                reason: format!("'{}' is not a parameter; set it at the top level", name),
            });
        }
        effect.set_param(name, value)?;
    }
    if let Some(probability) = def.probability {
        effect.set_probability(probability);
    }
    if let Some(enabled) = def.enabled {
        effect.set_enabled(enabled);
    }
    effect.build_transform()?;

    let display_name = def
        .display_name
        .clone()
        .unwrap_or_else(|| def.type_name.clone());
    Ok(Box::new(PresetEffect::new(
        def.type_name.clone(),
        display_name,
        effect,
    )))
}
