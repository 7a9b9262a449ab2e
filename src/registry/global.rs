//! Process-wide registry
//!
//! Holds the current snapshot behind a lock. Readers clone the `Arc` and
//! keep working on that snapshot; `init` and `refresh` build a complete new
//! snapshot outside the lock and swap it in, so nobody ever observes a
//! partially populated registry.

use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::plugin::{discover, read_definitions, DiscoveryReport, PluginSource};
use super::snapshot::EffectRegistry;
use crate::effects::Effect;
use crate::error::{AugError, Result};

struct GlobalRegistry {
    sources: Vec<PluginSource>,
    snapshot: Arc<EffectRegistry>,
}

static REGISTRY: OnceLock<RwLock<GlobalRegistry>> = OnceLock::new();

fn cell() -> &'static RwLock<GlobalRegistry> {
    REGISTRY.get_or_init(|| {
        let sources = vec![PluginSource::Builtin];
        let snapshot = Arc::new(discover(&sources).registry);
        RwLock::new(GlobalRegistry { sources, snapshot })
    })
}

// A panic while holding the lock cannot leave a half-swapped snapshot behind,
// so poisoning is ignored.
fn read() -> RwLockReadGuard<'static, GlobalRegistry> {
    cell().read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write() -> RwLockWriteGuard<'static, GlobalRegistry> {
    cell().write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Replace the registry with one discovered from `sources`
pub fn init(sources: Vec<PluginSource>) -> DiscoveryReport {
    let discovery = discover(&sources);
    let mut global = write();
    global.sources = sources;
    global.snapshot = Arc::new(discovery.registry);
    discovery.report
}

/// Rediscover the current sources and swap in the result
pub fn refresh() -> DiscoveryReport {
    update_sources(|current| current.to_vec())
}

/// Discover from `edit(current sources)` and swap the result in
///
/// Discovery runs without the lock held. If another caller replaced the
/// sources meanwhile, the edit is reapplied to the new list and discovery
/// runs again, so concurrent updates never drop each other's sources.
fn update_sources<F>(edit: F) -> DiscoveryReport
where
    F: Fn(&[PluginSource]) -> Vec<PluginSource>,
{
    loop {
        let before = sources();
        let after = edit(&before);
        let discovery = discover(&after);

        let mut global = write();
        if global.sources == before {
            global.sources = after;
            global.snapshot = Arc::new(discovery.registry);
            return discovery.report;
        }
        log::debug!("Plugin sources changed during discovery, rediscovering");
    }
}

/// The current snapshot
///
/// Lazily initialised with the built-in effect set if `init` was never called.
pub fn snapshot() -> Arc<EffectRegistry> {
    Arc::clone(&read().snapshot)
}

/// The sources the current snapshot was discovered from
pub fn sources() -> Vec<PluginSource> {
    read().sources.clone()
}

/// Construct an effect from the current snapshot
pub fn construct(type_name: &str, probability: f64, enabled: bool) -> Option<Box<dyn Effect>> {
    snapshot().construct(type_name, probability, enabled)
}

/// Copy a definition file into `dest_dir` and refresh
///
/// The file must parse as a definition file. `dest_dir` becomes a plugin
/// source if it was not one already.
pub fn import_plugin(file: &Path, dest_dir: &Path) -> Result<DiscoveryReport> {
    if !file.is_file() {
        return Err(AugError::FileNotFound {
            path: file.to_path_buf(),
        });
    }
    let definitions = read_definitions(file)?;
    let file_name = file.file_name().ok_or_else(|| AugError::InvalidPlugin {
        source_name: file.display().to_string(),
        reason: "no file name".to_string(),
    })?;

    fs::create_dir_all(dest_dir).map_err(|e| AugError::DirectoryCreate {
        path: dest_dir.to_path_buf(),
        source: e,
    })?;
    let dest = dest_dir.join(file_name);
    fs::copy(file, &dest).map_err(|e| AugError::FileWrite {
        path: dest.clone(),
        source: e,
    })?;
    log::info!(
        "Imported {} plugin definition(s) into {}",
        definitions.len(),
        dest.display()
    );

    let source = PluginSource::Directory(dest_dir.to_path_buf());
    Ok(update_sources(|current| {
        let mut sources = current.to_vec();
        if !sources.contains(&source) {
            sources.push(source.clone());
        }
        sources
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // The registry is process-wide, so the lifecycle is exercised in a single test.
    #[test]
    fn test_global_lifecycle() {
        assert!(snapshot().contains("BlurEffect"));
        let before = snapshot();

        let incoming = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let file = incoming.path().join("soft.json");
        fs::write(&file, r#"{"type": "SoftBlur", "base": "BlurEffect"}"#).unwrap();

        let report = import_plugin(&file, plugins.path()).unwrap();
        assert!(report.loaded_names().contains(&"SoftBlur"));
        assert!(plugins.path().join("soft.json").is_file());
        assert!(construct("SoftBlur", 1.0, true).is_some());

        // Snapshots taken earlier are unaffected by the swap
        assert!(!before.contains("SoftBlur"));

        let broken = incoming.path().join("broken.json");
        fs::write(&broken, "[").unwrap();
        assert!(import_plugin(&broken, plugins.path()).is_err());

        init(vec![PluginSource::Builtin]);
        assert!(construct("SoftBlur", 1.0, true).is_none());
        assert_eq!(refresh().loaded.len(), snapshot().len());

        // Concurrent imports into different directories all stay registered
        let targets: Vec<TempDir> = (0..4).map(|_| TempDir::new().unwrap()).collect();
        std::thread::scope(|scope| {
            for (i, target) in targets.iter().enumerate() {
                let file = incoming.path().join(format!("parallel_{}.json", i));
                fs::write(&file, format!(r#"{{"type": "Parallel{}", "base": "RotateEffect"}}"#, i))
                    .unwrap();
                scope.spawn(move || import_plugin(&file, target.path()).unwrap());
            }
        });
        let current = sources();
        for (i, target) in targets.iter().enumerate() {
            assert!(current.contains(&PluginSource::Directory(target.path().to_path_buf())));
            assert!(snapshot().contains(&format!("Parallel{}", i)));
        }
        assert_eq!(current.len(), 1 + targets.len());
    }
}
