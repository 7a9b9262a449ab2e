//! Output file naming
//!
//! `aug_{copy}_{timestamp}-{seq}_{base}{ext}` for images and the same stem
//! with `.txt` for labels. `seq` counts up per run, so two copies written in
//! the same timestamp tick still get distinct names.

use std::path::Path;

use chrono::Local;

/// Local time with microseconds, e.g. `20240131_235959_123456`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// File names for one generated copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    pub image: String,
    pub label: String,
}

/// Build the stem for a generated copy
pub fn output_stem(copy_index: usize, timestamp: &str, sequence: u64, base: &str) -> String {
    format!("aug_{}_{}-{:06}_{}", copy_index, timestamp, sequence, base)
}

/// Hands out output names for one run
#[derive(Debug, Default)]
pub struct OutputNamer {
    sequence: u64,
}

impl OutputNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names for copy `copy_index` of `source`
    pub fn next(&mut self, copy_index: usize, source: &Path) -> OutputName {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let base = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let stem = output_stem(copy_index, &timestamp, self.sequence, &base);
        self.sequence += 1;
        OutputName {
            image: format!("{}{}", stem, ext),
            label: format!("{}.txt", stem),
        }
    }
}
