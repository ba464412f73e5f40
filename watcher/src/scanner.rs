//! Directory-diff change detection.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::TargetConfig;
use crate::error::Result;

/// A file reported by the tree scanner.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    /// Full path to the file.
    pub path: PathBuf,

    /// Whole-file content at report time.
    pub content: String,
}

/// Detects added or modified files by diffing modification times against a
/// remembered baseline.
///
/// The first poll is the baseline run: it records a timestamp for every
/// matching file and reports nothing, so pre-existing files do not flood
/// the sinks at startup. Deletions are not detectable from a timestamp map
/// and are never reported.
pub struct TreeScanner {
    config: TargetConfig,
    stamps: HashMap<PathBuf, SystemTime>,
    primed: bool,
}

impl TreeScanner {
    /// Create a scanner for a source-tree target.
    pub fn new(config: TargetConfig) -> Self {
        Self {
            config,
            stamps: HashMap::new(),
            primed: false,
        }
    }

    /// Number of files currently tracked.
    pub fn tracked(&self) -> usize {
        self.stamps.len()
    }

    /// Files that are new or modified since the previous poll.
    ///
    /// Every changed file is reported in the same poll; relative order
    /// between them follows directory traversal and is not guaranteed. A
    /// missing root directory is a soft failure: nothing is reported and
    /// the baseline is kept for the next poll.
    pub fn poll(&mut self) -> Result<Vec<ChangedFile>> {
        if !self.config.path.exists() {
            debug!(
                path = %self.config.path.display(),
                "tree root unavailable, skipping poll"
            );
            return Ok(Vec::new());
        }

        let baseline = !self.primed;
        self.primed = true;

        let mut changed = Vec::new();

        for entry in WalkDir::new(&self.config.path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if self.config.should_exclude(path) || !self.config.matches_extension(path) {
                continue;
            }

            let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) else {
                continue;
            };

            if self.stamps.get(path) == Some(&modified) {
                continue;
            }
            self.stamps.insert(path.to_path_buf(), modified);

            if baseline {
                continue;
            }

            match std::fs::read(path) {
                Ok(bytes) => changed.push(ChangedFile {
                    path: path.to_path_buf(),
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                }),
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "changed file unreadable, skipping"
                    );
                }
            }
        }

        Ok(changed)
    }
}
