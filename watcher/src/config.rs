//! Configuration types for watch targets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::SignatureRule;

/// Default number of context lines retained per target.
pub const DEFAULT_CONTEXT_CAPACITY: usize = 5;

/// Configuration for a single monitored source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Name identifying the target in events and logs.
    pub name: String,

    /// Path to the log file or the root of the source tree.
    pub path: PathBuf,

    /// What kind of source this is.
    pub kind: TargetKind,

    /// File extensions to include, without the leading dot (source trees only).
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Glob patterns to exclude (source trees only).
    #[serde(default = "default_excludes")]
    pub exclude_patterns: Vec<String>,

    /// How many lines of recent history to keep as context.
    #[serde(default = "default_context_capacity")]
    pub context_capacity: usize,

    /// Whether to re-read content that existed before the watch started
    /// (log files only).
    #[serde(default)]
    pub replay_existing: bool,

    /// Whether units matching no signature still produce an event.
    #[serde(default)]
    pub emit_unmatched: bool,

    /// Ordered signature table; earlier entries take priority.
    #[serde(default = "SignatureRule::default_table")]
    pub signatures: Vec<SignatureRule>,
}

fn default_context_capacity() -> usize {
    DEFAULT_CONTEXT_CAPACITY
}

fn default_excludes() -> Vec<String> {
    vec![
        // Version control
        "**/.git/**".to_string(),
        "**/.svn/**".to_string(),
        // Dependencies
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        // Build artifacts
        "**/build/**".to_string(),
        "**/obj/**".to_string(),
        "**/__pycache__/**".to_string(),
        // Editor droppings
        "**/*.swp".to_string(),
        "**/*~".to_string(),
        // Temporary files
        "**/*.tmp".to_string(),
    ]
}

impl TargetConfig {
    /// Create a config for a single append-only log file.
    pub fn log_file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: TargetKind::LogFile,
            extensions: Vec::new(),
            exclude_patterns: Vec::new(),
            context_capacity: DEFAULT_CONTEXT_CAPACITY,
            replay_existing: false,
            emit_unmatched: false,
            signatures: SignatureRule::default_table(),
        }
    }

    /// Create a config for a recursively scanned source tree.
    ///
    /// Tree targets default to reporting every changed file, even when no
    /// signature matches its content.
    pub fn source_tree(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: TargetKind::SourceTree,
            extensions: Vec::new(),
            exclude_patterns: default_excludes(),
            context_capacity: DEFAULT_CONTEXT_CAPACITY,
            replay_existing: false,
            emit_unmatched: true,
            signatures: SignatureRule::default_table(),
        }
    }

    /// Restrict the tree scan to one extension (may be called repeatedly).
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Set the context window capacity.
    pub fn with_context_capacity(mut self, capacity: usize) -> Self {
        self.context_capacity = capacity;
        self
    }

    /// Replace the signature table.
    pub fn with_signatures(mut self, signatures: Vec<SignatureRule>) -> Self {
        self.signatures = signatures;
        self
    }

    /// Re-read content that existed before the watch started.
    pub fn replay_existing(mut self) -> Self {
        self.replay_existing = true;
        self
    }

    /// Set whether unmatched units still produce an event.
    pub fn with_emit_unmatched(mut self, emit: bool) -> Self {
        self.emit_unmatched = emit;
        self
    }

    /// Check if a path should be excluded from the tree scan.
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob) = glob::Pattern::new(pattern) {
                if glob.matches(&path_str) {
                    return true;
                }
            }
        }

        false
    }

    /// Check if a path passes the extension filter. An empty filter passes
    /// everything.
    pub fn matches_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}

/// What kind of source a target watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A single append-only file, tailed by byte offset.
    LogFile,

    /// A directory tree, diffed by modification timestamp.
    SourceTree,
}
