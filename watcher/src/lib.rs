//! # Vigil Watcher
//!
//! Core watch-classify engine for Vigil. It turns append-only log files and
//! source trees into ordered sequences of classified events, keeping a
//! bounded window of recent lines as context for every match.
//!
//! ## Features
//!
//! - **Incremental Tailing**: only newly appended bytes are read
//! - **Truncation Recovery**: rotated or wiped files restart from byte 0
//! - **Directory Diffing**: added or modified files detected by timestamp
//! - **Ordered Signatures**: first-match-wins classification
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Watched Target                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  LogTail / TreeScanner ──► ContextWindow ──► Classifier        │
//! │          │                      │                 │             │
//! │          ▼                      ▼                 ▼             │
//! │     TailCursor              snapshot()        WatchEvent        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod classify;
pub mod config;
pub mod cursor;
pub mod error;
pub mod event;
pub mod scanner;
pub mod target;
pub mod window;

pub use classify::{SignatureClassifier, SignatureRule};
pub use config::{DEFAULT_CONTEXT_CAPACITY, TargetConfig, TargetKind};
pub use cursor::{LogTail, TailCursor};
pub use error::{Result, WatchError};
pub use event::{Classification, UNCLASSIFIED_LABEL, WatchEvent};
pub use scanner::{ChangedFile, TreeScanner};
pub use target::WatchedTarget;
pub use window::ContextWindow;
