//! Byte-offset tailing of append-only files.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;

/// Per-file byte-offset bookkeeping with truncation detection.
///
/// `offset` never exceeds the last observed size. The only non-monotonic
/// transition is the truncation reset, taken when the file shrinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TailCursor {
    /// Last byte position already consumed.
    offset: u64,

    /// File size observed on the previous poll.
    last_size: u64,
}

impl TailCursor {
    /// Record the current file size, resetting to the start when the file
    /// shrank. Returns true when truncation was detected.
    pub fn observe(&mut self, size: u64) -> bool {
        let truncated = size < self.last_size;
        if truncated {
            self.offset = 0;
        }
        self.last_size = size;
        truncated
    }

    /// Move the consumed position forward.
    pub fn advance(&mut self, to: u64) {
        debug_assert!(to <= self.last_size);
        self.offset = to;
    }

    /// Last byte position already consumed.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Incremental reader that turns newly appended bytes into complete lines.
#[derive(Debug)]
pub struct LogTail {
    path: PathBuf,
    cursor: TailCursor,
}

impl LogTail {
    /// Tail `path` from the beginning, replaying any existing content on
    /// the first poll.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor: TailCursor::default(),
        }
    }

    /// Tail `path` from its current end, ignoring existing content. A file
    /// that does not exist yet is tailed from the beginning once it appears.
    pub fn from_end(path: impl Into<PathBuf>) -> Self {
        let mut tail = Self::new(path);
        if let Ok(metadata) = std::fs::metadata(&tail.path) {
            tail.cursor.observe(metadata.len());
            tail.cursor.advance(metadata.len());
        }
        tail
    }

    /// Path being tailed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current cursor position.
    pub fn offset(&self) -> u64 {
        self.cursor.offset()
    }

    /// Complete lines appended since the last poll.
    ///
    /// A trailing line without a terminator is left in the file for a later
    /// poll; the cursor only advances past the last newline read. A file
    /// that cannot be opened (missing, locked) yields no lines and leaves
    /// the cursor untouched, so the next poll retries.
    pub fn poll(&mut self) -> Result<Vec<String>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) => {
                debug!(
                    path = %self.path.display(),
                    error = %err,
                    "source unavailable, skipping poll"
                );
                return Ok(Vec::new());
            }
        };

        let size = file.metadata()?.len();
        if self.cursor.observe(size) {
            info!(
                path = %self.path.display(),
                "file shrank, re-reading from the start"
            );
        }

        if size <= self.cursor.offset() {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.cursor.offset()))?;
        let mut buf = Vec::with_capacity((size - self.cursor.offset()) as usize);
        // Read no further than the probed size so a concurrent writer cannot
        // push a half-written line into this poll.
        file.take(size - self.cursor.offset())
            .read_to_end(&mut buf)?;

        let Some(last_newline) = buf.iter().rposition(|&b| b == b'\n') else {
            // Partial line only: consume nothing.
            return Ok(Vec::new());
        };

        let consumed = &buf[..=last_newline];
        self.cursor
            .advance(self.cursor.offset() + consumed.len() as u64);

        let text = String::from_utf8_lossy(consumed);
        let lines = text
            .split_terminator('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        Ok(lines)
    }
}
