//! One watch target: a source, its context window, and its classifier.

use std::path::PathBuf;

use crate::classify::SignatureClassifier;
use crate::config::{TargetConfig, TargetKind};
use crate::cursor::LogTail;
use crate::error::Result;
use crate::event::{Classification, UNCLASSIFIED_LABEL, WatchEvent};
use crate::scanner::TreeScanner;
use crate::window::ContextWindow;

enum Source {
    Log(LogTail),
    Tree(TreeScanner),
}

/// A monitored source with its classification pipeline.
///
/// Owned exclusively by one scheduling loop; all state (cursor or baseline,
/// context window) lives here rather than in globals, so targets never
/// interfere with each other.
pub struct WatchedTarget {
    name: String,
    kind: TargetKind,
    path: PathBuf,
    source: Source,
    window: ContextWindow,
    classifier: SignatureClassifier,
    emit_unmatched: bool,
}

impl WatchedTarget {
    /// Build the pipeline for one configured target.
    pub fn new(config: TargetConfig) -> Self {
        let name = config.name.clone();
        let kind = config.kind;
        let path = config.path.clone();
        let window = ContextWindow::new(config.context_capacity);
        let classifier = SignatureClassifier::new(config.signatures.clone());
        let emit_unmatched = config.emit_unmatched;

        let source = match config.kind {
            TargetKind::LogFile if config.replay_existing => Source::Log(LogTail::new(&config.path)),
            TargetKind::LogFile => Source::Log(LogTail::from_end(&config.path)),
            TargetKind::SourceTree => Source::Tree(TreeScanner::new(config)),
        };

        Self {
            name,
            kind,
            path,
            source,
            window,
            classifier,
            emit_unmatched,
        }
    }

    /// Target name as configured.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the target watches.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Poll the source once, classify new units, and assemble events.
    ///
    /// Every unit enters the context window whether or not it matches, so
    /// context accumulates across non-matching lines too.
    pub fn poll(&mut self) -> Result<Vec<WatchEvent>> {
        let mut events = Vec::new();

        match &mut self.source {
            Source::Log(tail) => {
                let path = tail.path().to_path_buf();
                for line in tail.poll()? {
                    self.window.push(line.clone());
                    let label = match self.classifier.classify(&line) {
                        Some(rule) => rule.label.clone(),
                        None if self.emit_unmatched => UNCLASSIFIED_LABEL.to_string(),
                        None => continue,
                    };
                    events.push(WatchEvent::new(
                        &self.name,
                        self.kind,
                        path.clone(),
                        Classification::new(label, line, self.window.snapshot()),
                    ));
                }
            }
            Source::Tree(scanner) => {
                for file in scanner.poll()? {
                    self.window.push(file.content.clone());
                    let label = match self.classifier.classify(&file.content) {
                        Some(rule) => rule.label.clone(),
                        None if self.emit_unmatched => UNCLASSIFIED_LABEL.to_string(),
                        None => continue,
                    };
                    events.push(WatchEvent::new(
                        &self.name,
                        self.kind,
                        file.path,
                        Classification::new(label, file.content, self.window.snapshot()),
                    ));
                }
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn append(path: &Path, content: &str) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_log_target_classifies_new_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.log");
        append(&path, "");

        let mut target =
            WatchedTarget::new(TargetConfig::log_file("editor", &path).replay_existing());

        append(&path, "foo\nERROR bar\n");
        let events = target.poll().unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].classification.label, "GenericError");
        assert_eq!(events[0].classification.line, "ERROR bar");
        assert_eq!(
            events[0].classification.context,
            vec!["foo".to_string(), "ERROR bar".to_string()]
        );
    }

    #[test]
    fn test_unmatched_log_lines_produce_no_events() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.log");

        let mut target =
            WatchedTarget::new(TargetConfig::log_file("editor", &path).replay_existing());

        append(&path, "calm\nquiet\n");
        assert!(target.poll().unwrap().is_empty());
    }

    #[test]
    fn test_context_accumulates_across_non_matches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.log");

        let mut target =
            WatchedTarget::new(TargetConfig::log_file("editor", &path).replay_existing());

        append(&path, "one\ntwo\nthree\nNullReferenceException: x\n");
        let events = target.poll().unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].classification.label, "NullReference");
        assert_eq!(
            events[0].classification.context,
            vec![
                "one".to_string(),
                "two".to_string(),
                "three".to_string(),
                "NullReferenceException: x".to_string(),
            ]
        );
    }

    #[test]
    fn test_tree_target_reports_unmatched_as_unclassified() {
        let dir = TempDir::new().unwrap();
        let mut target = WatchedTarget::new(
            TargetConfig::source_tree("scripts", dir.path()).with_extension("cs"),
        );

        // Baseline.
        assert!(target.poll().unwrap().is_empty());

        fs::write(dir.path().join("Player.cs"), "class Player {}").unwrap();
        let events = target.poll().unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].classification.label, UNCLASSIFIED_LABEL);
        assert!(events[0].path.ends_with("Player.cs"));
    }

    #[test]
    fn test_tree_target_classifies_matching_content() {
        let dir = TempDir::new().unwrap();
        let mut target = WatchedTarget::new(
            TargetConfig::source_tree("scripts", dir.path()).with_extension("cs"),
        );
        target.poll().unwrap();

        fs::write(
            dir.path().join("Broken.cs"),
            "class Broken {} // error CS0116 lives here",
        )
        .unwrap();
        let events = target.poll().unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].classification.label, "CompilationError");
    }
}
