//! Think-then-react wiring for the inference boundary.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use vigil_sinks::{EventSink, InferenceBridge, StreamSink};
use vigil_watcher::{TargetKind, WatchEvent};

/// Sink adapter that asks the inference collaborator about an event and
/// forwards the reply to the delivery channel.
///
/// Runs entirely inside the dispatch task for the event, so a slow
/// inference call never blocks polling; it owns no watch state.
pub struct Responder {
    bridge: InferenceBridge,
    delivery: Arc<StreamSink>,
}

impl Responder {
    /// Wire a bridge to a delivery stream.
    pub fn new(bridge: InferenceBridge, delivery: Arc<StreamSink>) -> Self {
        Self { bridge, delivery }
    }
}

fn prompt_for(event: &WatchEvent) -> String {
    match event.kind {
        TargetKind::LogFile => format!(
            "System Error:\n{}",
            event.classification.context.join("\n")
        ),
        TargetKind::SourceTree => format!(
            "Review this code for bugs. Be concise.\nFILE: {}\n{}",
            event.path.display(),
            event.classification.line
        ),
    }
}

#[async_trait]
impl EventSink for Responder {
    fn name(&self) -> &str {
        "responder"
    }

    async fn send(&self, event: &WatchEvent) {
        let prompt = prompt_for(event);
        debug!(name = %event.target, "requesting inference");

        match self.bridge.request(&prompt).await {
            Ok(reply) => self.delivery.deliver(&reply).await,
            Err(err) => {
                warn!(name = %event.target, error = %err, "inference failed, dropping reaction");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vigil_watcher::Classification;

    #[test]
    fn test_log_prompt_carries_the_context() {
        let event = WatchEvent::new(
            "editor",
            TargetKind::LogFile,
            "/var/log/editor.log",
            Classification::new(
                "GenericError",
                "Error: boom",
                vec!["before".to_string(), "Error: boom".to_string()],
            ),
        );

        assert_eq!(prompt_for(&event), "System Error:\nbefore\nError: boom");
    }

    #[test]
    fn test_tree_prompt_carries_the_file() {
        let event = WatchEvent::new(
            "scripts",
            TargetKind::SourceTree,
            "/projects/game/Player.cs",
            Classification::new("Unclassified", "class Player {}", vec![]),
        );

        let prompt = prompt_for(&event);
        assert!(prompt.starts_with("Review this code for bugs."));
        assert!(prompt.contains("/projects/game/Player.cs"));
        assert!(prompt.contains("class Player {}"));
    }
}
