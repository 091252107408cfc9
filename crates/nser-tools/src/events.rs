//! Events - live output and completion notifications for runs
//!
//! The runner only needs a publish-only [`EventSink`]. [`EventBus`] is the
//! in-process implementation, fanning events out to any number of
//! subscribers via `tokio::broadcast`.

use crate::runner::RunResult;
use serde::Serialize;
use tokio::sync::broadcast;

/// Events emitted while a streaming run executes.
///
/// For a given run id, `Output` events arrive in the order the process
/// wrote the lines, and exactly one `Done` follows them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolEvent {
    /// One line of merged stdout/stderr
    Output {
        /// Run the line belongs to
        run_id: i64,
        /// Line content without the trailing newline
        line: String,
    },
    /// Final result of the run
    Done(RunResult),
}

impl ToolEvent {
    /// Run id carried by any event variant
    #[must_use]
    pub fn run_id(&self) -> i64 {
        match self {
            Self::Output { run_id, .. } => *run_id,
            Self::Done(result) => result.run_id,
        }
    }

    /// Topic name: `tool:output:<id>` or `tool:done:<id>`
    #[must_use]
    pub fn topic(&self) -> String {
        match self {
            Self::Output { run_id, .. } => format!("tool:output:{run_id}"),
            Self::Done(result) => format!("tool:done:{}", result.run_id),
        }
    }

    /// Whether this is the terminal event of its run
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Fire-and-forget destination for run events
pub trait EventSink: Send + Sync {
    /// Publish an event. Delivery is not acknowledged.
    fn publish(&self, event: ToolEvent);
}

/// Broadcast-based event bus.
///
/// Slow subscribers miss events (lagged) rather than blocking the publisher.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ToolEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all future events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ToolEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all active subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: ToolEvent) -> usize {
        // send() returns Err if there are no receivers, which is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Get the current number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: ToolEvent) {
        EventBus::publish(self, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nser_replay::RunStatus;

    fn done(run_id: i64) -> ToolEvent {
        ToolEvent::Done(RunResult {
            run_id,
            tool_name: "dig".to_string(),
            target: "example.com".to_string(),
            command_line: "dig example.com".to_string(),
            status: RunStatus::Completed,
            output: "ok".to_string(),
            duration_ms: 12,
            exit_code: 0,
        })
    }

    #[test]
    fn test_topics() {
        let output = ToolEvent::Output {
            run_id: 7,
            line: "A".to_string(),
        };
        assert_eq!(output.topic(), "tool:output:7");
        assert_eq!(done(7).topic(), "tool:done:7");
        assert_eq!(output.run_id(), 7);
        assert!(done(7).is_done());
        assert!(!output.is_done());
    }

    #[tokio::test]
    async fn test_publish_subscribe_in_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        for line in ["A", "B"] {
            bus.publish(ToolEvent::Output {
                run_id: 1,
                line: line.to_string(),
            });
        }
        bus.publish(done(1));

        let mut seen = Vec::new();
        loop {
            match rx.recv().await.unwrap() {
                ToolEvent::Output { line, .. } => seen.push(line),
                ToolEvent::Done(result) => {
                    assert_eq!(result.run_id, 1);
                    break;
                }
            }
        }
        assert_eq!(seen, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(done(3)), 2);
        assert_eq!(rx1.recv().await.unwrap().run_id(), 3);
        assert_eq!(rx2.recv().await.unwrap().run_id(), 3);
    }

    #[test]
    fn test_publish_no_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(done(1)), 0);

        let sink: &dyn EventSink = &bus;
        sink.publish(done(2));
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(ToolEvent::Output {
            run_id: 5,
            line: "22/tcp open ssh".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "output");
        assert_eq!(json["run_id"], 5);

        let json = serde_json::to_value(done(5)).unwrap();
        assert_eq!(json["type"], "done");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["duration_ms"], 12);
    }
}
