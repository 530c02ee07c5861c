//! Progress Notices
//!
//! Human-readable progress events emitted per turn for live display. These
//! are observational outputs only; nothing in the session loop depends on a
//! sink consuming them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::AgentMode;

/// One progress notice from a running session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Session accepted a query
    Started { mode: AgentMode },
    /// Fetching the dataset-overview primer
    FetchingOverview,
    /// Beginning a reasoning iteration
    Iteration { current: usize, max: usize },
    /// A model completion came back
    ModelCompleted { elapsed_secs: f64 },
    /// Dispatching one tool call
    ToolStarted {
        tool: String,
        parameters: Map<String, Value>,
    },
    /// A tool call finished (success or failure alike)
    ToolFinished { tool: String, elapsed_secs: f64 },
    /// Budget exhausted, forcing the final synthesis turn
    Synthesizing,
    /// Session produced a sanitized final answer
    Completed,
    /// Session aborted with a descriptive error
    Failed { error: String },
}

/// Sink for progress notices
///
/// Implementations must be cheap and non-blocking; they are called inline
/// from the session loop.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: ProgressEvent);
}

/// Sink that discards all events
pub struct NullSink;

impl ProgressSink for NullSink {
    fn notify(&self, _event: ProgressEvent) {}
}

/// Sink backed by an unbounded channel, for streaming to a display layer
pub struct ChannelSink {
    sender: tokio::sync::mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelSink {
    fn notify(&self, event: ProgressEvent) {
        // Receiver may have gone away (client disconnect); drop silently
        let _ = self.sender.send(event);
    }
}
