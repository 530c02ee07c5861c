//! # agent-core
//!
//! Bounded tool-calling orchestration for a data-analysis agent.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      AgentSession                            │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌─────────────┐  │
//! │  │ Context  │  │  Parser  │  │ Dispatch │  │ LlmProvider │  │
//! │  │ Builder  │──│ <TOOL>..│──│ Registry │──│ (Strategy)  │  │
//! │  └──────────┘  └──────────┘  └──────────┘  └─────────────┘  │
//! │                       │                                      │
//! │                 ┌───────────┐                                │
//! │                 │ Sanitizer │── final answer                 │
//! │                 └───────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A session seeds the conversation with a mode-specific role prompt and a
//! dataset-overview primer, then loops: ask the model, extract `<TOOL>` blocks
//! from its reply, execute them against the registry, and feed results back
//! until the model answers without requesting tools or the iteration budget
//! runs out. The `LlmProvider` trait keeps the loop independent of any
//! particular backend.

pub mod context;
pub mod error;
pub mod message;
pub mod parser;
pub mod progress;
pub mod provider;
pub mod sanitize;
pub mod session;
pub mod reasoning;
pub mod tool;

pub use context::AgentMode;
pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use progress::{ProgressEvent, ProgressSink};
pub use provider::LlmProvider;
pub use reasoning::{AgentConfig, AgentSession, AgentSessionBuilder, QueryReport};
pub use session::SessionState;
pub use tool::{Tool, ToolCallRequest, ToolOutcome, ToolRegistry};
