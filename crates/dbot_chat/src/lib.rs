//! # dbot_chat - DisasterBot conversation core
//!
//! Rule-based disaster-preparedness assistant:
//! - **Knowledge Base**: disaster categories, safety steps, FAQ, templates, tips
//! - **Intent Resolver**: substring rules mapping free text to a canned reply
//! - **Conversation State Machine**: greet once, sticky emergency mode
//! - **Message Pipeline**: simulated typing delay with strictly ordered replies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   ChatSurface   │◀───▶│ MessagePipeline │────▶│ IntentResolver  │
//! └─────────────────┘     └────────┬────────┘     └────────┬────────┘
//!                                  │                       │
//!                                  ▼                       ▼
//!                        ┌───────────────────┐   ┌─────────────────┐
//!                        │ ConversationState │   │  KnowledgeBase  │
//!                        │ + HistoryStore    │   └─────────────────┘
//!                        └───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dbot_chat::{IntentResolver, KnowledgeBase, SideEffect};
//!
//! let mut resolver = IntentResolver::with_seed(Arc::new(KnowledgeBase::default()), 7);
//! let reply = resolver.resolve("EMERGENCY, the river is rising");
//! assert_eq!(reply.side_effect, SideEffect::EnterEmergencyMode);
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod knowledge;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod state;
pub mod types;

pub use config::ChatConfig;
pub use error::{ChatError, ChatResult};
pub use history::{FileHistory, HistoryStore, MemoryHistory};
pub use knowledge::{CategoryInfo, FaqEntry, KnowledgeBase, Templates};
pub use pipeline::{ChatSurface, MessagePipeline, ReplyHandle};
pub use render::{auto_link, render_bot_body};
pub use resolver::{format_steps, normalize, IntentResolver};
pub use state::{ConversationPhase, ConversationState, ConversationStateMachine};
pub use types::{Intent, Message, MessageRole, ResponsePayload, SideEffect};
