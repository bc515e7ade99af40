//! Conversation state machine.
//!
//! ```text
//!   Idle ──start(no history)──▶ Greeted ──EnterEmergencyMode──▶ Emergency
//!    │                            ▲                                 │
//!    └──start(history)────────────┘                     (sticky until reset)
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::knowledge::Templates;
use crate::types::{Intent, ResponsePayload, SideEffect};

/// Phase of the conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConversationPhase {
    #[default]
    Idle,
    Greeted,
    Emergency,
}

/// Snapshot of the conversation flags
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ConversationState {
    pub phase: ConversationPhase,
    #[serde(rename = "emergencyMode")]
    pub emergency_mode: bool,
    #[serde(rename = "hasGreeted")]
    pub has_greeted: bool,
}

/// Owns the conversation flags; the only mutator of [`ConversationState`]
#[derive(Debug, Default)]
pub struct ConversationStateMachine {
    state: ConversationState,
}

impl ConversationStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state
    }

    pub fn phase(&self) -> ConversationPhase {
        self.state.phase
    }

    pub fn is_emergency(&self) -> bool {
        self.state.emergency_mode
    }

    /// First display request of a session.
    ///
    /// Returns the greeting to emit when the session is fresh. Sessions with
    /// prior history are marked greeted without emitting anything, and later
    /// calls never greet again.
    pub fn start(&mut self, has_prior_history: bool, templates: &Templates) -> Option<ResponsePayload> {
        if self.state.has_greeted {
            return None;
        }
        self.state.has_greeted = true;
        if self.state.phase == ConversationPhase::Idle {
            self.state.phase = ConversationPhase::Greeted;
        }

        if has_prior_history {
            return None;
        }

        info!("Greeting new session");
        Some(ResponsePayload::structured(
            templates.greeting.clone(),
            Intent::Greeting,
        ))
    }

    /// Apply a resolved payload and return the message to emit.
    ///
    /// An emergency trigger always emits the activation template in place of
    /// the payload body; only the first one changes the phase.
    pub fn on_response(&mut self, payload: ResponsePayload, templates: &Templates) -> ResponsePayload {
        if payload.side_effect != SideEffect::EnterEmergencyMode {
            return payload;
        }

        if !self.state.emergency_mode {
            info!(from = ?self.state.phase, "Entering emergency mode");
            self.state.emergency_mode = true;
            self.state.phase = ConversationPhase::Emergency;
        }

        ResponsePayload::structured(templates.emergency_activation.clone(), Intent::Emergency)
            .with_side_effect(SideEffect::EnterEmergencyMode)
    }

    /// Session clear: back to a fresh, ungreeted session
    pub fn reset(&mut self) {
        self.state = ConversationState::default();
    }
}
