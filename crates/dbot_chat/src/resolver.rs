//! Intent resolution.
//!
//! Maps free text to a [`ResponsePayload`] by substring rules, checked in
//! priority order with the first match winning:
//!
//! 1. `"emergency"` anywhere in the text activates emergency mode
//! 2. a known category name: its FAQ answer, else its safety steps
//! 3. `"contact"` / `"number"`: emergency contacts
//! 4. `"help"` / `"hi"` / `"hello"`: greeting
//! 5. anything else: the fallback template plus a random tip
//!
//! Matching is plain substring search on the lowercased, trimmed input, so
//! `"this"` counts as `"hi"` and a message naming two categories resolves
//! to whichever comes first in the knowledge base order.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::knowledge::KnowledgeBase;
use crate::types::{Intent, ResponsePayload, SideEffect};

const EMERGENCY_KEYWORD: &str = "emergency";
const CONTACT_KEYWORDS: [&str; 2] = ["contact", "number"];
const GREETING_KEYWORDS: [&str; 3] = ["help", "hi", "hello"];

/// Lowercase and trim user input
pub fn normalize(raw_text: &str) -> String {
    raw_text.trim().to_lowercase()
}

/// Render steps as a `"<CATEGORY> SAFETY STEPS:"` block with a 1-indexed list
pub fn format_steps(category: &str, steps: &[String]) -> String {
    let numbered = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("<br>");
    format!("{} SAFETY STEPS:<br>{}", category.to_uppercase(), numbered)
}

/// Rule-based resolver over a shared knowledge base
pub struct IntentResolver {
    kb: Arc<KnowledgeBase>,
    rng: StdRng,
}

impl IntentResolver {
    /// Resolver with an entropy-seeded tip generator
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            kb,
            rng: StdRng::from_entropy(),
        }
    }

    /// Resolver whose tip selection is reproducible
    pub fn with_seed(kb: Arc<KnowledgeBase>, seed: u64) -> Self {
        Self {
            kb,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Resolve raw user text. Total: every input yields a payload.
    pub fn resolve(&mut self, raw_text: &str) -> ResponsePayload {
        let text = normalize(raw_text);
        let payload = self.resolve_normalized(&text);
        debug!(intent = payload.intent.label(), "Resolved message");
        payload
    }

    fn resolve_normalized(&mut self, text: &str) -> ResponsePayload {
        let templates = self.kb.templates();

        if text.contains(EMERGENCY_KEYWORD) {
            return ResponsePayload::structured(
                templates.emergency_activation.clone(),
                Intent::Emergency,
            )
            .with_side_effect(SideEffect::EnterEmergencyMode);
        }

        for category in self.kb.categories() {
            if !text.contains(category.as_str()) {
                continue;
            }

            if let Some(answer) = self.kb.faq_answer(category, text) {
                return ResponsePayload::plain(answer, Intent::Faq {
                    category: category.clone(),
                });
            }

            if let Some(steps) = self.kb.steps(category) {
                return ResponsePayload::structured(format_steps(category, steps), Intent::Steps {
                    category: category.clone(),
                });
            }

            // recognized but no data: keep looking
        }

        if CONTACT_KEYWORDS.iter().any(|k| text.contains(k)) {
            return ResponsePayload::structured(
                templates.emergency_contacts.clone(),
                Intent::Contacts,
            );
        }

        if GREETING_KEYWORDS.iter().any(|k| text.contains(k)) {
            return ResponsePayload::structured(templates.greeting.clone(), Intent::Greeting);
        }

        let tip = self.kb.random_tip(&mut self.rng);
        ResponsePayload::structured(
            format!("{}<br><br><em>{}</em>", templates.unknown_fallback, tip),
            Intent::Fallback,
        )
    }
}
