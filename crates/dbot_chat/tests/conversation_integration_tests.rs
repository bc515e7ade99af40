//! Integration tests for the DisasterBot conversation core.

use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::tempdir;

use dbot_chat::{
    CategoryInfo, ChatConfig, ChatSurface, ConversationPhase, FileHistory, HistoryStore, Intent,
    IntentResolver, KnowledgeBase, MemoryHistory, MessagePipeline, MessageRole, SideEffect,
    Templates,
};

const TIPS: [&str; 3] = ["Tip A", "Tip B", "Tip C"];

fn scenario_kb() -> KnowledgeBase {
    KnowledgeBase::new(
        ["earthquake", "tsunami", "hurricane", "wildfire", "flood"],
        Templates {
            greeting: "<p>greeting</p>".to_string(),
            emergency_activation: "<p>emergency activated</p>".to_string(),
            unknown_fallback: "<p>unknown</p>".to_string(),
            emergency_contacts: "<p>contacts</p>".to_string(),
        },
        TIPS.iter().map(|t| t.to_string()).collect(),
    )
    .unwrap()
    .with_category_info("earthquake", CategoryInfo::with_steps(["Drop", "Cover", "Hold on"]))
    .with_category_info(
        "flood",
        CategoryInfo::with_steps(["Move to higher ground", "Avoid flood waters"])
            .faq("drive", "Turn around, don't drown."),
    )
}

fn resolver() -> IntentResolver {
    IntentResolver::with_seed(Arc::new(scenario_kb()), 11)
}

#[derive(Default)]
struct Transcript {
    lines: Mutex<Vec<(MessageRole, String)>>,
}

impl ChatSurface for Transcript {
    fn on_user_message(&self, text: &str) {
        self.lines.lock().push((MessageRole::User, text.to_string()));
    }

    fn on_bot_message(&self, body: &str, _is_structured: bool) {
        self.lines.lock().push((MessageRole::Bot, body.to_string()));
    }
}

/// "What should I do during an earthquake?" yields the numbered steps block.
#[test]
fn test_scenario_earthquake_steps() {
    let payload = resolver().resolve("What should I do during an earthquake?");
    assert_eq!(
        payload.body,
        "EARTHQUAKE SAFETY STEPS:<br>1. Drop<br>2. Cover<br>3. Hold on"
    );
    assert!(payload.is_structured);
}

/// "EMERGENCY flood rising" activates emergency mode without consulting flood data.
#[test]
fn test_scenario_emergency_flood() {
    let payload = resolver().resolve("EMERGENCY flood rising");
    assert_eq!(payload.side_effect, SideEffect::EnterEmergencyMode);
    assert_eq!(payload.body, "<p>emergency activated</p>");
}

/// "what is your number" yields the contacts template.
#[test]
fn test_scenario_contacts() {
    let payload = resolver().resolve("what is your number");
    assert_eq!(payload.body, "<p>contacts</p>");
    assert!(payload.is_structured);
}

/// Gibberish yields the fallback plus exactly one known tip.
#[test]
fn test_scenario_unknown_with_tip() {
    let mut resolver = resolver();
    for _ in 0..20 {
        let payload = resolver.resolve("asdfghjkl");
        let tips_found = TIPS
            .iter()
            .filter(|tip| payload.body.contains(*tip))
            .count();
        assert_eq!(tips_found, 1);
        assert!(payload.body.starts_with("<p>unknown</p><br><br><em>"));
        assert!(payload.body.ends_with("</em>"));
    }
}

#[test]
fn test_emergency_detected_in_any_case_and_position() {
    let mut resolver = resolver();
    for text in [
        "emergency",
        "EMERGENCY",
        "  this is an EmErGeNcY!!",
        "earthquake emergency now",
        "nonemergencyish",
    ] {
        assert_eq!(
            resolver.resolve(text).side_effect,
            SideEffect::EnterEmergencyMode,
            "input: {}",
            text
        );
    }
}

#[test]
fn test_faq_precedence_and_step_order() {
    let mut resolver = resolver();

    let faq = resolver.resolve("Can I drive through a flood?");
    assert_eq!(faq.body, "Turn around, don't drown.");
    assert!(!faq.is_structured);

    let steps = resolver.resolve("flood");
    assert_eq!(
        steps.body,
        "FLOOD SAFETY STEPS:<br>1. Move to higher ground<br>2. Avoid flood waters"
    );
}

#[test]
fn test_resolver_is_total_on_adversarial_input() {
    let mut resolver = resolver();
    let long = "x".repeat(1_000_000);
    let html = "<script>alert('hi')</script>";
    let unicode = "地震 🚨 Ñandú";

    assert_eq!(resolver.resolve("").intent, Intent::Fallback);
    assert_eq!(resolver.resolve(&long).intent, Intent::Fallback);
    // "hi" inside the markup
    assert_eq!(resolver.resolve(html).intent, Intent::Greeting);
    assert_eq!(resolver.resolve(unicode).intent, Intent::Fallback);
}

#[test]
fn test_multi_category_resolution_is_deterministic() {
    let mut resolver = resolver();
    let expected = Intent::Steps {
        category: "earthquake".to_string(),
    };
    for _ in 0..10 {
        assert_eq!(resolver.resolve("earthquake flood").intent, expected);
        assert_eq!(resolver.resolve("flood earthquake").intent, expected);
    }
}

#[tokio::test]
async fn test_full_conversation() {
    let pipeline = MessagePipeline::new(
        Arc::new(scenario_kb()),
        Arc::new(MemoryHistory::new()),
        &ChatConfig::instant().with_seed(4),
    )
    .unwrap();
    let transcript = Arc::new(Transcript::default());
    pipeline.attach_surface(transcript.clone());

    for text in ["hello", "earthquake", "EMERGENCY flood rising", "contact"] {
        pipeline.submit(text).unwrap().unwrap().wait().await.unwrap();
    }

    let lines = transcript.lines.lock().clone();
    let bots: Vec<_> = lines
        .iter()
        .filter(|(role, _)| *role == MessageRole::Bot)
        .map(|(_, body)| body.as_str())
        .collect();
    assert_eq!(
        bots,
        vec![
            "<p>greeting</p>",
            "<p>greeting</p>",
            "EARTHQUAKE SAFETY STEPS:<br>1. Drop<br>2. Cover<br>3. Hold on",
            "<p>emergency activated</p>",
            "<p>contacts</p>",
        ]
    );

    let state = pipeline.state();
    assert!(state.emergency_mode);
    assert_eq!(state.phase, ConversationPhase::Emergency);

    pipeline.shutdown().await.unwrap();
}

/// The greeting is sent once per fresh history, not once per process.
#[tokio::test]
async fn test_file_history_greets_only_first_session() {
    let temp = tempdir().unwrap();
    let config = ChatConfig {
        history_dir: Some(temp.path().to_path_buf()),
        ..ChatConfig::instant()
    };

    let first = MessagePipeline::from_config(&config).unwrap();
    first.submit("flood").unwrap().unwrap().wait().await.unwrap();
    first.shutdown().await.unwrap();

    let transcript = Arc::new(Transcript::default());
    let second = MessagePipeline::from_config(&config).unwrap();
    second.attach_surface(transcript.clone());
    assert!(transcript.lines.lock().is_empty());
    assert!(second.state().has_greeted);

    let stored = FileHistory::new(temp.path()).load().unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].role, MessageRole::Bot);
    assert_eq!(stored[1].body, "flood");

    second.clear_session().unwrap();
    assert_eq!(transcript.lines.lock().len(), 1);
}

#[tokio::test]
async fn test_from_config_loads_knowledge_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("kb.yaml");
    std::fs::write(&path, scenario_kb().to_yaml().unwrap()).unwrap();

    let config = ChatConfig {
        knowledge_path: Some(path),
        ..ChatConfig::instant()
    };
    let pipeline = MessagePipeline::from_config(&config).unwrap();
    let reply = pipeline
        .submit("earthquake")
        .unwrap()
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(
        reply.body,
        "EARTHQUAKE SAFETY STEPS:<br>1. Drop<br>2. Cover<br>3. Hold on"
    );
}
