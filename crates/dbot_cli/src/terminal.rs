//! Terminal rendering of bot replies.
//!
//! Structured replies carry a little HTML; the terminal gets line breaks
//! and bullets instead.

use std::io::Write;
use std::sync::OnceLock;

use regex::Regex;

use dbot_chat::ChatSurface;

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"))
}

fn blank_lines() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n{3,}").expect("blank line pattern is a valid regex"))
}

/// Convert a reply body to plain terminal text
pub fn to_terminal_text(body: &str, is_structured: bool) -> String {
    if !is_structured {
        return body.to_string();
    }

    let text = body
        .replace("<br>", "\n")
        .replace("<li>", "\n  • ")
        .replace("<ul>", "\n")
        .replace("</ul>", "\n")
        .replace("<p>", "\n")
        .replace("</p>", "\n");
    let text = tag_pattern().replace_all(&text, "");
    let text = text
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    blank_lines()
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

/// Chat surface writing to stdout
pub struct TerminalSurface;

impl ChatSurface for TerminalSurface {
    fn on_user_message(&self, _text: &str) {
        // already on screen as typed
    }

    fn on_bot_message(&self, body: &str, is_structured: bool) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "\r🤖 {}\n", to_terminal_text(body, is_structured));
        let _ = out.flush();
    }

    fn on_typing_started(&self) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "🤖 …");
        let _ = out.flush();
    }

    fn on_typing_stopped(&self) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r   \r");
        let _ = out.flush();
    }
}
