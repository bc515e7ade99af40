//! Rendering boundary helpers.
//!
//! The core hands raw bodies to the surface. Surfaces that render HTML call
//! [`render_bot_body`] so plain-text replies get their URLs and phone numbers
//! linked.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// `https?://\S+` or a US-formatted phone number `\d{3}-\d{3}-\d{4}`
fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?P<url>https?://\S+)|(?P<phone>\d{3}-\d{3}-\d{4})")
            .expect("link pattern is a valid regex")
    })
}

/// Wrap URLs and phone numbers in anchors.
///
/// Both patterns are matched in a single pass, so digits inside a URL are
/// never linked a second time.
pub fn auto_link(text: &str) -> String {
    link_pattern()
        .replace_all(text, |caps: &Captures| {
            if let Some(url) = caps.name("url") {
                format!(r#"<a href="{0}" target="_blank">{0}</a>"#, url.as_str())
            } else {
                let phone = &caps[0];
                format!(r#"<a href="tel:{0}">{0}</a>"#, phone)
            }
        })
        .into_owned()
}

/// Body as it should be inserted into an HTML surface
pub fn render_bot_body(body: &str, is_structured: bool) -> String {
    if is_structured {
        body.to_string()
    } else {
        auto_link(body)
    }
}
