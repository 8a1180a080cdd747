//! Style prompt builder
//!
//! Renders the style block plus the incoming message into one generation
//! request. Deterministic: same inputs, same prompt.

/// Stands in for the incoming text on media-only events
pub const MEDIA_PLACEHOLDER: &str = "[media]";

/// Name used when the platform gives us no sender display name
pub const UNKNOWN_SENDER: &str = "Someone";

/// Build the single prompt sent to the generation oracle
pub fn build_prompt(style_block: &str, sender_name: Option<&str>, incoming: Option<&str>) -> String {
    let sender = sender_name.unwrap_or(UNKNOWN_SENDER);
    let incoming = incoming.unwrap_or(MEDIA_PLACEHOLDER);

    format!(
        "You are roleplaying as me, a human who is currently away from the chat.\n\
         \n\
         My recent messages (copy this style, tone, and language):\n\
         {style_block}\n\
         \n\
         Context:\n\
         - '{sender}' sent: \"{incoming}\"\n\
         \n\
         Instructions:\n\
         - Reply exactly like I would, in my style.\n\
         - Casual greeting gets a casual reply.\n\
         - If it sounds urgent, say I'll get back to them soon, in my own words.\n\
         - Keep it short, one or two sentences.\n\
         \n\
         Reply:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes_style_and_message() {
        let prompt = build_prompt("short lowercase texts", Some("Alice"), Some("you around?"));
        assert!(prompt.contains("short lowercase texts"));
        assert!(prompt.contains("Alice"));
        assert!(prompt.contains("you around?"));
    }

    #[test]
    fn test_media_only_uses_placeholder() {
        let prompt = build_prompt("style", Some("Bob"), None);
        assert!(prompt.contains(MEDIA_PLACEHOLDER));
    }

    #[test]
    fn test_missing_sender_name() {
        let prompt = build_prompt("style", None, Some("hi"));
        assert!(prompt.contains(UNKNOWN_SENDER));
    }

    #[test]
    fn test_deterministic() {
        let a = build_prompt("s", Some("A"), Some("m"));
        let b = build_prompt("s", Some("A"), Some("m"));
        assert_eq!(a, b);
    }
}
