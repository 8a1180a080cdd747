//! Operator command grammar
//!
//! In-band control surface: a trigger token (default `.ai`) followed by a
//! subcommand. Matching is token-based, so the trigger inside ordinary text
//! never fires a command.

/// Recognized subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Enable ghost mode
    On,
    /// Disable ghost mode
    Off,
    /// Report mode and corpus size, no mutation
    Status,
    /// Purge the style corpus
    Clear,
    /// Liveness acknowledgment, no mutation
    Test,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::On => "on",
            Command::Off => "off",
            Command::Status => "status",
            Command::Clear => "clear",
            Command::Test => "test",
        }
    }
}

/// Outcome of matching operator text against the trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Trigger plus a recognized subcommand
    Command(Command),
    /// Trigger present but the subcommand is missing or unknown
    Unknown(String),
}

/// Parse operator text.
///
/// Returns `None` when the text does not start with the trigger token - such
/// text is not a command at all and is offered to the style corpus instead.
/// Case-insensitive and whitespace-tolerant: `" .AI   ON "` parses.
pub fn parse(text: &str, trigger: &str) -> Option<Parsed> {
    let mut parts = text.trim().split_whitespace();
    let head = parts.next()?;
    if !head.eq_ignore_ascii_case(trigger) {
        return None;
    }

    let sub = parts.next().unwrap_or("");
    let parsed = match sub.to_ascii_lowercase().as_str() {
        "on" => Parsed::Command(Command::On),
        "off" => Parsed::Command(Command::Off),
        "status" => Parsed::Command(Command::Status),
        "clear" => Parsed::Command(Command::Clear),
        "test" => Parsed::Command(Command::Test),
        other => Parsed::Unknown(other.to_string()),
    };

    Some(parsed)
}

/// Usage text for malformed commands
pub fn usage(trigger: &str) -> String {
    format!(
        "Usage: {trigger} on | off | status | clear | test",
        trigger = trigger
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: &str = ".ai";

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(
            parse(".ai on", TRIGGER),
            Some(Parsed::Command(Command::On))
        );
        assert_eq!(
            parse(".ai off", TRIGGER),
            Some(Parsed::Command(Command::Off))
        );
        assert_eq!(
            parse(".ai status", TRIGGER),
            Some(Parsed::Command(Command::Status))
        );
        assert_eq!(
            parse(".ai clear", TRIGGER),
            Some(Parsed::Command(Command::Clear))
        );
        assert_eq!(
            parse(".ai test", TRIGGER),
            Some(Parsed::Command(Command::Test))
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            parse(".AI ON", TRIGGER),
            Some(Parsed::Command(Command::On))
        );
        assert_eq!(
            parse(".Ai OfF", TRIGGER),
            Some(Parsed::Command(Command::Off))
        );
    }

    #[test]
    fn test_whitespace_tolerant() {
        assert_eq!(
            parse("   .ai    on   ", TRIGGER),
            Some(Parsed::Command(Command::On))
        );
    }

    #[test]
    fn test_non_command_text() {
        assert_eq!(parse("hello there", TRIGGER), None);
        assert_eq!(parse("", TRIGGER), None);
        // trigger inside ordinary text is not a command
        assert_eq!(parse("I said .ai on yesterday", TRIGGER), None);
    }

    #[test]
    fn test_trigger_requires_token_boundary() {
        // ".aion" is not the trigger followed by a subcommand
        assert_eq!(parse(".aion", TRIGGER), None);
        assert_eq!(parse(".airplane mode", TRIGGER), None);
    }

    #[test]
    fn test_unknown_subcommand() {
        assert_eq!(
            parse(".ai frobnicate", TRIGGER),
            Some(Parsed::Unknown("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_bare_trigger_is_unknown() {
        assert_eq!(parse(".ai", TRIGGER), Some(Parsed::Unknown(String::new())));
        assert_eq!(parse(".ai   ", TRIGGER), Some(Parsed::Unknown(String::new())));
    }

    #[test]
    fn test_extra_args_ignored() {
        assert_eq!(
            parse(".ai on please", TRIGGER),
            Some(Parsed::Command(Command::On))
        );
    }

    #[test]
    fn test_usage_mentions_trigger() {
        let text = usage(".ghost");
        assert!(text.contains(".ghost"));
        assert!(text.contains("status"));
    }
}
