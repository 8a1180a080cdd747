//! Relevance classification
//!
//! Decides, per inbound event, whether an autonomous reply should be
//! attempted. Pure over the event and the current ghost-mode value; the
//! caller is responsible for reading the flag fail-closed.

use crate::event::{ChatKind, InboundEvent};

/// Classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Attempt exactly one reply
    Reply,
    /// Drop the event
    Ignore(IgnoreReason),
}

/// Why an event was dropped, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Operator-authored text is routed to commands/corpus, never replied to
    OperatorAuthored,
    AutomatedSender,
    ServiceEvent,
    GhostOff,
    /// Group message that neither mentions the operator nor replies to them
    NotAddressed,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::OperatorAuthored => "operator-authored",
            IgnoreReason::AutomatedSender => "automated sender",
            IgnoreReason::ServiceEvent => "service event",
            IgnoreReason::GhostOff => "ghost mode off",
            IgnoreReason::NotAddressed => "not addressed",
        }
    }
}

/// Classify one inbound event given the current ghost-mode flag.
///
/// `ghost_active` must already be fail-closed: an unreadable mode store is
/// passed in as `false`.
pub fn classify(event: &InboundEvent, ghost_active: bool) -> Verdict {
    if event.sender_is_operator {
        return Verdict::Ignore(IgnoreReason::OperatorAuthored);
    }
    if event.sender_is_automated {
        return Verdict::Ignore(IgnoreReason::AutomatedSender);
    }
    if event.is_service {
        return Verdict::Ignore(IgnoreReason::ServiceEvent);
    }
    if !ghost_active {
        return Verdict::Ignore(IgnoreReason::GhostOff);
    }

    match event.chat_kind {
        ChatKind::Direct => Verdict::Reply,
        ChatKind::Group => {
            if event.mentioned || event.replied_to_operator {
                Verdict::Reply
            } else {
                Verdict::Ignore(IgnoreReason::NotAddressed)
            }
        }
    }
}
