//! Transport-independent inbound event model

/// Kind of conversation an event arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Direct,
    Group,
}

/// One inbound platform event, normalized away from the transport's types
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Conversation the event belongs to
    pub chat_id: i64,

    /// Platform message id, used for reply-quoting and command acks
    pub event_id: i32,

    pub chat_kind: ChatKind,

    /// Authored by the operator's own account
    pub sender_is_operator: bool,

    /// Sender is a bot or other automated agent
    pub sender_is_automated: bool,

    /// Service/system event (member joined, title changed, ...)
    pub is_service: bool,

    /// Operator was @-mentioned (groups)
    pub mentioned: bool,

    /// Event quotes a message the operator wrote (groups)
    pub replied_to_operator: bool,

    /// Sender display name, when the platform provides one
    pub sender_name: Option<String>,

    /// Text content; `None` for media-only events
    pub text: Option<String>,
}

impl InboundEvent {
    /// A plain human direct message (common case in tests)
    pub fn direct(chat_id: i64, text: &str) -> Self {
        Self {
            chat_id,
            event_id: 1,
            chat_kind: ChatKind::Direct,
            sender_is_operator: false,
            sender_is_automated: false,
            is_service: false,
            mentioned: false,
            replied_to_operator: false,
            sender_name: Some("Sender".to_string()),
            text: Some(text.to_string()),
        }
    }

    /// A plain human group message with the given addressing flags
    pub fn group(chat_id: i64, text: &str, mentioned: bool, replied_to_operator: bool) -> Self {
        Self {
            chat_kind: ChatKind::Group,
            mentioned,
            replied_to_operator,
            ..Self::direct(chat_id, text)
        }
    }

    /// Operator-authored text in any chat
    pub fn from_operator(chat_id: i64, text: &str) -> Self {
        Self {
            sender_is_operator: true,
            ..Self::direct(chat_id, text)
        }
    }
}
