//! Conversion between one editable block of text and a role-tagged conversation.
//!
//! The text grammar is `segment (DELIMITER segment)*`. A delimiter occupies a
//! line of its own (surrounding spaces allowed). A segment may start with a
//! role prefix; segments without one are "untagged" and belong to the user.
//!
//! ```text
//! Translate this to French.
//!  -+-+-+-+-
//! [Model's response]: Traduisez ceci en français.
//!  -+-+-+-+-
//! Now make it formal.
//! ```
//!
//! decodes to `[user, assistant, user]`.

use crate::message::{Message, Role};

/// Separator token between segments.
pub const DELIMITER: &str = "-+-+-+-+-";

/// The delimiter line as emitted by [`encode`] and the helpers below.
pub const DELIMITER_LINE: &str = " -+-+-+-+- ";

/// Prefix marking a system segment.
pub const SYSTEM_PREFIX: &str = "[System]:";

/// Prefix marking a user segment.
pub const USER_PREFIX: &str = "[User]:";

/// Prefix marking an assistant segment.
pub const ASSISTANT_PREFIX: &str = "[Model's response]:";

/// The role prefix token for `role`.
pub fn prefix(role: Role) -> &'static str {
    match role {
        Role::System => SYSTEM_PREFIX,
        Role::User => USER_PREFIX,
        Role::Assistant => ASSISTANT_PREFIX,
    }
}

/// Decode free text into a conversation.
///
/// Text without a delimiter line is a single user message, unchanged.
/// Otherwise each segment is classified by its role prefix and merged:
/// consecutive segments of the same role are joined with a newline, an
/// untagged segment continues a user message or opens a new one, and the
/// system message (last one wins) is moved to index 0. When `allow_system`
/// is false a system-tagged segment is handled as untagged text.
///
/// Content keeps its whitespace; only the single space after a role prefix
/// is dropped. Blank segments and tagged segments with a blank body produce
/// no message.
pub fn decode(text: &str, allow_system: bool) -> Vec<Message> {
    let Some(segments) = split_segments(text) else {
        return vec![Message::user(text)];
    };

    let mut messages: Vec<Message> = Vec::new();
    let mut system: Option<String> = None;
    let mut last_role: Option<Role> = None;

    for segment in &segments {
        if segment.trim().is_empty() {
            continue;
        }

        let (tag, content) = classify(segment);
        if tag.is_some() && content.trim().is_empty() {
            continue;
        }
        match tag {
            Some(Role::System) if allow_system => {
                system = Some(content.to_string());
                last_role = Some(Role::System);
            }
            Some(Role::Assistant) => {
                push_or_append(&mut messages, &mut last_role, Role::Assistant, content);
            }
            // user-tagged, untagged, and system text when system is disallowed
            _ => push_or_append(&mut messages, &mut last_role, Role::User, content),
        }
    }

    if let Some(system) = system {
        messages.insert(0, Message::system(system));
    }

    if messages.is_empty() {
        return vec![Message::user(text)];
    }

    messages
}

/// Encode a conversation as editable text.
///
/// Each message becomes `"<prefix> <content>\n"`, separated by delimiter
/// lines. Occurrences of the message's own prefix inside its content are
/// removed so the text cannot re-tag itself. A one-message conversation keeps
/// its trailing delimiter line, otherwise the result would read back as plain
/// untagged text.
pub fn encode(messages: &[Message]) -> String {
    let separator = format!("{}\n", DELIMITER_LINE);
    let mut text = messages
        .iter()
        .map(|m| {
            let prefix = prefix(m.role);
            format!("{} {}\n", prefix, m.content.replace(prefix, ""))
        })
        .collect::<Vec<_>>()
        .join(&separator);

    if messages.len() == 1 {
        text.push_str(&separator);
    }
    text
}

/// Build the text that continues a stored exchange.
///
/// The stored prompt is followed by the assistant-tagged response and an
/// open delimiter, so whatever is typed next becomes a new user turn.
pub fn append_response(prompt: &str, response: &str) -> String {
    format!(
        "{}\n{}\n{} {}\n{}\n",
        prompt, DELIMITER_LINE, ASSISTANT_PREFIX, response, DELIMITER_LINE
    )
}

/// Place a prompt template in front of the user's text.
pub fn with_template(template: &str, body: &str) -> String {
    format!("{}\n{}\n{}", template, DELIMITER_LINE, body)
}

/// Whether a line is a delimiter line.
pub fn is_delimiter_line(line: &str) -> bool {
    line.trim() == DELIMITER
}

fn split_segments(text: &str) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut found = false;

    for line in text.lines() {
        if is_delimiter_line(line) {
            found = true;
            segments.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }

    if !found {
        return None;
    }
    segments.push(current.join("\n"));
    Some(segments)
}

fn classify(segment: &str) -> (Option<Role>, &str) {
    let trimmed = segment.trim_start();
    for role in [Role::System, Role::User, Role::Assistant] {
        if let Some(rest) = trimmed.strip_prefix(prefix(role)) {
            return (Some(role), rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    (None, segment)
}

fn push_or_append(
    messages: &mut Vec<Message>,
    last_role: &mut Option<Role>,
    role: Role,
    content: &str,
) {
    match messages.last_mut() {
        Some(last) if *last_role == Some(role) => {
            if !content.is_empty() {
                if !last.content.is_empty() {
                    last.content.push('\n');
                }
                last.content.push_str(content);
            }
        }
        _ => messages.push(Message::new(role, content)),
    }
    *last_role = Some(role);
}
