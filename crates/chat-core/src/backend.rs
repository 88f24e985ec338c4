//! The ProviderBackend trait definition.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::message::{Message, Role};
use crate::temperature::Temperature;

/// A vendor adapter that turns a conversation into a completion.
///
/// Implementations range from HTTP clients for hosted models to mocks used in
/// tests. This trait is object-safe and can be used with `Arc<dyn ProviderBackend>`.
#[async_trait]
pub trait ProviderBackend: Send + Sync {
    /// Complete the conversation and return the response text.
    ///
    /// # Arguments
    ///
    /// * `messages` - The decoded conversation, system message first if any.
    /// * `model_id` - Vendor model identifier (not the display key).
    /// * `temperature` - Shared 0-10 scale; the backend rescales it.
    async fn complete(
        &self,
        messages: &[Message],
        model_id: &str,
        temperature: Temperature,
    ) -> Result<String, ProviderError>;

    /// Get a human-readable name for this backend.
    fn name(&self) -> &str;

    /// Whether the vendor accepts a system-role message.
    ///
    /// Default implementation returns true.
    fn supports_system_role(&self) -> bool {
        true
    }
}

/// Merge system messages into the leading user message.
///
/// Used by backends without system-role support. System content is placed
/// before the first user message's content; if the conversation has no user
/// message before its first assistant turn, a new user message is inserted at
/// the front.
pub fn fold_system_into_user(messages: &[Message]) -> Vec<Message> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let mut rest: Vec<Message> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .cloned()
        .collect();

    if system.is_empty() {
        return rest;
    }

    let system_text = system.join("\n");
    match rest.first_mut() {
        Some(first) if first.role == Role::User => {
            first.content = format!("{}\n{}", system_text, first.content);
        }
        _ => rest.insert(0, Message::user(system_text)),
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_without_system_is_identity() {
        let messages = vec![Message::user("a"), Message::assistant("b")];
        assert_eq!(fold_system_into_user(&messages), messages);
    }

    #[test]
    fn test_fold_into_leading_user() {
        let messages = vec![
            Message::system("be terse"),
            Message::user("hello"),
            Message::assistant("hi"),
        ];
        let folded = fold_system_into_user(&messages);
        assert_eq!(
            folded,
            vec![Message::user("be terse\nhello"), Message::assistant("hi")]
        );
    }

    #[test]
    fn test_fold_creates_user_when_assistant_leads() {
        let messages = vec![Message::system("rules"), Message::assistant("hi")];
        let folded = fold_system_into_user(&messages);
        assert_eq!(folded, vec![Message::user("rules"), Message::assistant("hi")]);
    }
}
