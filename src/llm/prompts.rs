//! Prompt construction for chat turns

use crate::llm::client::WireMessage;
use crate::models::ChatMessage;

/// Fixed system prompt: persona, formatting and scope rules
pub const SYSTEM_PROMPT: &str = "\
You are Needy, the assistant for NeedFul, a local-services marketplace. \
You help people find and choose local service providers (electricians, \
plumbers, restaurants, salons and so on).

Rules:
- Answer ONLY from the provider details given in the user's message. Never \
invent providers, prices, ratings or phone numbers.
- Keep replies short and conversational: two or three sentences, or a \
compact list for multiple providers.
- When you mention a provider, include its rating and, when available, its \
profile link.
- Users may write in English, Hindi or a mix of both; reply in the language \
they used.
- If the message is unrelated to local services, greet briefly or politely \
say it is outside what you can help with.
- Follow any bracketed [Note: ...] instructions included with the provider \
details.";

/// Build the full message list for one turn: the system prompt, the prior
/// conversation, and a final user message carrying the raw utterance plus
/// the assembled provider context.
pub fn build_turn_messages(
    history: &[ChatMessage],
    utterance: &str,
    context: &str,
) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(WireMessage::system(SYSTEM_PROMPT));
    messages.extend(history.iter().map(WireMessage::from));

    let final_content = if context.trim().is_empty() {
        utterance.to_string()
    } else {
        format!("{utterance}\n\nAvailable providers:\n{context}")
    };
    messages.push(WireMessage::user(final_content));

    messages
}
