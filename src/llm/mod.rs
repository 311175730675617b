//! Outbound LLM chat-completion client

pub mod client;
pub mod prompts;

pub use client::{LlmClient, WireMessage, EMPTY_COMPLETION_REPLY, MAX_ATTEMPTS};
pub use prompts::{build_turn_messages, SYSTEM_PROMPT};
