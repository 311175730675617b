//! Response composition: a priority-ordered decision chain
//!
//! States are evaluated strictly in order and the first match produces the
//! final reply: best-provider shortcut, mock-mode templates (no LLM
//! credential), then the LLM call with its templated fallbacks. Every
//! template is deterministic so replies are reproducible for a given input.

use std::sync::Arc;

use tracing::{error, info};

use crate::chat::intent::IntentFlags;
use crate::llm::{build_turn_messages, LlmClient};
use crate::models::{ChatMessage, Provider, ProviderHit};

pub const TECHNICAL_ERROR_REPLY: &str = "Sorry, something went wrong on our side. Please use the Search page while we \
     sort it out.";

pub const SERVER_BUSY_REPLY: &str =
    "Our assistant is handling a lot of requests right now. Please try again in a moment.";

pub const NO_SERVICES_REPLY: &str =
    "I couldn't find any services for that. Try the Search page to browse every category.";

pub const CLARIFY_FOLLOW_UP_REPLY: &str =
    "Could you give me a bit more detail about what you're looking for?";

pub const NO_RELEVANT_SERVICES_REPLY: &str =
    "I couldn't find relevant services. Try another category or location.";

/// Everything the composer needs about the current turn
pub struct TurnInputs<'a> {
    pub flags: &'a IntentFlags,
    /// Current turn's (possibly distance-annotated) results
    pub hits: &'a [ProviderHit],
    /// The session's last non-empty result set
    pub snapshot: &'a [Provider],
    /// Prior conversation, excluding the current utterance
    pub history: &'a [ChatMessage],
    pub utterance: &'a str,
    /// Assembled provider context block
    pub context: &'a str,
}

/// Composer choosing and producing the final reply for a turn
pub struct ResponseComposer {
    llm: Option<Arc<LlmClient>>,
}

impl ResponseComposer {
    pub fn new(llm: Option<Arc<LlmClient>>) -> Self {
        Self { llm }
    }

    /// Produce the reply for one turn. Single pass, no re-entry: the first
    /// matching state wins.
    pub async fn compose(&self, turn: &TurnInputs<'_>) -> String {
        // State 1: best-provider shortcut. Fresh results win over the
        // snapshot; the snapshot only serves context-free follow-ups.
        if turn.flags.is_best_query {
            let pool: Vec<&Provider> = if turn.hits.is_empty() {
                turn.snapshot.iter().collect()
            } else {
                turn.hits.iter().map(|hit| &hit.provider).collect()
            };
            if !pool.is_empty() {
                info!("answering best-provider query from {} candidate(s)", pool.len());
                return best_provider_reply(pool);
            }
        }

        match &self.llm {
            // State 2: no credential configured, answer from templates
            None => mock_reply(turn),
            // State 3: LLM call with retry, degrading to templates
            Some(client) => {
                let messages = build_turn_messages(turn.history, turn.utterance, turn.context);
                match client.chat_completion(&messages).await {
                    Ok(text) => text,
                    Err(e) => {
                        error!("LLM call exhausted retries: {e}");
                        if turn.hits.is_empty() {
                            SERVER_BUSY_REPLY.to_string()
                        } else {
                            detailed_listing_reply(turn.hits)
                        }
                    }
                }
            }
        }
    }
}

/// Rank by rating, tie-break by review count, and name the winner
fn best_provider_reply(mut pool: Vec<&Provider>) -> String {
    pool.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then_with(|| b.review_count.cmp(&a.review_count))
    });
    let top = pool[0];
    format!(
        "Based on ratings, {} is the top choice — {}/5 from {} reviews in {}. \
         Want me to compare it with the alternatives?",
        top.name, top.rating, top.review_count, top.city
    )
}

/// Mock-mode decision chain, in fixed priority order
fn mock_reply(turn: &TurnInputs<'_>) -> String {
    if !turn.hits.is_empty() {
        return short_listing_reply(turn.hits);
    }
    if turn.history.is_empty() {
        return NO_SERVICES_REPLY.to_string();
    }
    if turn.flags.is_compare_query && turn.snapshot.len() >= 2 {
        return comparison_reply(&turn.snapshot[0], &turn.snapshot[1]);
    }
    if !turn.history.is_empty() {
        return CLARIFY_FOLLOW_UP_REPLY.to_string();
    }
    NO_RELEVANT_SERVICES_REPLY.to_string()
}

/// Compact listing of up to three providers (mock mode)
fn short_listing_reply(hits: &[ProviderHit]) -> String {
    let mut reply = String::from("Here's what I found:\n");
    for hit in hits.iter().take(3) {
        let p = &hit.provider;
        reply.push_str(&format!(
            "\n⭐ {}/5 — {} ({})",
            p.rating,
            p.name,
            p.area_or_city()
        ));
        if let Some(phone) = &p.phone {
            reply.push_str(&format!(" · 📞 {phone}"));
        }
    }
    reply.push_str("\n\nAsk me about any of them for more detail.");
    reply
}

/// Two-provider comparison with a rating-based verdict (mock mode)
fn comparison_reply(a: &Provider, b: &Provider) -> String {
    let verdict = if a.rating > b.rating {
        format!("{} has the edge on ratings.", a.name)
    } else if b.rating > a.rating {
        format!("{} has the edge on ratings.", b.name)
    } else {
        "Both are rated the same — pick whichever is more convenient.".to_string()
    };

    format!(
        "Quick comparison:\n\n{}: ⭐ {}/5, {}, from {}\n{}: ⭐ {}/5, {}, from {}\n\n{verdict}",
        a.name,
        a.rating,
        a.city,
        starting_price(a),
        b.name,
        b.rating,
        b.city,
        starting_price(b),
    )
}

fn starting_price(provider: &Provider) -> String {
    provider
        .services
        .first()
        .and_then(|service| service.price)
        .map(|price| format!("₹{price}"))
        .unwrap_or_else(|| "On request".to_string())
}

/// Fuller listing used when the LLM is unreachable but results exist:
/// link markup, rating, address, phone and hours per provider.
fn detailed_listing_reply(hits: &[ProviderHit]) -> String {
    let mut reply = String::from("I couldn't reach the assistant, but here are the top matches:\n");
    for hit in hits.iter().take(3) {
        let p = &hit.provider;
        let link = p
            .profile_path()
            .unwrap_or_else(|| "N/A".to_string());
        reply.push_str(&format!("\n[{}]({link}) — ⭐ {}/5", p.name, p.rating));
        match &p.address {
            Some(address) => reply.push_str(&format!("\n   📍 {address}, {}", p.city)),
            None => reply.push_str(&format!("\n   📍 {}", p.city)),
        }
        if let Some(phone) = &p.phone {
            reply.push_str(&format!("\n   📞 {phone}"));
        }
        if let Some(hours) = &p.operating_hours {
            reply.push_str(&format!("\n   🕒 {hours}"));
        }
        reply.push('\n');
    }
    reply.push_str("\nWant more detail on any of these?");
    reply
}
