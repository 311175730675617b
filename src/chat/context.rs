//! Context assembly: the provider summary block injected into the LLM prompt

use crate::chat::intent::{is_substantive, IntentFlags};
use crate::models::{ProviderHit, ServiceOffering};

/// Distances at or above this are noise (or the missing-location
/// sentinel) and are not shown
const MAX_SHOWN_DISTANCE_KM: f64 = 100.0;

pub(crate) const NOTE_MISSING_LOCATION: &str = "[Note: The user asked for the closest provider but did not share a location. \
     Apologize for the missing location and present the top-rated providers instead.]";

pub(crate) const NOTE_ANSWER_FROM_HISTORY: &str = "[Note: No providers matched this message. If it is a follow-up question, \
     answer it from the earlier conversation instead of saying nothing was found.]";

pub(crate) const NOTE_NO_MATCHES: &str = "[Note: No matching local providers were found. Greet the user, or politely \
     decline if the message is unrelated to local services.]";

/// Assembler for creating context from provider candidates
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Assemble the context block for one turn: a numbered provider list
    /// followed by any guidance notes for the response stage.
    #[must_use]
    pub fn assemble(
        &self,
        hits: &[ProviderHit],
        flags: &IntentFlags,
        has_history: bool,
        utterance: &str,
        has_user_location: bool,
    ) -> String {
        let mut context = String::new();
        let mut total_length = 0;

        for (idx, hit) in hits.iter().enumerate() {
            let entry = format!("{}\n", self.format_hit(idx + 1, hit));

            if total_length + entry.len() > self.max_context_length {
                break;
            }

            context.push_str(&entry);
            total_length += entry.len();
        }

        if flags.is_asking_for_closest && !has_user_location {
            context.push_str(&format!("\n{NOTE_MISSING_LOCATION}\n"));
        }

        if hits.is_empty() {
            if has_history {
                context.push_str(&format!("\n{NOTE_ANSWER_FROM_HISTORY}\n"));
            } else if is_substantive(utterance) {
                context.push_str(&format!("\n{NOTE_NO_MATCHES}\n"));
            }
        }

        context
    }

    /// Format a single provider entry
    fn format_hit(&self, position: usize, hit: &ProviderHit) -> String {
        let p = &hit.provider;

        let mut header = format!("{position}. {}", p.name);
        if let Some(distance) = hit.distance_km {
            if distance < MAX_SHOWN_DISTANCE_KM {
                header.push_str(&format!(" (~{distance:.1} km away)"));
            }
        }

        let address = match &p.address {
            Some(address) => format!("{address}, {}", p.city),
            None => p.city.clone(),
        };

        let services = if p.services.is_empty() {
            "General Services".to_string()
        } else {
            p.services
                .iter()
                .map(format_service)
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "{header}\n   Rating: {}/5 ({} reviews)\n   Category: {}\n   Address: {address}\n   Hours: {}\n   About: {}\n   Services: {services}\n   Phone: {}\n   Link: {}",
            p.rating,
            p.review_count,
            p.category_name,
            p.operating_hours.as_deref().unwrap_or("Not specified"),
            p.description.as_deref().unwrap_or("No description"),
            p.phone.as_deref().unwrap_or("N/A"),
            p.profile_path().as_deref().unwrap_or("N/A"),
        )
    }
}

/// Flatten one service to "title (₹price/unit)"
fn format_service(service: &ServiceOffering) -> String {
    match (&service.price, &service.price_unit) {
        (Some(price), Some(unit)) => format!("{} (₹{price}/{unit})", service.title),
        (Some(price), None) => format!("{} (₹{price})", service.title),
        _ => service.title.clone(),
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(4000) // Default max context length
    }
}
