//! Keyword-based intent classification
//!
//! Classification is plain substring matching against fixed vocabularies.
//! There is no stemming and no normalization beyond lowercasing; Hinglish
//! keywords are matched as literal substrings.

/// Flags extracted from the latest user utterance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentFlags {
    pub is_best_query: bool,
    pub is_compare_query: bool,
    pub is_asking_for_closest: bool,
    /// Documented behavior only; does not gate any pipeline branch
    pub is_urgent: bool,
    pub target_category_slug: Option<String>,
}

/// Ordered keyword -> category-slug table. Declaration order is the
/// tie-break: the first matching keyword wins, so broader words go after
/// the more specific ones that share a category.
const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("electrician", "electricians"),
    ("wiring", "electricians"),
    ("fan repair", "electricians"),
    ("light fitting", "electricians"),
    ("bijli", "electricians"),
    ("plumber", "plumbers"),
    ("plumbing", "plumbers"),
    ("tap", "plumbers"),
    ("leak", "plumbers"),
    ("pipe", "plumbers"),
    ("ac", "ac-repair"),
    ("air condition", "ac-repair"),
    ("cooling", "ac-repair"),
    ("carpenter", "carpenters"),
    ("furniture", "carpenters"),
    ("woodwork", "carpenters"),
    ("painter", "painters"),
    ("painting", "painters"),
    ("salon", "salons"),
    ("haircut", "salons"),
    ("parlour", "salons"),
    ("restaurant", "restaurants"),
    ("food", "restaurants"),
    ("khana", "restaurants"),
    ("dinner", "restaurants"),
    ("lunch", "restaurants"),
    ("tutor", "tutors"),
    ("coaching", "tutors"),
    ("tuition", "tutors"),
    ("cleaning", "cleaning"),
    ("safai", "cleaning"),
    ("pest control", "cleaning"),
    ("mechanic", "mechanics"),
    ("car repair", "mechanics"),
    ("bike repair", "mechanics"),
];

const BEST_KEYWORDS: &[&str] = &["best", "top rated", "sabse accha", "accha", "konsa"];

const COMPARE_KEYWORDS: &[&str] = &["compare", "comparison", "versus", " vs ", "difference", "farak"];

const CLOSEST_KEYWORDS: &[&str] = &["closest", "nearest", "near me", "nearby", "paas"];

const URGENT_KEYWORDS: &[&str] = &["urgent", "emergency", "asap", "jaldi", "turant"];

/// Utterances of three characters or fewer carry no usable intent; text
/// filters downstream skip them too so noise never drives a match.
pub fn is_substantive(utterance: &str) -> bool {
    utterance.trim().chars().count() > 3
}

/// Classify the latest user utterance.
pub fn classify(utterance: &str) -> IntentFlags {
    let text = utterance.trim().to_lowercase();
    if !is_substantive(&text) {
        return IntentFlags::default();
    }

    let contains_any = |keywords: &[&str]| keywords.iter().any(|kw| text.contains(kw));

    // First declared match wins
    let target_category_slug = CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, slug)| (*slug).to_string());

    IntentFlags {
        is_best_query: contains_any(BEST_KEYWORDS),
        is_compare_query: contains_any(COMPARE_KEYWORDS),
        is_asking_for_closest: contains_any(CLOSEST_KEYWORDS),
        is_urgent: contains_any(URGENT_KEYWORDS),
        target_category_slug,
    }
}
