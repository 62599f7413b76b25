//! Keyword-based intent classification.
//!
//! Two independent heuristics over free text: a wake phrase that
//! short-circuits to a greeting, and a booking-intent check that
//! short-circuits to the booking flow. Both are deliberately naive substring
//! tests; false positives and negatives are acceptable.

/// Trigger utterance handled before any retrieval.
const WAKE_PHRASE: &str = "hey jarvis";

/// Keywords that indicate the visitor wants to schedule a service.
const BOOKING_KEYWORDS: &[&str] = &[
    "book",
    "booking",
    "appointment",
    "schedule",
    "reserve",
    "consultation",
];

/// True when the text is exactly the wake phrase, ignoring case and a
/// trailing `.` or `!`.
pub fn is_wake_phrase(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    let t = t.trim_end_matches(['.', '!']);
    t == WAKE_PHRASE
}

/// True when the text contains a booking keyword, or both "call" and "book".
pub fn has_booking_intent(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    if BOOKING_KEYWORDS.iter().any(|kw| t.contains(kw)) {
        return true;
    }
    t.contains("call") && t.contains("book")
}
