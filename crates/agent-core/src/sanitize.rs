//! Final-Response Cleanup
//!
//! The model is instructed never to ask the user for more input and never to
//! leak tool markup into the final answer, but compliance is not guaranteed.
//! This module is the deterministic backstop: strip well-formed `<TOOL>`
//! blocks (keeping surrounding prose), drop everything after an unterminated
//! open marker, then truncate at the first sentence containing a canned
//! closing phrase.

use crate::parser::{TOOL_CLOSE, TOOL_OPEN};

/// Case-insensitive closing phrases that trigger truncation of the sentence
/// containing them and everything after it.
const CLOSING_PHRASES: &[&str] = &[
    "would you like me to elaborate",
    "let me know if you need",
    "is there anything else",
    "is there anything specific",
    "do you need any additional information",
    "would you like more details",
    "please let me know",
    "i hope this analysis helps",
];

/// Clean a candidate final response for display.
///
/// Never fails; text free of markers and closing phrases passes through
/// unchanged (modulo trimming), which makes the function idempotent.
pub fn clean_response(text: &str) -> String {
    let text = strip_tool_blocks(text);
    let text = strip_closing_phrases(&text);
    text.trim().to_string()
}

/// Remove well-formed tool blocks, keeping the prose around them. An open
/// marker with no close marker drops the remainder of the text: better to
/// under-return than leak malformed markup.
fn strip_tool_blocks(text: &str) -> String {
    if !text.contains(TOOL_OPEN) {
        return text.to_string();
    }

    let mut pieces = text.split(TOOL_OPEN);
    let mut cleaned = pieces.next().unwrap_or_default().to_string();

    for piece in pieces {
        if let Some((_, after)) = piece.split_once(TOOL_CLOSE) {
            if !after.trim().is_empty() {
                cleaned.push_str(after);
            }
        }
        // No close marker: the whole piece is dropped
    }

    cleaned
}

/// Truncate at the first sentence containing a closing phrase. Sentences are
/// split on the literal `". "` separator, matching the historical behavior
/// (known to be fragile around abbreviations).
fn strip_closing_phrases(text: &str) -> String {
    let mut text = text.to_string();

    for phrase in CLOSING_PHRASES {
        if !text.to_lowercase().contains(phrase) {
            continue;
        }

        let sentences: Vec<&str> = text.split(". ").collect();
        if let Some(idx) = sentences
            .iter()
            .position(|s| s.to_lowercase().contains(phrase))
        {
            let mut kept = sentences[..idx].join(". ");
            if idx > 0 {
                kept.push('.');
            }
            text = kept;
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        let text = "Revenue grew 10% while margins held steady.";
        assert_eq!(clean_response(text), text);
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let text = "NTPC leads the Energy sector. Margins improved in 2024.";
        let once = clean_response(text);
        assert_eq!(clean_response(&once), once);
    }

    #[test]
    fn test_removes_tool_block_keeps_prose() {
        let text = "Before. <TOOL>{\"tool\":\"x\"}</TOOL> After.";
        assert_eq!(clean_response(text), "Before.  After.");
    }

    #[test]
    fn test_unterminated_block_drops_remainder() {
        let text = "Solid analysis here. <TOOL>{\"tool\":\"x\" and then garbage";
        assert_eq!(clean_response(text), "Solid analysis here.");
    }

    #[test]
    fn test_block_and_closing_phrase_combined() {
        let text =
            "Revenue grew 10%. <TOOL>{...}</TOOL> Let me know if you need more details.";
        assert_eq!(clean_response(text), "Revenue grew 10%.");
    }

    #[test]
    fn test_closing_sentence_and_following_dropped() {
        let text = "Margins are up. Would you like more details on this. This never shows.";
        assert_eq!(clean_response(text), "Margins are up.");
    }

    #[test]
    fn test_closing_in_first_sentence_empties_text() {
        let text = "Is there anything else I can do. Trailing content.";
        assert_eq!(clean_response(text), "");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let text = "Good year overall. I HOPE THIS ANALYSIS HELPS you decide.";
        assert_eq!(clean_response(text), "Good year overall.");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(clean_response("  answer  \n"), "answer");
    }
}
