//! Tool-Call Extraction
//!
//! The model embeds tool requests in free text as `<TOOL>{...}</TOOL>`
//! blocks containing a JSON object with a mandatory `tool` field and an
//! optional `parameters` mapping. Extraction is best-effort: a block that
//! fails to decode is skipped and the scan continues; an open marker with
//! no matching close marker is ignored. The scan itself never fails.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::tool::ToolCallRequest;

/// Open marker for an embedded tool call
pub const TOOL_OPEN: &str = "<TOOL>";
/// Close marker for an embedded tool call
pub const TOOL_CLOSE: &str = "</TOOL>";

#[derive(Deserialize)]
struct RawToolCall {
    tool: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

/// Extract tool-call requests from model output, in order of appearance.
///
/// Returns an empty vec when no well-formed block is present.
pub fn parse_tool_calls(text: &str) -> Vec<ToolCallRequest> {
    if !text.contains(TOOL_OPEN) {
        return Vec::new();
    }

    let mut calls = Vec::new();

    for block in text.split(TOOL_OPEN).skip(1) {
        let Some((body, _)) = block.split_once(TOOL_CLOSE) else {
            // Unterminated block: ignore, keep scanning later pairs
            continue;
        };

        match serde_json::from_str::<RawToolCall>(body.trim()) {
            Ok(raw) => calls.push(ToolCallRequest::new(raw.tool, raw.parameters)),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed tool block");
            }
        }
    }

    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_call_with_parameters() {
        let calls = parse_tool_calls(r#"<TOOL>{"tool":"x","parameters":{"a":1}}</TOOL>"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "x");
        assert_eq!(calls[0].parameters.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_parameters_default_to_empty() {
        let calls = parse_tool_calls(r#"<TOOL>{"tool": "get_dataset_overview"}</TOOL>"#);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].parameters.is_empty());
    }

    #[test]
    fn test_no_marker_yields_empty() {
        assert!(parse_tool_calls("Revenue grew 10% year on year.").is_empty());
    }

    #[test]
    fn test_order_matches_appearance() {
        let text = concat!(
            "First I need the PSU data.\n",
            r#"<TOOL>{"tool":"get_psu_data","parameters":{"psu_name":"PSU_1"}}</TOOL>"#,
            "\nThen the sector context.\n",
            r#"<TOOL>{"tool":"analyze_sector","parameters":{"sector":"Energy"}}</TOOL>"#,
        );
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tool, "get_psu_data");
        assert_eq!(calls[1].tool, "analyze_sector");
    }

    #[test]
    fn test_malformed_block_skipped_scan_continues() {
        let text = concat!(
            r#"<TOOL>{not json}</TOOL> "#,
            r#"<TOOL>{"tool":"analyze_psu","parameters":{"psu_name":"PSU_2"}}</TOOL>"#,
        );
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "analyze_psu");
    }

    #[test]
    fn test_missing_tool_key_skipped() {
        let calls = parse_tool_calls(r#"<TOOL>{"parameters":{"a":1}}</TOOL>"#);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_unterminated_block_ignored() {
        let text = concat!(
            r#"<TOOL>{"tool":"analyze_psu"}"#,
            "\nno close marker here",
        );
        assert!(parse_tool_calls(text).is_empty());
    }

    #[test]
    fn test_unterminated_block_does_not_break_later_blocks() {
        // The dangling open marker swallows everything up to the next close
        // marker; the last well-formed pair still parses.
        let text = concat!(
            r#"<TOOL>{"tool":"a"} "#,
            r#"<TOOL>{"tool":"b"}</TOOL>"#,
        );
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "b");
    }

    #[test]
    fn test_multiline_json_block() {
        let text = "<TOOL>\n{\n    \"tool\": \"identify_top_performers\",\n    \"parameters\": {\"sector\": \"Energy\", \"metric\": \"ROE\", \"top_n\": 5}\n}\n</TOOL>";
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].parameters.get("top_n"), Some(&json!(5)));
    }
}
