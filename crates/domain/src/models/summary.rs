//! Petition transcript summarisation models.
//!
//! The transcript of a citizen petition is sent to an LLM with a fixed
//! prompt; the reply is free text that is expected to end with a JSON
//! object holding the twelve extracted fields below.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Longest transcript accepted, in characters.
pub const MAX_TRANSCRIPT_CHARS: usize = 10_000;

/// Request body for the summary endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Fields extracted from a petition transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPetition {
    #[serde(default, deserialize_with = "lenient_string")]
    pub petitioner_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub county: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub district: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub requested_action: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub urgency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub follow_up_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub additional_notes: Option<String>,
}

/// Names of the extracted fields, in prompt order.
pub const EXTRACTED_FIELDS: [&str; 12] = [
    "petitionerName",
    "phoneNumber",
    "email",
    "address",
    "county",
    "district",
    "issueCategory",
    "issueSummary",
    "requestedAction",
    "urgency",
    "followUpDate",
    "additionalNotes",
];

/// Successful summary response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub success: bool,
    pub extracted_data: ExtractedPetition,
    /// Milliseconds spent handling the request.
    pub processing_time: u64,
}

/// Failure body shared by the edge-function endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeFailure {
    pub success: bool,
    pub error: String,
}

impl EdgeFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Transcript rejected before it reaches the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("Transcript is required")]
    Missing,

    #[error("Transcript exceeds 10000 characters ({0} given)")]
    TooLong(usize),
}

/// The model reply could not be turned into extracted fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("No JSON object found in model response")]
    NoJsonObject,

    #[error("Model response JSON is invalid: {0}")]
    InvalidJson(String),
}

/// Checks the transcript and returns it trimmed.
pub fn validate_transcript(transcript: Option<&str>) -> Result<&str, TranscriptError> {
    let trimmed = transcript.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(TranscriptError::Missing);
    }

    let count = trimmed.chars().count();
    if count > MAX_TRANSCRIPT_CHARS {
        return Err(TranscriptError::TooLong(count));
    }

    Ok(trimmed)
}

/// Builds the extraction prompt for a transcript.
pub fn build_prompt(transcript: &str) -> String {
    let fields = EXTRACTED_FIELDS
        .iter()
        .map(|f| format!("  \"{}\": string or null", f))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "You are assisting a political constituency office. Read the petition \
         transcript below and extract the requested details.\n\n\
         Transcript:\n\"\"\"\n{transcript}\n\"\"\"\n\n\
         Respond with a single JSON object with exactly these fields:\n{{\n{fields}\n}}\n\n\
         Use null for anything the transcript does not mention. \
         Dates use the YYYY-MM-DD format. urgency is one of low, medium, high."
    )
}

/// Returns the last balanced top-level `{...}` block in `text`.
///
/// Every `{` is tried as a block start, so a stray unmatched brace in the
/// surrounding prose does not swallow the blocks that follow it. Of the
/// balanced blocks, the one closing last wins, and of those the outermost.
/// Braces inside JSON strings are ignored once a block has been opened.
pub fn extract_last_json_object(text: &str) -> Option<&str> {
    let mut best: Option<(usize, usize)> = None;

    for (start, c) in text.char_indices() {
        if c != '{' {
            continue;
        }
        let Some(end) = matching_close(text, start) else {
            continue;
        };
        // Starts are visited in order, so on equal ends the earlier
        // (outer) block is kept.
        if best.map_or(true, |(_, best_end)| end > best_end) {
            best = Some((start, end));
        }
    }

    best.map(|(start, end)| &text[start..=end])
}

/// Byte index of the `}` closing the block opened at `start`.
fn matching_close(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parses the extracted fields out of a model reply.
pub fn parse_extracted_petition(reply: &str) -> Result<ExtractedPetition, ExtractionError> {
    let block = extract_last_json_object(reply).ok_or(ExtractionError::NoJsonObject)?;
    serde_json::from_str(block).map_err(|e| ExtractionError::InvalidJson(e.to_string()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(serde_json::Value::Array(items)) => {
            let joined = items
                .iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Null) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_transcript_missing() {
        assert_eq!(validate_transcript(None), Err(TranscriptError::Missing));
        assert_eq!(validate_transcript(Some("")), Err(TranscriptError::Missing));
        assert_eq!(validate_transcript(Some(" \n\t ")), Err(TranscriptError::Missing));
    }

    #[test]
    fn test_validate_transcript_length_limit() {
        let at_limit = "a".repeat(MAX_TRANSCRIPT_CHARS);
        assert!(validate_transcript(Some(&at_limit)).is_ok());

        let over = "a".repeat(MAX_TRANSCRIPT_CHARS + 1);
        assert_eq!(
            validate_transcript(Some(&over)),
            Err(TranscriptError::TooLong(MAX_TRANSCRIPT_CHARS + 1))
        );
    }

    #[test]
    fn test_validate_transcript_counts_characters_not_bytes() {
        let multibyte = "é".repeat(MAX_TRANSCRIPT_CHARS);
        assert!(validate_transcript(Some(&multibyte)).is_ok());
    }

    #[test]
    fn test_build_prompt_lists_every_field() {
        let prompt = build_prompt("My road has potholes.");
        assert!(prompt.contains("My road has potholes."));
        for field in EXTRACTED_FIELDS {
            assert!(prompt.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_extract_last_json_object_picks_last_block() {
        let text = r#"Draft: {"a": 1} Final answer: {"b": {"c": 2}} thanks"#;
        assert_eq!(extract_last_json_object(text), Some(r#"{"b": {"c": 2}}"#));
    }

    #[test]
    fn test_extract_last_json_object_ignores_braces_in_strings() {
        let text = r#"Here you go: {"issueSummary": "broken } pipe {", "urgency": "high"}"#;
        let block = extract_last_json_object(text).unwrap();
        assert!(block.ends_with(r#""high"}"#));
        assert!(serde_json::from_str::<serde_json::Value>(block).is_ok());
    }

    #[test]
    fn test_extract_last_json_object_handles_escaped_quotes() {
        let text = r#"{"additionalNotes": "she said \"urgent }\""}"#;
        assert_eq!(extract_last_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_last_json_object_prose_quotes_outside_block() {
        let text = r#"The caller said "hello". {"urgency": "low"}"#;
        assert_eq!(extract_last_json_object(text), Some(r#"{"urgency": "low"}"#));
    }

    #[test]
    fn test_extract_last_json_object_none() {
        assert_eq!(extract_last_json_object("no json here"), None);
        assert_eq!(extract_last_json_object("{ unterminated"), None);
    }

    #[test]
    fn test_extract_last_json_object_skips_unmatched_prose_brace() {
        let text = "Fields use the {name} style, e.g. { as shown.\n{\"urgency\": \"high\"}";
        assert_eq!(
            extract_last_json_object(text),
            Some(r#"{"urgency": "high"}"#)
        );
    }

    #[test]
    fn test_extract_last_json_object_unmatched_brace_before_nested_block() {
        let text = r#"Note { open. {"location": {"ward": "Kilimani"}, "urgency": "low"}"#;
        let block = extract_last_json_object(text).unwrap();
        assert!(block.starts_with(r#"{"location""#));
        assert!(serde_json::from_str::<serde_json::Value>(block).is_ok());
    }

    #[test]
    fn test_parse_extracted_petition() {
        let reply = r#"Sure! Here is the data:
```json
{
  "petitionerName": "Amina Otieno",
  "phoneNumber": 254700000000,
  "email": null,
  "address": "  ",
  "county": "Nakuru",
  "district": "Naivasha",
  "issueCategory": "Infrastructure",
  "issueSummary": "Road to the market is impassable.",
  "requestedAction": "Grade the road",
  "urgency": "high",
  "followUpDate": "2026-11-01",
  "additionalNotes": ["Called twice", "Has photos"],
  "unexpected": "ignored"
}
```"#;
        let petition = parse_extracted_petition(reply).unwrap();
        assert_eq!(petition.petitioner_name.as_deref(), Some("Amina Otieno"));
        assert_eq!(petition.phone_number.as_deref(), Some("254700000000"));
        assert_eq!(petition.email, None);
        assert_eq!(petition.address, None);
        assert_eq!(petition.urgency.as_deref(), Some("high"));
        assert_eq!(
            petition.additional_notes.as_deref(),
            Some("Called twice, Has photos")
        );
    }

    #[test]
    fn test_parse_extracted_petition_errors() {
        assert_eq!(
            parse_extracted_petition("I could not find anything."),
            Err(ExtractionError::NoJsonObject)
        );
        assert!(matches!(
            parse_extracted_petition("{not: json}"),
            Err(ExtractionError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_summary_response_uses_camel_case() {
        let response = SummaryResponse {
            success: true,
            extracted_data: ExtractedPetition {
                issue_summary: Some("Water shortage".to_string()),
                ..Default::default()
            },
            processing_time: 12,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["processingTime"], 12);
        assert_eq!(json["extractedData"]["issueSummary"], "Water shortage");
        assert!(json["extractedData"]["petitionerName"].is_null());
        assert_eq!(json["extractedData"].as_object().unwrap().len(), 12);
    }
}
