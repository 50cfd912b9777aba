//! Parse LLM output into functionality records

use crate::error::ExtractorError;
use crate::types::{ChunkExtraction, RecordCandidate};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Parse an LLM response into records.
///
/// Fence lines are stripped first. If the remainder is not a JSON array, the
/// outermost `[` ... `]` span of the raw response is tried before giving up
/// with [`ExtractorError::MalformedResponse`]. Individual elements that are
/// not record objects are skipped; nameless records are counted and dropped.
pub fn parse_llm_response(response: &str) -> Result<ChunkExtraction, ExtractorError> {
    let elements = parse_array(response)?;

    let mut extraction = ChunkExtraction::default();
    for (idx, element) in elements.into_iter().enumerate() {
        if !element.is_object() {
            warn!("Skipping element {}: not a JSON object", idx);
            extraction.skipped_elements += 1;
            continue;
        }

        match serde_json::from_value::<RecordCandidate>(element) {
            Ok(candidate) => match candidate.into_record() {
                Some(record) => extraction.records.push(record),
                None => {
                    debug!("Discarding element {}: missing name", idx);
                    extraction.discarded_nameless += 1;
                }
            },
            Err(e) => {
                warn!("Failed to parse element {}: {}", idx, e);
                extraction.skipped_elements += 1;
            }
        }
    }

    Ok(extraction)
}

fn parse_array(response: &str) -> Result<Vec<Value>, ExtractorError> {
    let stripped = strip_code_fences(response);
    if stripped.is_empty() {
        return Err(ExtractorError::MalformedResponse("Empty response".to_string()));
    }

    match serde_json::from_str::<Value>(&stripped) {
        Ok(Value::Array(items)) => return Ok(items),
        Ok(_) => debug!("Response is JSON but not an array, trying salvage"),
        Err(e) => debug!("Response is not JSON ({}), trying salvage", e),
    }

    let salvaged = salvage_array(response)
        .ok_or_else(|| ExtractorError::MalformedResponse("No JSON array found in response".to_string()))?;

    match serde_json::from_str::<Value>(salvaged)? {
        Value::Array(items) => Ok(items),
        _ => Err(ExtractorError::MalformedResponse("Expected JSON array".to_string())),
    }
}

/// Remove fenced-code delimiter lines (with or without a language tag)
pub fn strip_code_fences(response: &str) -> String {
    response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn salvage_array(response: &str) -> Option<&str> {
    static ARRAY_SPAN: OnceLock<Regex> = OnceLock::new();
    let re = ARRAY_SPAN.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid array span regex"));
    re.find(response).map(|m| m.as_str())
}
