//! Parse provider output into semantic issues
//!
//! Model output is untrusted. The response must be a JSON object with a
//! `findings` array; anything else is an error. Inside the array, items are
//! normalized rather than rejected:
//!
//! - an unrecognized `findingType` becomes `redundant_edge`
//! - a finding with an empty description is dropped
//! - a missing `involvedEntities` becomes an empty list
//! - `findings: null` (or no `findings` key) means no findings

use crate::error::GraphExpertError;
use lorekeeper_domain::{SemanticFindingType, SemanticIssue};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    findings: Option<Vec<Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFinding {
    #[serde(default)]
    finding_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    involved_entities: Option<Vec<String>>,
    #[serde(default)]
    suggestion: Option<String>,
}

/// Parse a completion response into semantic issues
pub fn parse_semantic_response(response: &str) -> Result<Vec<SemanticIssue>, GraphExpertError> {
    let raw = read_response(strip_fences(response))?;

    let mut issues = Vec::new();
    for (idx, item) in raw.findings.unwrap_or_default().into_iter().enumerate() {
        let finding: RawFinding = match serde_json::from_value(item) {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to parse semantic finding {}: {}", idx, e);
                continue;
            }
        };

        let description = finding.description.unwrap_or_default().trim().to_string();
        if description.is_empty() {
            warn!("Dropping semantic finding {}: empty description", idx);
            continue;
        }

        issues.push(SemanticIssue {
            finding_type: SemanticFindingType::from_label(
                finding.finding_type.as_deref().unwrap_or_default(),
            ),
            description,
            involved_entities: finding.involved_entities.unwrap_or_default(),
            suggestion: finding
                .suggestion
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        });
    }

    Ok(issues)
}

/// Remove a surrounding markdown code fence, with or without a language tag
fn strip_fences(response: &str) -> &str {
    let body = response.trim();
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };

    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Read the response object, ignoring prose before or after it
///
/// The first `{` that opens a complete object wins. Later candidates only
/// count when they carry a `findings` key, so a nested finding from a
/// truncated reply is never mistaken for the whole response.
fn read_response(body: &str) -> Result<RawResponse, GraphExpertError> {
    let mut first_error = None;

    for (idx, (start, _)) in body.match_indices('{').enumerate() {
        let mut values =
            serde_json::Deserializer::from_str(&body[start..]).into_iter::<Map<String, Value>>();

        match values.next() {
            Some(Ok(object)) if idx == 0 || object.contains_key("findings") => {
                return Ok(serde_json::from_value(Value::Object(object))?);
            }
            Some(Err(e)) if first_error.is_none() => first_error = Some(e),
            _ => {}
        }
    }

    Err(match first_error {
        Some(e) => e.into(),
        None => GraphExpertError::InvalidResponse("No JSON object in response".to_string()),
    })
}
