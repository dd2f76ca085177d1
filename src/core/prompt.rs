use crate::models::{Item, ScoredCandidate};
use serde::Deserialize;
use serde_json::{json, Value};

pub const SYSTEM_PROMPT: &str =
    "You are an expert at matching lost and found items. Be thorough but only suggest strong matches.";

/// Name of the function the oracle is forced to call
pub const TOOL_NAME: &str = "report_matches";

/// Build the comparison request for one source item and its candidates
///
/// Candidates are numbered from 1 and carry their id so the oracle can
/// reference them in its structured answer.
pub fn build_prompt(source: &Item, candidates: &[Item]) -> String {
    let listing = candidates
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            format!(
                "{}. ID: {}\n   Title: {}\n   Description: {}\n   Location: {}\n   Date: {}\n",
                idx + 1,
                item.id,
                item.title,
                item.description,
                item.location,
                item.item_date
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are analyzing lost and found items to find potential matches.\n\n\
         Source item ({category}):\n\
         - Title: {title}\n\
         - Description: {description}\n\
         - Location: {location}\n\
         - Date: {date}\n\n\
         Potential matching items ({opposite}):\n\
         {listing}\n\
         Analyze each potential match and return matches with a score from 0.0 to 1.0 based on:\n\
         - Title and description similarity (same type of item)\n\
         - Location proximity (same or nearby location)\n\
         - Date proximity (within reasonable timeframe)\n\
         - Category matching (e.g., a lost wallet matching a found wallet)\n\n\
         Only return items with score >= 0.5. Return fewer, higher quality matches rather than many low-quality ones.",
        category = source.category,
        title = source.title,
        description = source.description,
        location = source.location,
        date = source.item_date,
        opposite = source.category.opposite(),
        listing = listing,
    )
}

/// JSON-schema tool definition the oracle must answer through
pub fn report_matches_tool() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": TOOL_NAME,
            "description": "Report the matching items found",
            "parameters": {
                "type": "object",
                "properties": {
                    "matches": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "item_id": { "type": "string", "description": "The ID of the matching item" },
                                "score": { "type": "number", "description": "Match score from 0.0 to 1.0" },
                                "reason": { "type": "string", "description": "Brief explanation of why this is a match" }
                            },
                            "required": ["item_id", "score", "reason"]
                        }
                    }
                },
                "required": ["matches"]
            }
        }
    })
}

/// Full chat-completions body for one scoring call
pub fn build_request(model: &str, source: &Item, candidates: &[Item]) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": build_prompt(source, candidates) }
        ],
        "tools": [report_matches_tool()],
        "tool_choice": { "type": "function", "function": { "name": TOOL_NAME } }
    })
}

#[derive(Debug, Deserialize)]
struct ReportedMatches {
    #[serde(default)]
    matches: Vec<Value>,
}

/// Pull the `report_matches` arguments out of a chat-completions response.
///
/// Anything missing or malformed yields an empty list: oracle output is
/// non-deterministic and an unusable answer means "no matches", not an error.
/// A bad entry is dropped on its own without discarding the rest.
pub fn parse_tool_call(response: &Value) -> Vec<ScoredCandidate> {
    let arguments = response
        .pointer("/choices/0/message/tool_calls/0/function/arguments")
        .and_then(Value::as_str);

    let Some(arguments) = arguments else {
        tracing::info!("No tool call in oracle response");
        return Vec::new();
    };

    let reported = match serde_json::from_str::<ReportedMatches>(arguments) {
        Ok(reported) => reported,
        Err(e) => {
            tracing::warn!("Discarding malformed tool call arguments: {}", e);
            return Vec::new();
        }
    };

    reported
        .matches
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<ScoredCandidate>(entry) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                tracing::warn!("Discarding malformed match entry: {}", e);
                None
            }
        })
        .collect()
}
