//! Lenient parsing of LLM replies.
//!
//! Models wrap JSON in prose or markdown fences and write numbers as
//! strings. Everything here tolerates that and reduces the reply to the
//! typed schema, or fails with a descriptive error.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::schema::{AssessmentVerdict, Claim};

/// Locate the first balanced JSON object or array inside `text` that
/// actually parses.
pub fn extract_json(text: &str) -> Option<&str> {
    find_json(text, |_| true).map(|(raw, _)| raw)
}

/// Like [`extract_json`], but skips top-level spans that `wanted` rejects.
/// A reply citing `[1]` before its verdict object still yields the object.
/// Spans nested inside a rejected value are not considered.
fn find_json<F>(text: &str, wanted: F) -> Option<(&str, Value)>
where
    F: Fn(&Value) -> bool,
{
    let bytes = text.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        let b = bytes[start];
        if b != b'{' && b != b'[' {
            start += 1;
            continue;
        }

        if let Some(end) = balanced_end(bytes, start) {
            let candidate = &text[start..=end];
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                if wanted(&value) {
                    return Some((candidate, value));
                }
                start = end + 1;
                continue;
            }
        }
        start += 1;
    }

    None
}

/// An array of claim items (strings or objects), or an object holding a
/// `claims` array. Citation arrays like `[2]` do not qualify.
fn is_claims_shape(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(|item| item.is_string() || item.is_object()),
        Value::Object(map) => map.get("claims").is_some_and(Value::is_array),
        _ => false,
    }
}

/// Index of the bracket closing the one at `start`, ignoring brackets inside
/// string literals.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the claim extractor's reply. Accepts a bare array or an object
/// with a `claims` array; items may be objects or plain strings. Items
/// without text are dropped and at most `k` claims are returned.
pub fn parse_claims(reply: &str, k: usize) -> Result<Vec<Claim>> {
    let (_, value) = find_json(reply, is_claims_shape)
        .context("Claim extractor reply contained no claims array")?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("claims")
            .and_then(Value::as_array)
            .context("Claims JSON object has no `claims` array")?,
        _ => anyhow::bail!("Claims JSON is neither an array nor an object"),
    };

    let claims = items
        .iter()
        .filter_map(claim_from_value)
        .take(k)
        .collect();

    Ok(claims)
}

fn claim_from_value(value: &Value) -> Option<Claim> {
    match value {
        Value::String(text) if !text.trim().is_empty() => {
            Some(Claim::new(text.trim(), None, Vec::new()))
        }
        Value::Object(map) => {
            let text = map.get("text").and_then(Value::as_str)?.trim();
            if text.is_empty() {
                return None;
            }

            let snippet = map
                .get("snippet")
                .and_then(Value::as_str)
                .map(str::to_string);

            let queries = match map.get("proposed_queries") {
                Some(Value::Array(qs)) => qs
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                Some(Value::String(q)) => vec![q.clone()],
                _ => Vec::new(),
            };

            Some(Claim::new(text, snippet, queries))
        }
        _ => None,
    }
}

/// Parse the assessor's reply into a verdict. Missing or non-numeric scores
/// become 0.0, numeric scores are clamped into [0, 1]. A reply without a
/// JSON object is an error.
pub fn parse_verdict(reply: &str) -> Result<AssessmentVerdict> {
    let (_, value) = find_json(reply, Value::is_object)
        .context("Assessment reply contained no JSON object")?;
    let map = value
        .as_object()
        .context("Assessment JSON is not an object")?;

    let rationale = match map.get("rationale") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    Ok(AssessmentVerdict {
        support_score: coerce_score(map.get("support_score")),
        contradiction_score: coerce_score(map.get("contradiction_score")),
        rationale,
    })
}

/// Number or numeric string to a score in [0, 1]; anything else is 0.0.
pub fn coerce_score(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => 0.0,
    }
}
