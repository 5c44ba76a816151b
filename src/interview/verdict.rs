//! Terminal-verdict extraction from raw assistant replies.
//!
//! The assistant ends an interview by embedding a JSON object in its
//! reply. This module splits that object from any conversational prose
//! around it. Malformed payloads degrade to plain text; extraction never
//! fails the interview.

use serde::Deserialize;

use crate::models::enums::RiskLevel;
use crate::models::RiskVerdict;

/// Outcome of scanning one assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    /// The reply carried a verdict; `remainder` is the surrounding prose
    /// (possibly empty) with the JSON span removed.
    Terminal {
        verdict: RiskVerdict,
        remainder: String,
    },
    /// Ordinary conversational text, kept verbatim.
    Prose(String),
}

#[derive(Deserialize)]
struct VerdictPayload {
    resumo_triagem: String,
    grau_risco: String,
}

/// Scan a raw assistant reply for a terminal verdict.
///
/// Pure function: the same input always yields the same result.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some((start, end)) = first_balanced_span(raw) else {
        return ParsedReply::Prose(raw.to_string());
    };

    match serde_json::from_str::<VerdictPayload>(&raw[start..end]) {
        Ok(payload) => {
            let remainder = format!("{}{}", &raw[..start], &raw[end..])
                .trim()
                .to_string();
            ParsedReply::Terminal {
                verdict: RiskVerdict {
                    summary: payload.resumo_triagem,
                    risk_level: RiskLevel::parse_lenient(&payload.grau_risco),
                },
                remainder,
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "brace span is not a verdict payload, treating reply as prose");
            ParsedReply::Prose(raw.to_string())
        }
    }
}

/// Byte range of the first balanced `{...}` span, honoring JSON string
/// literals and escapes. `None` when no span closes.
fn first_balanced_span(text: &str) -> Option<(usize, usize)> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, i + 1));
                }
            }
            _ => {}
        }
    }
    None
}
