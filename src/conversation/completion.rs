// ABOUTME: Detects and extracts the sentinel-delimited completion block from model replies
// ABOUTME: Strips the block from spoken text and parses its JSON into CollectedUserData
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::constants::sentinels::COMPLETE_MARKER;
use crate::models::CollectedUserData;

/// What the completion scan found in a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No completion marker present
    Absent,
    /// Marker present and the JSON block decoded
    Parsed(CollectedUserData),
    /// Marker present but no decodable block
    Malformed,
}

/// A model reply with the completion block removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedReply {
    /// Text safe to show and speak
    pub text: String,
    /// Completion status
    pub completion: Completion,
}

/// Captures the JSON object between the two sentinel markers
fn payload_regex() -> Option<&'static Regex> {
    static PAYLOAD_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    PAYLOAD_REGEX
        .get_or_init(|| Regex::new(r"(?s)\|\|\|COMPLETE\|\|\|\s*(\{.*?\})\s*\|\|\|END\|\|\|").ok())
        .as_ref()
}

/// Matches the whole sentinel block for removal
fn block_regex() -> Option<&'static Regex> {
    static BLOCK_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    BLOCK_REGEX
        .get_or_init(|| Regex::new(r"(?s)\|\|\|COMPLETE\|\|\|.*?\|\|\|END\|\|\|").ok())
        .as_ref()
}

/// Scan a raw model reply for the completion block.
///
/// The first block is removed and the remainder trimmed. A start marker
/// without a closing marker removes everything from the marker on, so a
/// truncated block is never spoken.
#[must_use]
pub fn scan_reply(raw: &str) -> ScannedReply {
    let Some(marker_at) = raw.find(COMPLETE_MARKER) else {
        return ScannedReply {
            text: raw.trim().to_owned(),
            completion: Completion::Absent,
        };
    };

    let completion = payload_regex()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map_or(Completion::Malformed, |json| {
            match serde_json::from_str::<CollectedUserData>(json.as_str()) {
                Ok(data) => Completion::Parsed(data),
                Err(e) => {
                    warn!(error = %e, "Completion block JSON did not decode");
                    Completion::Malformed
                }
            }
        });

    let text = match block_regex().and_then(|re| re.find(raw)) {
        Some(block) => format!("{}{}", &raw[..block.start()], &raw[block.end()..]),
        None => raw[..marker_at].to_owned(),
    };

    ScannedReply {
        text: text.trim().to_owned(),
        completion,
    }
}
