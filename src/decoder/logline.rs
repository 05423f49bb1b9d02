// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Turns raw log lines into decoded FIX messages.
//!
//! A line is split into a free-text prefix (timestamp, bracketed
//! connection/thread labels, a Sending/Receiving marker) and the FIX payload.
//! Each line either yields a [`DecodedMessage`] or a [`SkipReason`]; the
//! document-level loop keeps going regardless, so garbage lines only ever
//! shrink the result.

use crate::decoder::config::{AuditConfig, SOH};
use crate::decoder::fixparser::parse_fix;
use crate::decoder::message::{
    DecodedField, DecodedMessage, Direction, MessageType, OversizedField,
};
use crate::decoder::timestamp::{LOG_PREFIX, parse_timestamp};
use crate::fix::tags;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

static DIRECTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(sending|sent|receiving|received)\b").expect("valid regex")
});

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").expect("valid regex"));

/// Why a line produced no message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum SkipReason {
    #[error("blank line")]
    Blank,
    #[error("comment line")]
    Comment,
    #[error("no FIX payload found")]
    NoFixPayload,
    #[error("no tag=value fields in payload")]
    NoFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub reason: SkipReason,
}

/// Everything recovered from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedLog {
    pub messages: Vec<DecodedMessage>,
    pub skipped: Vec<SkippedLine>,
}

/// Decode every line of `text`.  Never fails: undecodable lines are listed in
/// `skipped` and the remaining messages are numbered in input order.
pub fn decode_log(text: &str, config: &AuditConfig) -> DecodedLog {
    let mut log = DecodedLog::default();
    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;
        match decode_line(line_number, line, config) {
            Ok(mut message) => {
                message.sequence = log.messages.len() + 1;
                log.messages.push(message);
            }
            Err(reason) => {
                if !matches!(reason, SkipReason::Blank | SkipReason::Comment) {
                    debug!(line = line_number, %reason, "skipping log line");
                }
                log.skipped.push(SkippedLine {
                    line_number,
                    reason,
                });
            }
        }
    }
    log
}

/// Decode a single log line.  `sequence` is provisionally the line number;
/// [`decode_log`] renumbers messages by emission order.
pub fn decode_line(
    line_number: usize,
    text: &str,
    config: &AuditConfig,
) -> Result<DecodedMessage, SkipReason> {
    let line = text.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim_end().is_empty() {
        return Err(SkipReason::Blank);
    }
    if trimmed.starts_with('#') {
        return Err(SkipReason::Comment);
    }

    let start = payload_start(line, &config.delimiters).ok_or(SkipReason::NoFixPayload)?;
    let (prefix, payload) = line.split_at(start);
    let delimiter = config.delimiter_for(payload).unwrap_or(SOH);
    let parsed = parse_fix(payload, delimiter);
    if parsed.is_empty() {
        return Err(SkipReason::NoFields);
    }

    let tables = &config.tables;
    let mut fields = BTreeMap::new();
    let mut repeated = Vec::new();
    let oversized: Vec<OversizedField> = parsed
        .oversized
        .into_iter()
        .map(|field| {
            debug!(line = line_number, tag = %field.tag, "tag number out of range, kept verbatim");
            OversizedField {
                name: format!("Tag_{}", field.tag),
                raw: field.value,
            }
        })
        .collect();
    for field in parsed.fields {
        let decoded = DecodedField {
            tag: field.tag,
            name: tables.field_name(field.tag),
            decoded: tables.decode(field.tag, &field.value).to_string(),
            raw: field.value,
        };
        if fields.contains_key(&decoded.tag) {
            repeated.push(decoded);
        } else {
            fields.insert(decoded.tag, decoded);
        }
    }

    let msg_type = fields
        .get(&tags::MSG_TYPE)
        .map(|f| MessageType::from_code(&f.raw));
    let msg_type_label = fields.get(&tags::MSG_TYPE).map(|f| f.decoded.clone());
    let timestamp = prefix_timestamp(prefix).or_else(|| {
        fields
            .get(&tags::SENDING_TIME)
            .and_then(|f| parse_timestamp(&f.raw))
    });
    let mut labels = bracketed_labels(prefix).into_iter();

    Ok(DecodedMessage {
        sequence: line_number,
        line_number,
        timestamp,
        direction: direction(prefix),
        connection: labels.next(),
        thread: labels.next(),
        msg_type,
        msg_type_label,
        fields,
        repeated,
        oversized,
        raw: truncate(line, config.raw_limit),
    })
}

/// Byte offset where the FIX payload begins: the first `<digits>=` that starts
/// a token, i.e. sits at the start of the line or follows whitespace, `:` or
/// one of the configured delimiters.  A leading `8=FIX` is just such a token;
/// `8=FIX` inside a value (`448=FIXDESK`, free text) is not.
fn payload_start(line: &str, delimiters: &[char]) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (pos, ch) in line.char_indices() {
        let at_boundary =
            prev.is_none_or(|p| p.is_whitespace() || p == ':' || delimiters.contains(&p));
        if at_boundary && ch.is_ascii_digit() && starts_with_tag(&line[pos..]) {
            return Some(pos);
        }
        prev = Some(ch);
    }
    None
}

fn starts_with_tag(text: &str) -> bool {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && text.as_bytes().get(digits) == Some(&b'=')
}

fn prefix_timestamp(prefix: &str) -> Option<chrono::NaiveDateTime> {
    LOG_PREFIX
        .captures(prefix)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_timestamp(m.as_str()))
}

/// The marker closest to the payload wins; bracketed labels such as
/// `[sent-queue]` are connection or thread names, not markers.
fn direction(prefix: &str) -> Option<Direction> {
    let unlabelled = BRACKETED.replace_all(prefix, " ");
    let marker = DIRECTION_MARKER
        .captures_iter(&unlabelled)
        .last()?
        .get(1)?
        .as_str()
        .to_string();
    match marker.to_ascii_lowercase().as_str() {
        "sending" | "sent" => Some(Direction::Outgoing),
        _ => Some(Direction::Incoming),
    }
}

fn bracketed_labels(prefix: &str) -> Vec<String> {
    BRACKETED
        .captures_iter(prefix)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn truncate(line: &str, limit: Option<usize>) -> String {
    match limit {
        Some(limit) => line.chars().take(limit).collect(),
        None => line.to_string(),
    }
}
