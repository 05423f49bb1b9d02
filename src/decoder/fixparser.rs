// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

/// Parsed representation of a single FIX tag/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub tag: u32,
    pub value: String,
}

/// A fragment whose tag is all digits but too large for a `u32` tag number.
/// Kept verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizedTag {
    pub tag: String,
    pub value: String,
}

/// Tag/value pairs recovered from one payload, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPayload {
    pub fields: Vec<FieldValue>,
    pub oversized: Vec<OversizedTag>,
}

impl ParsedPayload {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.oversized.is_empty()
    }
}

/// Split a FIX payload into ordered tag/value pairs on `delimiter`, skipping
/// fragments without `=` or whose tag is not a number.  Only the first `=`
/// separates tag from value, so values may themselves contain `=`.
pub fn parse_fix(msg: &str, delimiter: char) -> ParsedPayload {
    let mut parsed = ParsedPayload::default();
    for fragment in msg.split(delimiter).map(str::trim) {
        let Some((tag, value)) = fragment.split_once('=') else {
            continue;
        };
        let tag = tag.trim();
        if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let value = value.trim().to_string();
        match tag.parse::<u32>() {
            Ok(tag) => parsed.fields.push(FieldValue { tag, value }),
            Err(_) => parsed.oversized.push(OversizedTag {
                tag: tag.to_string(),
                value,
            }),
        }
    }
    parsed
}
