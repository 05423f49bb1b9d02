// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use crate::decoder::message::{DecodedMessage, MessageType};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub tag: u32,
    pub field_name: String,
    pub original_value: Option<String>,
    pub new_value: Option<String>,
    pub change_type: ChangeType,
}

/// What a cancel/replace request changed relative to the order it replaced.
/// `original_found == false` means the predecessor never appeared in the log,
/// so an empty `changes` list is "unknown", not "unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementDiff {
    pub replacement: String,
    pub original: Option<String>,
    pub original_found: bool,
    pub line_number: usize,
    pub changes: Vec<FieldChange>,
}

/// Diff every replace request against its predecessor: the latest earlier new
/// order or replace whose ClOrdID matches the request's OrigClOrdID.
pub fn diff_replacements(
    messages: &[DecodedMessage],
    order: &[usize],
    ignored: &BTreeSet<u32>,
) -> Vec<ReplacementDiff> {
    let mut placed: HashMap<&str, &DecodedMessage> = HashMap::new();
    let mut diffs = Vec::new();

    for msg in order.iter().filter_map(|&idx| messages.get(idx)) {
        let is_new = msg.is(&MessageType::NewOrderSingle);
        let is_replace = msg.is(&MessageType::OrderCancelReplaceRequest);
        if !is_new && !is_replace {
            continue;
        }
        let event = msg.order_event();

        if is_replace {
            let orig_id = event.orig_cl_ord_id();
            let original = orig_id.and_then(|id| placed.get(id).copied());
            diffs.push(ReplacementDiff {
                replacement: event.cl_ord_id().unwrap_or_default().to_string(),
                original: orig_id.map(str::to_string),
                original_found: original.is_some(),
                line_number: msg.line_number,
                changes: original
                    .map(|orig| diff_messages(orig, msg, ignored))
                    .unwrap_or_default(),
            });
        }

        if let Some(id) = event.cl_ord_id() {
            placed.insert(id, msg);
        }
    }
    diffs
}

/// Field-level differences between two messages, by ascending tag, comparing
/// decoded values.  Tags in `ignored` are skipped.
pub fn diff_messages(
    original: &DecodedMessage,
    replacement: &DecodedMessage,
    ignored: &BTreeSet<u32>,
) -> Vec<FieldChange> {
    let tags: BTreeSet<u32> = original
        .fields
        .keys()
        .chain(replacement.fields.keys())
        .copied()
        .filter(|tag| !ignored.contains(tag))
        .collect();

    tags.into_iter()
        .filter_map(|tag| {
            let before = original.fields.get(&tag);
            let after = replacement.fields.get(&tag);
            let change_type = match (before, after) {
                (None, Some(_)) => ChangeType::Added,
                (Some(_), None) => ChangeType::Removed,
                (Some(b), Some(a)) if b.decoded != a.decoded => ChangeType::Modified,
                _ => return None,
            };
            let field_name = after.or(before).map(|f| f.name.clone())?;
            Some(FieldChange {
                tag,
                field_name,
                original_value: before.map(|f| f.decoded.clone()),
                new_value: after.map(|f| f.decoded.clone()),
                change_type,
            })
        })
        .collect()
}
