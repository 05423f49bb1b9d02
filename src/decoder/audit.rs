// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use crate::decoder::chain::{Lineage, LineageAnomaly, OrderChain, chronological_order};
use crate::decoder::config::AuditConfig;
use crate::decoder::diff::{ReplacementDiff, diff_replacements};
use crate::decoder::logline::{SkippedLine, decode_log};
use crate::decoder::message::DecodedMessage;
use crate::decoder::summary::{AuditSummary, ChainSummary, summarise};
use serde::Serialize;
use tracing::{debug, info_span};

/// Complete result of auditing one document.  `messages` stay in input order;
/// every other view is derived from the chronological ordering.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub messages: Vec<DecodedMessage>,
    pub skipped: Vec<SkippedLine>,
    pub chains: Vec<OrderChain>,
    pub anomalies: Vec<LineageAnomaly>,
    pub diffs: Vec<ReplacementDiff>,
    pub summary: AuditSummary,
    pub chain_summaries: Vec<ChainSummary>,
}

impl AuditReport {
    /// Chain holding `cl_ord_id`, if any.
    pub fn chain_for(&self, cl_ord_id: &str) -> Option<&OrderChain> {
        self.chains.iter().find(|c| c.contains(cl_ord_id))
    }

    /// Messages belonging to `chain`, in chronological order.
    pub fn chain_messages(&self, chain: &OrderChain) -> Vec<&DecodedMessage> {
        let ids = chain.id_set();
        chronological_order(&self.messages)
            .into_iter()
            .map(|idx| &self.messages[idx])
            .filter(|msg| {
                msg.msg_type.as_ref().is_some_and(|k| k.is_lifecycle())
                    && msg.order_event().cl_ord_id().is_some_and(|id| ids.contains(id))
            })
            .collect()
    }
}

/// Decode, order, link, diff and summarise a whole log.  Input that contains
/// no FIX at all produces an empty report rather than an error.
pub fn audit_text(text: &str, config: &AuditConfig) -> AuditReport {
    let span = info_span!("audit", bytes = text.len());
    let _guard = span.enter();

    let log = decode_log(text, config);
    let order = chronological_order(&log.messages);
    let (chains, anomalies) = Lineage::build(&log.messages, &order).chains();
    let diffs = diff_replacements(&log.messages, &order, &config.diff_ignored_tags);
    let (summary, chain_summaries) = summarise(&log.messages, &order, &chains, log.skipped.len());

    debug!(
        messages = log.messages.len(),
        skipped = log.skipped.len(),
        chains = chains.len(),
        anomalies = anomalies.len(),
        "audit complete"
    );

    AuditReport {
        messages: log.messages,
        skipped: log.skipped,
        chains,
        anomalies,
        diffs,
        summary,
        chain_summaries,
    }
}
