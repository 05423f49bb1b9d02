// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use crate::decoder::chain::OrderChain;
use crate::decoder::message::{DecodedMessage, MessageType};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

const UNKNOWN_STATUS: &str = "Unknown";

/// Fill statistics for one logical order (a whole replacement chain).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionStats {
    pub original_qty: f64,
    pub filled_qty: f64,
    pub fill_percentage: f64,
    pub vwap: f64,
    pub execution_count: usize,
    pub replacement_count: usize,
    pub final_status: String,
    pub symbol: Option<String>,
    pub side: Option<String>,
    pub venues: Vec<String>,
}

impl Default for ExecutionStats {
    fn default() -> Self {
        OrderTally::default().finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainSummary {
    pub root: String,
    #[serde(flatten)]
    pub stats: ExecutionStats,
}

/// Headline numbers for a whole log.  The execution figures describe the
/// chain that holds the first new order in the log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditSummary {
    pub total_messages: usize,
    pub skipped_lines: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub root: Option<String>,
    #[serde(flatten)]
    pub stats: ExecutionStats,
}

/// Running totals collected while streaming a chain's messages in time order.
#[derive(Debug, Default)]
struct OrderTally {
    original_qty: Option<f64>,
    filled_qty: f64,
    notional: f64,
    volume: f64,
    execution_count: usize,
    replacement_count: usize,
    final_status: Option<String>,
    symbol: Option<String>,
    side: Option<String>,
    venues: BTreeSet<String>,
}

impl OrderTally {
    fn absorb(&mut self, msg: &DecodedMessage) {
        let event = msg.order_event();
        if self.symbol.is_none() {
            self.symbol = event.symbol().map(str::to_string);
        }
        if self.side.is_none() {
            self.side = event.side().map(str::to_string);
        }

        match msg.msg_type.as_ref() {
            Some(MessageType::NewOrderSingle) => {
                if self.original_qty.is_none() {
                    self.original_qty = event.order_qty();
                }
            }
            Some(MessageType::OrderCancelReplaceRequest) => self.replacement_count += 1,
            Some(MessageType::ExecutionReport) => {
                self.final_status = Some(
                    event
                        .ord_status()
                        .filter(|s| !s.is_empty())
                        .unwrap_or(UNKNOWN_STATUS)
                        .to_string(),
                );
                self.absorb_execution(msg);
            }
            _ => {}
        }
    }

    fn absorb_execution(&mut self, msg: &DecodedMessage) {
        let event = msg.order_event();
        let cum_qty = event.cum_qty().unwrap_or(0.0);
        if cum_qty <= 0.0 {
            return;
        }
        self.execution_count += 1;
        self.filled_qty = self.filled_qty.max(cum_qty);

        // Some venues report LastPx=0 and only carry the price in AvgPx.
        let mut last_px = event.last_px().unwrap_or(0.0);
        let avg_px = event.avg_px().unwrap_or(0.0);
        if last_px == 0.0 && avg_px > 0.0 {
            last_px = avg_px;
        }
        let last_qty = event.last_qty().unwrap_or(0.0);
        if last_qty > 0.0 {
            self.notional += last_qty * last_px;
            self.volume += last_qty;
        }
        if let Some(venue) = event.last_market() {
            self.venues.insert(venue.to_string());
        }
    }

    fn finish(self) -> ExecutionStats {
        let original_qty = self.original_qty.unwrap_or(0.0);
        let fill_percentage = if original_qty > 0.0 {
            self.filled_qty / original_qty * 100.0
        } else {
            0.0
        };
        let vwap = if self.volume > 0.0 {
            self.notional / self.volume
        } else {
            0.0
        };
        ExecutionStats {
            original_qty,
            filled_qty: self.filled_qty,
            fill_percentage,
            vwap,
            execution_count: self.execution_count,
            replacement_count: self.replacement_count,
            final_status: self
                .final_status
                .unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
            symbol: self.symbol,
            side: self.side,
            venues: self.venues.into_iter().collect(),
        }
    }
}

/// Summarise every chain in one pass over the time-ordered messages, then
/// pick the headline chain for the log-level summary.
pub fn summarise(
    messages: &[DecodedMessage],
    order: &[usize],
    chains: &[OrderChain],
    skipped_lines: usize,
) -> (AuditSummary, Vec<ChainSummary>) {
    let mut owners: HashMap<&str, Vec<usize>> = HashMap::new();
    for (chain_idx, chain) in chains.iter().enumerate() {
        for id in &chain.cl_ord_ids {
            owners.entry(id.as_str()).or_default().push(chain_idx);
        }
    }

    let mut tallies: Vec<OrderTally> = chains.iter().map(|_| OrderTally::default()).collect();
    let mut first_new_order: Option<&str> = None;
    let mut first_timestamp: Option<NaiveDateTime> = None;
    let mut last_timestamp: Option<NaiveDateTime> = None;

    for msg in order.iter().filter_map(|&idx| messages.get(idx)) {
        if let Some(ts) = msg.timestamp {
            first_timestamp = Some(first_timestamp.map_or(ts, |t| t.min(ts)));
            last_timestamp = Some(last_timestamp.map_or(ts, |t| t.max(ts)));
        }
        if !msg.msg_type.as_ref().is_some_and(MessageType::is_lifecycle) {
            continue;
        }
        let Some(cl_ord_id) = msg.order_event().cl_ord_id() else {
            continue;
        };
        if first_new_order.is_none() && msg.is(&MessageType::NewOrderSingle) {
            first_new_order = Some(cl_ord_id);
        }
        for &chain_idx in owners.get(cl_ord_id).into_iter().flatten() {
            tallies[chain_idx].absorb(msg);
        }
    }

    let summaries: Vec<ChainSummary> = chains
        .iter()
        .zip(tallies)
        .map(|(chain, tally)| ChainSummary {
            root: chain.root.clone(),
            stats: tally.finish(),
        })
        .collect();

    let headline = first_new_order
        .and_then(|id| chains.iter().position(|c| c.contains(id)))
        .or(if chains.is_empty() { None } else { Some(0) });

    let summary = AuditSummary {
        total_messages: messages.len(),
        skipped_lines,
        first_timestamp,
        last_timestamp,
        root: headline.map(|idx| summaries[idx].root.clone()),
        stats: headline
            .map(|idx| summaries[idx].stats.clone())
            .unwrap_or_default(),
    };
    (summary, summaries)
}
