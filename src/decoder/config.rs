// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use crate::fix::{FixTables, tags};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const SOH: char = '\u{0001}';

/// Separator precedence used when none is configured.
pub const DEFAULT_DELIMITERS: [char; 3] = [SOH, '|', ';'];

/// Length at which the raw source line is cut for display.
pub const DEFAULT_RAW_LIMIT: usize = 200;

/// Tags that always differ between two distinct messages and therefore say
/// nothing about what a replacement changed.
const DIFF_IGNORED: [u32; 14] = [
    tags::BEGIN_STRING,
    tags::BODY_LENGTH,
    tags::CHECK_SUM,
    tags::CL_ORD_ID,
    tags::MSG_SEQ_NUM,
    tags::MSG_TYPE,
    tags::ORIG_CL_ORD_ID,
    tags::POSS_DUP_FLAG,
    tags::SENDER_COMP_ID,
    tags::SENDING_TIME,
    tags::TARGET_COMP_ID,
    tags::TRANSACT_TIME,
    tags::POSS_RESEND,
    tags::ORIG_SENDING_TIME,
];

/// Knobs shared by every stage of an audit run.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub delimiters: Vec<char>,
    pub tables: Arc<FixTables>,
    pub diff_ignored_tags: BTreeSet<u32>,
    pub raw_limit: Option<usize>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            tables: FixTables::standard(),
            diff_ignored_tags: DIFF_IGNORED.into_iter().collect(),
            raw_limit: Some(DEFAULT_RAW_LIMIT),
        }
    }
}

impl AuditConfig {
    pub fn with_tables(mut self, tables: Arc<FixTables>) -> Self {
        self.tables = tables;
        self
    }

    /// Replace the separator precedence.  An empty list keeps the defaults so a
    /// misconfigured caller still gets a working decoder.
    pub fn with_delimiters(mut self, delimiters: Vec<char>) -> Self {
        if !delimiters.is_empty() {
            self.delimiters = delimiters;
        }
        self
    }

    pub fn with_raw_limit(mut self, limit: Option<usize>) -> Self {
        self.raw_limit = limit;
        self
    }

    /// Pick the separator for a payload: the first configured delimiter that
    /// actually occurs in it.
    pub fn delimiter_for(&self, payload: &str) -> Option<char> {
        self.delimiters.iter().copied().find(|d| payload.contains(*d))
    }
}
