// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

pub mod audit;
pub mod chain;
pub mod colours;
pub mod config;
pub mod diff;
pub mod fixparser;
pub mod logline;
pub mod message;
pub mod report;
pub mod summary;
pub mod timestamp;

pub use audit::{AuditReport, audit_text};
pub use chain::{Lineage, LineageAnomaly, OrderChain, chronological_order};
pub use colours::{disable_colours, enable_colours};
pub use config::AuditConfig;
pub use diff::{ChangeType, FieldChange, ReplacementDiff, diff_messages, diff_replacements};
pub use logline::{DecodedLog, SkipReason, SkippedLine, decode_line, decode_log};
pub use message::{DecodedField, DecodedMessage, Direction, MessageType, OrderEvent};
pub use summary::{AuditSummary, ChainSummary, ExecutionStats};
