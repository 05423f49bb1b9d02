// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! FIX log auditing: decode tag=value messages out of application logs,
//! rebuild cancel/replace chains, diff each replacement against the order it
//! replaced and summarise fills.

pub mod decoder;
pub mod fix;
pub mod ingest;

pub use decoder::{AuditConfig, AuditReport, audit_text, decode_line, decode_log};
pub use fix::FixTables;
