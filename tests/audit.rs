// SPDX-License-Identifier: AGPL-3.0-only
// End-to-end audits of a realistic cancel/replace session log.

use fixaudit::decoder::chain::LineageAnomaly;
use fixaudit::decoder::diff::ChangeType;
use fixaudit::decoder::message::MessageType;
use fixaudit::ingest::decode_bytes;
use fixaudit::{AuditConfig, AuditReport, audit_text};

const SAMPLE: &str = include_str!("data/sample_order.log");

const CHAIN: [&str; 4] = [
    "5DLY0000030001",
    "5DLY000003000B",
    "5DLY000003000K",
    "5DLY000003000P",
];

/// (LastQty, LastPx) of every fill in the sample log.
const FILLS: [(f64, f64); 16] = [
    (100.0, 2.15),
    (100.0, 2.15),
    (200.0, 2.16),
    (100.0, 2.16),
    (8.0, 2.17),
    (11.0, 2.17),
    (22.0, 2.17),
    (59.0, 2.17),
    (100.0, 2.18),
    (100.0, 2.18),
    (100.0, 2.18),
    (128.0, 2.18),
    (72.0, 2.18),
    (200.0, 2.18),
    (200.0, 2.17),
    (100.0, 2.17),
];

fn sample_report() -> AuditReport {
    audit_text(SAMPLE, &AuditConfig::default())
}

#[test]
fn sample_log_reconstructs_full_chain() {
    let report = sample_report();
    assert_eq!(report.messages.len(), 27);
    assert_eq!(report.skipped.len(), 4);
    assert_eq!(report.chains.len(), 1);
    assert!(report.anomalies.is_empty());

    let chain = &report.chains[0];
    assert_eq!(chain.root, CHAIN[0]);
    assert_eq!(chain.cl_ord_ids, CHAIN);
    assert!(
        chain
            .order_ids
            .iter()
            .all(|id| id.as_deref() == Some("LSE-77001"))
    );
    let statuses: Vec<&str> = chain
        .steps
        .iter()
        .map(|s| s.terminal_status.as_str())
        .collect();
    assert_eq!(
        statuses,
        vec!["Partially Filled", "Partially Filled", "Partially Filled", "Canceled"]
    );
}

#[test]
fn cumulative_quantity_progresses_in_time_order() {
    let report = sample_report();
    let chain = report.chain_for("5DLY000003000K").expect("chain");
    let mut cums: Vec<f64> = report
        .chain_messages(chain)
        .into_iter()
        .filter(|m| m.is(&MessageType::ExecutionReport))
        .filter_map(|m| m.order_event().cum_qty())
        .filter(|q| *q > 0.0)
        .collect();
    cums.dedup();
    assert_eq!(
        cums,
        vec![
            100.0, 200.0, 400.0, 500.0, 508.0, 519.0, 541.0, 600.0, 700.0, 800.0, 900.0,
            1028.0, 1100.0, 1300.0, 1500.0, 1600.0
        ]
    );
}

#[test]
fn sample_summary_figures() {
    let report = sample_report();
    let summary = &report.summary;
    assert_eq!(summary.root.as_deref(), Some(CHAIN[0]));
    assert_eq!(summary.total_messages, 27);
    assert_eq!(summary.skipped_lines, 4);

    let stats = &summary.stats;
    assert_eq!(stats.original_qty, 2000.0);
    assert_eq!(stats.filled_qty, 1600.0);
    assert!((stats.fill_percentage - 80.0).abs() < 1e-9);
    assert_eq!(stats.execution_count, 19);
    assert_eq!(stats.replacement_count, 2);
    assert_eq!(stats.final_status, "Canceled");
    assert_eq!(stats.symbol.as_deref(), Some("BARC"));
    assert_eq!(stats.side.as_deref(), Some("Buy"));
    assert_eq!(stats.venues, vec!["BATE", "CHIX", "XLON"]);

    let volume: f64 = FILLS.iter().map(|(q, _)| q).sum();
    let notional: f64 = FILLS.iter().map(|(q, p)| q * p).sum();
    assert_eq!(volume, 1600.0);
    assert!((stats.vwap - notional / volume).abs() < 1e-9);

    let first = summary.first_timestamp.expect("first").to_string();
    let last = summary.last_timestamp.expect("last").to_string();
    assert_eq!(first, "2025-03-10 07:59:58.000001");
    assert_eq!(last, "2025-03-10 08:00:21.200700");
}

#[test]
fn replacement_diffs_show_only_what_changed() {
    let report = sample_report();
    assert_eq!(report.diffs.len(), 2);

    let price = &report.diffs[0];
    assert_eq!(price.replacement, CHAIN[1]);
    assert_eq!(price.original.as_deref(), Some(CHAIN[0]));
    assert!(price.original_found);
    assert_eq!(price.line_number, 12);
    assert_eq!(price.changes.len(), 1);
    assert_eq!(price.changes[0].field_name, "Price");
    assert_eq!(price.changes[0].original_value.as_deref(), Some("2.15"));
    assert_eq!(price.changes[0].new_value.as_deref(), Some("2.18"));

    let qty = &report.diffs[1];
    assert_eq!(qty.replacement, CHAIN[2]);
    assert_eq!(qty.changes.len(), 1);
    assert_eq!(qty.changes[0].tag, 38);
    assert_eq!(qty.changes[0].change_type, ChangeType::Modified);
    assert_eq!(qty.changes[0].original_value.as_deref(), Some("2000"));
    assert_eq!(qty.changes[0].new_value.as_deref(), Some("1800"));
}

#[test]
fn separators_do_not_change_the_audit() {
    let pipe = sample_report();
    for sep in ["\u{1}", ";"] {
        let text = SAMPLE.replace('|', sep);
        let other = audit_text(&text, &AuditConfig::default());
        assert_eq!(other.messages.len(), pipe.messages.len());
        assert_eq!(other.chains[0].cl_ord_ids, pipe.chains[0].cl_ord_ids);
        assert_eq!(other.summary.stats, pipe.summary.stats);
        assert_eq!(other.diffs.len(), pipe.diffs.len());
    }
}

#[test]
fn auditing_is_deterministic() {
    let first = serde_json::to_value(sample_report()).expect("json");
    let second = serde_json::to_value(sample_report()).expect("json");
    assert_eq!(first, second);
}

#[test]
fn garbage_never_breaks_the_audit() {
    let junk = [
        "",
        "\n\n\n",
        "=|=|=",
        "abc=def|ghi=jkl",
        "35",
        "|||;;;\u{1}\u{1}",
        "2025-99-99 99:99:99 Sending: 35=D|11=",
        "35=8|11=A|14=lots|32=-|31=NaN|6=inf",
        "35=G|11=A|41=A\n35=G|11=A|41=A",
    ];
    for text in junk {
        let report = audit_text(text, &AuditConfig::default());
        assert_eq!(report.summary.stats.fill_percentage, 0.0, "{text:?}");
        assert_eq!(report.summary.stats.vwap, 0.0, "{text:?}");
    }

    let bytes: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    let text = decode_bytes(&bytes);
    let report = audit_text(&text, &AuditConfig::default());
    assert_eq!(
        report.messages.len() + report.skipped.len(),
        text.lines().count()
    );
    assert_eq!(report.summary.stats.vwap, 0.0);
}

#[test]
fn self_replacement_is_reported_as_cycle() {
    let report = audit_text("35=G|11=A|41=A\n", &AuditConfig::default());
    assert_eq!(report.chains.len(), 1);
    assert_eq!(
        report.anomalies,
        vec![LineageAnomaly::Cycle {
            ids: vec!["A".to_string()]
        }]
    );
}

#[test]
fn custom_delimiter_precedence_is_honoured() {
    let config = AuditConfig::default().with_delimiters(vec![';']);
    let report = audit_text("35=D;11=X|Y;38=10\n", &config);
    assert_eq!(report.messages[0].value(11), Some("X|Y"));
    assert_eq!(report.summary.stats.original_qty, 10.0);
}

#[test]
fn desk_values_containing_fix_keep_the_order() {
    let text = "\
2024-01-01 10:00:00.000 Sending: 35=D|11=A|448=FIXDESK|55=VOD|54=1|38=100
2024-01-01 10:00:01.000 [sent-queue] Receiving: 35=8|11=A|37=O1|39=2|150=F|14=100|32=100|31=1.5
";
    let report = audit_text(text, &AuditConfig::default());
    assert_eq!(report.messages.len(), 2);
    assert_eq!(report.chains.len(), 1);
    assert_eq!(report.chains[0].cl_ord_ids, vec!["A"]);
    assert_eq!(report.summary.stats.original_qty, 100.0);
    assert_eq!(report.summary.stats.filled_qty, 100.0);
    assert_eq!(report.summary.stats.final_status, "Filled");
}
