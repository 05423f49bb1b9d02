// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Presentation of an [`AuditReport`]: a coloured terminal report, a JSON
//! document, or a flat CSV export of the decoded messages.

use crate::decoder::audit::AuditReport;
use crate::decoder::chain::{LineageAnomaly, OrderChain};
use crate::decoder::colours::{ColourPalette, palette};
use crate::decoder::diff::{ChangeType, ReplacementDiff};
use crate::decoder::message::DecodedMessage;
use crate::decoder::summary::ExecutionStats;
use anyhow::Context;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;
use terminal_size::{Width, terminal_size};

const TIME_WIDTH: usize = 26;

pub(crate) fn terminal_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        w as usize
    } else {
        80
    }
}

/// Printable width of `text`, ignoring ANSI SGR sequences.
pub(crate) fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_esc = false;
    for ch in text.chars() {
        if in_esc {
            if ch == 'm' {
                in_esc = false;
            }
            continue;
        }
        if ch == '\u{1b}' {
            in_esc = true;
            continue;
        }
        width += 1;
    }
    width
}

pub(crate) fn pad_ansi(text: &str, width: usize) -> String {
    let visible = visible_width(text);
    if visible >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - visible))
}

fn format_time(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_qty(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn coloured(colour: &str, text: &str, reset: &str) -> String {
    format!("{colour}{text}{reset}")
}

/// Write the terminal report for one source.
pub fn render_text(
    out: &mut dyn Write,
    source: &str,
    report: &AuditReport,
    show_messages: bool,
) -> std::io::Result<()> {
    let colours = palette();
    let rule = "─".repeat(terminal_width().clamp(40, 120));
    writeln!(out, "{}{}{}", colours.line, rule, colours.reset)?;
    writeln!(
        out,
        "{}Audit{} {}{}{}",
        colours.title, colours.reset, colours.file, source, colours.reset
    )?;

    render_summary(out, report, colours)?;
    render_chains(out, report, colours)?;
    render_diffs(out, &report.diffs, colours)?;
    render_anomalies(out, &report.anomalies, colours)?;
    if show_messages {
        render_messages(out, &report.messages, colours)?;
    }
    Ok(())
}

fn render_summary(
    out: &mut dyn Write,
    report: &AuditReport,
    colours: ColourPalette,
) -> std::io::Result<()> {
    let summary = &report.summary;
    writeln!(
        out,
        "  {}Messages:{} {} decoded, {} skipped, {} -> {}",
        colours.heading,
        colours.reset,
        summary.total_messages,
        summary.skipped_lines,
        format_time(summary.first_timestamp),
        format_time(summary.last_timestamp),
    )?;
    let Some(root) = summary.root.as_deref() else {
        writeln!(out, "  {}No orders found{}", colours.line, colours.reset)?;
        return Ok(());
    };
    writeln!(out, "  {}Order Summary:{}", colours.heading, colours.reset)?;
    let (headers, values) = stats_row(root, &summary.stats, colours);
    render_table_row(out, &headers, &values, colours)
}

fn stats_row(
    root: &str,
    stats: &ExecutionStats,
    colours: ColourPalette,
) -> (Vec<&'static str>, Vec<String>) {
    let headers = vec![
        "Root", "Symbol", "Side", "OrderQty", "Filled", "Fill%", "VWAP", "Execs", "Replaces",
        "Status", "Venues",
    ];
    let value = |text: &str| coloured(colours.value, text, colours.reset);
    let venues = if stats.venues.is_empty() {
        "-".to_string()
    } else {
        stats.venues.join(",")
    };
    let values = vec![
        value(root),
        value(stats.symbol.as_deref().unwrap_or("-")),
        coloured(
            colours.status,
            stats.side.as_deref().unwrap_or("-"),
            colours.reset,
        ),
        value(&format_qty(stats.original_qty)),
        value(&format_qty(stats.filled_qty)),
        value(&format!("{:.2}", stats.fill_percentage)),
        value(&format!("{:.6}", stats.vwap)),
        value(&stats.execution_count.to_string()),
        value(&stats.replacement_count.to_string()),
        coloured(
            colours.for_status(&stats.final_status),
            &stats.final_status,
            colours.reset,
        ),
        value(&venues),
    ];
    (headers, values)
}

fn render_table_row(
    out: &mut dyn Write,
    headers: &[&str],
    values: &[String],
    colours: ColourPalette,
) -> std::io::Result<()> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, head)| {
            let value_width = values.get(i).map(|v| visible_width(v)).unwrap_or(0);
            visible_width(head).max(value_width) + 2
        })
        .collect();

    write!(out, "    ")?;
    for (head, width) in headers.iter().zip(&widths) {
        let label = coloured(colours.label, head, colours.reset);
        write!(out, "{} ", pad_ansi(&label, *width))?;
    }
    writeln!(out)?;
    write!(out, "    ")?;
    for (val, width) in values.iter().zip(&widths) {
        write!(out, "{} ", pad_ansi(val, *width))?;
    }
    writeln!(out)
}

fn render_chains(
    out: &mut dyn Write,
    report: &AuditReport,
    colours: ColourPalette,
) -> std::io::Result<()> {
    if report.chains.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {}Order Chains:{}", colours.heading, colours.reset)?;
    for (chain, summary) in report.chains.iter().zip(&report.chain_summaries) {
        render_chain(out, chain, colours)?;
        if report.chains.len() > 1 {
            let (headers, values) = stats_row(&chain.root, &summary.stats, colours);
            render_table_row(out, &headers, &values, colours)?;
        }
    }
    Ok(())
}

fn render_chain(
    out: &mut dyn Write,
    chain: &OrderChain,
    colours: ColourPalette,
) -> std::io::Result<()> {
    let broker_ids: Vec<&str> = chain
        .order_ids
        .iter()
        .map(|id| id.as_deref().unwrap_or("-"))
        .collect();
    writeln!(
        out,
        "    {}ClOrdID:{} {}{}{}",
        colours.label,
        colours.reset,
        colours.value,
        chain.cl_ord_ids.join(" -> "),
        colours.reset
    )?;
    writeln!(
        out,
        "    {}OrderID:{} {}{}{}",
        colours.label,
        colours.reset,
        colours.value,
        broker_ids.join(" -> "),
        colours.reset
    )?;

    let id_width = chain
        .cl_ord_ids
        .iter()
        .map(|id| id.len())
        .max()
        .unwrap_or(0)
        .max(8)
        + 2;
    let headers = [
        ("ClOrdID", id_width),
        ("first seen", TIME_WIDTH + 1),
        ("last seen", TIME_WIDTH + 1),
        ("duration", 12),
        ("events", 7),
        ("status", 0),
    ];
    write!(out, "      ")?;
    for (label, width) in headers {
        let w = if width == 0 { label.len() } else { width };
        write!(
            out,
            "{} ",
            pad_ansi(&coloured(colours.label, label, colours.reset), w)
        )?;
    }
    writeln!(out)?;

    for step in &chain.steps {
        let duration = step
            .duration_ms
            .map(|ms| format!("{ms:.3}ms"))
            .unwrap_or_else(|| "-".to_string());
        let cells = [
            pad_ansi(&coloured(colours.value, &step.cl_ord_id, colours.reset), id_width),
            pad_ansi(&format_time(step.first_seen), TIME_WIDTH + 1),
            pad_ansi(&format_time(step.last_seen), TIME_WIDTH + 1),
            pad_ansi(&duration, 12),
            pad_ansi(&step.events.to_string(), 7),
            coloured(
                colours.for_status(&step.terminal_status),
                &step.terminal_status,
                colours.reset,
            ),
        ];
        writeln!(out, "      {}", cells.join(" "))?;
    }
    Ok(())
}

fn render_diffs(
    out: &mut dyn Write,
    diffs: &[ReplacementDiff],
    colours: ColourPalette,
) -> std::io::Result<()> {
    if diffs.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {}Replacements:{}", colours.heading, colours.reset)?;
    for diff in diffs {
        let original = diff.original.as_deref().unwrap_or("-");
        writeln!(
            out,
            "    {}{}{} replaces {}{}{} (line {})",
            colours.value,
            diff.replacement,
            colours.reset,
            colours.value,
            original,
            colours.reset,
            diff.line_number
        )?;
        if !diff.original_found {
            writeln!(
                out,
                "      {}original order not found in log{}",
                colours.warning, colours.reset
            )?;
            continue;
        }
        if diff.changes.is_empty() {
            writeln!(out, "      {}no field changes{}", colours.line, colours.reset)?;
        }
        for change in &diff.changes {
            let marker = match change.change_type {
                ChangeType::Added => "+",
                ChangeType::Removed => "-",
                ChangeType::Modified => "~",
            };
            writeln!(
                out,
                "      {marker} {}{:>4}{} {}{}{}: {} -> {}",
                colours.line,
                change.tag,
                colours.reset,
                colours.label,
                change.field_name,
                colours.reset,
                coloured(
                    colours.value,
                    change.original_value.as_deref().unwrap_or("-"),
                    colours.reset
                ),
                coloured(
                    colours.value,
                    change.new_value.as_deref().unwrap_or("-"),
                    colours.reset
                ),
            )?;
        }
    }
    Ok(())
}

fn render_anomalies(
    out: &mut dyn Write,
    anomalies: &[LineageAnomaly],
    colours: ColourPalette,
) -> std::io::Result<()> {
    if anomalies.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {}Lineage anomalies:{}", colours.warning, colours.reset)?;
    for anomaly in anomalies {
        let text = match anomaly {
            LineageAnomaly::MultipleParents { id, parents } => {
                format!("{id} has several parents: {}", parents.join(", "))
            }
            LineageAnomaly::Branch { id, children } => {
                format!("{id} was replaced more than once: {}", children.join(", "))
            }
            LineageAnomaly::Cycle { ids } => format!("cycle: {}", ids.join(" -> ")),
        };
        writeln!(out, "    {}{}{}", colours.warning, text, colours.reset)?;
    }
    Ok(())
}

fn render_messages(
    out: &mut dyn Write,
    messages: &[DecodedMessage],
    colours: ColourPalette,
) -> std::io::Result<()> {
    if messages.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {}Messages:{}", colours.heading, colours.reset)?;
    for msg in messages {
        let kind = msg.msg_type_label.as_deref().unwrap_or("-");
        let direction = msg
            .direction
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "    {}{:>5}{} {} {:<3} {}{}{}",
            colours.line,
            msg.line_number,
            colours.reset,
            pad_ansi(&format_time(msg.timestamp), TIME_WIDTH),
            direction,
            colours.status,
            kind,
            colours.reset
        )?;
        let pairs: Vec<String> = msg
            .named_values()
            .into_iter()
            .map(|(name, value)| {
                format!(
                    "{}{}{}={}{}{}",
                    colours.label, name, colours.reset, colours.value, value, colours.reset
                )
            })
            .collect();
        writeln!(out, "          {}", pairs.join(" "))?;
    }
    Ok(())
}

/// JSON envelope for one audited source.
#[derive(Serialize)]
pub struct SourceReport<'a> {
    pub source: &'a str,
    #[serde(flatten)]
    pub report: &'a AuditReport,
}

pub fn write_json(out: &mut dyn Write, reports: &[SourceReport<'_>]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, reports).context("Failed to serialise report")?;
    writeln!(out)?;
    Ok(())
}

/// One CSV row per decoded message.  Kept flat: the csv crate cannot
/// serialise nested structs.
#[derive(Debug, Serialize)]
struct MessageRow<'a> {
    source: &'a str,
    sequence: usize,
    line_number: usize,
    timestamp: String,
    direction: String,
    msg_type: &'a str,
    cl_ord_id: &'a str,
    orig_cl_ord_id: &'a str,
    order_id: &'a str,
    ord_status: &'a str,
    exec_type: &'a str,
    symbol: &'a str,
    side: &'a str,
    order_qty: Option<f64>,
    cum_qty: Option<f64>,
    leaves_qty: Option<f64>,
    last_qty: Option<f64>,
    last_px: Option<f64>,
    avg_px: Option<f64>,
    last_market: &'a str,
}

impl<'a> MessageRow<'a> {
    fn new(source: &'a str, msg: &'a DecodedMessage) -> Self {
        let event = msg.order_event();
        MessageRow {
            source,
            sequence: msg.sequence,
            line_number: msg.line_number,
            timestamp: msg
                .timestamp
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string())
                .unwrap_or_default(),
            direction: msg.direction.map(|d| d.to_string()).unwrap_or_default(),
            msg_type: msg.msg_type_label.as_deref().unwrap_or_default(),
            cl_ord_id: event.cl_ord_id().unwrap_or_default(),
            orig_cl_ord_id: event.orig_cl_ord_id().unwrap_or_default(),
            order_id: event.order_id().unwrap_or_default(),
            ord_status: event.ord_status().unwrap_or_default(),
            exec_type: event.exec_type().unwrap_or_default(),
            symbol: event.symbol().unwrap_or_default(),
            side: event.side().unwrap_or_default(),
            order_qty: event.order_qty(),
            cum_qty: event.cum_qty(),
            leaves_qty: event.leaves_qty(),
            last_qty: event.last_qty(),
            last_px: event.last_px(),
            avg_px: event.avg_px(),
            last_market: event.last_market().unwrap_or_default(),
        }
    }
}

/// Write every decoded message of every source as CSV, with a single header.
pub fn write_csv(out: &mut dyn Write, reports: &[SourceReport<'_>]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for source in reports {
        for msg in &source.report.messages {
            let row = MessageRow::new(source.source, msg);
            writer
                .serialize(&row)
                .with_context(|| format!("Failed to write CSV row for line {}", msg.line_number))?;
        }
    }
    writer.flush()?;
    Ok(())
}
