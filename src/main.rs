// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

/// fixaudit command-line entry point.
///
/// Reads each input (file or stdin), runs the audit core over it and renders
/// the result as a terminal report, JSON or CSV.  Protocol logic lives in the
/// library; this file only wires user input into it.
use anyhow::{Context, Result, anyhow};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use fixaudit::decoder::colours::palette;
use fixaudit::decoder::config::SOH;
use fixaudit::decoder::report::{SourceReport, render_text, write_csv, write_json};
use fixaudit::decoder::{AuditConfig, AuditReport, audit_text, disable_colours, enable_colours};
use fixaudit::ingest::{STDIN, read_source, source_label};
use rayon::prelude::*;
use std::io::{self, IsTerminal, Write};
use std::sync::OnceLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Release builds get the tag via `FIXAUDIT_VERSION`; otherwise Cargo's
/// package version is used.
const VERSION: &str = match option_env!("FIXAUDIT_VERSION") {
    Some(tag) => tag,
    None => env!("CARGO_PKG_VERSION"),
};

fn sha() -> &'static str {
    option_env!("FIXAUDIT_COMMIT").unwrap_or("0000000")
}

fn rust_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

fn version_string() -> String {
    format!(
        "fixaudit {VERSION} (commit:{}) [rust:{}]",
        sha(),
        rust_version()
    )
}

/// Cached version string with a 'static lifetime for clap metadata.
fn version_str() -> &'static str {
    static VERSION_STR: OnceLock<String> = OnceLock::new();
    VERSION_STR.get_or_init(version_string).as_str()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() {
    std::process::exit(match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            1
        }
    });
}

fn run() -> Result<i32> {
    let matches = match build_cli().try_get_matches() {
        Ok(m) => m,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                return Ok(0);
            }
            _ => err.exit(),
        },
    };

    let opts = CliOptions::from_matches(&matches)?;
    if opts.show_version {
        println!("{}", version_string());
        return Ok(0);
    }

    init_tracing(opts.verbose);

    match opts.colour {
        Some(true) => enable_colours(),
        Some(false) => disable_colours(),
        None if !io::stdout().is_terminal() => disable_colours(),
        None => {}
    }

    let config = AuditConfig::default().with_delimiters(opts.delimiters.clone());
    let files = if opts.files.is_empty() {
        vec![STDIN.to_string()]
    } else {
        opts.files.clone()
    };

    // One independent audit per input; collect() keeps argument order.
    let results: Vec<(&str, Result<AuditReport>)> = files
        .par_iter()
        .map(|path| (path.as_str(), audit_source(path, &config)))
        .collect();

    let mut code = 0;
    let mut reports = Vec::new();
    for (path, result) in &results {
        match result {
            Ok(report) => reports.push(SourceReport {
                source: source_label(path),
                report,
            }),
            Err(err) => {
                let colours = palette();
                eprintln!("{}{err:#}{}", colours.warning, colours.reset);
                code = 1;
            }
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match opts.format {
        OutputFormat::Text => {
            for source in &reports {
                render_text(&mut out, source.source, source.report, opts.messages)?;
            }
        }
        OutputFormat::Json => write_json(&mut out, &reports)?,
        OutputFormat::Csv => write_csv(&mut out, &reports)?,
    }
    out.flush()?;
    Ok(code)
}

fn audit_source(path: &str, config: &AuditConfig) -> Result<AuditReport> {
    let label = source_label(path);
    let text = read_source(path).with_context(|| format!("Cannot read {label}"))?;
    info!(source = label, bytes = text.len(), "auditing");
    Ok(audit_text(&text, config))
}

/// Log to stderr so stdout stays clean for JSON/CSV.  `RUST_LOG` wins over
/// `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn build_cli() -> Command {
    Command::new("fixaudit")
        .about("Reconstruct order audit trails from FIX logs")
        .disable_version_flag(true)
        .version(version_str())
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .value_parser(["text", "json", "csv"])
                .default_value("text")
                .help("Output format"),
        )
        .arg(
            Arg::new("delimiter")
                .long("delimiter")
                .value_name("CHAR")
                .action(ArgAction::Append)
                .help("Field separator, in order of precedence (repeatable; default: SOH | ;)"),
        )
        .arg(
            Arg::new("messages")
                .long("messages")
                .action(ArgAction::SetTrue)
                .help("List every decoded message in the text report"),
        )
        .arg(
            Arg::new("colour")
                .long("colour")
                .num_args(0..=1)
                .value_name("yes|no")
                .require_equals(false)
                .default_missing_value("true")
                .help("Force coloured output on or off"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information and exit"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .num_args(0..)
                .action(ArgAction::Append)
                .trailing_var_arg(true)
                .help("Log files to audit (default or '-': stdin)"),
        )
}

#[derive(Debug)]
struct CliOptions {
    format: OutputFormat,
    delimiters: Vec<char>,
    messages: bool,
    colour: Option<bool>,
    verbose: bool,
    show_version: bool,
    files: Vec<String>,
}

impl CliOptions {
    /// Translate clap's `ArgMatches` into typed options, rejecting bad values
    /// before any input is read.
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let delimiters = matches
            .get_many::<String>("delimiter")
            .map(|vals| vals.map(|v| parse_delimiter(v)).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();
        let files: Vec<String> = matches
            .get_many::<String>("files")
            .map(|vals| vals.map(|v| v.to_string()).collect())
            .unwrap_or_default();
        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            Some("csv") => OutputFormat::Csv,
            _ => OutputFormat::Text,
        };

        Ok(Self {
            format,
            delimiters,
            messages: matches.get_flag("messages"),
            colour: parse_colour(matches.get_one::<String>("colour"))?,
            verbose: matches.get_flag("verbose"),
            show_version: matches.get_flag("version"),
            files,
        })
    }
}

/// Accepts "yes"/"no" as well as "true"/"false".
fn parse_colour(value: Option<&String>) -> Result<Option<bool>> {
    match value {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(Some(true)),
            "false" | "no" => Ok(Some(false)),
            other => Err(anyhow!("invalid value for --colour: {other}")),
        },
    }
}

/// A literal character, `SOH`, or a hex escape such as `\x1f` or `0x7c`.
fn parse_delimiter(value: &str) -> Result<char> {
    if value.is_empty() {
        return Err(anyhow!("delimiter cannot be empty"));
    }
    if value.eq_ignore_ascii_case("SOH") {
        return Ok(SOH);
    }
    if let Some(hex) = value
        .strip_prefix("\\x")
        .or_else(|| value.strip_prefix("0x"))
    {
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| anyhow!("invalid delimiter hex value: {value}"))?;
        return char::from_u32(code)
            .ok_or_else(|| anyhow!("delimiter code {value} is not valid Unicode"));
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(anyhow!(
            "delimiter must be a single character or hex code like \\x01"
        )),
    }
}
