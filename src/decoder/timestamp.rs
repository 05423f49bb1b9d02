// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools
//
// Timestamp grammar for FIX UTCTimestamp fields and log-line prefixes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// `YYYYMMDD-HH:MM:SS[.f]` as carried by SendingTime/TransactTime.
static FIX_STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})-(\d{2}):(\d{2}):(\d{2})(?:\.(\d{1,9}))?$")
        .expect("valid regex")
});

/// `YYYY-MM-DD HH:MM:SS[.f][.f]` as written at the head of a log line.  The
/// trailing block is the secondary fraction some loggers append.
static LOG_STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})[ T](\d{2}):(\d{2}):(\d{2})(?:[.,](\d{1,9}))?(?:[.,](\d{1,9}))?$",
    )
    .expect("valid regex")
});

/// Locates a log-style timestamp at the start of a line.
pub(crate) static LOG_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}(?:[.,]\d{1,9}){0,2})")
        .expect("valid regex")
});

type Attempt = fn(&str) -> Option<NaiveDateTime>;

/// Formats tried in order; the first that parses wins.
const ATTEMPTS: [Attempt; 2] = [parse_fix_stamp, parse_log_stamp];

/// Parse a timestamp in any supported format.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    ATTEMPTS.iter().find_map(|attempt| attempt(text))
}

fn parse_fix_stamp(text: &str) -> Option<NaiveDateTime> {
    let caps = FIX_STAMP.captures(text)?;
    let part = |i: usize| caps.get(i).map(|m| m.as_str());
    build(
        [part(1)?, part(2)?, part(3)?, part(4)?, part(5)?, part(6)?],
        part(7).unwrap_or(""),
    )
}

fn parse_log_stamp(text: &str) -> Option<NaiveDateTime> {
    let caps = LOG_STAMP.captures(text)?;
    let part = |i: usize| caps.get(i).map(|m| m.as_str());
    let mut fraction = part(7).unwrap_or("").to_string();
    if let Some(extra) = part(8) {
        fraction.push_str(extra);
    }
    build(
        [part(1)?, part(2)?, part(3)?, part(4)?, part(5)?, part(6)?],
        &fraction,
    )
}

fn build(parts: [&str; 6], fraction: &str) -> Option<NaiveDateTime> {
    let [year, month, day, hour, minute, second] = parts;
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    let time = NaiveTime::from_hms_nano_opt(
        hour.parse().ok()?,
        minute.parse().ok()?,
        second.parse().ok()?,
        fraction_nanos(fraction)?,
    )?;
    Some(NaiveDateTime::new(date, time))
}

/// Turn fractional-second digits into nanoseconds; digits past the ninth are dropped.
fn fraction_nanos(digits: &str) -> Option<u32> {
    if digits.is_empty() {
        return Some(0);
    }
    let kept: String = digits.chars().take(9).collect();
    let value: u32 = kept.parse().ok()?;
    Some(value * 10u32.pow(9 - kept.len() as u32))
}
