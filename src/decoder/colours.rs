// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use std::sync::atomic::{AtomicBool, Ordering};

/// ANSI colour palette for the audit report.  Each field holds the SGR
/// sequence for one role.
#[derive(Clone, Copy)]
pub struct ColourPalette {
    pub reset: &'static str,
    pub line: &'static str,
    pub heading: &'static str,
    pub label: &'static str,
    pub value: &'static str,
    pub status: &'static str,
    pub file: &'static str,
    pub good: &'static str,
    pub warning: &'static str,
    pub title: &'static str,
}

const COLOURED: ColourPalette = ColourPalette {
    reset: "\u{001b}[0m",
    line: "\u{001b}[38;5;244m",
    heading: "\u{001b}[38;5;81m",
    label: "\u{001b}[38;5;151m",
    value: "\u{001b}[38;5;228m",
    status: "\u{001b}[38;5;214m",
    file: "\u{001b}[95m",
    good: "\u{001b}[32m",
    warning: "\u{001b}[31m",
    title: "\u{001b}[1;97m",
};

const PLAIN: ColourPalette = ColourPalette {
    reset: "",
    line: "",
    heading: "",
    label: "",
    value: "",
    status: "",
    file: "",
    good: "",
    warning: "",
    title: "",
};

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Current palette, respecting the global switch.
pub fn palette() -> ColourPalette {
    if ENABLED.load(Ordering::Relaxed) {
        COLOURED
    } else {
        PLAIN
    }
}

/// Disable ANSI output globally (piped output or `--colour no`).
pub fn disable_colours() {
    ENABLED.store(false, Ordering::Relaxed);
}

pub fn enable_colours() {
    ENABLED.store(true, Ordering::Relaxed);
}

impl ColourPalette {
    /// Colour for an order status: fills read as good news, cancels and
    /// rejects as warnings, everything else neutral.
    pub fn for_status(&self, status: &str) -> &'static str {
        match status {
            "Filled" => self.good,
            "Canceled" | "Rejected" | "Expired" | "Done for Day" => self.warning,
            _ => self.status,
        }
    }
}
