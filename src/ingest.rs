// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Reading log sources into text.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use tracing::debug;

/// Path that selects standard input.
pub const STDIN: &str = "-";

/// Bytes to text: UTF-8 when valid, otherwise ISO-8859-1, which maps every
/// byte to the code point of the same value and so never fails.
pub fn decode_bytes(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(err) => {
            debug!(valid_up_to = err.valid_up_to(), "input is not UTF-8, reading as Latin-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Read a whole source, `-` meaning stdin.
pub fn read_source(path: &str) -> io::Result<String> {
    let mut bytes = Vec::new();
    if path == STDIN {
        io::stdin().lock().read_to_end(&mut bytes)?;
    } else {
        File::open(path)?.read_to_end(&mut bytes)?;
    }
    Ok(decode_bytes(&bytes).into_owned())
}

/// Display name for a source.
pub fn source_label(path: &str) -> &str {
    if path == STDIN { "(stdin)" } else { path }
}
