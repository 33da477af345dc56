// SPDX-License-Identifier: MIT
//
// Terminal errors.
//
// Every variant here is fatal to the session: the binary restores the
// terminal, prints the error and exits with status 1. A read that times
// out with no data is not an error and never reaches this type.

use std::io;

use thiserror::Error;

/// Failure of a terminal-level operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the current terminal attributes failed (e.g. stdin is not a TTY).
    #[error("tcgetattr: {0}")]
    GetAttr(#[source] io::Error),

    /// Applying terminal attributes failed.
    #[error("tcsetattr: {0}")]
    SetAttr(#[source] io::Error),

    /// A genuine I/O error while reading input.
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing to the terminal failed where the write is mandatory.
    #[error("write: {0}")]
    Write(#[source] io::Error),

    /// The cursor-report fallback hit an I/O error on the terminal.
    #[error("getWindowSize: {0}")]
    Probe(#[source] io::Error),

    /// Neither the OS query nor the cursor-report fallback produced a size.
    #[error("getWindowSize: unable to determine terminal size")]
    WindowSize,
}

/// Result alias for terminal operations.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Tests ───────────────────────────────────────────────────────────────────
