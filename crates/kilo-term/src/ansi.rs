// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. This module only knows the byte-level
// encoding of the handful of terminal commands the viewer needs.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI CUP uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// They never fail when writing to `OutputBuffer` (backed by a Vec).

use std::io::{self, Write};

/// Move the cursor to the bottom-right corner: 999 columns right, then
/// 999 rows down. CUF/CUD stop at the screen edge, so this lands on the
/// last cell whatever the window size. Used by window size discovery.
pub const CURSOR_FAR_CORNER: &[u8] = b"\x1b[999C\x1b[999B";

/// Device Status Report 6: ask the terminal where the cursor is.
/// The reply arrives on stdin as `ESC [ row ; col R`.
pub const QUERY_CURSOR_POSITION: &[u8] = b"\x1b[6n";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: usize, y: usize) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Move the cursor to the top-left cell (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the cursor to the end of the current line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
