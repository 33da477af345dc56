// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal layer for kilo.
//
// Everything that touches the controlling terminal lives here: the
// termios raw-mode guard, window size discovery, the byte-to-key decoder,
// the ANSI sequences the viewer emits, and the frame buffer that turns a
// whole refresh into one write() call.
//
// There is no TUI framework underneath. Input is read one byte at a time
// from a raw terminal with a 100ms read timeout, and output is assembled
// in memory and handed to the terminal in a single write.

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod terminal;

pub use error::{Error, Result};
