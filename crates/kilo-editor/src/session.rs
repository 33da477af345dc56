//! Session — the refresh / read / dispatch loop.
//!
//! A [`Session`] owns all viewer state: the rows, the cursor, the view and
//! the options. One iteration of [`Session::run`] is:
//!
//! 1. scroll the view to the cursor and write one frame;
//! 2. block (in 100ms slices) for one key;
//! 3. quit on the quit chord, move the cursor on a navigation key, ignore
//!    anything else.
//!
//! Single-threaded and synchronous. The only wait is the key read.
//!
//! Frame writes are best effort: a failed or short write is logged and the
//! loop carries on, since the next frame repaints everything anyway. A
//! failed key read is fatal.

use std::io::Write;

use kilo_term::ansi;
use kilo_term::input::{ByteSource, Key, read_key};
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;
use tracing::{debug, info, warn};

use crate::cursor::Cursor;
use crate::error::Result;
use crate::options::Options;
use crate::render;
use crate::row::RowStore;
use crate::view::View;

/// What the loop does after a key has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep going.
    Continue,
    /// Clear the screen and end the session.
    Quit,
}

/// The viewer state for one run of the program.
pub struct Session {
    rows: RowStore,
    cursor: Cursor,
    view: View,
    options: Options,
    /// Reused between frames; always empty outside `refresh`.
    frame: OutputBuffer,
}

impl Session {
    /// Create a session showing `rows` on a screen of `screen`.
    #[must_use]
    pub fn new(rows: RowStore, screen: Size, options: Options) -> Self {
        Self {
            rows,
            cursor: Cursor::new(),
            view: View::new(screen),
            options,
            frame: OutputBuffer::new(),
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn rows(&self) -> &RowStore {
        &self.rows
    }

    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Place the cursor directly. Unclamped; the next move clamps it.
    pub const fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    // -- Loop ---------------------------------------------------------------

    /// Run until the quit chord arrives.
    ///
    /// On quit the screen is cleared and the cursor homed before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if reading a key fails.
    pub fn run(&mut self, input: &mut impl ByteSource, out: &mut impl Write) -> Result<()> {
        info!(
            rows = self.rows.num_rows(),
            cols = self.view.screen().cols,
            screen_rows = self.view.screen().rows,
            "session started"
        );

        loop {
            self.refresh(out);
            let key = read_key(input)?;
            if self.process_key(key) == Action::Quit {
                clear_screen(out);
                info!("session ended");
                return Ok(());
            }
        }
    }

    /// Scroll to the cursor and write one frame in a single write.
    pub fn refresh(&mut self, out: &mut impl Write) {
        self.view.scroll(&self.cursor);

        if let Err(e) = render::compose(
            &mut self.frame,
            &self.rows,
            &self.cursor,
            &self.view,
            &self.options,
        ) {
            warn!("composing frame: {e}");
            self.frame.clear();
            return;
        }

        let len = self.frame.len();
        match self.frame.flush_to(out) {
            Ok(n) if n < len => warn!(written = n, expected = len, "short frame write"),
            Ok(_) => {}
            Err(e) => warn!("frame write failed: {e}"),
        }
    }

    /// Dispatch one key.
    pub fn process_key(&mut self, key: Key) -> Action {
        debug!(?key, "key");

        if key == self.options.quit_chord() {
            return Action::Quit;
        }
        if key.is_navigation() {
            self.cursor.move_cursor(key, &self.rows, self.view.screen());
        }
        Action::Continue
    }
}

/// Clear the screen and home the cursor in one write, best effort.
pub fn clear_screen(out: &mut impl Write) {
    let mut buf = OutputBuffer::new();
    let composed = ansi::clear_screen(&mut buf).and_then(|()| ansi::cursor_home(&mut buf));
    if let Err(e) = composed.and_then(|()| buf.flush_to(out).map(drop)) {
        warn!("clearing screen: {e}");
    }
}

/// Print every decoded key on its own line until a plain `q` arrives.
///
/// A diagnostic mode for checking what a terminal sends. Output uses
/// `\r\n` because the terminal does no output processing in raw mode.
///
/// # Errors
///
/// Returns an error if reading a key or writing its description fails.
pub fn inspect_keys(input: &mut impl ByteSource, out: &mut impl Write) -> Result<()> {
    loop {
        let key = read_key(input)?;
        write!(out, "{key}\r\n")
            .and_then(|()| out.flush())
            .map_err(kilo_term::Error::Write)?;
        if key == Key::Byte(b'q') {
            return Ok(());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
