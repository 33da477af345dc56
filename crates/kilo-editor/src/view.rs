//! View — scroll offsets over the row store.
//!
//! A `View` holds the first visible row and column (`rowoff`, `coloff`) and
//! the screen dimensions captured at startup. It doesn't own the rows or
//! the cursor; those are passed in.
//!
//! Scrolling is lazy. Cursor movement never touches the offsets; instead
//! [`View::scroll`] runs once per frame, just before composition, and
//! nudges the offsets the minimum distance needed to bring the cursor back
//! on screen. Calling it again without moving the cursor changes nothing.

use kilo_term::terminal::Size;
use tracing::debug;

use crate::cursor::Cursor;

/// The visible window onto the row store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// First visible row.
    rowoff: usize,
    /// First visible column.
    coloff: usize,
    /// Screen dimensions, fixed for the session.
    screen: Size,
}

impl View {
    /// Create a view at the top-left of the text for a screen of `screen`.
    #[must_use]
    pub const fn new(screen: Size) -> Self {
        Self {
            rowoff: 0,
            coloff: 0,
            screen,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// First visible row.
    #[inline]
    #[must_use]
    pub const fn rowoff(&self) -> usize {
        self.rowoff
    }

    /// First visible column.
    #[inline]
    #[must_use]
    pub const fn coloff(&self) -> usize {
        self.coloff
    }

    /// Screen dimensions.
    #[inline]
    #[must_use]
    pub const fn screen(&self) -> Size {
        self.screen
    }

    /// Number of text rows on screen.
    #[inline]
    #[must_use]
    pub fn screen_rows(&self) -> usize {
        usize::from(self.screen.rows)
    }

    /// Number of text columns on screen.
    #[inline]
    #[must_use]
    pub fn screen_cols(&self) -> usize {
        usize::from(self.screen.cols)
    }

    /// Set both offsets directly.
    pub const fn set_offsets(&mut self, rowoff: usize, coloff: usize) {
        self.rowoff = rowoff;
        self.coloff = coloff;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Adjust the offsets so the cursor is on screen.
    ///
    /// Afterwards `rowoff <= cy < rowoff + rows` and
    /// `coloff <= cx < coloff + cols`. A zero dimension leaves its offset
    /// alone. Returns whether anything changed.
    pub fn scroll(&mut self, cursor: &Cursor) -> bool {
        let before = (self.rowoff, self.coloff);
        let (rows, cols) = (self.screen_rows(), self.screen_cols());

        if rows > 0 {
            if cursor.cy() < self.rowoff {
                self.rowoff = cursor.cy();
            }
            if cursor.cy() >= self.rowoff + rows {
                self.rowoff = cursor.cy() - rows + 1;
            }
        }

        if cols > 0 {
            if cursor.cx() < self.coloff {
                self.coloff = cursor.cx();
            }
            if cursor.cx() >= self.coloff + cols {
                self.coloff = cursor.cx() - cols + 1;
            }
        }

        let changed = before != (self.rowoff, self.coloff);
        if changed {
            debug!(rowoff = self.rowoff, coloff = self.coloff, "scrolled");
        }
        changed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
