//! Cursor — position tracking with clamped, line-wrapping movement.
//!
//! The cursor is a `(cx, cy)` pair in row-store coordinates: `cy` is a row
//! index and `cx` a byte offset into that row. It does not own or reference
//! the rows; the store is passed to [`Cursor::move_cursor`] as a parameter.
//!
//! # Limits
//!
//! - `cy` ranges over `0..=num_rows`. `num_rows` itself is the line just
//!   past the end of the file, where the cursor can sit but nothing is drawn.
//! - `cx` never exceeds the length of the row at `cy` (0 when there is no
//!   row). Every move ends by clamping `cx`, which gives the familiar ragged
//!   right edge: moving down from a long line onto a short one snaps the
//!   cursor to the short line's end.
//!
//! # Wrapping
//!
//! Left at column 0 continues at the end of the previous line; Right at a
//! line's end continues at column 0 of the next. Right never wraps off the
//! past-the-end line, because there is no row there.

use kilo_term::input::Key;
use kilo_term::terminal::Size;

use crate::row::RowStore;

/// A cursor in the row store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Byte offset into the current row.
    cx: usize,
    /// Current row index.
    cy: usize,
}

impl Cursor {
    /// Create a cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { cx: 0, cy: 0 }
    }

    /// Create a cursor at column `cx` of row `cy`, unclamped.
    #[must_use]
    pub const fn at(cx: usize, cy: usize) -> Self {
        Self { cx, cy }
    }

    // -- Accessors ----------------------------------------------------------

    /// Column (byte offset into the row).
    #[inline]
    #[must_use]
    pub const fn cx(&self) -> usize {
        self.cx
    }

    /// Row index.
    #[inline]
    #[must_use]
    pub const fn cy(&self) -> usize {
        self.cy
    }

    // -- Movement -----------------------------------------------------------

    /// Apply a navigation key.
    ///
    /// `screen` supplies the page height for Page Up/Down and the target
    /// column for End, which is the last screen column (then clamped to the
    /// row like every other move). Keys that aren't navigation keys leave
    /// the cursor alone.
    pub fn move_cursor(&mut self, key: Key, rows: &RowStore, screen: Size) {
        match key {
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                self.step(key, rows);
            }
            Key::Home => self.cx = 0,
            Key::End => self.cx = usize::from(screen.cols).saturating_sub(1),
            Key::PageUp => {
                for _ in 0..screen.rows {
                    self.step(Key::ArrowUp, rows);
                }
            }
            Key::PageDown => {
                for _ in 0..screen.rows {
                    self.step(Key::ArrowDown, rows);
                }
            }
            Key::Byte(_) | Key::Delete | Key::Escape => return,
        }
        self.clamp(rows);
    }

    /// One arrow step, followed by the row-length clamp.
    fn step(&mut self, key: Key, rows: &RowStore) {
        match key {
            Key::ArrowLeft => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = rows.row_len(self.cy);
                }
            }
            Key::ArrowRight => {
                if let Some(row) = rows.row(self.cy) {
                    if self.cx < row.len() {
                        self.cx += 1;
                    } else if self.cx == row.len() {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Key::ArrowUp => self.cy = self.cy.saturating_sub(1),
            Key::ArrowDown => {
                if self.cy < rows.num_rows() {
                    self.cy += 1;
                }
            }
            _ => {}
        }
        self.clamp(rows);
    }

    /// Snap `cx` back onto the row at `cy`.
    fn clamp(&mut self, rows: &RowStore) {
        self.cx = self.cx.min(rows.row_len(self.cy));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
