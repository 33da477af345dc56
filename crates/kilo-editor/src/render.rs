//! Frame composition.
//!
//! [`compose`] paints one complete frame into an `OutputBuffer`:
//!
//! ```text
//! ESC[?25l  ESC[H                      hide cursor, go home
//! <row 0> ESC[K \r\n                   text slice or placeholder, erase rest
//! <row 1> ESC[K \r\n
//!   ...
//! <row N-1> ESC[K                      no line break after the last row
//! ESC[{y};{x}H  ESC[?25h               place and show the cursor
//! ```
//!
//! Screen rows past the end of the text get the placeholder glyph. When the
//! text is empty, the row a third of the way down shows the welcome line
//! instead, centered and cut to the screen width.
//!
//! The caller is expected to have run [`View::scroll`](crate::view::View::scroll)
//! first, so the cursor is inside the view.

use std::io;

use kilo_term::ansi;
use kilo_term::output::OutputBuffer;

use crate::cursor::Cursor;
use crate::options::Options;
use crate::row::RowStore;
use crate::view::View;

/// Paint the visible part of `rows` and the cursor into `frame`.
///
/// # Errors
///
/// Propagates writer errors, which an `OutputBuffer` never produces.
pub fn compose(
    frame: &mut OutputBuffer,
    rows: &RowStore,
    cursor: &Cursor,
    view: &View,
    options: &Options,
) -> io::Result<()> {
    ansi::cursor_hide(frame)?;
    ansi::cursor_home(frame)?;

    draw_rows(frame, rows, view, options)?;

    ansi::cursor_to(
        frame,
        cursor.cx().saturating_sub(view.coloff()),
        cursor.cy().saturating_sub(view.rowoff()),
    )?;
    ansi::cursor_show(frame)
}

fn draw_rows(
    frame: &mut OutputBuffer,
    rows: &RowStore,
    view: &View,
    options: &Options,
) -> io::Result<()> {
    let screen_rows = view.screen_rows();
    let screen_cols = view.screen_cols();

    for y in 0..screen_rows {
        match rows.row(y + view.rowoff()) {
            Some(row) => {
                let bytes = row.as_bytes();
                let start = view.coloff().min(bytes.len());
                let end = (start + screen_cols).min(bytes.len());
                frame.push_bytes(&bytes[start..end]);
            }
            None if rows.is_empty() && y == screen_rows / 3 => {
                draw_welcome(frame, screen_cols, options);
            }
            None => frame.push_bytes(&[options.placeholder]),
        }

        ansi::clear_line(frame)?;
        if y + 1 < screen_rows {
            frame.push_bytes(b"\r\n");
        }
    }
    Ok(())
}

/// The welcome line: placeholder, padding, message, centered in `cols`.
fn draw_welcome(frame: &mut OutputBuffer, cols: usize, options: &Options) {
    let message = options.welcome.as_bytes();
    let len = message.len().min(cols);
    let mut padding = (cols - len) / 2;

    if padding > 0 {
        frame.push_bytes(&[options.placeholder]);
        padding -= 1;
    }
    frame.push_repeated(b' ', padding);
    frame.push_bytes(&message[..len]);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use kilo_term::terminal::Size;
    use pretty_assertions::assert_eq;

    fn opts(welcome: &str) -> Options {
        Options {
            welcome: welcome.to_string(),
            ..Options::default()
        }
    }

    fn frame_of(rows: &RowStore, cursor: Cursor, view: &View, options: &Options) -> String {
        let mut frame = OutputBuffer::new();
        compose(&mut frame, rows, &cursor, view, options).unwrap();
        String::from_utf8(frame.as_bytes().to_vec()).unwrap()
    }

    /// Split a frame into its screen rows (between the home and final
    /// cursor sequences), with the erase-line suffix removed.
    fn screen_lines(frame: &str) -> Vec<String> {
        let body = frame.strip_prefix("\x1b[?25l\x1b[H").unwrap();
        let body = &body[..body.rfind("\x1b[K").unwrap() + 3];
        body.split("\r\n")
            .map(|l| l.strip_suffix("\x1b[K").unwrap().to_string())
            .collect()
    }

    // -- Empty buffer -------------------------------------------------------

    #[test]
    fn empty_buffer_small_screen_exact_bytes() {
        let view = View::new(Size { cols: 10, rows: 3 });
        let frame = frame_of(&RowStore::new(), Cursor::new(), &view, &opts("hi"));
        assert_eq!(
            frame,
            "\x1b[?25l\x1b[H~\x1b[K\r\n~   hi\x1b[K\r\n~\x1b[K\x1b[1;1H\x1b[?25h"
        );
    }

    #[test]
    fn empty_buffer_80x24_welcome_on_row_8() {
        let options = Options::default();
        let view = View::new(Size { cols: 80, rows: 24 });
        let frame = frame_of(&RowStore::new(), Cursor::new(), &view, &options);
        let lines = screen_lines(&frame);

        assert_eq!(lines.len(), 24);
        for (y, line) in lines.iter().enumerate() {
            if y == 8 {
                let pad = (80 - options.welcome.len()) / 2;
                let expected = format!("~{}{}", " ".repeat(pad - 1), options.welcome);
                assert_eq!(line, &expected);
            } else {
                assert_eq!(line, "~", "row {y}");
            }
        }
        assert!(frame.ends_with("\x1b[1;1H\x1b[?25h"));
    }

    #[test]
    fn welcome_truncated_to_screen_width() {
        let view = View::new(Size { cols: 5, rows: 3 });
        let frame = frame_of(&RowStore::new(), Cursor::new(), &view, &opts("abcdefgh"));
        assert_eq!(screen_lines(&frame)[1], "abcde");
    }

    #[test]
    fn welcome_with_one_column_of_padding() {
        let view = View::new(Size { cols: 4, rows: 3 });
        let frame = frame_of(&RowStore::new(), Cursor::new(), &view, &opts("ab"));
        assert_eq!(screen_lines(&frame)[1], "~ab");
    }

    #[test]
    fn no_welcome_when_buffer_has_text() {
        let view = View::new(Size { cols: 20, rows: 6 });
        let rows = RowStore::from_text(b"only\n");
        let frame = frame_of(&rows, Cursor::new(), &view, &opts("WELCOME"));
        assert!(!frame.contains("WELCOME"));
        assert_eq!(screen_lines(&frame), vec!["only", "~", "~", "~", "~", "~"]);
    }

    // -- Text rows ----------------------------------------------------------

    #[test]
    fn rows_are_clipped_to_width() {
        let view = View::new(Size { cols: 4, rows: 2 });
        let rows = RowStore::from_text(b"abcdefgh\nxy\n");
        let frame = frame_of(&rows, Cursor::new(), &view, &opts(""));
        assert_eq!(screen_lines(&frame), vec!["abcd", "xy"]);
    }

    #[test]
    fn column_offset_slices_rows() {
        let mut view = View::new(Size { cols: 3, rows: 3 });
        view.set_offsets(0, 2);
        let rows = RowStore::from_text(b"abcdefgh\nxy\nxyz\n");
        let frame = frame_of(&rows, Cursor::at(2, 0), &view, &opts(""));
        // "xy" is shorter than the offset: nothing left to draw.
        assert_eq!(screen_lines(&frame), vec!["cde", "", "z"]);
    }

    #[test]
    fn row_offset_skips_rows_and_places_cursor() {
        let mut view = View::new(Size { cols: 10, rows: 2 });
        view.set_offsets(3, 1);
        let rows = RowStore::from_text(b"0\n1\n2\n3abc\n4abc\n");
        let frame = frame_of(&rows, Cursor::at(2, 4), &view, &opts(""));
        assert_eq!(screen_lines(&frame), vec!["abc", "abc"]);
        assert!(frame.ends_with("\x1b[2;2H\x1b[?25h"));
    }

    #[test]
    fn placeholder_after_last_row() {
        let mut view = View::new(Size { cols: 10, rows: 3 });
        view.set_offsets(1, 0);
        let rows = RowStore::from_text(b"a\nb\n");
        let frame = frame_of(&rows, Cursor::at(0, 1), &view, &opts(""));
        assert_eq!(screen_lines(&frame), vec!["b", "~", "~"]);
    }

    #[test]
    fn custom_placeholder() {
        let options = Options {
            placeholder: b'.',
            ..opts("")
        };
        let view = View::new(Size { cols: 10, rows: 2 });
        let rows = RowStore::from_text(b"a\n");
        let frame = frame_of(&rows, Cursor::new(), &view, &options);
        assert_eq!(screen_lines(&frame), vec!["a", "."]);
    }

    #[test]
    fn last_row_has_no_line_break() {
        let view = View::new(Size { cols: 10, rows: 4 });
        let frame = frame_of(&RowStore::from_text(b"x\n"), Cursor::new(), &view, &opts(""));
        assert_eq!(frame.matches("\r\n").count(), 3);
        assert_eq!(frame.matches("\x1b[K").count(), 4);
    }
}
