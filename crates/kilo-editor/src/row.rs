//! Row store — the lines of the loaded file.
//!
//! A [`RowStore`] is an ordered, gap-free sequence of [`Row`]s, each an owned
//! byte string with its line terminator stripped. Rows are bytes, not `str`:
//! the viewer shows a file's bytes as they are and never needs to decode
//! them, so a file that isn't valid UTF-8 loads just the same.
//!
//! The store only grows. Rows are appended while the file loads and are
//! read-only after that.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of text, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    chars: Vec<u8>,
}

impl Row {
    /// Create a row holding a copy of `bytes`.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            chars: bytes.to_vec(),
        }
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The row's bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }
}

// ---------------------------------------------------------------------------
// RowStore
// ---------------------------------------------------------------------------

/// The text being viewed, as an ordered list of rows.
///
/// Rows are addressed `0..num_rows()`. There is no "always one empty line"
/// convention: an empty file is an empty store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    // -- Construction -------------------------------------------------------

    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Create a store from in-memory text, split exactly as [`load`](Self::load)
    /// splits a file.
    #[must_use]
    pub fn from_text(text: &[u8]) -> Self {
        let mut store = Self::new();
        // Reading from a slice cannot fail.
        let _ = store.append_lines(text);
        store
    }

    /// Create a store holding the lines of the file at `path`.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn open(path: &Path) -> Result<Self> {
        let mut store = Self::new();
        store.load(path)?;
        Ok(store)
    }

    // -- Loading ------------------------------------------------------------

    /// Append every line of the file at `path`.
    ///
    /// Trailing `\r` and `\n` bytes are stripped from each line. Line length
    /// is bounded only by memory.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the file can't be opened, [`Error::Read`] if
    /// reading it fails.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let before = self.rows.len();
        self.append_lines(BufReader::new(file))
            .map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), rows = self.rows.len() - before, "file loaded");
        Ok(())
    }

    /// Append each line read from `reader`.
    fn append_lines(&mut self, mut reader: impl BufRead) -> io::Result<()> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            self.append_row(strip_line_ending(&line));
        }
    }

    /// Append a copy of `bytes` as a new last row.
    pub fn append_row(&mut self, bytes: &[u8]) {
        self.rows.push(Row::new(bytes));
    }

    // -- Access -------------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store has no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`, if it exists.
    #[inline]
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Length of the row at `index`, or 0 past the end.
    #[inline]
    #[must_use]
    pub fn row_len(&self, index: usize) -> usize {
        self.row(index).map_or(0, Row::len)
    }

    /// Iterate over the rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

/// Drop every trailing `\r` / `\n` byte.
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map_or(0, |i| i + 1);
    &line[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn bytes(store: &RowStore) -> Vec<&[u8]> {
        store.iter().map(Row::as_bytes).collect()
    }

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    // -- Row ----------------------------------------------------------------

    #[test]
    fn row_copies_bytes() {
        let src = b"hello".to_vec();
        let row = Row::new(&src);
        drop(src);
        assert_eq!(row.as_bytes(), b"hello");
        assert_eq!(row.len(), 5);
        assert!(!row.is_empty());
    }

    // -- Line ending stripping ----------------------------------------------

    #[test]
    fn strip_lf() {
        assert_eq!(strip_line_ending(b"abc\n"), b"abc");
    }

    #[test]
    fn strip_crlf() {
        assert_eq!(strip_line_ending(b"abc\r\n"), b"abc");
    }

    #[test]
    fn strip_all_trailing_terminators() {
        assert_eq!(strip_line_ending(b"abc\r\r\n"), b"abc");
        assert_eq!(strip_line_ending(b"\r\n"), b"");
    }

    #[test]
    fn strip_keeps_interior_cr() {
        assert_eq!(strip_line_ending(b"a\rb\n"), b"a\rb");
    }

    // -- append_row ---------------------------------------------------------

    #[test]
    fn append_preserves_order() {
        let mut store = RowStore::new();
        store.append_row(b"one");
        store.append_row(b"two");
        store.append_row(b"");
        assert_eq!(store.num_rows(), 3);
        assert_eq!(bytes(&store), vec![&b"one"[..], b"two", b""]);
    }

    #[test]
    fn row_len_past_end_is_zero() {
        let store = RowStore::from_text(b"abc\n");
        assert_eq!(store.row_len(0), 3);
        assert_eq!(store.row_len(1), 0);
        assert!(store.row(1).is_none());
    }

    // -- from_text ----------------------------------------------------------

    #[test]
    fn from_text_empty() {
        let store = RowStore::from_text(b"");
        assert!(store.is_empty());
        assert_eq!(store.num_rows(), 0);
    }

    #[test]
    fn from_text_without_final_newline() {
        let store = RowStore::from_text(b"a\nb");
        assert_eq!(bytes(&store), vec![&b"a"[..], b"b"]);
    }

    #[test]
    fn from_text_blank_lines_are_rows() {
        let store = RowStore::from_text(b"\n\nx\n");
        assert_eq!(bytes(&store), vec![&b""[..], b"", b"x"]);
    }

    #[test]
    fn from_text_non_utf8() {
        let store = RowStore::from_text(b"\xff\xfe\n");
        assert_eq!(store.row(0).unwrap().as_bytes(), b"\xff\xfe");
    }

    // -- load ---------------------------------------------------------------

    #[test]
    fn load_n_terminated_lines() {
        let f = temp_file(b"first\nsecond line\n\nfourth\n");
        let store = RowStore::open(f.path()).unwrap();
        assert_eq!(
            bytes(&store),
            vec![&b"first"[..], b"second line", b"", b"fourth"]
        );
    }

    #[test]
    fn load_crlf_file() {
        let f = temp_file(b"one\r\ntwo\r\n");
        let store = RowStore::open(f.path()).unwrap();
        assert_eq!(bytes(&store), vec![&b"one"[..], b"two"]);
    }

    #[test]
    fn load_long_line() {
        let long = vec![b'x'; 100_000];
        let mut contents = long.clone();
        contents.push(b'\n');
        let f = temp_file(&contents);
        let store = RowStore::open(f.path()).unwrap();
        assert_eq!(store.num_rows(), 1);
        assert_eq!(store.row(0).unwrap().as_bytes(), &long[..]);
    }

    #[test]
    fn load_appends_to_existing_rows() {
        let f = temp_file(b"loaded\n");
        let mut store = RowStore::from_text(b"already\n");
        store.load(f.path()).unwrap();
        assert_eq!(bytes(&store), vec![&b"already"[..], b"loaded"]);
    }

    #[test]
    fn load_empty_file() {
        let f = temp_file(b"");
        let store = RowStore::open(f.path()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn load_nonexistent_is_open_error() {
        let err = RowStore::open(Path::new("/nonexistent/path/file.txt")).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
        assert!(err.to_string().starts_with("/nonexistent/path/file.txt: "));
    }
}
