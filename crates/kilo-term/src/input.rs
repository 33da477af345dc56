// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns the raw byte stream from a terminal in raw mode into one logical
// key per call. Ordinary bytes come back verbatim; the escape byte (0x1B)
// starts a short lookahead that recognizes the cursor and editing keys
// terminals send as multi-byte sequences:
//
//   ESC [ A / B / C / D      arrows (up, down, right, left)
//   ESC [ H   ESC O H        Home
//   ESC [ F   ESC O F        End
//   ESC [ 1~ 7~              Home
//   ESC [ 3~                 Delete
//   ESC [ 4~ 8~              End
//   ESC [ 5~ 6~              Page Up / Page Down
//
// # Lone ESC
//
// A bare ESC could be the Escape key or the first byte of a sequence. The
// terminal is configured with a 100ms read timeout, so each lookahead read
// either yields a byte or times out. A timeout after ESC means the user
// pressed Escape: we return it instead of waiting. Worst-case latency for
// the Escape key is therefore two read timeouts.
//
// # Byte sources
//
// The decoder reads through the `ByteSource` trait rather than stdin
// directly. The terminal implementation lives in `terminal.rs`; `&[u8]`
// implements it too, with an exhausted slice behaving like a timeout,
// which is what the tests feed it.

use std::fmt;
use std::io;

use crate::error::{Error, Result};

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded key.
///
/// Literal bytes and named keys are distinct variants, so a named key can
/// never be confused with a byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal byte: printable character or control character.
    Byte(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    /// A lone ESC, or an escape sequence we don't recognize.
    Escape,
}

/// The control chord for `byte`: the byte with bits 5–7 cleared.
///
/// `ctrl(b'q')` is 0x11, the byte a terminal sends for CTRL-Q.
#[inline]
#[must_use]
pub const fn ctrl(byte: u8) -> u8 {
    byte & 0x1f
}

impl Key {
    /// The key produced by holding CTRL and pressing `byte`.
    #[inline]
    #[must_use]
    pub const fn ctrl(byte: u8) -> Self {
        Self::Byte(ctrl(byte))
    }

    /// Whether this is one of the cursor-motion keys.
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        matches!(
            self,
            Self::ArrowUp
                | Self::ArrowDown
                | Self::ArrowLeft
                | Self::ArrowRight
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }
}

/// Formats keys the way the key inspection mode prints them: the decimal
/// byte value, followed by the character itself when it is printable.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Byte(b) if b.is_ascii_control() => write!(f, "{b}"),
            Self::Byte(b) if b.is_ascii() => write!(f, "{b} ('{}')", char::from(b)),
            Self::Byte(b) => write!(f, "{b}"),
            Self::ArrowUp => f.write_str("<Up>"),
            Self::ArrowDown => f.write_str("<Down>"),
            Self::ArrowLeft => f.write_str("<Left>"),
            Self::ArrowRight => f.write_str("<Right>"),
            Self::Home => f.write_str("<Home>"),
            Self::End => f.write_str("<End>"),
            Self::PageUp => f.write_str("<PageUp>"),
            Self::PageDown => f.write_str("<PageDown>"),
            Self::Delete => f.write_str("<Delete>"),
            Self::Escape => f.write_str("<Esc>"),
        }
    }
}

// ─── Byte Sources ───────────────────────────────────────────────────────────

/// A blocking-with-timeout source of single input bytes.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// Returns `Ok(Some(byte))` when a byte arrived, `Ok(None)` when the
    /// read timed out with nothing to report, and `Err` only for a genuine
    /// I/O failure.
    ///
    /// # Errors
    ///
    /// Propagates the underlying read error.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// A byte slice is a source whose end behaves like a timeout.
impl ByteSource for &[u8] {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.split_first() {
            Some((&b, rest)) => {
                *self = rest;
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

/// Block until one key is available and return it.
///
/// Timeouts with no data are retried indefinitely; only a real I/O error
/// ends the wait. An escape sequence that times out part way through
/// decodes as [`Key::Escape`]; any bytes already consumed are dropped.
///
/// # Errors
///
/// Returns [`Error::Read`] if the source reports an I/O error.
pub fn read_key(src: &mut impl ByteSource) -> Result<Key> {
    let byte = loop {
        if let Some(b) = read_once(src)? {
            break b;
        }
    };

    if byte == 0x1b {
        decode_escape(src)
    } else {
        Ok(Key::Byte(byte))
    }
}

/// One read attempt: `None` on timeout.
fn read_once(src: &mut impl ByteSource) -> Result<Option<u8>> {
    src.read_byte().map_err(Error::Read)
}

/// Decode what follows an ESC byte.
fn decode_escape(src: &mut impl ByteSource) -> Result<Key> {
    let Some(first) = read_once(src)? else {
        return Ok(Key::Escape);
    };
    let Some(second) = read_once(src)? else {
        return Ok(Key::Escape);
    };

    let key = match (first, second) {
        (b'[', digit @ b'0'..=b'9') => {
            let Some(b'~') = read_once(src)? else {
                return Ok(Key::Escape);
            };
            match digit {
                b'1' | b'7' => Key::Home,
                b'3' => Key::Delete,
                b'4' | b'8' => Key::End,
                b'5' => Key::PageUp,
                b'6' => Key::PageDown,
                _ => Key::Escape,
            }
        }
        (b'[', b'A') => Key::ArrowUp,
        (b'[', b'B') => Key::ArrowDown,
        (b'[', b'C') => Key::ArrowRight,
        (b'[', b'D') => Key::ArrowLeft,
        (b'[' | b'O', b'H') => Key::Home,
        (b'[' | b'O', b'F') => Key::End,
        _ => Key::Escape,
    };

    Ok(key)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Decode the first key of `bytes`.
    fn key(bytes: &[u8]) -> Key {
        let mut src = bytes;
        read_key(&mut src).unwrap()
    }

    /// A scripted source where `None` entries are explicit timeouts.
    struct Script(VecDeque<Option<u8>>);

    impl Script {
        fn new(items: &[Option<u8>]) -> Self {
            Self(items.iter().copied().collect())
        }
    }

    impl ByteSource for Script {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            Ok(self.0.pop_front().flatten())
        }
    }

    struct Failing;

    impl ByteSource for Failing {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            Err(io::Error::from(io::ErrorKind::Interrupted))
        }
    }

    // ── Literal bytes ───────────────────────────────────────────────────

    #[test]
    fn every_non_escape_byte_is_literal() {
        for b in (0u8..=255).filter(|&b| b != 0x1b) {
            assert_eq!(key(&[b]), Key::Byte(b), "byte {b:#04x}");
        }
    }

    #[test]
    fn literal_ignores_following_bytes() {
        let mut src: &[u8] = b"ab";
        assert_eq!(read_key(&mut src).unwrap(), Key::Byte(b'a'));
        assert_eq!(read_key(&mut src).unwrap(), Key::Byte(b'b'));
    }

    #[test]
    fn control_chord_masks_low_five_bits() {
        assert_eq!(ctrl(b'q'), 0x11);
        assert_eq!(ctrl(b'Q'), 0x11);
        assert_eq!(ctrl(b'a'), 0x01);
        assert_eq!(key(&[0x11]), Key::ctrl(b'q'));
    }

    // ── Timeout retry ───────────────────────────────────────────────────

    #[test]
    fn timeouts_before_first_byte_are_retried() {
        let mut src = Script::new(&[None, None, None, Some(b'x')]);
        assert_eq!(read_key(&mut src).unwrap(), Key::Byte(b'x'));
    }

    #[test]
    fn io_error_is_fatal() {
        let err = read_key(&mut Failing).unwrap_err();
        assert!(matches!(err, Error::Read(_)));
    }

    // ── Arrows ──────────────────────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(key(b"\x1b[A"), Key::ArrowUp);
        assert_eq!(key(b"\x1b[B"), Key::ArrowDown);
        assert_eq!(key(b"\x1b[C"), Key::ArrowRight);
        assert_eq!(key(b"\x1b[D"), Key::ArrowLeft);
    }

    #[test]
    fn rapid_arrow_keys() {
        let mut src: &[u8] = b"\x1b[A\x1b[B\x1b[C\x1b[D";
        let keys: Vec<Key> = (0..4).map(|_| read_key(&mut src).unwrap()).collect();
        assert_eq!(
            keys,
            vec![Key::ArrowUp, Key::ArrowDown, Key::ArrowRight, Key::ArrowLeft]
        );
        assert!(src.is_empty());
    }

    // ── Home / End ──────────────────────────────────────────────────────

    #[test]
    fn home_variants() {
        assert_eq!(key(b"\x1b[H"), Key::Home);
        assert_eq!(key(b"\x1bOH"), Key::Home);
        assert_eq!(key(b"\x1b[1~"), Key::Home);
        assert_eq!(key(b"\x1b[7~"), Key::Home);
    }

    #[test]
    fn end_variants() {
        assert_eq!(key(b"\x1b[F"), Key::End);
        assert_eq!(key(b"\x1bOF"), Key::End);
        assert_eq!(key(b"\x1b[4~"), Key::End);
        assert_eq!(key(b"\x1b[8~"), Key::End);
    }

    // ── Tilde sequences ─────────────────────────────────────────────────

    #[test]
    fn editing_keys() {
        assert_eq!(key(b"\x1b[3~"), Key::Delete);
        assert_eq!(key(b"\x1b[5~"), Key::PageUp);
        assert_eq!(key(b"\x1b[6~"), Key::PageDown);
    }

    #[test]
    fn unmapped_digits_are_escape() {
        for d in [b'0', b'2', b'9'] {
            assert_eq!(key(&[0x1b, b'[', d, b'~']), Key::Escape, "digit {}", d as char);
        }
    }

    #[test]
    fn digit_without_tilde_is_escape() {
        assert_eq!(key(b"\x1b[5x"), Key::Escape);
    }

    // ── Unresolved sequences ────────────────────────────────────────────

    #[test]
    fn unknown_sequences_are_escape() {
        assert_eq!(key(b"\x1b[Z"), Key::Escape);
        assert_eq!(key(b"\x1bOA"), Key::Escape);
        assert_eq!(key(b"\x1bxy"), Key::Escape);
    }

    #[test]
    fn lone_escape() {
        assert_eq!(key(b"\x1b"), Key::Escape);
    }

    #[test]
    fn escape_timeout_after_bracket() {
        assert_eq!(key(b"\x1b["), Key::Escape);
    }

    #[test]
    fn escape_timeout_before_tilde() {
        assert_eq!(key(b"\x1b[3"), Key::Escape);
    }

    #[test]
    fn escape_timeout_does_not_swallow_later_input() {
        // ESC, then a timeout, then "[A" typed separately: two literals.
        let mut src = Script::new(&[Some(0x1b), None, Some(b'['), Some(b'A')]);
        assert_eq!(read_key(&mut src).unwrap(), Key::Escape);
        assert_eq!(read_key(&mut src).unwrap(), Key::Byte(b'['));
        assert_eq!(read_key(&mut src).unwrap(), Key::Byte(b'A'));
    }

    // ── Key helpers ─────────────────────────────────────────────────────

    #[test]
    fn navigation_classification() {
        assert!(Key::ArrowLeft.is_navigation());
        assert!(Key::PageDown.is_navigation());
        assert!(!Key::Delete.is_navigation());
        assert!(!Key::Escape.is_navigation());
        assert!(!Key::Byte(b'j').is_navigation());
    }

    #[test]
    fn display_matches_inspection_format() {
        assert_eq!(Key::Byte(b'a').to_string(), "97 ('a')");
        assert_eq!(Key::Byte(3).to_string(), "3");
        assert_eq!(Key::Byte(200).to_string(), "200");
        assert_eq!(Key::PageUp.to_string(), "<PageUp>");
    }
}
