//! Viewer options.
//!
//! | Field             | Default                               |
//! |-------------------|---------------------------------------|
//! | `placeholder`     | `~`                                   |
//! | `welcome`         | `Kilo editor -- version <crate ver>`  |
//! | `quit_key`        | `q` (pressed as CTRL-Q)               |
//! | `read_timeout_ds` | `1` (100ms)                           |

use kilo_term::input::Key;

/// Crate version, shown in the welcome line.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display and key settings for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Glyph drawn at the start of screen rows past the end of the text.
    pub placeholder: u8,

    /// Announcement centered on an empty buffer.
    pub welcome: String,

    /// Letter whose CTRL chord quits.
    pub quit_key: u8,

    /// Terminal read timeout in tenths of a second.
    pub read_timeout_ds: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            placeholder: b'~',
            welcome: format!("Kilo editor -- version {VERSION}"),
            quit_key: b'q',
            read_timeout_ds: 1,
        }
    }
}

impl Options {
    /// The key that ends the session.
    #[inline]
    #[must_use]
    pub const fn quit_chord(&self) -> Key {
        Key::ctrl(self.quit_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = Options::default();
        assert_eq!(o.placeholder, b'~');
        assert_eq!(o.read_timeout_ds, 1);
        assert!(o.welcome.starts_with("Kilo editor -- version "));
        assert!(o.welcome.ends_with(VERSION));
    }

    #[test]
    fn quit_chord_is_ctrl_q() {
        assert_eq!(Options::default().quit_chord(), Key::Byte(0x11));
    }
}
