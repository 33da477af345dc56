// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size discovery, and RAII restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), and raw fd reads and writes.
// These are the standard POSIX interfaces for terminal control; there is
// no safe alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// The original terminal attributes are the one resource whose leak
// outlives the process: a shell left in raw mode has no echo and no line
// editing. So restoration happens on every exit path:
//
//   - `RawMode::restore` on orderly shutdown, where a failure is reported;
//   - `Drop for RawMode` on early returns and unwinding;
//   - a panic hook that restores from a process-wide backup before the
//     panic message is printed, so the message lands on a working terminal.
//
// Restoring twice is harmless: the guard forgets its saved attributes
// after the first successful restore.
//
// Raw mode here is the classic kilo recipe: no echo, byte-at-a-time input,
// no signal keys, no flow control, no CR→NL input translation, no output
// post-processing, 8-bit characters, and VMIN=0 / VTIME=1 so read()
// returns after 100ms even when nothing was typed.

use std::io::{self, Write};
#[cfg(unix)]
use std::os::fd::RawFd;
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use tracing::{debug, warn};

use crate::ansi;
use crate::error::{Error, Result};
use crate::input::ByteSource;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

// ─── Window Size Discovery ──────────────────────────────────────────────────

/// Capacity of the cursor report buffer, terminator included.
const REPORT_CAPACITY: usize = 32;

/// Determine the window size, asking the OS first.
///
/// When `ioctl` can't answer, fall back to pushing the cursor into the
/// bottom-right corner and asking the terminal where it ended up.
///
/// # Errors
///
/// Returns [`Error::Probe`] if the fallback hits an I/O error, and
/// [`Error::WindowSize`] if it fails otherwise.
pub fn window_size(input: &mut impl ByteSource, out: &mut impl Write) -> Result<Size> {
    discover_size(get_size(), input, out)
}

/// [`window_size`] with the OS answer supplied by the caller.
///
/// # Errors
///
/// Returns [`Error::WindowSize`] when `primary` is `None` and the
/// cursor-report fallback fails; [`Error::Probe`] when it fails on an I/O
/// error. Any short write during the fallback counts as failure.
pub fn discover_size(
    primary: Option<Size>,
    input: &mut impl ByteSource,
    out: &mut impl Write,
) -> Result<Size> {
    if let Some(size) = primary {
        return Ok(size);
    }

    debug!("TIOCGWINSZ unavailable, probing with cursor report");
    write_probe(out, ansi::CURSOR_FAR_CORNER)?;
    cursor_position(input, out)
}

/// Ask the terminal for the cursor position and parse its reply.
///
/// # Errors
///
/// Returns [`Error::Probe`] if writing the query or reading the reply
/// fails, [`Error::WindowSize`] if the query is cut short or the reply
/// doesn't parse.
pub fn cursor_position(input: &mut impl ByteSource, out: &mut impl Write) -> Result<Size> {
    write_probe(out, ansi::QUERY_CURSOR_POSITION)?;

    let mut reply = Vec::with_capacity(REPORT_CAPACITY);
    while reply.len() < REPORT_CAPACITY - 1 {
        match input.read_byte() {
            Ok(Some(b'R') | None) => break,
            Ok(Some(b)) => reply.push(b),
            Err(e) => {
                warn!("reading cursor report: {e}");
                return Err(Error::Probe(e));
            }
        }
    }

    parse_cursor_report(&reply).ok_or(Error::WindowSize)
}

/// One write that must land whole.
fn write_probe(out: &mut impl Write, bytes: &[u8]) -> Result<()> {
    match out.write(bytes).and_then(|n| out.flush().map(|()| n)) {
        Ok(n) if n == bytes.len() => Ok(()),
        Ok(n) => {
            warn!(written = n, expected = bytes.len(), "short write during size probe");
            Err(Error::WindowSize)
        }
        Err(e) => {
            warn!("write during size probe: {e}");
            Err(Error::Probe(e))
        }
    }
}

/// Parse a cursor position report body: `ESC [ rows ; cols`, with the
/// final `R` already stripped.
///
/// Both numbers must be plain positive decimals that fit a `u16`.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let split = body.iter().position(|&b| b == b';')?;
    let rows = parse_decimal(&body[..split])?;
    let cols = parse_decimal(&body[split + 1..])?;
    (rows > 0 && cols > 0).then_some(Size { cols, rows })
}

fn parse_decimal(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    digits.iter().try_fold(0u16, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u16::from(d - b'0'))
    })
}

// ─── Raw I/O ────────────────────────────────────────────────────────────────

/// Byte source reading straight from stdin's file descriptor.
///
/// Bypasses Rust's buffered `Stdin` so every call is one `read()` and the
/// termios timeout applies to each byte. A read of zero bytes (timeout) or
/// `EAGAIN`/`EINTR` is reported as "nothing yet".
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyReader;

#[cfg(unix)]
impl ByteSource for TtyReader {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

#[cfg(not(unix))]
impl ByteSource for TtyReader {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;
        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Writer going straight to stdout's file descriptor.
///
/// Rust's `Stdout` is line buffered and would split a frame at every
/// `\r\n`; this writer turns each `write` into exactly one `write()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyWriter;

#[cfg(unix)]
impl Write for TtyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(libc::STDOUT_FILENO, buf.as_ptr().cast(), buf.len()) };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(not(unix))]
impl Write for TtyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut stdout = io::stdout().lock();
        let n = stdout.write(buf)?;
        stdout.flush()?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't reach
/// it. This backup lives behind a [`Mutex`], not `static mut`.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some((fd, ref original)) = *guard {
            unsafe {
                let _ = libc::tcsetattr(fd, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Show the cursor (a frame may have hidden it), clear, and home.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[?25h\x1b[2J\x1b[H";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor,
/// bypassing Rust's stdout lock in case the panic happened while it was held.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Derive the raw attribute set from `original`.
///
/// `timeout_ds` is the read timeout in tenths of a second (VTIME); VMIN is
/// zero so a read returns empty-handed once the timeout expires.
#[cfg(unix)]
#[must_use]
pub fn raw_attributes(original: &libc::termios, timeout_ds: u8) -> libc::termios {
    let mut raw = *original;

    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag &= !libc::CSIZE;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = timeout_ds;

    raw
}

/// Raw mode guard.
///
/// [`enable`](Self::enable) saves the current attributes and switches the
/// terminal to raw mode. The saved attributes are reapplied by
/// [`restore`](Self::restore) or, failing that, when the guard is dropped.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::RawMode;
///
/// let mut raw = RawMode::enable(1)?;
/// // ... read keys, draw frames ...
/// raw.restore()?;
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct RawMode {
    /// Terminal whose attributes were changed.
    #[cfg(unix)]
    fd: RawFd,
    /// Original termios, `None` once restored.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Enter raw mode with a read timeout of `timeout_ds` tenths of a second.
    ///
    /// Pending output is flushed and unread input discarded when the new
    /// attributes are applied.
    ///
    /// # Errors
    ///
    /// [`Error::GetAttr`] if the current attributes can't be read (stdin is
    /// not a terminal), [`Error::SetAttr`] if the raw set can't be applied.
    #[cfg(unix)]
    pub fn enable(timeout_ds: u8) -> Result<Self> {
        Self::enable_fd(libc::STDIN_FILENO, timeout_ds)
    }

    #[cfg(unix)]
    fn enable_fd(fd: RawFd, timeout_ds: u8) -> Result<Self> {
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut original) } != 0 {
            return Err(Error::GetAttr(io::Error::last_os_error()));
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some((fd, original));
        }
        install_panic_hook();

        let attrs = raw_attributes(&original, timeout_ds);
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const attrs) } != 0 {
            let err = io::Error::last_os_error();
            restore_termios_from_backup();
            return Err(Error::SetAttr(err));
        }

        debug!(fd, timeout_ms = u32::from(timeout_ds) * 100, "raw mode enabled");
        Ok(Self {
            fd,
            original: Some(original),
        })
    }

    #[cfg(not(unix))]
    pub fn enable(_timeout_ds: u8) -> Result<Self> {
        Err(Error::GetAttr(io::Error::from(io::ErrorKind::Unsupported)))
    }

    /// Reapply the original attributes. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SetAttr`] if `tcsetattr` fails. The guard stays
    /// armed, so dropping it tries once more.
    #[cfg(unix)]
    pub fn restore(&mut self) -> Result<()> {
        let Some(ref original) = self.original else {
            return Ok(());
        };

        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, original) } != 0 {
            return Err(Error::SetAttr(io::Error::last_os_error()));
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
        self.original = None;
        debug!("terminal attributes restored");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn restore(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("restoring terminal on drop: {e}");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
