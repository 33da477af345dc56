// SPDX-License-Identifier: MIT
//
// kilo — a small terminal text viewer.
//
// This is the binary that wires the two crates together:
//
//   kilo-term   → raw mode, window size, key decoding, frame output
//   kilo-editor → rows, cursor, view, frame composition, the session loop
//
// Startup order matters. Raw mode comes first so that every later failure
// (window size, opening the file) happens inside the guard and restores
// the terminal on its way out. The window size fallback also needs raw
// mode to read the terminal's cursor report.
//
// Exit status is 0 after CTRL-Q and 1 after any fatal error, which is
// printed to stderr once the terminal is back in its original state.

use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use kilo_editor::options::{Options, VERSION};
use kilo_editor::row::RowStore;
use kilo_editor::session::{self, Session};
use kilo_term::terminal::{self, RawMode, TtyReader, TtyWriter};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: kilo [OPTIONS] [FILE]

Open FILE for viewing, or start with an empty buffer.
Arrow keys, Home/End and Page Up/Down move the cursor. CTRL-Q quits.

Options:
  --keys         Print each decoded key until 'q' is pressed
  -h, --help     Print this help
  -V, --version  Print the version

Environment:
  KILO_LOG       Log filter (e.g. debug); logging is off when unset
  KILO_LOG_FILE  Log file path (default: <tmp>/kilo.log)";

// ─── Command line ───────────────────────────────────────────────────────────

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// View a file, or an empty buffer.
    View(Option<PathBuf>),
    /// Print decoded keys.
    Keys,
    Help,
    Version,
}

/// Parse arguments (without the program name).
fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut file = None;
    let mut keys = false;

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--keys" => keys = true,
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(format!("unknown option '{flag}'"));
            }
            _ if file.is_some() => return Err("only one file can be opened".to_string()),
            _ => file = Some(PathBuf::from(&arg)),
        }
    }

    if keys {
        return Ok(Command::Keys);
    }
    Ok(Command::View(file))
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send logs to a file when `KILO_LOG` is set. The terminal itself is
/// in raw mode and owned by the frame renderer, so logs never go there.
fn init_logging() {
    let Ok(directive) = env::var("KILO_LOG") else {
        return;
    };
    let Ok(filter) = EnvFilter::try_new(&directive) else {
        eprintln!("kilo: ignoring invalid KILO_LOG '{directive}'");
        return;
    };

    let path = env::var_os("KILO_LOG_FILE")
        .map_or_else(|| env::temp_dir().join("kilo.log"), PathBuf::from);

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        eprintln!("kilo: cannot open log file {}", path.display());
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

// ─── Modes ──────────────────────────────────────────────────────────────────

fn view(path: Option<&Path>) -> kilo_editor::Result<()> {
    let options = Options::default();
    let mut raw = RawMode::enable(options.read_timeout_ds)?;
    let (mut input, mut out) = (TtyReader, TtyWriter);

    let screen = terminal::window_size(&mut input, &mut out)?;
    let rows = match path {
        Some(p) => RowStore::open(p)?,
        None => RowStore::new(),
    };
    info!(path = ?path, rows = rows.num_rows(), ?screen, "starting");

    Session::new(rows, screen, options).run(&mut input, &mut out)?;
    raw.restore()?;
    Ok(())
}

fn keys() -> kilo_editor::Result<()> {
    let mut raw = RawMode::enable(Options::default().read_timeout_ds)?;
    session::inspect_keys(&mut TtyReader, &mut TtyWriter)?;
    raw.restore()?;
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let command = parse_args(env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("kilo: {e}\n\n{USAGE}");
        process::exit(1);
    });

    let result = match command {
        Command::Help => {
            println!("{USAGE}");
            return;
        }
        Command::Version => {
            println!("kilo {VERSION}");
            return;
        }
        Command::Keys => {
            init_logging();
            keys()
        }
        Command::View(path) => {
            init_logging();
            view(path.as_deref())
        }
    };

    // The raw mode guard has been dropped by now, restoring the terminal.
    if let Err(e) = result {
        session::clear_screen(&mut TtyWriter);
        error!("{e}");
        eprintln!("kilo: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
