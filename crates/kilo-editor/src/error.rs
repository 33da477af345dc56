//! Editor errors.
//!
//! Failing to open or read the startup file ends the session, as does any
//! terminal error bubbling up from `kilo_term`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of an editor operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be opened.
    #[error("{}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was opened but reading it failed part way.
    #[error("{}: read failed: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A terminal operation failed.
    #[error(transparent)]
    Term(#[from] kilo_term::Error),
}

/// Result alias for editor operations.
pub type Result<T> = std::result::Result<T, Error>;
