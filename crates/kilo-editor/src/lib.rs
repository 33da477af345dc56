//! # kilo-editor — Editor core for kilo
//!
//! The state and logic behind the viewer, independent of any real terminal:
//!
//! - **[`row`]** — `Row` and `RowStore`, the lines of the loaded file
//! - **[`cursor`]** — `Cursor` with clamped, line-wrapping movement
//! - **[`view`]** — `View`, the scroll offsets and screen dimensions
//! - **[`render`]** — frame composition into a single output buffer
//! - **[`options`]** — display and key settings
//! - **[`session`]** — the refresh / read / dispatch loop
//!
//! Everything here talks to the terminal through `kilo_term`'s
//! `ByteSource` and `std::io::Write`, so the whole loop runs in tests
//! against byte slices and vectors.

pub mod cursor;
pub mod error;
pub mod options;
pub mod render;
pub mod row;
pub mod session;
pub mod view;

pub use error::{Error, Result};
