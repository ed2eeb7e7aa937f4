//! API Module - User-facing surface
//!
//! - `cli` - flags, subcommands, startup loading
//! - `form` - interactive re-run-on-change form
//! - `presenter` - text/JSON rendering

pub mod cli;
pub mod form;
pub mod presenter;
