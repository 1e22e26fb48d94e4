//! Command line front end.
//!
//! `setup` holds the clap definitions, `commands` maps each subcommand onto
//! `scanlistapp::api::ScanApi` and `render` turns the returned `CmdResult`
//! into terminal output. With `--json` the `CmdResult` is printed as is.

mod commands;
mod render;
pub mod setup;

pub use commands::run;
