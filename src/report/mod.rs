//! Report renderers for enumerated dependencies.
//!
//! - [`terminal`] — colored table with a summary line; respects `--verbose` / `--quiet`.
//!
//! JSON output is a plain `serde_json` dump of the records and lives in `main`.

pub mod terminal;
