//! # CLI Behavior
//!
//! This is **one possible UI client** for workoutapp, not the application
//! itself. The CLI is the only place that knows about terminal I/O, exit codes
//! and output formatting.
//!
//! ## Naked Execution (`workout`)
//!
//! Running `workout` with no arguments defaults to `workout list`.
//!
//! ## Indexes
//!
//! `list` numbers workouts newest first. The numbers come from the canonical
//! ordering of the whole collection, so `workout delete 2` removes the workout
//! that `list` and `list --by-week` both show as `2`.
//!
//! ## Import
//!
//! `workout import` reads a health-data export (`--from`, or `health_export` in
//! the config). Only activities newer than the last successful import are
//! considered, and activities already in the log are skipped.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap and argument value parsers
//! - `commands`: context wiring and per-command handlers
//! - `render`: output formatting (lines, details, calendar, stats)

mod commands;
mod render;
pub mod setup;

pub use commands::run;
