//! # Workout CLI Architecture
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only starts the runtime, invokes `cli::run()` and handles process
//! termination.
//!
//! ## Workspace Structure
//!
//! - `crates/workoutapp/`: UI-agnostic library (store, persistence, import, views)
//! - `crates/workout/`: this CLI, one possible client of the library
//!
//! ## Layering
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/workout/src/cli/)                     │
//! │  - clap argument parsing (setup.rs)                      │
//! │  - context wiring + per-command handlers (commands.rs)   │
//! │  - terminal output (render.rs)                           │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Library (crates/workoutapp)                             │
//! │  - WorkoutStore actor, Persistence, ImportReconciler     │
//! │  - stats / history / index / live / exercises            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every invocation opens the store, runs one command and shuts the store
//! down, which flushes the debounced save before the process exits.

mod cli;
mod logging;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
