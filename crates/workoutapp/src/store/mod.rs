//! # Storage Layer
//!
//! The workout collection lives in exactly one place: the [`WorkoutStore`].
//! Everything else (views, the health import, the CLI) reads its snapshots and
//! sends it mutations.
//!
//! ## Layers
//!
//! ```text
//! WorkoutStore  (workout_store.rs)  owns Vec<Workout>, debounces saves, notifies observers
//!      │
//!      ▼
//! Persistence   (persistence.rs)    JSON codec + failure policy (load → empty, save → log)
//!      │
//!      ▼
//! StorageBackend (backend.rs)       keyed blobs: FsBackend (production), MemBackend (tests)
//! ```
//!
//! ## Execution Model
//!
//! The store is an actor: a single tokio task owns the collection and applies
//! commands one at a time. [`WorkoutStore`] handles are cheap clones that send
//! commands and await the acknowledgement, so once `add(..).await` returns the
//! mutation is visible through `current()` and every observer has seen it.
//!
//! ## Debounced Saves
//!
//! Each mutation (re)arms a single save deadline (`save_delay`, 500ms by default).
//! When the deadline passes without further mutations the latest collection is
//! written. Intermediate states are never written individually. The initial
//! load does not arm the deadline. `flush`, `shutdown` and dropping the last
//! handle write any pending state immediately.
//!
//! ## Storage Layout
//!
//! For `FsBackend`, one file per key:
//!
//! ```text
//! <data dir>/
//! ├── saved_workouts.json       # JSON array of workouts
//! ├── last_health_import.json   # epoch seconds of the last completed import
//! └── custom_exercises.json     # user-defined exercise names
//! ```

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod persistence;
pub mod workout_store;

pub use backend::StorageBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use persistence::{ImportMarkStore, Persistence, WorkoutPersistence};
pub use workout_store::{Subscription, WorkoutStore, DEFAULT_SAVE_DELAY};
