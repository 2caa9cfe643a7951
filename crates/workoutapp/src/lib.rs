//! # Workoutapp Architecture
//!
//! Workoutapp is the core library of a local-first workout log. It owns the
//! canonical workout collection, keeps it durable on disk and merges in
//! sessions recorded by a health-data platform. It contains no UI code: the
//! `workout` CLI (and any other client) renders what this crate computes.
//!
//! ## Layers
//!
//! ```text
//! client (CLI, UI)
//!   │  reads snapshots, subscribes, calls mutations
//!   ▼
//! WorkoutStore ◄──── ImportReconciler ◄── ActivityProvider + AuthorizationSource
//!   │  debounced save                         │ high-water mark
//!   ▼                                         ▼
//! Persistence<B> ─────────────────────────────┘
//!   │
//!   ▼
//! StorageBackend (FsBackend | MemBackend)
//! ```
//!
//! - [`model`]: plain value types.
//! - [`store`]: key-value backend, persistence gateway and the actor-backed
//!   [`store::WorkoutStore`], the only owner of the collection.
//! - [`import`]: the once-per-process health import and its capabilities.
//! - [`stats`], [`history`], [`index`]: pure views over a snapshot.
//! - [`live`], [`exercises`]: building workouts and the exercise catalog.
//! - [`config`]: layered settings.
//!
//! ## Failure Policy
//!
//! Loading, saving and importing never surface errors to the user: each logs
//! through `tracing` and degrades to "state unchanged". Everything else returns
//! [`error::Result`].

pub mod config;
pub mod error;
pub mod exercises;
pub mod history;
pub mod import;
pub mod index;
pub mod live;
pub mod model;
pub mod stats;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use error::{Result, WorkoutError};
pub use model::{Exercise, Workout, WorkoutCategory};
