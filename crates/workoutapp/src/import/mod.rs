//! # Health Data Import
//!
//! Pulls activities recorded by the platform health service and merges them into
//! the [`crate::store::WorkoutStore`] without duplicates.
//!
//! ## Capabilities
//!
//! The platform is reached through two injected traits:
//! - [`ActivityProvider`]: async fetch of recent activities plus an auxiliary
//!   energy query over a time window.
//! - [`AuthorizationSource`]: synchronous permission check for workout data.
//!
//! [`export_file::ExportFileProvider`] implements both on top of a health-data
//! export file; `test_utils` has in-memory doubles.
//!
//! ## Reconciliation
//!
//! [`ImportReconciler::import_if_needed`] runs at most once per reconciler
//! (one per process):
//!
//! 1. **Gate**: the first call flips `Idle → Running`; every later call is a no-op.
//! 2. **Authorization**: not authorized ⇒ stop (the gate stays closed).
//! 3. **Fetch** up to `limit` activities (bounded by a timeout).
//! 4. **Window**: keep activities starting strictly after the high-water mark
//!    (all of them if there is no mark).
//! 5. **Map** candidates concurrently, one task each (see [`mapping`]).
//! 6. **Dedup** by id against the store snapshot and within the batch.
//! 7. **Merge** with a single `add_all`, then advance the mark to "now".
//!
//! Any failure after the authorization check leaves the mark untouched, so the
//! next launch retries the same window. Nothing propagates to the caller: the
//! attempt ends with an [`ImportOutcome`] that may be ignored.
//!
//! ## Identity
//!
//! Imported workouts reuse the provider's stable activity id verbatim. This is
//! what lets repeated imports of the same window deduplicate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub mod export_file;
pub mod mapping;
pub mod reconciler;

pub use reconciler::{ImportOutcome, ImportReconciler, ImportSettings};

/// One activity as reported by the health platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalActivity {
    /// Stable identifier assigned by the platform.
    pub id: Uuid,
    /// Platform activity tag, e.g. `running` or `traditional_strength_training`.
    pub activity_type: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("health data unavailable: {0}")]
    Unavailable(String),

    #[error("health query timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed health data: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of external activity records.
#[async_trait]
pub trait ActivityProvider: Send + Sync {
    /// Most recent activities, newest first, at most `limit` of them.
    async fn fetch_activities(&self, limit: usize) -> Result<Vec<ExternalActivity>, ProviderError>;

    /// Cumulative active energy (kcal) recorded in `[start, end)`.
    async fn energy_burned(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, ProviderError>;
}

/// Permission state for reading workout data.
pub trait AuthorizationSource: Send + Sync {
    fn authorization_status(&self) -> AuthorizationStatus;
}
