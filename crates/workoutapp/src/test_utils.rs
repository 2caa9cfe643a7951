//! In-memory doubles for the persistence and health-platform capabilities.
//!
//! Enabled for unit tests and, through the `test_utils` feature, for
//! integration tests and downstream crates.

use crate::error::{Result, WorkoutError};
use crate::import::{
    ActivityProvider, AuthorizationSource, AuthorizationStatus, ExternalActivity, ProviderError,
};
use crate::model::{Exercise, Workout, WorkoutCategory};
use crate::store::{ImportMarkStore, WorkoutPersistence};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Fixed reference point for fixtures: 2025-06-01 10:00 UTC.
pub fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A strength workout `days` days after [`base_date`].
pub fn workout_at(days: i64) -> Workout {
    Workout::new(
        base_date() + ChronoDuration::days(days),
        format!("Workout {}", days),
        WorkoutCategory::Strength,
        vec![Exercise::new("Squat", 3, 5, 100.0)],
        "",
    )
}

/// A 30 minute activity with a fresh id.
pub fn activity_at(start: DateTime<Utc>, tag: &str) -> ExternalActivity {
    ExternalActivity {
        id: Uuid::new_v4(),
        activity_type: tag.to_string(),
        start,
        end: start + ChronoDuration::minutes(30),
    }
}

// --- Persistence ---

/// Serves a fixed initial collection and records every save.
#[derive(Default)]
pub struct RecordingPersistence {
    initial: Vec<Workout>,
    saves: Mutex<Vec<Vec<Workout>>>,
}

impl RecordingPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workouts(initial: Vec<Workout>) -> Self {
        Self {
            initial,
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn save_count(&self) -> usize {
        lock(&self.saves).len()
    }

    pub fn last_saved(&self) -> Option<Vec<Workout>> {
        lock(&self.saves).last().cloned()
    }
}

impl WorkoutPersistence for RecordingPersistence {
    fn load_workouts(&self) -> Vec<Workout> {
        self.initial.clone()
    }

    fn save_workouts(&self, workouts: &[Workout]) {
        lock(&self.saves).push(workouts.to_vec());
    }
}

#[derive(Default)]
pub struct MemoryMarks {
    mark: Mutex<Option<DateTime<Utc>>>,
    simulate_write_error: AtomicBool,
}

impl MemoryMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mark(at: DateTime<Utc>) -> Self {
        Self {
            mark: Mutex::new(Some(at)),
            simulate_write_error: AtomicBool::new(false),
        }
    }

    pub fn current(&self) -> Option<DateTime<Utc>> {
        *lock(&self.mark)
    }

    pub fn set_simulate_write_error(&self, fail: bool) {
        self.simulate_write_error.store(fail, Ordering::SeqCst);
    }
}

impl ImportMarkStore for MemoryMarks {
    fn load_mark(&self) -> Option<DateTime<Utc>> {
        self.current()
    }

    fn save_mark(&self, at: DateTime<Utc>) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(WorkoutError::Store("simulated mark write error".to_string()));
        }
        *lock(&self.mark) = Some(at);
        Ok(())
    }
}

// --- Health Platform ---

/// Scripted activity provider.
pub struct FakeProvider {
    activities: Mutex<Vec<ExternalActivity>>,
    energy_kcal: f64,
    energy_fails: bool,
    energy_delay: Option<Duration>,
    fetch_fails: AtomicBool,
    fetches: AtomicUsize,
    energy_queries: AtomicUsize,
}

impl FakeProvider {
    pub fn new(activities: Vec<ExternalActivity>) -> Self {
        Self {
            activities: Mutex::new(activities),
            energy_kcal: 0.0,
            energy_fails: false,
            energy_delay: None,
            fetch_fails: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            energy_queries: AtomicUsize::new(0),
        }
    }

    /// Every energy query answers `kcal`.
    pub fn with_energy(mut self, kcal: f64) -> Self {
        self.energy_kcal = kcal;
        self
    }

    pub fn with_failing_energy(mut self) -> Self {
        self.energy_fails = true;
        self
    }

    pub fn with_energy_delay(mut self, delay: Duration) -> Self {
        self.energy_delay = Some(delay);
        self
    }

    pub fn set_activities(&self, activities: Vec<ExternalActivity>) {
        *lock(&self.activities) = activities;
    }

    pub fn set_fetch_error(&self, fail: bool) {
        self.fetch_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn energy_query_count(&self) -> usize {
        self.energy_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivityProvider for FakeProvider {
    async fn fetch_activities(&self, limit: usize) -> std::result::Result<Vec<ExternalActivity>, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fetch_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("simulated fetch error".to_string()));
        }
        let mut activities = lock(&self.activities).clone();
        activities.sort_by(|a, b| b.start.cmp(&a.start));
        activities.truncate(limit);
        Ok(activities)
    }

    async fn energy_burned(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> std::result::Result<f64, ProviderError> {
        self.energy_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.energy_delay {
            tokio::time::sleep(delay).await;
        }
        if self.energy_fails {
            return Err(ProviderError::Unavailable("simulated energy error".to_string()));
        }
        Ok(self.energy_kcal)
    }
}

pub struct FixedAuthorization(pub AuthorizationStatus);

impl AuthorizationSource for FixedAuthorization {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.0
    }
}
