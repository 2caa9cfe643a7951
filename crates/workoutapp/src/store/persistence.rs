use super::backend::StorageBackend;
use crate::error::Result;
use crate::model::Workout;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

pub const WORKOUTS_KEY: &str = "saved_workouts";
pub const IMPORT_MARK_KEY: &str = "last_health_import";
pub const EXERCISES_KEY: &str = "custom_exercises";

/// Loads and saves the whole workout collection.
///
/// Both operations are infallible by contract: a failed load reads as an empty
/// collection and a failed save is logged and dropped. The in-memory store stays
/// authoritative until the next successful save.
pub trait WorkoutPersistence: Send + Sync {
    fn load_workouts(&self) -> Vec<Workout>;

    fn save_workouts(&self, workouts: &[Workout]);
}

/// Durable high-water mark of the last completed health import.
pub trait ImportMarkStore: Send + Sync {
    /// `None` means "never imported".
    fn load_mark(&self) -> Option<DateTime<Utc>>;

    fn save_mark(&self, at: DateTime<Utc>) -> Result<()>;
}

impl<T: WorkoutPersistence + ?Sized> WorkoutPersistence for Arc<T> {
    fn load_workouts(&self) -> Vec<Workout> {
        (**self).load_workouts()
    }

    fn save_workouts(&self, workouts: &[Workout]) {
        (**self).save_workouts(workouts)
    }
}

impl<T: ImportMarkStore + ?Sized> ImportMarkStore for Arc<T> {
    fn load_mark(&self) -> Option<DateTime<Utc>> {
        (**self).load_mark()
    }

    fn save_mark(&self, at: DateTime<Utc>) -> Result<()> {
        (**self).save_mark(at)
    }
}

/// JSON codec and failure policy on top of a [`StorageBackend`].
pub struct Persistence<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> Persistence<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fallible load. A missing blob is an empty collection, not an error.
    pub fn try_load_workouts(&self) -> Result<Vec<Workout>> {
        match self.backend.get(WORKOUTS_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn try_save_workouts(&self, workouts: &[Workout]) -> Result<()> {
        let bytes = serde_json::to_vec(workouts)?;
        self.backend.set(WORKOUTS_KEY, &bytes)
    }

    pub fn load_exercise_names(&self) -> Vec<String> {
        let loaded = self
            .backend
            .get(EXERCISES_KEY)
            .and_then(|bytes| match bytes {
                Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
                None => Ok(Vec::new()),
            });
        loaded.unwrap_or_else(|e| {
            warn!(error = %e, "failed to load custom exercises");
            Vec::new()
        })
    }

    pub fn save_exercise_names(&self, names: &[String]) -> Result<()> {
        let bytes = serde_json::to_vec(names)?;
        self.backend.set(EXERCISES_KEY, &bytes)
    }
}

impl<B: StorageBackend> WorkoutPersistence for Persistence<B> {
    fn load_workouts(&self) -> Vec<Workout> {
        match self.try_load_workouts() {
            Ok(workouts) => {
                debug!(count = workouts.len(), "loaded workouts");
                workouts
            }
            Err(e) => {
                warn!(error = %e, "failed to load workouts, starting empty");
                Vec::new()
            }
        }
    }

    fn save_workouts(&self, workouts: &[Workout]) {
        match self.try_save_workouts(workouts) {
            Ok(()) => debug!(count = workouts.len(), "saved workouts"),
            Err(e) => warn!(error = %e, count = workouts.len(), "failed to save workouts"),
        }
    }
}

impl<B: StorageBackend> ImportMarkStore for Persistence<B> {
    fn load_mark(&self) -> Option<DateTime<Utc>> {
        let bytes = match self.backend.get(IMPORT_MARK_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read import mark");
                return None;
            }
        };
        let seconds: f64 = match serde_json::from_slice(&bytes) {
            Ok(seconds) => seconds,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable import mark");
                return None;
            }
        };
        epoch_seconds_to_datetime(seconds)
    }

    fn save_mark(&self, at: DateTime<Utc>) -> Result<()> {
        let seconds = at.timestamp_micros() as f64 / 1_000_000.0;
        let bytes = serde_json::to_vec(&seconds)?;
        self.backend.set(IMPORT_MARK_KEY, &bytes)
    }
}

/// Zero, negative and non-finite values mean "never imported".
fn epoch_seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    DateTime::from_timestamp_micros((seconds * 1_000_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, WorkoutCategory};
    use crate::store::mem_backend::MemBackend;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn make_persistence() -> Persistence<MemBackend> {
        Persistence::new(MemBackend::new())
    }

    fn sample_workouts() -> Vec<Workout> {
        let day = Utc.with_ymd_and_hms(2025, 6, 24, 7, 30, 15).unwrap();
        vec![
            Workout::new(
                day,
                "Legs",
                WorkoutCategory::Strength,
                vec![
                    Exercise::new("Squat", 5, 5, 102.5),
                    Exercise::new("Lunges", 3, 12, 0.0),
                ],
                "deep squats\nno pain",
            ),
            Workout::new(
                day + Duration::milliseconds(1_234),
                "",
                WorkoutCategory::Other,
                vec![],
                "",
            ),
            Workout::with_id(
                Uuid::new_v4(),
                day - Duration::days(40),
                "Evening swim",
                WorkoutCategory::Swimming,
                vec![Exercise::new("Crawl", 1, 1, 0.1 + 0.2)],
                "Calories: 412, Duration: 45 min",
            ),
        ]
    }

    // --- Round Trip Tests ---

    #[test]
    fn test_save_then_load_is_identity() {
        let persistence = make_persistence();
        let workouts = sample_workouts();

        persistence.save_workouts(&workouts);
        assert_eq!(persistence.load_workouts(), workouts);
    }

    #[test]
    fn test_empty_collection_round_trips() {
        let persistence = make_persistence();
        persistence.save_workouts(&[]);
        assert_eq!(persistence.backend().get(WORKOUTS_KEY).unwrap(), Some(b"[]".to_vec()));
        assert!(persistence.load_workouts().is_empty());
    }

    #[test]
    fn test_save_overwrites_previous_state() {
        let persistence = make_persistence();
        let workouts = sample_workouts();
        persistence.save_workouts(&workouts);
        persistence.save_workouts(&workouts[..1]);

        assert_eq!(persistence.load_workouts(), workouts[..1].to_vec());
    }

    // --- Failure Policy Tests ---

    #[test]
    fn test_missing_blob_loads_empty() {
        let persistence = make_persistence();
        assert!(persistence.load_workouts().is_empty());
        assert!(persistence.try_load_workouts().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let persistence = make_persistence();
        persistence.backend().set(WORKOUTS_KEY, b"{not json").unwrap();

        assert!(persistence.try_load_workouts().is_err());
        assert!(persistence.load_workouts().is_empty());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let persistence = make_persistence();
        let workouts = sample_workouts();
        persistence.save_workouts(&workouts);

        persistence.backend().set_simulate_write_error(true);
        persistence.save_workouts(&[]);
        assert!(persistence.try_save_workouts(&[]).is_err());

        // previous state is untouched
        assert_eq!(persistence.load_workouts(), workouts);
    }

    #[test]
    fn test_reads_legacy_documents() {
        let persistence = make_persistence();
        let id = Uuid::new_v4();
        let doc = format!(
            r#"[{{"id":"{}","date":"2025-06-29T10:00:00Z","type":"Løpetur","category":"Løping","exercises":[],"notes":""}}]"#,
            id
        );
        persistence.backend().set(WORKOUTS_KEY, doc.as_bytes()).unwrap();

        let loaded = persistence.load_workouts();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), id);
        assert_eq!(loaded[0].category, WorkoutCategory::Running);
    }

    // --- Import Mark Tests ---

    #[test]
    fn test_mark_absent_by_default() {
        assert_eq!(make_persistence().load_mark(), None);
    }

    #[test]
    fn test_mark_round_trips_with_subsecond_precision() {
        let persistence = make_persistence();
        let at = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap() + Duration::milliseconds(250);

        persistence.save_mark(at).unwrap();
        assert_eq!(persistence.load_mark(), Some(at));
    }

    #[test]
    fn test_zero_mark_means_never_imported() {
        let persistence = make_persistence();
        persistence.backend().set(IMPORT_MARK_KEY, b"0").unwrap();
        assert_eq!(persistence.load_mark(), None);

        persistence.backend().set(IMPORT_MARK_KEY, b"garbage").unwrap();
        assert_eq!(persistence.load_mark(), None);
    }

    #[test]
    fn test_mark_is_stored_as_epoch_seconds() {
        let persistence = make_persistence();
        let at = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        persistence.save_mark(at).unwrap();

        let raw = persistence.backend().get(IMPORT_MARK_KEY).unwrap().unwrap();
        let seconds: f64 = serde_json::from_slice(&raw).unwrap();
        assert_eq!(seconds, at.timestamp() as f64);
    }

    // --- Exercise Catalog Storage ---

    #[test]
    fn test_exercise_names_round_trip() {
        let persistence = make_persistence();
        assert!(persistence.load_exercise_names().is_empty());

        let names = vec!["Bench press".to_string(), "Pull-up".to_string()];
        persistence.save_exercise_names(&names).unwrap();
        assert_eq!(persistence.load_exercise_names(), names);
    }
}
