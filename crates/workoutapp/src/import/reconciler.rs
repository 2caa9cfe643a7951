use super::mapping::{map_activity, resolve_energy};
use super::{
    ActivityProvider, AuthorizationSource, AuthorizationStatus, ExternalActivity, ProviderError,
};
use crate::error::{Result, WorkoutError};
use crate::model::Workout;
use crate::store::{ImportMarkStore, WorkoutStore};
use chrono::Utc;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSettings {
    /// Maximum number of activities requested per attempt.
    pub fetch_limit: usize,
    pub fetch_timeout: Duration,
    /// Bound on each energy query. Expiry reads as 0 kcal.
    pub metric_timeout: Duration,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            fetch_limit: 100,
            fetch_timeout: Duration::from_secs(30),
            metric_timeout: Duration::from_secs(10),
        }
    }
}

/// How an import attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// An attempt already ran (or is running) in this process.
    AlreadyAttempted,
    NotAuthorized,
    /// Nothing after the mark, or everything was already in the store.
    NothingNew,
    Imported { count: usize },
    Failed { reason: String },
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportOutcome::AlreadyAttempted => f.write_str("import already attempted"),
            ImportOutcome::NotAuthorized => f.write_str("health data access not authorized"),
            ImportOutcome::NothingNew => f.write_str("no new workouts"),
            ImportOutcome::Imported { count } => write!(f, "imported {} workout(s)", count),
            ImportOutcome::Failed { reason } => write!(f, "import failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportPhase {
    Idle,
    Running,
    Done,
}

/// Merges health-platform activities into the store, once per process.
pub struct ImportReconciler {
    store: WorkoutStore,
    provider: Arc<dyn ActivityProvider>,
    authorization: Arc<dyn AuthorizationSource>,
    marks: Arc<dyn ImportMarkStore>,
    settings: ImportSettings,
    phase: Mutex<ImportPhase>,
}

impl ImportReconciler {
    pub fn new(
        store: WorkoutStore,
        provider: Arc<dyn ActivityProvider>,
        authorization: Arc<dyn AuthorizationSource>,
        marks: Arc<dyn ImportMarkStore>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            store,
            provider,
            authorization,
            marks,
            settings,
            phase: Mutex::new(ImportPhase::Idle),
        }
    }

    /// Run the import if it has not run yet in this process.
    ///
    /// Never fails: errors are logged and reported as [`ImportOutcome::Failed`],
    /// with the high-water mark left where it was.
    pub async fn import_if_needed(&self) -> ImportOutcome {
        if !self.begin() {
            debug!("import already attempted this session");
            return ImportOutcome::AlreadyAttempted;
        }

        let outcome = match self.run().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "health import failed, mark not advanced");
                ImportOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.set_phase(ImportPhase::Done);
        info!(%outcome, "health import finished");
        outcome
    }

    /// Whether an attempt has already started in this process.
    pub fn attempted(&self) -> bool {
        self.phase() != ImportPhase::Idle
    }

    fn begin(&self) -> bool {
        let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        if *phase != ImportPhase::Idle {
            return false;
        }
        *phase = ImportPhase::Running;
        true
    }

    fn phase(&self) -> ImportPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, next: ImportPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    async fn run(&self) -> Result<ImportOutcome> {
        let status = self.authorization.authorization_status();
        if status != AuthorizationStatus::Authorized {
            debug!(?status, "health data not authorized, skipping import");
            return Ok(ImportOutcome::NotAuthorized);
        }

        let fetched = tokio::time::timeout(
            self.settings.fetch_timeout,
            self.provider.fetch_activities(self.settings.fetch_limit),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.settings.fetch_timeout))??;

        let mark = self.marks.load_mark();
        let candidates: Vec<_> = fetched
            .into_iter()
            .filter(|activity| mark.map_or(true, |mark| activity.start > mark))
            .collect();
        debug!(?mark, candidates = candidates.len(), "filtered fetched activities");
        if candidates.is_empty() {
            return Ok(ImportOutcome::NothingNew);
        }

        let mapped = self.map_all(candidates).await?;
        // Dedup against stored ids runs on the store task together with the insert.
        let inserted = self.store.add_new(mapped).await?;
        if inserted.is_empty() {
            return Ok(ImportOutcome::NothingNew);
        }
        let count = inserted.len();

        // Mark is "now", not the newest record: anything recorded during the
        // attempt lands in the next window.
        if let Err(e) = self.marks.save_mark(Utc::now()) {
            warn!(error = %e, "failed to advance import mark");
        }
        Ok(ImportOutcome::Imported { count })
    }

    /// One task per activity; results are ordered by (date, id) afterwards.
    async fn map_all(&self, candidates: Vec<ExternalActivity>) -> Result<Vec<Workout>> {
        let mut tasks = JoinSet::new();
        for activity in candidates {
            let provider = Arc::clone(&self.provider);
            let timeout = self.settings.metric_timeout;
            tasks.spawn(async move {
                let kcal = resolve_energy(provider.as_ref(), &activity, timeout).await;
                map_activity(&activity, kcal)
            });
        }

        let mut mapped = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let workout = joined.map_err(|e| WorkoutError::Task(e.to_string()))?;
            mapped.push(workout);
        }
        mapped.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id().cmp(&b.id())));
        Ok(mapped)
    }
}
