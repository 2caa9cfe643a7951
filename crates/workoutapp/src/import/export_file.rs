//! Health platform backed by an exported JSON file.
//!
//! ```text
//! {
//!   "activities": [
//!     { "id": "…", "activity_type": "running",
//!       "start": "2025-06-29T07:00:00Z", "end": "2025-06-29T07:45:00Z" }
//!   ],
//!   "energy_samples": [ { "at": "2025-06-29T07:10:00Z", "kcal": 12.5 } ]
//! }
//! ```
//!
//! The file is re-read on every query, so a fresh export is picked up without
//! restarting.

use super::{
    ActivityProvider, AuthorizationSource, AuthorizationStatus, ExternalActivity, ProviderError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthExport {
    #[serde(default)]
    pub activities: Vec<ExternalActivity>,
    #[serde(default)]
    pub energy_samples: Vec<EnergySample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySample {
    pub at: DateTime<Utc>,
    pub kcal: f64,
}

pub struct ExportFileProvider {
    path: PathBuf,
}

impl ExportFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<HealthExport, ProviderError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::Unavailable(format!(
                    "no health export at {}",
                    self.path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ActivityProvider for ExportFileProvider {
    async fn fetch_activities(&self, limit: usize) -> Result<Vec<ExternalActivity>, ProviderError> {
        let mut activities = self.read().await?.activities;
        activities.sort_by(|a, b| b.start.cmp(&a.start));
        activities.truncate(limit);
        debug!(path = %self.path.display(), count = activities.len(), "read health export");
        Ok(activities)
    }

    async fn energy_burned(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, ProviderError> {
        let export = self.read().await?;
        Ok(export
            .energy_samples
            .iter()
            .filter(|sample| sample.at >= start && sample.at < end)
            .map(|sample| sample.kcal)
            .sum())
    }
}

impl AuthorizationSource for ExportFileProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        if self.path.is_file() {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::NotDetermined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 29, hour, minute, 0).unwrap()
    }

    fn write_export(dir: &TempDir, export: &HealthExport) -> PathBuf {
        let path = dir.path().join("export.json");
        std::fs::write(&path, serde_json::to_vec(export).unwrap()).unwrap();
        path
    }

    fn activity(hour: u32) -> ExternalActivity {
        ExternalActivity {
            id: Uuid::new_v4(),
            activity_type: "running".to_string(),
            start: at(hour, 0),
            end: at(hour, 0) + Duration::minutes(45),
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_newest_first_up_to_limit() {
        let dir = TempDir::new().unwrap();
        let export = HealthExport {
            activities: vec![activity(6), activity(9), activity(7)],
            energy_samples: vec![],
        };
        let provider = ExportFileProvider::new(write_export(&dir, &export));

        let fetched = provider.fetch_activities(2).await.unwrap();
        let hours: Vec<_> = fetched.iter().map(|a| a.start).collect();
        assert_eq!(hours, vec![at(9, 0), at(7, 0)]);
    }

    #[tokio::test]
    async fn test_energy_sums_samples_in_half_open_window() {
        let dir = TempDir::new().unwrap();
        let export = HealthExport {
            activities: vec![],
            energy_samples: vec![
                EnergySample { at: at(6, 59), kcal: 100.0 },
                EnergySample { at: at(7, 0), kcal: 10.0 },
                EnergySample { at: at(7, 30), kcal: 2.5 },
                EnergySample { at: at(8, 0), kcal: 100.0 },
            ],
        };
        let provider = ExportFileProvider::new(write_export(&dir, &export));

        let kcal = provider.energy_burned(at(7, 0), at(8, 0)).await.unwrap();
        assert_eq!(kcal, 12.5);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_authorized_and_unavailable() {
        let dir = TempDir::new().unwrap();
        let provider = ExportFileProvider::new(dir.path().join("missing.json"));

        assert_eq!(
            provider.authorization_status(),
            AuthorizationStatus::NotDetermined
        );
        assert!(matches!(
            provider.fetch_activities(10).await,
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, b"{\"activities\": 3}").unwrap();
        let provider = ExportFileProvider::new(path);

        assert_eq!(provider.authorization_status(), AuthorizationStatus::Authorized);
        assert!(matches!(
            provider.fetch_activities(10).await,
            Err(ProviderError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_sections_are_optional() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, b"{}").unwrap();
        let provider = ExportFileProvider::new(path);

        assert!(provider.fetch_activities(10).await.unwrap().is_empty());
        assert_eq!(provider.energy_burned(at(0, 0), at(23, 0)).await.unwrap(), 0.0);
    }
}
