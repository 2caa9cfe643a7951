//! # Domain Model
//!
//! Plain value types: [`Exercise`], [`Workout`] and [`WorkoutCategory`].
//! Equality compares every field, including ids and nested exercises.
//!
//! A workout's `id` is fixed at construction. Records created locally get a fresh
//! v4 UUID; imported records reuse the provider's stable identifier (see
//! [`crate::import`]), which is what makes re-imports deduplicate cleanly.
//!
//! ## Serialized Shape
//!
//! ```text
//! {
//!   "id": "3f0c…",                 // hyphenated UUID
//!   "date": "2025-06-24T18:00:00Z", // RFC 3339, UTC
//!   "type": "Push day",
//!   "category": "strength",
//!   "exercises": [{ "id", "name", "sets", "reps", "weight" }],
//!   "notes": ""
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    id: Uuid,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
}

impl Exercise {
    pub fn new(name: impl Into<String>, sets: u32, reps: u32, weight: f64) -> Self {
        Self::with_id(Uuid::new_v4(), name, sets, reps, weight)
    }

    pub fn with_id(id: Uuid, name: impl Into<String>, sets: u32, reps: u32, weight: f64) -> Self {
        Self {
            id,
            name: name.into(),
            sets,
            reps,
            weight,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Same exercise (same id) with `sets` replaced.
    pub fn with_sets(&self, sets: u32) -> Self {
        Self {
            sets,
            ..self.clone()
        }
    }

    /// Total reps across all sets.
    pub fn total_reps(&self) -> u32 {
        self.sets.saturating_mul(self.reps)
    }

    /// Lifted load: sets × reps × weight.
    pub fn volume(&self) -> f64 {
        f64::from(self.total_reps()) * self.weight
    }
}

/// Presentation grouping for workouts. Carries no business rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutCategory {
    // Aliases accept the raw values written by the first releases.
    #[serde(alias = "Styrke")]
    Strength,
    #[serde(alias = "Kondisjon")]
    Cardio,
    #[serde(alias = "Yoga")]
    Yoga,
    #[serde(alias = "Gange")]
    Walking,
    #[serde(alias = "Løping")]
    Running,
    #[serde(alias = "Sykling")]
    Cycling,
    #[serde(alias = "Svømming")]
    Swimming,
    #[serde(alias = "Annet")]
    Other,
}

impl WorkoutCategory {
    pub const ALL: [WorkoutCategory; 8] = [
        WorkoutCategory::Strength,
        WorkoutCategory::Cardio,
        WorkoutCategory::Yoga,
        WorkoutCategory::Walking,
        WorkoutCategory::Running,
        WorkoutCategory::Cycling,
        WorkoutCategory::Swimming,
        WorkoutCategory::Other,
    ];

    /// Stable serialization tag.
    pub fn tag(&self) -> &'static str {
        match self {
            WorkoutCategory::Strength => "strength",
            WorkoutCategory::Cardio => "cardio",
            WorkoutCategory::Yoga => "yoga",
            WorkoutCategory::Walking => "walking",
            WorkoutCategory::Running => "running",
            WorkoutCategory::Cycling => "cycling",
            WorkoutCategory::Swimming => "swimming",
            WorkoutCategory::Other => "other",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutCategory::Strength => "Strength",
            WorkoutCategory::Cardio => "Cardio",
            WorkoutCategory::Yoga => "Yoga",
            WorkoutCategory::Walking => "Walking",
            WorkoutCategory::Running => "Running",
            WorkoutCategory::Cycling => "Cycling",
            WorkoutCategory::Swimming => "Swimming",
            WorkoutCategory::Other => "Other",
        }
    }
}

impl fmt::Display for WorkoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WorkoutCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        WorkoutCategory::ALL
            .into_iter()
            .find(|c| c.tag() == wanted || c.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown workout category: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub workout_type: String,
    pub category: WorkoutCategory,
    pub exercises: Vec<Exercise>,
    pub notes: String,
}

impl Workout {
    pub fn new(
        date: DateTime<Utc>,
        workout_type: impl Into<String>,
        category: WorkoutCategory,
        exercises: Vec<Exercise>,
        notes: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), date, workout_type, category, exercises, notes)
    }

    /// Builds a workout around an existing identity (imports, edits, fixtures).
    pub fn with_id(
        id: Uuid,
        date: DateTime<Utc>,
        workout_type: impl Into<String>,
        category: WorkoutCategory,
        exercises: Vec<Exercise>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id,
            date,
            workout_type: workout_type.into(),
            category,
            exercises,
            notes: notes.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }

    pub fn total_reps(&self) -> u32 {
        self.exercises.iter().map(Exercise::total_reps).sum()
    }

    pub fn volume(&self) -> f64 {
        self.exercises.iter().map(Exercise::volume).sum()
    }
}
