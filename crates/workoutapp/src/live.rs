//! Building workouts from user input.
//!
//! [`WorkoutDraft`] is the manual-entry form; [`LiveSession`] tracks a workout
//! while it happens and turns into a draft dated at the session start.
//! Time is always passed in, never read from the clock.

use crate::error::{Result, WorkoutError};
use crate::model::{Exercise, Workout, WorkoutCategory};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    pub date: DateTime<Utc>,
    pub workout_type: String,
    pub category: WorkoutCategory,
    pub exercises: Vec<Exercise>,
    pub notes: String,
}

impl WorkoutDraft {
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date,
            workout_type: String::new(),
            category: WorkoutCategory::Strength,
            exercises: Vec::new(),
            notes: String::new(),
        }
    }

    /// False while the type is blank.
    pub fn can_save(&self) -> bool {
        !self.workout_type.trim().is_empty()
    }

    /// Add one set to the exercise at `index`. Returns false if there is none.
    pub fn add_set(&mut self, index: usize) -> bool {
        match self.exercises.get_mut(index) {
            Some(exercise) => {
                *exercise = exercise.with_sets(exercise.sets.saturating_add(1));
                true
            }
            None => false,
        }
    }

    /// Trimmed type and notes; a blank type is refused.
    pub fn build(&self) -> Result<Workout> {
        if !self.can_save() {
            return Err(WorkoutError::EmptyWorkoutType);
        }
        Ok(Workout::new(
            self.date,
            self.workout_type.trim(),
            self.category,
            self.exercises.clone(),
            self.notes.trim(),
        ))
    }
}

/// A workout in progress. Paused time does not count towards `elapsed`.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSession {
    pub draft: WorkoutDraft,
    paused_at: Option<DateTime<Utc>>,
    total_paused: Duration,
}

impl LiveSession {
    pub fn start(
        workout_type: impl Into<String>,
        category: WorkoutCategory,
        now: DateTime<Utc>,
    ) -> Self {
        let mut draft = WorkoutDraft::new(now);
        draft.workout_type = workout_type.into();
        draft.category = category;
        Self {
            draft,
            paused_at: None,
            total_paused: Duration::zero(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.draft.date
    }

    pub fn is_running(&self) -> bool {
        self.paused_at.is_none()
    }

    /// No-op when already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// No-op when running.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if let Some(began) = self.paused_at.take() {
            self.total_paused += (now - began).max(Duration::zero());
        }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let current_pause = self
            .paused_at
            .map_or(Duration::zero(), |began| now - began);
        (now - self.started_at() - self.total_paused - current_pause).max(Duration::zero())
    }

    pub fn finish(self) -> Result<Workout> {
        self.draft.build()
    }
}
