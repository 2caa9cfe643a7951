//! Conversion of platform activities into [`Workout`]s.
//!
//! [`map_activity`] is pure: the same activity and energy value always produce
//! the same workout. The only I/O is the energy lookup in [`resolve_energy`],
//! which never fails: errors and timeouts read as 0 kcal.

use super::{ActivityProvider, ExternalActivity};
use crate::model::{Workout, WorkoutCategory};
use std::time::Duration;
use tracing::debug;

/// Platform tag → (category, label). Anything not listed maps to `other`.
const ACTIVITY_TABLE: &[(&str, WorkoutCategory, &str)] = &[
    (
        "traditional_strength_training",
        WorkoutCategory::Strength,
        "Strength",
    ),
    ("running", WorkoutCategory::Running, "Running"),
    ("cycling", WorkoutCategory::Cycling, "Cycling"),
    ("walking", WorkoutCategory::Walking, "Walking"),
    ("swimming", WorkoutCategory::Swimming, "Swimming"),
    ("yoga", WorkoutCategory::Yoga, "Yoga"),
    ("mind_and_body", WorkoutCategory::Yoga, "Mind & Body"),
];

fn lookup(tag: &str) -> Option<&'static (&'static str, WorkoutCategory, &'static str)> {
    ACTIVITY_TABLE
        .iter()
        .find(|(known, _, _)| known.eq_ignore_ascii_case(tag))
}

pub fn category_for(tag: &str) -> WorkoutCategory {
    lookup(tag).map_or(WorkoutCategory::Other, |(_, category, _)| *category)
}

pub fn display_name(tag: &str) -> &'static str {
    lookup(tag).map_or("Other", |(_, _, label)| label)
}

/// Build the workout for `activity`, given the energy burned during it.
pub fn map_activity(activity: &ExternalActivity, energy_kcal: f64) -> Workout {
    let minutes = (activity.end - activity.start).num_minutes().max(0);
    let calories = if energy_kcal.is_finite() && energy_kcal > 0.0 {
        energy_kcal.trunc() as i64
    } else {
        0
    };

    Workout::with_id(
        activity.id,
        activity.start,
        display_name(&activity.activity_type),
        category_for(&activity.activity_type),
        Vec::new(),
        format!("Calories: {}, Duration: {} min", calories, minutes),
    )
}

/// Energy for the activity window, or 0 when the query fails or times out.
pub async fn resolve_energy(
    provider: &dyn ActivityProvider,
    activity: &ExternalActivity,
    timeout: Duration,
) -> f64 {
    match tokio::time::timeout(
        timeout,
        provider.energy_burned(activity.start, activity.end),
    )
    .await
    {
        Ok(Ok(kcal)) => kcal,
        Ok(Err(e)) => {
            debug!(activity = %activity.id, error = %e, "energy query failed, using 0");
            0.0
        }
        Err(_) => {
            debug!(activity = %activity.id, ?timeout, "energy query timed out, using 0");
            0.0
        }
    }
}
