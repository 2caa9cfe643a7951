//! # Statistics
//!
//! Aggregates for the dashboard. Everything here is a pure function of a
//! workout snapshot, a reference day and a time zone: "today" and day
//! boundaries are the caller's, so results are reproducible in tests.
//!
//! Day-window functions count `days` calendar days ending with (and including)
//! `today`, and return them oldest first.

use crate::model::Workout;
use chrono::{Datelike, Days, IsoWeek, NaiveDate, TimeZone};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub workouts: usize,
    pub sets: u64,
    /// Sets × reps, summed.
    pub reps: u64,
    /// Sets × reps × weight, summed.
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCount {
    pub week: IsoWeek,
    pub count: usize,
}

impl WeekCount {
    pub fn label(&self) -> String {
        format!("Week {}", self.week.week())
    }
}

/// Calendar day of the workout in `tz`.
pub fn local_day<Tz: TimeZone>(workout: &Workout, tz: &Tz) -> NaiveDate {
    workout.date.with_timezone(tz).date_naive()
}

pub fn totals(workouts: &[Workout]) -> Totals {
    workouts.iter().fold(
        Totals {
            workouts: workouts.len(),
            ..Totals::default()
        },
        |mut acc, w| {
            for e in &w.exercises {
                acc.sets += u64::from(e.sets);
                acc.reps += u64::from(e.sets) * u64::from(e.reps);
            }
            acc.volume += w.volume();
            acc
        },
    )
}

fn window(today: NaiveDate, days: usize) -> impl Iterator<Item = NaiveDate> {
    (0..days as u64)
        .rev()
        .filter_map(move |offset| today.checked_sub_days(Days::new(offset)))
}

pub fn daily_counts<Tz: TimeZone>(
    workouts: &[Workout],
    today: NaiveDate,
    days: usize,
    tz: &Tz,
) -> Vec<DayCount> {
    let local: Vec<NaiveDate> = workouts.iter().map(|w| local_day(w, tz)).collect();
    window(today, days)
        .map(|date| DayCount {
            date,
            count: local.iter().filter(|d| **d == date).count(),
        })
        .collect()
}

/// One entry per ISO week, `ceil(days / 7)` weeks ending with the week of `today`.
pub fn weekly_counts<Tz: TimeZone>(
    workouts: &[Workout],
    today: NaiveDate,
    days: usize,
    tz: &Tz,
) -> Vec<WeekCount> {
    let weeks = days.div_ceil(7);
    let local: Vec<IsoWeek> = workouts.iter().map(|w| local_day(w, tz).iso_week()).collect();
    (0..weeks as u64)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset * 7)))
        .map(|day| {
            let week = day.iso_week();
            WeekCount {
                week,
                count: local.iter().filter(|w| **w == week).count(),
            }
        })
        .collect()
}

/// Change in workout count of the last `days` days against the `days` before.
///
/// Both periods empty ⇒ 0; previous period empty ⇒ 100.
pub fn percent_change<Tz: TimeZone>(
    workouts: &[Workout],
    today: NaiveDate,
    days: usize,
    tz: &Tz,
) -> f64 {
    let counts = daily_counts(workouts, today, days.saturating_mul(2), tz);
    let (previous, current) = counts.split_at(counts.len() / 2);
    let previous: usize = previous.iter().map(|d| d.count).sum();
    let current: usize = current.iter().map(|d| d.count).sum();

    match (previous, current) {
        (0, 0) => 0.0,
        (0, _) => 100.0,
        (p, c) => (c as f64 - p as f64) / p as f64 * 100.0,
    }
}

/// Up to `limit` workouts, newest first.
pub fn recent(workouts: &[Workout], limit: usize) -> Vec<Workout> {
    let mut sorted = workouts.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}
