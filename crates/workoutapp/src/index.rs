//! # Workout Identifiers: UUID vs Display Index
//!
//! Workouts are identified by UUID, which is the right key for storage and
//! deduplication but is miserable to type. The CLI therefore shows a short
//! 1-based display index next to each workout.
//!
//! ## Canonical Ordering
//!
//! The index is derived from one canonical ordering of the whole collection,
//! never from whatever subset a command happens to show: all workouts sorted by
//! `date` descending (newest = 1). Workouts sharing a date keep their insertion
//! order. This keeps `workout delete 2` pointing at the same record that
//! `workout list` labelled `2`.
//!
//! ## Implementation
//!
//! - [`index_workouts`]: assigns canonical display indexes
//! - [`parse_index_or_range`]: parses user input like `"1-3"`
//! - [`resolve_selectors`]: maps selectors back to UUIDs

use crate::error::{Result, WorkoutError};
use crate::model::Workout;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayWorkout {
    pub index: usize,
    pub workout: Workout,
}

/// A user input selecting workouts by display index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Single(usize),
    Range(usize, usize),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Single(i) => write!(f, "{}", i),
            Selector::Range(start, end) => write!(f, "{}-{}", start, end),
        }
    }
}

/// Newest first, numbered from 1.
pub fn index_workouts(mut workouts: Vec<Workout>) -> Vec<DisplayWorkout> {
    workouts.sort_by(|a, b| b.date.cmp(&a.date));
    workouts
        .into_iter()
        .enumerate()
        .map(|(i, workout)| DisplayWorkout {
            index: i + 1,
            workout,
        })
        .collect()
}

fn parse_index(s: &str) -> std::result::Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("Invalid index: {}", s)),
        Ok(n) => Ok(n),
    }
}

/// Parses `"3"` or `"1-3"`.
pub fn parse_index_or_range(s: &str) -> std::result::Result<Selector, String> {
    match s.split_once('-') {
        Some((start, end)) => {
            let start = parse_index(start)?;
            let end = parse_index(end)?;
            if start > end {
                return Err(format!("Invalid range: {}", s));
            }
            Ok(Selector::Range(start, end))
        }
        None => parse_index(s).map(Selector::Single),
    }
}

/// Resolve selectors against the canonical index. Each workout appears once,
/// in the order it was first selected.
pub fn resolve_selectors(selectors: &[Selector], indexed: &[DisplayWorkout]) -> Result<Vec<Uuid>> {
    let lookup = |i: usize| {
        i.checked_sub(1)
            .and_then(|pos| indexed.get(pos))
            .map(|dw| dw.workout.id())
            .ok_or_else(|| WorkoutError::Api(format!("No workout with index {}", i)))
    };

    let mut ids = Vec::new();
    for selector in selectors {
        let (start, end) = match *selector {
            Selector::Single(i) => (i, i),
            Selector::Range(start, end) => (start, end),
        };
        for i in start..=end {
            let id = lookup(i)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}
