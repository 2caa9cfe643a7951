//! History views: week sections for the list, day lookups and month grids for
//! the calendar. Weeks are ISO weeks; day boundaries follow the caller's time
//! zone.

use crate::model::Workout;
use crate::stats::local_day;
use chrono::{Datelike, IsoWeek, NaiveDate, TimeZone};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSection {
    pub week: IsoWeek,
    /// Newest first.
    pub workouts: Vec<Workout>,
}

impl WeekSection {
    pub fn label(&self) -> String {
        format!("Week {}, {}", self.week.week(), self.week.year())
    }
}

/// Newest week first.
pub fn group_by_week<Tz: TimeZone>(workouts: &[Workout], tz: &Tz) -> Vec<WeekSection> {
    let mut sorted = workouts.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut sections: Vec<WeekSection> = Vec::new();
    for workout in sorted {
        let week = local_day(&workout, tz).iso_week();
        match sections.iter_mut().find(|s| s.week == week) {
            Some(section) => section.workouts.push(workout),
            None => sections.push(WeekSection {
                week,
                workouts: vec![workout],
            }),
        }
    }
    sections.sort_by(|a, b| b.week.cmp(&a.week));
    sections
}

pub fn workouts_on<Tz: TimeZone>(workouts: &[Workout], day: NaiveDate, tz: &Tz) -> Vec<Workout> {
    let mut found: Vec<Workout> = workouts
        .iter()
        .filter(|w| local_day(w, tz) == day)
        .cloned()
        .collect();
    found.sort_by(|a, b| a.date.cmp(&b.date));
    found
}

pub fn has_workout_on<Tz: TimeZone>(workouts: &[Workout], day: NaiveDate, tz: &Tz) -> bool {
    workouts.iter().any(|w| local_day(w, tz) == day)
}

/// Days of the month, preceded by `None` padding so the first day lands in its
/// weekday column of a Sunday-first calendar. `None` for an invalid month.
pub fn month_grid(year: i32, month: u32) -> Option<Vec<Option<NaiveDate>>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let padding = first.weekday().num_days_from_sunday() as usize;

    let mut grid = vec![None; padding];
    grid.extend(
        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(Some),
    );
    Some(grid)
}

/// Day-of-month numbers that have at least one workout.
pub fn active_days<Tz: TimeZone>(
    workouts: &[Workout],
    year: i32,
    month: u32,
    tz: &Tz,
) -> BTreeSet<u32> {
    workouts
        .iter()
        .map(|w| local_day(w, tz))
        .filter(|d| d.year() == year && d.month() == month)
        .map(|d| d.day())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkoutCategory;
    use chrono::{FixedOffset, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn on(date: NaiveDate, hour: u32, name: &str) -> Workout {
        let at = date.and_hms_opt(hour, 0, 0).unwrap().and_utc();
        Workout::new(at, name, WorkoutCategory::Other, vec![], "")
    }

    #[test]
    fn test_week_sections_newest_first() {
        let workouts = vec![
            on(day(2025, 6, 16), 9, "w25 mon"),
            on(day(2025, 6, 24), 9, "w26 tue"),
            on(day(2025, 6, 22), 9, "w25 sun"),
            on(day(2025, 6, 29), 9, "w26 sun"),
        ];

        let sections = group_by_week(&workouts, &Utc);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].label(), "Week 26, 2025");
        let names: Vec<_> = sections[0]
            .workouts
            .iter()
            .map(|w| w.workout_type.as_str())
            .collect();
        assert_eq!(names, vec!["w26 sun", "w26 tue"]);
        assert_eq!(sections[1].label(), "Week 25, 2025");
    }

    #[test]
    fn test_week_label_uses_iso_year() {
        // 29 Dec 2025 belongs to week 1 of 2026
        let sections = group_by_week(&[on(day(2025, 12, 29), 9, "x")], &Utc);
        assert_eq!(sections[0].label(), "Week 1, 2026");
    }

    #[test]
    fn test_workouts_on_day() {
        let target = day(2025, 6, 24);
        let workouts = vec![
            on(target, 18, "evening"),
            on(day(2025, 6, 25), 9, "other day"),
            on(target, 7, "morning"),
        ];

        let found: Vec<_> = workouts_on(&workouts, target, &Utc)
            .into_iter()
            .map(|w| w.workout_type)
            .collect();
        assert_eq!(found, vec!["morning", "evening"]);
        assert!(has_workout_on(&workouts, target, &Utc));
        assert!(!has_workout_on(&workouts, day(2025, 6, 26), &Utc));
    }

    #[test]
    fn test_has_workout_respects_time_zone() {
        let late = on(day(2025, 6, 24), 23, "late");
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert!(has_workout_on(&[late.clone()], day(2025, 6, 25), &plus_two));
        assert!(!has_workout_on(&[late], day(2025, 6, 25), &Utc));
    }

    #[test]
    fn test_month_grid_padding() {
        // June 2025 starts on a Sunday: no padding
        let june = month_grid(2025, 6).unwrap();
        assert_eq!(june.len(), 30);
        assert_eq!(june[0], Some(day(2025, 6, 1)));

        // July 2025 starts on a Tuesday
        let july = month_grid(2025, 7).unwrap();
        assert_eq!(july.len(), 2 + 31);
        assert_eq!(&july[..2], &[None, None]);
        assert_eq!(july[2], Some(day(2025, 7, 1)));
        assert_eq!(july.last(), Some(&Some(day(2025, 7, 31))));

        // leap February
        assert_eq!(month_grid(2024, 2).unwrap().iter().flatten().count(), 29);
        assert!(month_grid(2025, 13).is_none());
    }

    #[test]
    fn test_active_days() {
        let workouts = vec![
            on(day(2025, 6, 3), 9, "a"),
            on(day(2025, 6, 3), 18, "b"),
            on(day(2025, 6, 17), 9, "c"),
            on(day(2025, 7, 1), 9, "d"),
        ];
        let active: Vec<_> = active_days(&workouts, 2025, 6, &Utc).into_iter().collect();
        assert_eq!(active, vec![3, 17]);
    }
}
