use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use workoutapp::{Exercise, WorkoutCategory};

const MAX_STATS_DAYS: u64 = 3650;

#[derive(Parser, Debug)]
#[command(name = "workout", bin_name = "workout", version)]
#[command(about = "Local-first workout log", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the workout data (overrides config and WORKOUT_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List workouts, newest first
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Group by ISO week
        #[arg(long, short = 'w')]
        by_week: bool,
    },

    /// Log a workout
    #[command(alias = "a", display_order = 2)]
    Add {
        /// Workout type, e.g. "Push day"
        #[arg(required = true, num_args = 1..)]
        workout_type: Vec<String>,

        #[arg(long, short = 'c', default_value = "strength")]
        category: WorkoutCategory,

        /// YYYY-MM-DD, "YYYY-MM-DD HH:MM" or RFC 3339 (default: now)
        #[arg(long, short = 'd', value_parser = parse_date_arg)]
        date: Option<DateTime<Utc>>,

        #[arg(long, short = 'n', default_value = "")]
        notes: String,

        /// NAME:SETSxREPS[@WEIGHT], repeatable
        #[arg(long = "exercise", short = 'e', value_parser = parse_exercise_arg)]
        exercises: Vec<Exercise>,
    },

    /// Delete workouts by index (e.g. 1 or 2-4)
    #[command(alias = "rm", display_order = 3)]
    Delete {
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Totals, recent activity and trends
    #[command(display_order = 4)]
    Stats {
        /// Size of the trend window in days (1-3650)
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_STATS_DAYS)
        )]
        days: usize,
    },

    /// Workouts on a given day
    #[command(display_order = 5)]
    Day {
        #[arg(value_parser = parse_day_arg)]
        date: NaiveDate,
    },

    /// Month calendar with active days marked
    #[command(alias = "cal", display_order = 6)]
    Calendar {
        /// YYYY-MM (default: this month)
        #[arg(value_parser = parse_month_arg)]
        month: Option<(i32, u32)>,
    },

    /// Import workouts from a health-data export
    #[command(display_order = 7)]
    Import {
        /// Export file (default: health_export from config)
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },

    /// Manage custom exercise names
    #[command(alias = "ex", display_order = 8)]
    Exercises {
        #[command(subcommand)]
        action: Option<ExerciseAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExerciseAction {
    List,
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Remove by position (as shown by `exercises list`)
    Remove { index: usize },
    Rename { old: String, new: String },
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>, String> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("Time does not exist in the local time zone: {}", naive))
}

/// Dates without a time land at local noon.
pub fn parse_date_arg(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return local_to_utc(naive);
    }
    let day = parse_day_arg(s)?;
    local_to_utc(day.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()))
}

pub fn parse_day_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| format!("Invalid date: {}", s))
}

pub fn parse_month_arg(s: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("Invalid month (expected YYYY-MM): {}", s);
    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// `Bench press:3x8@60`, `Pull-up:4x6`.
pub fn parse_exercise_arg(s: &str) -> Result<Exercise, String> {
    let invalid = || format!("Invalid exercise (expected NAME:SETSxREPS[@WEIGHT]): {}", s);
    let (name, spec) = s.rsplit_once(':').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }
    let (volume, weight) = match spec.split_once('@') {
        Some((volume, weight)) => {
            let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid());
            }
            (volume, weight)
        }
        None => (spec, 0.0),
    };
    let (sets, reps) = volume
        .trim()
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(invalid)?;
    let sets: u32 = sets.trim().parse().map_err(|_| invalid())?;
    let reps: u32 = reps.trim().parse().map_err(|_| invalid())?;
    if sets == 0 || reps == 0 {
        return Err(invalid());
    }
    Ok(Exercise::new(name, sets, reps, weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_exercise() {
        let e = parse_exercise_arg("Bench press:3x8@62.5").unwrap();
        assert_eq!(e.name, "Bench press");
        assert_eq!((e.sets, e.reps), (3, 8));
        assert_eq!(e.weight, 62.5);

        let bodyweight = parse_exercise_arg("Pull-up: 4X6").unwrap();
        assert_eq!((bodyweight.sets, bodyweight.reps), (4, 6));
        assert_eq!(bodyweight.weight, 0.0);
    }

    #[test]
    fn test_parse_exercise_rejects_garbage() {
        let bad_inputs = [
            "Squat",
            ":3x5",
            "Squat:3",
            "Squat:ax5",
            "Squat:3x5@",
            "Squat:3x5@-10",
            "Squat:0x5",
            "Squat:3x0",
        ];
        for bad in bad_inputs {
            assert!(parse_exercise_arg(bad).is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn test_parse_date_forms() {
        let rfc = parse_date_arg("2025-06-24T18:00:00Z").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2025-06-24T18:00:00+00:00");

        let day = parse_date_arg("2025-06-24").unwrap().with_timezone(&Local);
        assert_eq!(day.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 24).unwrap());
        assert_eq!(day.hour(), 12);

        let timed = parse_date_arg("2025-06-24 07:30").unwrap().with_timezone(&Local);
        assert_eq!((timed.hour(), timed.minute()), (7, 30));

        assert!(parse_date_arg("yesterday").is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month_arg("2025-07"), Ok((2025, 7)));
        assert!(parse_month_arg("2025-13").is_err());
        assert!(parse_month_arg("July").is_err());
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "workout",
            "--data-dir",
            "/tmp/w",
            "add",
            "Push",
            "day",
            "-c",
            "cardio",
            "-e",
            "Dips:3x10",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/w")));
        match cli.command {
            Some(Commands::Add {
                workout_type,
                category,
                exercises,
                ..
            }) => {
                assert_eq!(workout_type.join(" "), "Push day");
                assert_eq!(category, WorkoutCategory::Cardio);
                assert_eq!(exercises.len(), 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_stats_days_is_bounded() {
        let cli = Cli::try_parse_from(["workout", "stats", "--days", "30"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Stats { days: 30 })));

        for bad in ["0", "3651", "1000000000000"] {
            assert!(
                Cli::try_parse_from(["workout", "stats", "--days", bad]).is_err(),
                "{} should fail",
                bad
            );
        }
    }

    #[test]
    fn test_cli_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["workout"]).unwrap();
        assert!(cli.command.is_none());
    }
}
