//! Per-command handlers.
//!
//! `run()` parses arguments, builds the [`AppContext`] (config, persistence,
//! store), dispatches, and always shuts the store down afterwards so pending
//! saves reach disk even when the handler failed.

use super::render::{
    print_exercise_names, print_info, print_stats, print_success, print_warning,
    print_week_sections, print_workout_details, print_workouts, render_calendar, StatsView,
};
use super::setup::{Cli, Commands, ExerciseAction};
use crate::logging;
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use clap::Parser;
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use workoutapp::config::WorkoutConfig;
use workoutapp::error::{Result, WorkoutError};
use workoutapp::exercises::ExerciseCatalog;
use workoutapp::history::{active_days, group_by_week, month_grid, workouts_on};
use workoutapp::import::export_file::ExportFileProvider;
use workoutapp::import::{ImportOutcome, ImportReconciler};
use workoutapp::index::{index_workouts, parse_index_or_range, resolve_selectors};
use workoutapp::live::WorkoutDraft;
use workoutapp::stats;
use workoutapp::store::{FsBackend, Persistence, WorkoutStore};
use workoutapp::{Exercise, WorkoutCategory};

const RECENT_LIMIT: usize = 5;

struct AppContext {
    config: WorkoutConfig,
    persistence: Arc<Persistence<FsBackend>>,
    store: WorkoutStore,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let ctx = init_context(&cli)?;
    let result = dispatch(&ctx, cli.command).await;
    ctx.store.shutdown().await;
    result
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let mut config = WorkoutConfig::load_default()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    let data_dir = config.data_dir()?;
    debug!(data_dir = %data_dir.display(), "opening workout data");

    let persistence = Arc::new(Persistence::new(FsBackend::new(data_dir)));
    let store = WorkoutStore::open(persistence.clone(), config.save_delay());
    Ok(AppContext {
        config,
        persistence,
        store,
    })
}

async fn dispatch(ctx: &AppContext, command: Option<Commands>) -> Result<()> {
    match command {
        None => handle_list(ctx, false),
        Some(Commands::List { by_week }) => handle_list(ctx, by_week),
        Some(Commands::Add {
            workout_type,
            category,
            date,
            notes,
            exercises,
        }) => handle_add(ctx, workout_type.join(" "), category, date, notes, exercises).await,
        Some(Commands::Delete { indexes }) => handle_delete(ctx, &indexes).await,
        Some(Commands::Stats { days }) => handle_stats(ctx, days),
        Some(Commands::Day { date }) => handle_day(ctx, date),
        Some(Commands::Calendar { month }) => handle_calendar(ctx, month),
        Some(Commands::Import { from }) => handle_import(ctx, from).await,
        Some(Commands::Exercises { action }) => handle_exercises(ctx, action),
    }
}

fn handle_list(ctx: &AppContext, by_week: bool) -> Result<()> {
    let workouts = ctx.store.current();
    if by_week {
        let index_of: HashMap<_, _> = index_workouts(workouts.clone())
            .into_iter()
            .map(|dw| (dw.workout.id(), dw.index))
            .collect();
        print_week_sections(&group_by_week(&workouts, &Local), &index_of);
    } else {
        print_workouts(&index_workouts(workouts));
    }
    Ok(())
}

async fn handle_add(
    ctx: &AppContext,
    workout_type: String,
    category: WorkoutCategory,
    date: Option<DateTime<Utc>>,
    notes: String,
    exercises: Vec<Exercise>,
) -> Result<()> {
    let draft = WorkoutDraft {
        date: date.unwrap_or_else(Utc::now),
        workout_type,
        category,
        exercises,
        notes,
    };
    let workout = draft.build()?;
    let title = workout.workout_type.clone();
    ctx.store.add(workout).await?;
    print_success(&format!("Added workout: {}", title));
    Ok(())
}

async fn handle_delete(ctx: &AppContext, indexes: &[String]) -> Result<()> {
    let selectors = indexes
        .iter()
        .map(|s| parse_index_or_range(s))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(WorkoutError::Api)?;
    let indexed = index_workouts(ctx.store.current());
    let ids = resolve_selectors(&selectors, &indexed)?;

    let mut deleted = 0;
    for id in ids {
        if ctx.store.delete_by_id(id).await? {
            deleted += 1;
        }
    }
    print_success(&format!("Deleted {} workout(s)", deleted));
    Ok(())
}

fn handle_stats(ctx: &AppContext, days: usize) -> Result<()> {
    let workouts = ctx.store.current();
    let today = Local::now().date_naive();
    let view = StatsView {
        days,
        totals: stats::totals(&workouts),
        daily: stats::daily_counts(&workouts, today, days, &Local),
        weekly: stats::weekly_counts(&workouts, today, days, &Local),
        change: stats::percent_change(&workouts, today, days, &Local),
        recent: stats::recent(&workouts, RECENT_LIMIT),
    };
    print_stats(&view);
    Ok(())
}

fn handle_day(ctx: &AppContext, date: NaiveDate) -> Result<()> {
    let found = workouts_on(&ctx.store.current(), date, &Local);
    if found.is_empty() {
        print_info(&format!("No workouts on {}", date));
    } else {
        print_workout_details(&found);
    }
    Ok(())
}

fn handle_calendar(ctx: &AppContext, month: Option<(i32, u32)>) -> Result<()> {
    let (year, month) = month.unwrap_or_else(|| {
        let today = Local::now().date_naive();
        (today.year(), today.month())
    });
    let grid = month_grid(year, month)
        .ok_or_else(|| WorkoutError::Api(format!("Invalid month: {}-{}", year, month)))?;
    let active = active_days(&ctx.store.current(), year, month, &Local);
    println!("{}", render_calendar(year, month, &grid, &active));
    Ok(())
}

async fn handle_import(ctx: &AppContext, from: Option<PathBuf>) -> Result<()> {
    let path = from
        .or_else(|| ctx.config.health_export.clone())
        .ok_or_else(|| {
            WorkoutError::Config(
                "no health export configured (use --from or WORKOUT_HEALTH_EXPORT)".to_string(),
            )
        })?;

    let provider = Arc::new(ExportFileProvider::new(path));
    let reconciler = ImportReconciler::new(
        ctx.store.clone(),
        provider.clone(),
        provider,
        ctx.persistence.clone(),
        ctx.config.import_settings(),
    );

    match reconciler.import_if_needed().await {
        ImportOutcome::Imported { count } => {
            print_success(&format!("Imported {} workout(s)", count))
        }
        ImportOutcome::NothingNew => print_info("No new workouts to import"),
        ImportOutcome::NotAuthorized => {
            print_warning("Health export not found; nothing imported")
        }
        outcome @ (ImportOutcome::AlreadyAttempted | ImportOutcome::Failed { .. }) => {
            print_warning(&outcome.to_string())
        }
    }
    Ok(())
}

fn handle_exercises(ctx: &AppContext, action: Option<ExerciseAction>) -> Result<()> {
    let mut catalog = ExerciseCatalog::load(&*ctx.persistence);

    match action.unwrap_or(ExerciseAction::List) {
        ExerciseAction::List => {
            print_exercise_names(catalog.names());
            return Ok(());
        }
        ExerciseAction::Add { name } => {
            let name = name.join(" ");
            if !catalog.add(&name) {
                return Err(WorkoutError::Api(format!(
                    "Exercise already exists or is blank: {}",
                    name.trim()
                )));
            }
            print_success(&format!("Added exercise: {}", name.trim()));
        }
        ExerciseAction::Remove { index } => {
            let removed = index
                .checked_sub(1)
                .and_then(|i| catalog.remove(i))
                .ok_or_else(|| WorkoutError::Api(format!("No exercise with index {}", index)))?;
            print_success(&format!("Removed exercise: {}", removed));
        }
        ExerciseAction::Rename { old, new } => {
            if !catalog.rename(&old, &new) {
                return Err(WorkoutError::Api(format!(
                    "Cannot rename {:?} to {:?}",
                    old, new
                )));
            }
            print_success(&format!("Renamed {} to {}", old, new.trim()));
        }
    }
    catalog.save(&*ctx.persistence)
}
