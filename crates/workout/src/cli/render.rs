//! Terminal output.
//!
//! Layout (widths, truncation, padding) is computed here with Unicode-aware
//! widths; colors come from `colored` and are switched off when stdout is not
//! a terminal. Builders return `String`s so they can be tested without a tty.

use chrono::{DateTime, Local, NaiveDate, Utc};
use colored::Colorize;
use std::collections::{BTreeSet, HashMap};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use uuid::Uuid;
use workoutapp::history::WeekSection;
use workoutapp::index::DisplayWorkout;
use workoutapp::stats::{DayCount, Totals, WeekCount};
use workoutapp::{Exercise, Workout};

const LINE_WIDTH: usize = 80;
const TIME_WIDTH: usize = 14;
const CATEGORY_WIDTH: usize = 10;

pub(super) fn print_success(message: &str) {
    println!("{}", message.green());
}

pub(super) fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

pub(super) fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

pub(super) fn print_workouts(indexed: &[DisplayWorkout]) {
    if indexed.is_empty() {
        println!("No workouts yet.");
        return;
    }
    for dw in indexed {
        println!("{}", workout_line(dw.index, &dw.workout));
    }
}

pub(super) fn print_week_sections(sections: &[WeekSection], index_of: &HashMap<Uuid, usize>) {
    if sections.is_empty() {
        println!("No workouts yet.");
        return;
    }
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", section.label().bold());
        for workout in &section.workouts {
            let index = index_of.get(&workout.id()).copied().unwrap_or(0);
            println!("{}", workout_line(index, workout));
        }
    }
}

fn workout_line(index: usize, workout: &Workout) -> String {
    let idx_str = format!("{:>3}. ", index);
    let date = workout.date.with_timezone(&Local).format("%Y-%m-%d").to_string();
    let title = if workout.workout_type.is_empty() {
        "(untitled)"
    } else {
        workout.workout_type.as_str()
    };

    let fixed_width = idx_str.width() + date.width() + 2 + CATEGORY_WIDTH + 2 + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed_width);
    let title_display = truncate_to_width(title, available);
    let padding = " ".repeat(available.saturating_sub(title_display.width()));
    let category = format!("{:<width$}", workout.category.label(), width = CATEGORY_WIDTH);

    format!(
        "{}{}  {}{}  {}{}",
        idx_str.yellow(),
        date.dimmed(),
        title_display,
        padding,
        category.cyan(),
        format_time_ago(workout.date).dimmed()
    )
}

pub(super) fn print_workout_details(workouts: &[Workout]) {
    for (i, workout) in workouts.iter().enumerate() {
        if i > 0 {
            println!("\n--------------------------------\n");
        }
        println!("{}", workout_details(workout));
    }
}

fn workout_details(workout: &Workout) -> String {
    let mut out = format!(
        "{} {}  {}\n",
        workout.date.with_timezone(&Local).format("%H:%M").to_string().yellow(),
        workout.workout_type.bold(),
        workout.category.label().cyan()
    );
    for exercise in &workout.exercises {
        out.push_str(&format!("  - {}\n", format_exercise(exercise)));
    }
    if !workout.exercises.is_empty() {
        out.push_str(&format!(
            "  {} sets, {} reps, {} kg total\n",
            workout.total_sets(),
            workout.total_reps(),
            format_weight(workout.volume())
        ));
    }
    if !workout.notes.is_empty() {
        out.push_str(&format!("  {}\n", workout.notes.italic()));
    }
    out.trim_end().to_string()
}

pub(super) fn format_exercise(exercise: &Exercise) -> String {
    if exercise.weight > 0.0 {
        format!(
            "{} {}x{} @ {} kg",
            exercise.name,
            exercise.sets,
            exercise.reps,
            format_weight(exercise.weight)
        )
    } else {
        format!("{} {}x{}", exercise.name, exercise.sets, exercise.reps)
    }
}

/// Whole numbers print without decimals.
pub(super) fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{:.1}", weight)
    }
}

pub(super) struct StatsView {
    pub days: usize,
    pub totals: Totals,
    pub daily: Vec<DayCount>,
    pub weekly: Vec<WeekCount>,
    pub change: f64,
    pub recent: Vec<Workout>,
}

pub(super) fn print_stats(view: &StatsView) {
    println!("{}", stats_report(view));
}

fn stats_report(view: &StatsView) -> String {
    let t = &view.totals;
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Totals".bold()));
    out.push_str(&format!(
        "  {} workouts, {} sets, {} reps, {} kg lifted\n\n",
        t.workouts,
        t.sets,
        t.reps,
        format_weight(t.volume)
    ));

    out.push_str(&format!("{}\n", format!("Last {} days", view.days).bold()));
    let bars: Vec<String> = view
        .daily
        .iter()
        .map(|d| format!("  {}  {}", d.date.format("%a %d %b"), "#".repeat(d.count)))
        .collect();
    out.push_str(&bars.join("\n"));
    out.push('\n');
    let change = format!("{:+.0}%", view.change);
    let change = if view.change < 0.0 {
        change.red()
    } else {
        change.green()
    };
    out.push_str(&format!(
        "  {} vs previous {} days\n\n",
        change, view.days
    ));

    out.push_str(&format!("{}\n", "By week".bold()));
    for week in &view.weekly {
        out.push_str(&format!("  {:<8} {}\n", week.label(), week.count));
    }

    if !view.recent.is_empty() {
        out.push_str(&format!("\n{}\n", "Recent".bold()));
        for workout in &view.recent {
            out.push_str(&format!(
                "  {}  {}\n",
                workout.date.with_timezone(&Local).format("%Y-%m-%d"),
                workout.workout_type
            ));
        }
    }
    out.trim_end().to_string()
}

/// Sunday-first month grid; active days are bracketed.
pub(super) fn render_calendar(
    year: i32,
    month: u32,
    grid: &[Option<NaiveDate>],
    active: &BTreeSet<u32>,
) -> String {
    use chrono::Datelike;

    let title = grid
        .iter()
        .flatten()
        .next()
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month));
    let mut out = format!("{:^28}\n", title).bold().to_string();
    out.push('\n');
    out.push_str(" Su  Mo  Tu  We  Th  Fr  Sa\n");

    for week in grid.chunks(7) {
        let line: String = week
            .iter()
            .map(|cell| match cell {
                None => "    ".to_string(),
                Some(d) if active.contains(&d.day()) => {
                    format!("[{:>2}]", d.day()).green().bold().to_string()
                }
                Some(d) => format!(" {:>2} ", d.day()),
            })
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.trim_end().to_string()
}

pub(super) fn print_exercise_names(names: &[String]) {
    if names.is_empty() {
        println!("No custom exercises.");
        return;
    }
    for (i, name) in names.iter().enumerate() {
        println!("{} {}", format!("{:>3}.", i + 1).yellow(), name);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
