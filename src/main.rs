use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use meal_insights::api_connection::endpoints::Provider;
use meal_insights::cli::{parse_args, Command, GoalArgs};
use meal_insights::config::{AppConfig, API_KEY_ENV_VAR};
use meal_insights::frequent::{find_frequent_items, ClusterOptions, FrequentItemCluster};
use meal_insights::goals::{
    day_progress, weekly_report, ClassifierThresholds, GoalContext, WeeklyReport,
};
use meal_insights::log_loader::load_food_log;
use meal_insights::logging;
use meal_insights::meal_analyzer::{analyze_meal, mime_type_for, MealInput, Photo};
use tokio::fs;

fn resolve_goals(config: &AppConfig, args: &GoalArgs) -> Result<GoalContext> {
    GoalContext::new(
        args.target_calories.unwrap_or(config.target_calories),
        args.target_protein.unwrap_or(config.target_protein),
        args.maintenance_calories.unwrap_or(config.maintenance_calories),
    )
    .context("Invalid goals")
}

fn print_frequent_items(items: &[FrequentItemCluster]) {
    if items.is_empty() {
        println!("No frequent items yet.");
        return;
    }
    println!("{:<32} {:>6} {:>8} {:>8}", "Item", "Times", "kcal", "Protein");
    for item in items {
        println!(
            "{:<32} {:>6} {:>8.0} {:>7.0}g",
            item.representative_name,
            item.occurrence_count,
            item.average_calories,
            item.average_protein
        );
    }
}

fn print_weekly_report(report: &WeeklyReport) {
    println!(
        "Week {} to {} (target {:.0} kcal / {:.0} g protein, maintenance {:.0} kcal)",
        report.window.start,
        report.window.end(),
        report.goals.target_calories(),
        report.goals.target_protein(),
        report.goals.maintenance_calories()
    );
    for day in &report.days {
        println!(
            "{} {:>7.0} kcal [{:<11}] {:>5.0} g [{:<11}]",
            day.totals.date.format("%a %d"),
            day.totals.calories,
            day.calorie_status.label(),
            day.totals.protein,
            day.protein_status.label()
        );
    }
    let summary = &report.summary;
    println!(
        "Days logged: {} | avg {:.0} kcal, {:.0} g protein",
        summary.days_logged, summary.average_calories, summary.average_protein
    );
    println!(
        "Balance vs maintenance: daily {:+.0} kcal | weekly {:+.0} kcal",
        summary.daily_deficit, summary.weekly_deficit
    );
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = parse_args();
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    logging::init(&config.log_level, config.log_format);

    let thresholds = ClassifierThresholds::default();

    match cli_args.command {
        Command::Frequent { log, min_occurrences, max_items, threshold } => {
            let records = load_food_log(&log.log)?;
            let options = ClusterOptions::default()
                .with_min_occurrences(min_occurrences)
                .with_max_items(max_items)
                .with_similarity_threshold(threshold);
            let items = find_frequent_items(&records, &options)?;
            tracing::info!(
                records = records.len(),
                suggestions = items.len(),
                "Computed frequent items"
            );

            if log.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print_frequent_items(&items);
            }
        }
        Command::Weekly { log, goals, week_of } => {
            let records = load_food_log(&log.log)?;
            let goals = resolve_goals(&config, &goals)?;
            let week_of = week_of.unwrap_or_else(today);
            let report = weekly_report(&records, &goals, week_of, &thresholds)?;

            if log.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_weekly_report(&report);
            }
        }
        Command::Today { log, goals, date } => {
            let records = load_food_log(&log.log)?;
            let goals = resolve_goals(&config, &goals)?;
            let date = date.unwrap_or_else(today);
            let progress = day_progress(&records, &goals, date, &thresholds)?;

            if log.json {
                println!("{}", serde_json::to_string_pretty(&progress)?);
            } else {
                println!(
                    "{}: {:.0} kcal ({}), {:.0} g protein ({})",
                    date,
                    progress.totals.calories,
                    progress.calorie_status.label(),
                    progress.totals.protein,
                    progress.protein_status.label()
                );
                println!(
                    "Left for today: {:.0} kcal and {:.0} g protein",
                    progress.remaining_calories, progress.remaining_protein
                );
            }
        }
        Command::Analyze { text, photo, date } => {
            let photo_data = match &photo {
                Some(path) => Some(Photo {
                    bytes: fs::read(path)
                        .await
                        .with_context(|| format!("Failed to read photo '{}'", path.display()))?,
                    mime_type: mime_type_for(path).to_string(),
                }),
                None => None,
            };
            if text.trim().is_empty() && photo_data.is_none() {
                anyhow::bail!("Provide a meal description with --text or a photo with --photo");
            }

            let provider = Provider::openrouter(API_KEY_ENV_VAR);
            if photo_data.is_some() && !provider.supports_images(&config.model) {
                tracing::warn!(
                    model = %config.model,
                    "Configured model is not known to accept images"
                );
            }
            let input = MealInput {
                description: text,
                photo: photo_data,
            };
            let image_ref = photo.as_ref().map(|p| p.display().to_string());
            let records = analyze_meal(
                &provider,
                &config.model,
                &input,
                date.unwrap_or_else(today),
                image_ref.as_deref(),
            )
            .await
            .context("Meal analysis failed")?;

            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
