use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use fitlog_core::config::DataConfig;
use fitlog_core::*;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status for failures worth retrying (EX_TEMPFAIL)
const EXIT_RETRYABLE: u8 = 75;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Workout log and calorie dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a user and print their owner id
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,
    },

    /// Print the owner id registered for an email
    FindUser {
        #[arg(long)]
        email: String,
    },

    /// Parse a workout log and store its entries
    Log {
        #[arg(long)]
        owner: String,

        /// Workout log text (read from --file or stdin when omitted)
        text: Option<String>,

        /// Read the workout log from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Validate and price without storing
        #[arg(long)]
        dry_run: bool,

        /// Log time, local (default: now)
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },

    /// List the workouts logged on one day
    Day {
        #[arg(long)]
        owner: String,

        /// Day to list (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show today's totals, category breakdown and 7-day trend
    Dashboard {
        #[arg(long)]
        owner: String,

        /// Reference time, local (default: now)
        #[arg(long)]
        at: Option<NaiveDateTime>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Roll up journaled workouts into the CSV archive
    Rollup {
        /// Clean up processed journals after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init_with_level(logging::level_for_verbosity(cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_retryable() {
                ExitCode::from(EXIT_RETRYABLE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    tracing::debug!("Using data directory {:?}", config.data.data_dir);

    match cli.command {
        Commands::Register { name, email } => cmd_register(&config.data, &name, &email),
        Commands::FindUser { email } => cmd_find_user(&config.data, &email),
        Commands::Log {
            owner,
            text,
            file,
            dry_run,
            at,
        } => {
            let raw = read_log_text(text, file)?;
            let parser = LogParser::from_config(&config.parser);
            if dry_run {
                cmd_check(&parser, &raw)
            } else {
                let now = at.unwrap_or_else(local_now);
                cmd_log(&config.data, &parser, &OwnerId::new(owner), &raw, now)
            }
        }
        Commands::Day { owner, date, json } => {
            let date = date.unwrap_or_else(|| local_now().date());
            cmd_day(&config.data, &OwnerId::new(owner), date, json)
        }
        Commands::Dashboard { owner, at, json } => {
            // Captured once for every window in the summary
            let now = at.unwrap_or_else(local_now);
            cmd_dashboard(&config.data, &OwnerId::new(owner), now, json)
        }
        Commands::Rollup { cleanup } => cmd_rollup(&config.data, cleanup),
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn read_log_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw)?;
    Ok(raw)
}

fn cmd_register(data: &DataConfig, name: &str, email: &str) -> Result<()> {
    let user = UserRegistry::update(&data.users_path(), |registry| {
        registry.register(name, email, local_now())
    })?;
    println!("{}", user.id);
    Ok(())
}

fn cmd_find_user(data: &DataConfig, email: &str) -> Result<()> {
    let registry = UserRegistry::load(&data.users_path())?;
    println!("{}", registry.find_by_email(email)?.id);
    Ok(())
}

fn cmd_check(parser: &LogParser, raw: &str) -> Result<()> {
    let entries = price_entries(parser, raw)?;
    for entry in &entries {
        display_entry(entry);
    }
    println!("\n[Dry run - {} workouts not logged]", entries.len());
    Ok(())
}

fn cmd_log(
    data: &DataConfig,
    parser: &LogParser,
    owner: &OwnerId,
    raw: &str,
    now: NaiveDateTime,
) -> Result<()> {
    let users = UserRegistry::load(&data.users_path())?;
    let mut store = JournalStore::from_config(data);

    let records = log_workouts(&mut store, &users, parser, owner, raw, now)?;
    for record in &records {
        display_record(record);
    }
    println!("\n✓ Logged {} workouts", records.len());
    Ok(())
}

fn cmd_day(data: &DataConfig, owner: &OwnerId, date: NaiveDate, json: bool) -> Result<()> {
    let users = UserRegistry::load(&data.users_path())?;
    let store = JournalStore::from_config(data);

    let day = workouts_on(&store, &users, owner, date)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&day)?);
        return Ok(());
    }

    println!("Workouts on {}", date);
    for record in &day.todays_workouts {
        display_record(record);
    }
    println!("  Total: {} kcal", day.total_calories_burned);
    Ok(())
}

fn cmd_dashboard(data: &DataConfig, owner: &OwnerId, now: NaiveDateTime, json: bool) -> Result<()> {
    let users = UserRegistry::load(&data.users_path())?;
    let store = JournalStore::from_config(data);

    let summary = summarize(&store, &users, owner, now)?;
    if json {
        let response = DashboardResponse::from(&summary);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Today");
    println!("  Calories burned: {}", summary.total_calories_today);
    println!("  Workouts:        {}", summary.total_workouts_today);
    println!("  Avg per workout: {:.1}", summary.avg_calories_per_workout_today);
    println!();
    println!("By category");
    for total in &summary.category_breakdown {
        println!("  {:<16} {}", total.category, total.total_calories);
    }
    println!();
    println!("Last {} days", summary.trend.len());
    for point in &summary.trend {
        println!("  {}  {}", point.day_label, point.total_calories);
    }
    Ok(())
}

fn cmd_rollup(data: &DataConfig, cleanup: bool) -> Result<()> {
    let journal_path = data.journal_path();
    let archive_path = data.archive_path();

    if !journal_path.exists() {
        println!("No journal found - nothing to roll up.");
        return Ok(());
    }

    let count = rollup::archive_journal(&journal_path, &archive_path)?;

    println!("✓ Rolled up {} workouts to CSV", count);
    println!("  CSV: {}", archive_path.display());

    if cleanup {
        if let Some(journal_dir) = journal_path.parent() {
            let cleaned = rollup::cleanup_processed_journals(journal_dir)?;
            if cleaned > 0 {
                println!("✓ Cleaned up {} processed journals", cleaned);
            }
        }
    }

    Ok(())
}

fn display_entry(entry: &WorkoutEntry) {
    println!(
        "  [{}] {}: {} sets x {} reps @ {}kg, {}min → {} kcal",
        entry.category,
        entry.name,
        entry.sets,
        entry.reps,
        entry.weight_kg,
        entry.duration_min,
        entry.calories_burned
    );
}

fn display_record(record: &WorkoutRecord) {
    display_entry(&WorkoutEntry::from(record));
}
