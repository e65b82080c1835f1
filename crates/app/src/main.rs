use std::fmt;

use progress_core::model::{MaterialId, ParseIdError};
use services::{Clock, ProgressService, views};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArg { what: &'static str },
    UnknownArg(String),
    InvalidMaterialId(ParseIdError),
    InvalidPercent { raw: String },
    InvalidMinutes { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArg { what } => write!(f, "missing argument: {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMaterialId(err) => write!(f, "{err}"),
            ArgsError::InvalidPercent { raw } => write!(f, "invalid percent value: {raw}"),
            ArgsError::InvalidMinutes { raw } => write!(f, "invalid --minutes value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- dashboard [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- complete <material-id> [--db <sqlite_url>]");
    eprintln!(
        "  cargo run -p app -- progress <material-id> <percent> [--minutes <n>] [--db <sqlite_url>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:progress.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PROGRESS_DB_URL");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Dashboard,
    Complete {
        material_id: MaterialId,
    },
    Progress {
        material_id: MaterialId,
        percent: u8,
        minutes: Option<u32>,
    },
}

struct Args {
    db_url: String,
    command: Command,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("PROGRESS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://progress.sqlite3".into(), normalize_sqlite_url);
        let mut command_word: Option<String> = None;
        let mut positional: Vec<String> = Vec::new();
        let mut minutes: Option<u32> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--minutes" => {
                    let value = require_value(args, "--minutes")?;
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMinutes { raw: value.clone() })?;
                    minutes = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if other.starts_with("--") => {
                    return Err(ArgsError::UnknownArg(arg));
                }
                _ if command_word.is_none() => command_word = Some(arg),
                _ => positional.push(arg),
            }
        }

        let command = match command_word.as_deref() {
            // Default behavior: show the dashboard when no subcommand is given.
            None | Some("dashboard") => Command::Dashboard,
            Some("complete") => Command::Complete {
                material_id: take_material_id(&mut positional)?,
            },
            Some("progress") => {
                let material_id = take_material_id(&mut positional)?;
                let raw = positional
                    .first()
                    .cloned()
                    .ok_or(ArgsError::MissingArg { what: "percent" })?;
                positional.remove(0);
                let percent: u8 = raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidPercent { raw })?;
                Command::Progress {
                    material_id,
                    percent,
                    minutes,
                }
            }
            Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
        };

        if let Some(extra) = positional.into_iter().next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Self { db_url, command })
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn take_material_id(positional: &mut Vec<String>) -> Result<MaterialId, ArgsError> {
    if positional.is_empty() {
        return Err(ArgsError::MissingArg {
            what: "material-id",
        });
    }
    let raw = positional.remove(0);
    raw.parse().map_err(ArgsError::InvalidMaterialId)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn print_dashboard(service: &ProgressService) {
    let dashboard = service.dashboard();
    println!(
        "Materials   {}/{} ({}%)",
        dashboard.completed, dashboard.total, dashboard.percentage
    );
    println!("Streak      {} day(s)", dashboard.streak);
    println!(
        "Total time  {}h {}m",
        dashboard.total_minutes / 60,
        dashboard.total_minutes % 60
    );
    println!(
        "Level {}     {} / {} XP",
        dashboard.level, dashboard.xp, dashboard.next_level_xp
    );
    if !dashboard.recent_badges.is_empty() {
        let names: Vec<String> = dashboard
            .recent_badges
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("Badges      {}", names.join(", "));
    }

    println!();
    let snapshot = service.snapshot();
    for item in views::material_list(&snapshot) {
        let mark = if item.completed { "x" } else { " " };
        println!(
            "  [{mark}] {:<28} {:>3}%  {} min  {}",
            item.title, item.percent, item.duration_minutes, item.category
        );
    }
    if views::all_complete(&snapshot) {
        println!();
        println!("All materials complete. Congratulations!");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let service = ProgressService::load(Clock::default_clock(), &storage).await?;

    match parsed.command {
        Command::Dashboard => {}
        Command::Complete { material_id } => {
            let outcome = service.mark_material_complete(&material_id).await;
            println!("Completed {material_id} (+100 XP)");
            if outcome.leveled_up {
                println!("Level up! Now level {}", outcome.level);
            }
            for badge in &outcome.new_badges {
                println!("New badge: {badge}");
            }
            println!();
        }
        Command::Progress {
            material_id,
            percent,
            minutes,
        } => {
            service
                .update_material_progress(&material_id, percent, minutes)
                .await;
            println!("Updated {material_id}");
            println!();
        }
    }

    print_dashboard(&service);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
