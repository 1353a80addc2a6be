use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attendance_register::config::Config;
use attendance_register::db::Database;
use attendance_register::render;
use attendance_register::session::{IgnoreReason, SessionEvent, ToggleOutcome};
use attendance_register::store::RecordStore;
use attendance_register::{AttendanceDesk, AttendanceError};

#[derive(Parser)]
#[command(name = "attendance")]
#[command(about = "Mark class attendance and review attendance rates")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides ATTENDANCE_DB and the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark today's attendance
    Mark,
    /// List previous attendance records, latest first
    History,
    /// Show each student's attendance rate
    Dashboard,
    /// Write all records as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Load records from a JSON file, replacing records with the same date
    Import { file: PathBuf },
}

/// Log to stderr so stdout stays clean for the operator.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "attendance_register=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load(cli.config.as_deref());
    let db = match config.resolve_database_path(cli.db) {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    let store = RecordStore::new(db);
    let (mut desk, events) = AttendanceDesk::from_config(store.clone(), &config);

    match cli.command.unwrap_or(Commands::Mark) {
        Commands::Mark => {
            desk.refresh().await?;
            run_marking(&mut desk, events, config.window_minutes).await?;
        }
        Commands::History => {
            let records = desk.refresh().await?;
            print!("{}", render::render_history(records));
        }
        Commands::Dashboard => {
            desk.refresh().await?;
            print!("{}", render::render_dashboard(&desk.summary()));
        }
        Commands::Export { out } => {
            let json = store.export_json().await?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    println!("Records written to {}.", path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Import { file } => {
            let json = tokio::fs::read_to_string(&file).await?;
            let count = store.import_json(json).await?;
            println!("Imported {} records from {}.", count, file.display());
        }
    }

    Ok(())
}

enum Command {
    Toggle(String),
    ToggleAt(usize),
    List,
    Submit,
    Retry,
    Help,
    Back,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Ok(position) = line.parse::<usize>() {
        return Some(Command::ToggleAt(position));
    }
    Some(match line {
        "list" | "ls" => Command::List,
        "submit" => Command::Submit,
        "retry" => Command::Retry,
        "help" | "?" => Command::Help,
        "back" | "quit" | "exit" => Command::Back,
        name => Command::Toggle(name.to_string()),
    })
}

const HELP: &str = "Enter a number or name to cycle Absent → Present → Late → Early Leave → Absent.
Commands: list, submit, retry, back";

async fn run_marking(
    desk: &mut AttendanceDesk,
    mut events: UnboundedReceiver<SessionEvent>,
    window_minutes: u64,
) -> anyhow::Result<()> {
    desk.begin_session();
    println!("{}\n", HELP);
    if let Some(session) = desk.session() {
        print!("{}", render::render_marking(session));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if desk.handle_event(event) {
                    println!(
                        "Time's up. You can no longer mark attendance after {} minutes.",
                        window_minutes
                    );
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = parse_command(&line) else { continue };
                match command {
                    Command::Toggle(name) => report_toggle(desk.toggle(&name)),
                    Command::ToggleAt(position) => report_toggle(desk.toggle_at(position)),
                    Command::List => {
                        if let Some(session) = desk.session() {
                            print!("{}", render::render_marking(session));
                        }
                    }
                    Command::Submit => {
                        let today = chrono::Local::now().date_naive();
                        report_save(desk.submit(today).await);
                    }
                    Command::Retry => report_save(desk.retry_save().await),
                    Command::Help => println!("{}", HELP),
                    Command::Back => break,
                }
            }
        }
    }

    desk.end_session();
    Ok(())
}

fn report_toggle(result: Result<ToggleOutcome, attendance_register::ValidationError>) {
    match result {
        Ok(ToggleOutcome::Changed(status)) => println!("→ {}", status.label()),
        Ok(ToggleOutcome::Ignored(IgnoreReason::Locked)) => {
            println!("Time's up, attendance is locked.")
        }
        Ok(ToggleOutcome::Ignored(IgnoreReason::Submitted)) => {
            println!("Attendance already submitted.")
        }
        Ok(ToggleOutcome::Ignored(IgnoreReason::UnknownStudent)) => {
            println!("No such student.")
        }
        Err(e) => println!("{}", e),
    }
}

fn report_save(result: Result<attendance_register::models::AttendanceRecord, AttendanceError>) {
    match result {
        Ok(record) => print!("{}", render::render_submission(&record)),
        Err(AttendanceError::Persistence(e)) => {
            println!("Failed to save attendance: {}. Type `retry` to try again.", e)
        }
        Err(e) => println!("{}", e),
    }
}
