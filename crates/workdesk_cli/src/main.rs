//! Command-line front end for the work item store.
//!
//! # Responsibility
//! - Map subcommands onto `WorkItemService` calls and print JSON results.
//! - Resolve configuration from `.env`, the environment, then flags.
//!
//! # Invariants
//! - "Today" is read once per invocation from the local clock unless
//!   `--today` pins it.
//! - Failures go to stderr with a non-zero exit code.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use workdesk_core::db::open_db;
use workdesk_core::{
    init_logging, owner_id_from_headers, parse_intent, resolve_date_range, ItemStatus, ItemType,
    NewWorkItem, QueryFilter, SqliteWorkItemRepository, TimeRange, UpdateOutcome, UpdateRequest,
    WorkItemChanges, WorkItemId, WorkItemRepository, WorkItemService, WorkdeskConfig,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "workdesk", version)]
#[command(about = "Record, query and update personal work items", long_about = None)]
struct Cli {
    /// SQLite database path; overrides WORKDESK_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Caller identity; wins over --header
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Request header `name=value` used for owner resolution
    #[arg(long = "header", global = true, value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Reference date for relative time ranges (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract time range, type, status and keyword from free text
    Parse { text: String },
    /// Resolve a time-range tag into a date interval
    Range { tag: String },
    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that need an open work item store.
#[derive(Subcommand)]
enum StoreCommand {
    /// Record a new work item
    Record(RecordArgs),
    /// Structured lookup
    Query(QueryArgs),
    /// Natural-language lookup
    Ask { text: String },
    /// Update one work item by id or by description
    Update(UpdateArgs),
    /// Check that the store answers
    Health,
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long = "type")]
    item_type: ItemType,
    #[arg(long)]
    summary: String,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    project: Option<String>,
    #[arg(long)]
    due: Option<NaiveDate>,
    #[arg(long)]
    start: Option<NaiveDate>,
    #[arg(long)]
    priority: Option<u8>,
    #[arg(long)]
    status: Option<ItemStatus>,
    #[arg(long = "tag")]
    tags: Vec<String>,
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long)]
    id: Option<WorkItemId>,
    #[arg(long)]
    project: Option<String>,
    #[arg(long = "type")]
    item_type: Option<ItemType>,
    #[arg(long)]
    status: Option<ItemStatus>,
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long = "range")]
    time_range: Option<TimeRange>,
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    id: Option<WorkItemId>,
    #[arg(long)]
    keyword: Option<String>,
    /// Loose time-range tag; unknown values are ignored
    #[arg(long)]
    time_context: Option<String>,
    /// Original instruction text
    #[arg(long)]
    input: Option<String>,
    #[arg(long)]
    status: Option<ItemStatus>,
    #[arg(long)]
    due: Option<NaiveDate>,
    #[arg(long)]
    priority: Option<u8>,
    #[arg(long)]
    summary: Option<String>,
    #[arg(long)]
    content: Option<String>,
}

fn main() -> ExitCode {
    // A missing .env file is normal outside development.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<Value> {
    let config = WorkdeskConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command {
        Command::Parse { text } => Ok(serde_json::to_value(parse_intent(&text))?),
        Command::Range { tag } => Ok(serde_json::to_value(resolve_date_range(&tag, today))?),
        Command::Store(command) => {
            let owner_id = match cli.owner {
                Some(owner) => owner,
                None => owner_id_from_headers(
                    cli.headers
                        .iter()
                        .map(|(name, value)| (name.as_str(), value.as_str())),
                    &config.default_owner_id,
                ),
            };
            let conn = open_db(cli.db.unwrap_or(config.db_path))?;
            let service = WorkItemService::new(SqliteWorkItemRepository::try_new(&conn)?);
            run_store_command(&service, command, &owner_id, today)
        }
    }
}

fn run_store_command<R: WorkItemRepository>(
    service: &WorkItemService<R>,
    command: StoreCommand,
    owner_id: &str,
    today: NaiveDate,
) -> CliResult<Value> {
    let output = match command {
        StoreCommand::Record(args) => {
            let item = NewWorkItem {
                content: args.content,
                project_name: args.project,
                due_date: args.due,
                start_date: args.start,
                priority: args.priority,
                status: args.status,
                tags: args.tags,
                ..NewWorkItem::new(args.item_type, args.summary)
            };
            json!({ "id": service.record(owner_id, &item)? })
        }
        StoreCommand::Query(args) => {
            let filter = QueryFilter {
                item_id: args.id,
                project_name: args.project,
                item_type: args.item_type,
                status: args.status,
                keyword: args.keyword,
                time_range: args.time_range,
            };
            serde_json::to_value(service.query(owner_id, &filter, today)?)?
        }
        StoreCommand::Ask { text } => serde_json::to_value(service.smart_query(owner_id, &text, today)?)?,
        StoreCommand::Update(args) => {
            let request = UpdateRequest {
                user_input: args.input,
                item_id: args.id,
                keyword: args.keyword,
                time_context: args.time_context,
                changes: WorkItemChanges {
                    status: args.status,
                    due_date: args.due,
                    priority: args.priority,
                    summary: args.summary,
                    content: args.content,
                },
            };
            match service.update(owner_id, &request, today)? {
                UpdateOutcome::Updated(id) => json!({ "status": "updated", "id": id }),
                UpdateOutcome::NoChanges => json!({ "status": "no_changes" }),
            }
        }
        StoreCommand::Health => {
            service.health()?;
            json!({ "status": "ok" })
        }
    };
    Ok(output)
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `name=value`, got `{raw}`"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}
