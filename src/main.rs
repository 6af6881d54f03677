use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::{PgPool, PgPoolOptions};

mod badge;
mod config;
mod dashboard;
mod db;
mod error;
mod filter;
mod models;
mod notify;
mod report;
mod seed;
mod store;
mod table;
mod transition;
mod views;

use badge::Classify;
use config::Config;
use error::AdminError;
use filter::{EventFilter, Query, Selector, StatusFilter, UserFilter};
use models::{EventStatus, EventType, UserRole, VerificationStatus};
use notify::Notification;
use store::{ActionRequest, Directory};
use table::{Column, Identified, RenderedTable, Table};
use transition::{Action, TargetKind};
use views::Detail;

#[derive(Parser)]
#[command(name = "admin-console")]
#[command(about = "Verification and moderation console for the Group Scholar platform", long_about = None)]
struct Cli {
    /// Output format for tables and detail views
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
    Csv,
}

#[derive(clap::Args)]
struct ListArgs {
    /// Case-insensitive search over names, emails and related fields
    #[arg(long)]
    query: Option<String>,
    #[arg(long, value_enum)]
    status: Option<VerificationStatus>,
    /// Open the detail view of one record
    #[arg(long)]
    show: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List institutions
    Institutions(ListArgs),
    /// List students
    Students(ListArgs),
    /// List counselors
    Counselors(ListArgs),
    /// List platform users
    Users {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long, value_enum)]
        role: Option<UserRole>,
    },
    /// List events
    Events {
        #[arg(long)]
        query: Option<String>,
        #[arg(long, value_enum)]
        status: Option<EventStatus>,
        #[arg(long = "type", value_enum)]
        event_type: Option<EventType>,
        /// Only events on this day (YYYY-MM-DD)
        #[arg(long)]
        on: Option<NaiveDate>,
        #[arg(long)]
        show: Option<String>,
    },
    /// Apply an admin action to one record
    Act {
        #[arg(value_enum)]
        kind: TargetKind,
        id: String,
        #[arg(value_enum)]
        action: Action,
        /// Refuse the action unless the record is still at this generation
        #[arg(long)]
        expect_generation: Option<i64>,
        /// Name recorded on the activity entry
        #[arg(long)]
        by: Option<String>,
    },
    /// Show the activity feed, newest first
    Activity {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show platform statistics and chart series
    Dashboard,
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Create or upgrade the database schema
    InitDb,
    /// Load the built-in dataset into the database
    Seed,
    /// Import records of one kind from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: TargetKind,
        #[arg(long)]
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = match &config.database_url {
        Some(database_url) => Some(
            PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?,
        ),
        None => None,
    };
    let format = cli.format;

    match cli.command {
        Commands::InitDb => {
            db::init_db(require_pool(&pool)?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let directory = seed::directory()?;
            let inserted = db::seed(require_pool(&pool)?, &directory).await?;
            println!("Seed data inserted ({inserted} new rows).");
        }
        Commands::Import { kind, csv } => {
            let inserted = db::import_csv(require_pool(&pool)?, kind, &csv).await?;
            println!("Inserted {inserted} {kind} records from {}.", csv.display());
        }
        Commands::Institutions(args) => {
            let directory = load(pool.as_ref()).await?;
            let filter = status_filter(&args);
            let kept = filter::apply(directory.institutions.as_slice(), &filter, &directory);
            list(
                directory.institutions.as_slice(),
                kept,
                views::institution_columns(),
                args.show.as_deref(),
                TargetKind::Institution,
                views::institution_detail,
                format,
            )?;
        }
        Commands::Students(args) => {
            let directory = load(pool.as_ref()).await?;
            let filter = status_filter(&args);
            let kept = filter::apply(directory.students.as_slice(), &filter, &directory);
            list(
                directory.students.as_slice(),
                kept,
                views::student_columns(&directory),
                args.show.as_deref(),
                TargetKind::Student,
                |student| views::student_detail(student, &directory),
                format,
            )?;
        }
        Commands::Counselors(args) => {
            let directory = load(pool.as_ref()).await?;
            let filter = status_filter(&args);
            let kept = filter::apply(directory.counselors.as_slice(), &filter, &directory);
            list(
                directory.counselors.as_slice(),
                kept,
                views::counselor_columns(&directory),
                args.show.as_deref(),
                TargetKind::Counselor,
                |counselor| views::counselor_detail(counselor, &directory),
                format,
            )?;
        }
        Commands::Users { list: args, role } => {
            let directory = load(pool.as_ref()).await?;
            let filter = UserFilter {
                query: query(args.query.as_deref()),
                status: Selector::from(args.status),
                role: Selector::from(role),
            };
            let kept = filter::apply(directory.users.as_slice(), &filter, &directory);
            list(
                directory.users.as_slice(),
                kept,
                views::user_columns(),
                args.show.as_deref(),
                TargetKind::User,
                views::user_detail,
                format,
            )?;
        }
        Commands::Events {
            query: search,
            status,
            event_type,
            on,
            show,
        } => {
            let directory = load(pool.as_ref()).await?;
            let filter = EventFilter {
                query: query(search.as_deref()),
                status: Selector::from(status),
                event_type: Selector::from(event_type),
            };
            if on.is_some() && (search.is_some() || status.is_some() || event_type.is_some()) {
                log::info!("--on shows the whole day; query, status and type filters are ignored");
            }
            let kept = filter::event_listing(directory.events.as_slice(), &filter, on, &directory);
            if let Some(day) = on {
                if kept.is_empty() && show.is_none() && format == OutputFormat::Text {
                    let dates: Vec<String> = filter::event_dates(directory.events.as_slice())
                        .iter()
                        .map(NaiveDate::to_string)
                        .collect();
                    println!("No events on {day}. Days with events: {}", dates.join(", "));
                    return Ok(());
                }
            }
            list(
                directory.events.as_slice(),
                kept,
                views::event_columns(&directory),
                show.as_deref(),
                TargetKind::Event,
                |event| views::event_detail(event, &directory),
                format,
            )?;
        }
        Commands::Act {
            kind,
            id,
            action,
            expect_generation,
            by,
        } => {
            let mut directory = load(pool.as_ref()).await?;
            let performed_by = by.unwrap_or_else(|| config.actor.clone());
            let at = chrono::Local::now().naive_local();
            let request = ActionRequest {
                kind,
                id: &id,
                action,
                expected_generation: expect_generation,
                performed_by: &performed_by,
                at,
            };

            let applied = match directory.apply(&request) {
                Ok(applied) => applied,
                Err(err) => {
                    log::warn!("rejected {action} on {kind} {id}: {err}");
                    println!("{}", Notification::for_failure(kind, action, &err));
                    return Err(err.into());
                }
            };

            if let Some(pool) = &pool {
                if let Err(err) = db::persist(pool, &applied, at).await {
                    log::warn!("could not store {action} on {kind} {id}: {err:#}");
                    println!("{}", Notification::for_failure(kind, action, &err));
                    return Err(err);
                }
            }

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&applied)?),
                _ => println!("{}", Notification::for_applied(&applied)),
            }
        }
        Commands::Activity { limit } => {
            let directory = load(pool.as_ref()).await?;
            let entries = directory.recent_activity(limit);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
                _ if entries.is_empty() => println!("No activity recorded."),
                _ => {
                    for entry in entries {
                        println!(
                            "{}  {:<11} {:<24} {} ({} {}) by {}",
                            entry.timestamp.format("%Y-%m-%d %H:%M"),
                            entry.badge().label,
                            entry.action,
                            entry.entity_name,
                            entry.entity_kind.badge().label,
                            entry.entity_id,
                            entry.performed_by
                        );
                        if let Some(details) = &entry.details {
                            println!("    {details}");
                        }
                    }
                }
            }
        }
        Commands::Dashboard => {
            let directory = load(pool.as_ref()).await?;
            let overview = dashboard::overview(&directory, 5);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&overview)?),
                _ => print_overview(&overview),
            }
        }
        Commands::Report { out } => {
            let directory = load(pool.as_ref()).await?;
            let report = report::build_report(&directory, chrono::Local::now().date_naive());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn require_pool(pool: &Option<PgPool>) -> anyhow::Result<&PgPool> {
    pool.as_ref()
        .context("DATABASE_URL must be set to a Postgres instance for this command")
}

async fn load(pool: Option<&PgPool>) -> anyhow::Result<Directory> {
    let directory = match pool {
        Some(pool) => {
            log::info!("loading directory from Postgres");
            db::load_directory(pool).await?
        }
        None => {
            log::warn!("DATABASE_URL not set; using the built-in dataset, changes are not saved");
            seed::directory()?
        }
    };
    for (kind, id) in directory.dangling_references() {
        log::warn!("{kind} {id} references an unknown institution");
    }
    Ok(directory)
}

fn query(raw: Option<&str>) -> Query {
    raw.map(Query::new).unwrap_or_default()
}

fn status_filter(args: &ListArgs) -> StatusFilter {
    StatusFilter {
        query: query(args.query.as_deref()),
        status: Selector::from(args.status),
    }
}

fn list<T: Identified>(
    records: &[T],
    kept: Vec<&T>,
    columns: Vec<Column<'_, T>>,
    show: Option<&str>,
    kind: TargetKind,
    detail: impl Fn(&T) -> Detail,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let Some(id) = show else {
        let table = Table::new(columns);
        return print_table(&table.project(kept), format);
    };

    let mut opened = None;
    let mut table = Table::new(columns).on_row_click(|record: &T| opened = Some(detail(record)));
    let clicked = table.click(records, id);
    drop(table);

    match opened {
        Some(detail) if clicked => print_detail(&detail, format),
        _ => Err(AdminError::NotFound {
            kind,
            id: id.to_string(),
        }
        .into()),
    }
}

fn print_table(rendered: &RenderedTable, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text if rendered.is_empty() => println!("No records match."),
        OutputFormat::Text => print!("{}", rendered.to_text()),
        OutputFormat::Markdown => print!("{}", rendered.to_markdown()),
        OutputFormat::Json => println!("{}", rendered.to_json()?),
        OutputFormat::Csv => print!("{}", rendered.to_csv()?),
    }
    Ok(())
}

fn print_detail(detail: &Detail, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", views::detail_json(detail)?),
        OutputFormat::Markdown => {
            for (label, value) in detail {
                println!("- **{label}**: {value}");
            }
        }
        OutputFormat::Text | OutputFormat::Csv => println!("{}", views::format_detail(detail)),
    }
    Ok(())
}

fn print_overview(overview: &dashboard::Overview) {
    let stats = &overview.stats;
    println!("Institutions: {}", stats.total_institutions);
    println!("Students: {}", stats.total_students);
    println!("Counselors: {}", stats.total_counselors);
    println!("Pending verifications: {}", stats.pending_verifications);
    println!("Verified accounts: {}", stats.verified_accounts);
    println!("Rejected accounts: {}", stats.rejected_accounts);

    println!();
    println!("Verification status:");
    for datum in &overview.verification {
        println!("  {:<10} {}", datum.name, datum.value("value").unwrap_or(0));
    }

    println!();
    println!("Institution onboarding:");
    for datum in &overview.onboarding {
        println!("  {:<10} {}", datum.name, datum.value("value").unwrap_or(0));
    }

    println!();
    println!("User growth:");
    for datum in &overview.growth {
        println!(
            "  {:<10} {} students, {} counselors",
            datum.name,
            datum.value("students").unwrap_or(0),
            datum.value("counselors").unwrap_or(0)
        );
    }

    let events = &overview.events;
    println!();
    println!(
        "Events: {} total, {} upcoming, {} ongoing, {} completed",
        events.total, events.upcoming, events.ongoing, events.completed
    );

    println!();
    println!("Recent activity:");
    if overview.recent_activity.is_empty() {
        println!("  none");
    }
    for entry in &overview.recent_activity {
        println!(
            "  {} {}: {} by {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.action,
            entry.entity_name,
            entry.performed_by
        );
    }
}
