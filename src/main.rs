use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tripsplit::application::report::TripReportService;
use tripsplit::domain::ids::TripId;
use tripsplit::domain::ports::ExpenseStore;
use tripsplit::infrastructure::in_memory::{InMemoryDirectory, InMemoryExpenseStore};
use tripsplit::interfaces::csv::expense_reader::ExpenseReader;
use tripsplit::interfaces::csv::participant_reader::ParticipantReader;
use tripsplit::interfaces::csv::report_writer::ReportWriter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    /// Payments that settle every balance
    Settlements,
    /// Net balance per participant
    Balances,
    /// Total and self spending per participant
    Summary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input expenses CSV file
    input: PathBuf,

    /// Optional `id,name` CSV used to display participant names
    #[arg(long)]
    participants: Option<PathBuf>,

    /// Trip to report on. Required when the input holds more than one trip.
    #[arg(long)]
    trip: Option<String>,

    #[arg(long, value_enum, default_value_t = ReportKind::Settlements)]
    report: ReportKind,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Load expenses
    let store = InMemoryExpenseStore::new();
    let file = File::open(&cli.input).into_diagnostic()?;
    for expense in ExpenseReader::new(file).expenses().into_diagnostic()? {
        store.store(expense).await.into_diagnostic()?;
    }

    // Load display names
    let directory = InMemoryDirectory::new();
    if let Some(path) = &cli.participants {
        let file = File::open(path).into_diagnostic()?;
        for row in ParticipantReader::new(file).participants() {
            let row = row.into_diagnostic()?;
            directory.register(row.id, row.name).await;
        }
    }

    let trip = match cli.trip {
        Some(trip) => TripId::new(trip),
        None => {
            let trips = store.trips().await;
            match trips.as_slice() {
                [only] => only.clone(),
                [] => return Err(miette!("No expense records found in {}", cli.input.display())),
                _ => {
                    let listed: Vec<&str> = trips.iter().map(TripId::as_str).collect();
                    return Err(miette!(
                        "Input holds several trips ({}); pick one with --trip",
                        listed.join(", ")
                    ));
                }
            }
        }
    };
    tracing::info!(%trip, report = ?cli.report, "building trip report");

    let service = TripReportService::new(Arc::new(store), Arc::new(directory));

    // stdout is only locked once the report is ready
    match cli.report {
        ReportKind::Settlements | ReportKind::Balances => {
            let report = service.settlement_report(&trip).await.into_diagnostic()?;
            let mut out = io::stdout().lock();
            match (cli.format, cli.report) {
                (OutputFormat::Json, _) => write_json(&mut out, &report)?,
                (OutputFormat::Csv, ReportKind::Balances) => ReportWriter::new(&mut out)
                    .write_balances(&report)
                    .into_diagnostic()?,
                (OutputFormat::Csv, _) => ReportWriter::new(&mut out)
                    .write_settlements(&report)
                    .into_diagnostic()?,
            }
        }
        ReportKind::Summary => {
            let report = service.spending_report(&trip).await.into_diagnostic()?;
            let mut out = io::stdout().lock();
            match cli.format {
                OutputFormat::Json => write_json(&mut out, &report)?,
                OutputFormat::Csv => ReportWriter::new(&mut out)
                    .write_spending(&report)
                    .into_diagnostic()?,
            }
        }
    }

    Ok(())
}

fn write_json<W: Write, T: Serialize>(out: &mut W, report: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).into_diagnostic()?;
    writeln!(out).into_diagnostic()
}
