#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Operator CLI for nephro coach lab reports.
//!
//! ```text
//! nephro_coach_cli extract <pdf>
//! nephro_coach_cli import <pdf>
//! nephro_coach_cli history [--limit 20]
//! nephro_coach_cli bmi
//! ```
//!
//! `extract` runs the lab report pipeline without touching the database.
//! The other commands use the same `SQLite` database as the server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nephro_coach_database::db::{DEFAULT_DB_PATH, open_db};
use nephro_coach_database::{Collection, queries};
use nephro_coach_report_models::{BmiRecord, PatientRecord, StoredRecord};
use nephro_coach_server_models::{ApiBmiRecord, ApiPatientRecord, ApiPatientSummary};

#[derive(Parser)]
#[command(
    name = "nephro_coach_cli",
    about = "Extract, import and list nephro coach lab reports"
)]
struct Cli {
    /// Path to the records `SQLite` database
    #[arg(long, global = true, default_value = DEFAULT_DB_PATH)]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a patient record from a lab report and print it as JSON
    Extract {
        /// Lab report PDF
        pdf: PathBuf,
    },
    /// Extract a patient record from a lab report and store it
    Import {
        /// Lab report PDF
        pdf: PathBuf,
    },
    /// List stored patient records, most recent first
    History {
        /// Maximum number of records to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print stored BMI records as JSON
    Bmi,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { pdf } => {
            let record = extract(pdf).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Import { pdf } => {
            let record = extract(pdf.clone()).await?;
            let db = open_db(&cli.database).await?;
            let id = queries::insert(db.as_ref(), Collection::PatientRecords, &record).await?;

            log::info!("Imported {} as patient record {id}", pdf.display());

            let doc = ApiPatientRecord::from(StoredRecord { id, record });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Commands::History { limit } => {
            let db = open_db(&cli.database).await?;
            let records: Vec<StoredRecord<PatientRecord>> =
                queries::find_all(db.as_ref(), Collection::PatientRecords).await?;

            if records.is_empty() {
                println!("No patient history found.");
                return Ok(());
            }

            println!("{:<6} {:<24} {:<14} {:<24} RESULTS", "ID", "NAME", "AGE", "TESTED");
            println!("{}", "-".repeat(100));

            for stored in records.iter().rev().take(limit) {
                let summary = ApiPatientSummary::from(&stored.record);
                println!(
                    "{:<6} {:<24} {:<14} {:<24} {}",
                    stored.id,
                    truncate(&summary.patient_name, 24),
                    summary.patient_age,
                    summary.test_date_time,
                    summary.result
                );
            }

            println!(
                "\n{} of {} record(s)",
                records.len().min(limit),
                records.len()
            );
        }
        Commands::Bmi => {
            let db = open_db(&cli.database).await?;
            let records: Vec<StoredRecord<BmiRecord>> =
                queries::find_all(db.as_ref(), Collection::BmiRecords).await?;

            let docs: Vec<ApiBmiRecord> = records.into_iter().map(ApiBmiRecord::from).collect();
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
    }

    Ok(())
}

/// Runs the lab report pipeline on a blocking thread.
async fn extract(pdf: PathBuf) -> Result<PatientRecord, Box<dyn std::error::Error>> {
    log::debug!("Extracting {}", pdf.display());
    let record = tokio::task::spawn_blocking(move || nephro_coach_pdf::process_report_file(&pdf))
        .await??;
    Ok(record)
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let kept: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        value.to_string()
    }
}
