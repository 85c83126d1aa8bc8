use anyhow::{Context, Result};
use serde_json::json;
use supabase_record_writer::{InsertOutcome, RecordWriter, record_from_value};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // picks up SUPABASE_URL / SUPABASE_KEY from .env when present
    let writer = RecordWriter::from_env();

    let table = std::env::args().nth(1).unwrap_or_else(|| "events".to_string());
    let record = record_from_value(json!({
        "user_id": "u1",
        "event": "demo_insert",
        "confidence": 0.9,
    }))
    .context("Demo record must be a JSON object")?;

    match writer.try_insert_record(&table, record).await {
        InsertOutcome::Inserted { result, retried } => {
            println!("inserted (status {}, retried: {}): {}", result.status, retried, result.data);
        }
        InsertOutcome::Skipped => {
            println!("writer disabled, nothing sent");
        }
        InsertOutcome::Failed { error, retried } => {
            println!("insert failed (retried: {}): {}", retried, error);
        }
    }

    Ok(())
}
