//! Record writer
//!
//! Owns the (optional) store handle and performs single-record inserts with
//! one fallback retry when the store rejects an unknown column.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{SupabaseConfig, load_dotenv};
use crate::record::{FALLBACK_DROPPED_FIELD, Record, without_field};
use crate::store::{InsertResult, StoreError, TableStore};
use crate::supabase_client::SupabaseClient;

/// Why an insert did not produce a result
#[derive(Debug, Error)]
pub enum InsertFailure {
    /// The store rejected the record
    #[error(transparent)]
    Store(StoreError),
    /// The blocking worker panicked or was cancelled
    #[error("insert task failed: {0}")]
    Worker(String),
}

impl InsertFailure {
    fn is_missing_column(&self) -> bool {
        match self {
            InsertFailure::Store(e) => e.is_missing_column(),
            InsertFailure::Worker(_) => false,
        }
    }
}

/// Detailed result of `RecordWriter::try_insert_record`
#[derive(Debug)]
pub enum InsertOutcome {
    /// Writer has no store handle; nothing was sent
    Skipped,
    Inserted {
        result: InsertResult,
        /// True when the record only went through on the fallback attempt
        retried: bool,
    },
    Failed {
        error: InsertFailure,
        retried: bool,
    },
}

impl InsertOutcome {
    /// Collapse to the plain optional payload
    pub fn into_result(self) -> Option<InsertResult> {
        match self {
            InsertOutcome::Inserted { result, .. } => Some(result),
            InsertOutcome::Skipped | InsertOutcome::Failed { .. } => None,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// Writes single records to a remote table.
///
/// Built once; if no store could be set up, every insert is skipped for the
/// lifetime of the writer.
#[derive(Clone)]
pub struct RecordWriter {
    store: Option<Arc<dyn TableStore>>,
}

impl RecordWriter {
    /// Create a writer from optional config
    pub fn new(config: Option<SupabaseConfig>) -> Self {
        let Some(config) = config else {
            warn!(
                "[supabase] SUPABASE_URL or SUPABASE_KEY not found in environment; supabase inserts disabled."
            );
            return Self::disabled();
        };

        match SupabaseClient::new(&config) {
            Ok(client) => {
                info!("[supabase] Client configured for {}", client.base_url());
                Self::with_store(Arc::new(client))
            }
            Err(e) => {
                error!("[supabase] Failed to create client, supabase inserts disabled: {}", e);
                Self::disabled()
            }
        }
    }

    /// Load `.env`, then build from `SUPABASE_URL` / `SUPABASE_KEY`
    pub fn from_env() -> Self {
        load_dotenv();
        Self::new(SupabaseConfig::from_env())
    }

    /// Writer over an arbitrary store
    pub fn with_store(store: Arc<dyn TableStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Insert `record` into `table`.
    ///
    /// Never fails: a disabled writer, a rejected insert and a failed retry all
    /// come back as `None`. Use `try_insert_record` to tell them apart.
    pub async fn insert_record(&self, table: &str, record: Record) -> Option<InsertResult> {
        self.try_insert_record(table, record).await.into_result()
    }

    /// Insert `record` into `table`, reporting what happened
    pub async fn try_insert_record(&self, table: &str, record: Record) -> InsertOutcome {
        let Some(store) = &self.store else {
            warn!("[supabase] Skipping insert (no client): {}", display_record(&record));
            return InsertOutcome::Skipped;
        };

        let record = Arc::new(record);
        let first = run_insert(store.clone(), table, record.clone()).await;
        let error = match first {
            Ok(result) => {
                info!("[supabase] Inserted record into {}: {}", table, display_record(&record));
                return InsertOutcome::Inserted { result, retried: false };
            }
            Err(e) => e,
        };

        warn!("[supabase] Insert failed: {}", error);
        if !error.is_missing_column() {
            return InsertOutcome::Failed { error, retried: false };
        }

        // single fallback attempt, sent even when there was nothing to drop
        let fallback = Arc::new(without_field(&record, FALLBACK_DROPPED_FIELD));
        match run_insert(store.clone(), table, fallback.clone()).await {
            Ok(result) => {
                info!(
                    "[supabase] Inserted record into {} after dropping {}: {}",
                    table,
                    FALLBACK_DROPPED_FIELD,
                    display_record(&fallback)
                );
                InsertOutcome::Inserted { result, retried: true }
            }
            Err(e) => {
                warn!("[supabase] Insert retry failed: {}", e);
                InsertOutcome::Failed { error: e, retried: true }
            }
        }
    }
}

/// Run the blocking insert on tokio's blocking pool
async fn run_insert(
    store: Arc<dyn TableStore>,
    table: &str,
    record: Arc<Record>,
) -> Result<InsertResult, InsertFailure> {
    let table = table.to_string();
    tokio::task::spawn_blocking(move || store.insert(&table, &record))
        .await
        .map_err(|e| InsertFailure::Worker(e.to_string()))?
        .map_err(InsertFailure::Store)
}

fn display_record(record: &Record) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| format!("{:?}", record))
}
