//! Supabase record writer
//!
//! Thin adapter for persisting single records into a Supabase table. The
//! writer reads its credentials once, runs disabled when they are missing,
//! and retries once without the `confidence` field when the table rejects an
//! unknown column.

pub mod config;
pub mod record;
pub mod store;
pub mod supabase_client;
pub mod writer;

// Re-export commonly used types
pub use config::{SupabaseConfig, config_from_dotenv_file, load_dotenv, load_dotenv_from};
pub use record::{FALLBACK_DROPPED_FIELD, Record, record_from_value, without_field};
pub use store::{InsertResult, StoreError, TableStore, is_missing_column_error};
pub use supabase_client::SupabaseClient;
pub use writer::{InsertFailure, InsertOutcome, RecordWriter};
