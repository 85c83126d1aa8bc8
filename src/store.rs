//! Table store seam
//!
//! This module defines the interface the writer uses to reach a remote table,
//! the success payload, and the error type with its failure classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::record::Record;

/// PostgREST error code for "column not found in the schema cache"
pub const PGRST_UNKNOWN_COLUMN: &str = "PGRST204";

/// Success payload returned by the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertResult {
    /// HTTP status reported by the store
    pub status: u16,
    /// Rows echoed back by the store (`Value::Null` when nothing was returned)
    pub data: Value,
}

/// Errors a table store can report
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid supabase configuration: {0}")]
    InvalidConfig(String),

    #[error("request to supabase failed: {0}")]
    Transport(String),

    #[error("supabase returned {status}: {message}{}", format_context(.code, .details, .hint))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("failed to decode supabase response: {0}")]
    Decode(String),
}

fn format_context(code: &Option<String>, details: &Option<String>, hint: &Option<String>) -> String {
    let mut out = String::new();
    if let Some(code) = code {
        out.push_str(&format!(" (code {})", code));
    }
    if let Some(details) = details {
        out.push_str(&format!(" details: {}", details));
    }
    if let Some(hint) = hint {
        out.push_str(&format!(" hint: {}", hint));
    }
    out
}

impl StoreError {
    /// Whether this error looks like the record carried a column the table lacks
    pub fn is_missing_column(&self) -> bool {
        match self {
            StoreError::Api { code: Some(code), .. } if code == PGRST_UNKNOWN_COLUMN => true,
            StoreError::Api { .. } | StoreError::Transport(_) => is_missing_column_error(&self.to_string()),
            // Decode: the row was already accepted
            StoreError::InvalidConfig(_) | StoreError::Decode(_) => false,
        }
    }
}

/// Text heuristic for unknown-column failures.
///
/// Matches "could not find" or "column" in any case. Kept in one place so it
/// can be swapped for a structured check once the store exposes one.
pub fn is_missing_column_error(description: &str) -> bool {
    let lowered = description.to_lowercase();
    lowered.contains("could not find") || lowered.contains("column")
}

/// A remote table that accepts single-record inserts.
///
/// `insert` is blocking; async callers must run it off the runtime threads.
pub trait TableStore: Send + Sync {
    fn insert(&self, table: &str, record: &Record) -> Result<InsertResult, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: Option<&str>, message: &str) -> StoreError {
        StoreError::Api {
            status: 400,
            code: code.map(str::to_string),
            message: message.to_string(),
            details: None,
            hint: None,
        }
    }

    #[test]
    fn test_heuristic_matches_column_text() {
        assert!(is_missing_column_error(
            "Could not find the 'confidence' column of 'events' in the schema cache"
        ));
        assert!(is_missing_column_error("COLUMN \"confidence\" does not exist"));
        assert!(is_missing_column_error("could not find relation"));
    }

    #[test]
    fn test_heuristic_ignores_other_failures() {
        assert!(!is_missing_column_error("duplicate key value violates unique constraint"));
        assert!(!is_missing_column_error("connection refused"));
        assert!(!is_missing_column_error(""));
    }

    #[test]
    fn test_api_error_display_includes_message_and_code() {
        let err = api_error(Some("23505"), "duplicate key");
        assert_eq!(err.to_string(), "supabase returned 400: duplicate key (code 23505)");

        let err = api_error(None, "bad request");
        assert_eq!(err.to_string(), "supabase returned 400: bad request");
    }

    #[test]
    fn test_is_missing_column_uses_code_and_text() {
        assert!(api_error(Some(PGRST_UNKNOWN_COLUMN), "schema cache miss").is_missing_column());
        assert!(api_error(None, "Could not find the 'x' column").is_missing_column());
        assert!(!api_error(Some("23505"), "duplicate key").is_missing_column());
        assert!(StoreError::Transport("column of doom".into()).is_missing_column());
        assert!(!StoreError::Transport("timed out".into()).is_missing_column());
    }

    #[test]
    fn test_details_and_hint_are_part_of_the_description() {
        let err = StoreError::Api {
            status: 400,
            code: Some("23502".to_string()),
            message: "violates not-null constraint".to_string(),
            details: Some("Failing row contains column user_id".to_string()),
            hint: Some("check the payload".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "supabase returned 400: violates not-null constraint (code 23502) \
             details: Failing row contains column user_id hint: check the payload"
        );
        assert!(err.is_missing_column());

        let hinted = StoreError::Api {
            status: 400,
            code: None,
            message: "bad payload".to_string(),
            details: None,
            hint: Some("Could not find a matching field".to_string()),
        };
        assert!(hinted.is_missing_column());
    }

    #[test]
    fn test_decode_error_never_looks_like_missing_column() {
        let err = StoreError::Decode("expected value at line 1 column 1".to_string());
        assert!(!err.is_missing_column());
        assert!(!StoreError::InvalidConfig("column_url".to_string()).is_missing_column());
    }
}
