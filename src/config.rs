//! Configuration module for the supabase writer
//!
//! Credentials come from `SUPABASE_URL` / `SUPABASE_KEY`, optionally seeded
//! from a local `.env` file. Missing credentials are not an error: the caller
//! gets `None` and the writer runs disabled.

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Environment variable holding the project endpoint
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the access key
pub const SUPABASE_KEY_VAR: &str = "SUPABASE_KEY";

/// Supabase connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL (e.g., "https://abc.supabase.co")
    pub url: String,
    /// Service or anon key
    pub key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }

    /// Read the config from the process environment
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the config through an arbitrary lookup.
    ///
    /// Returns `None` when either value is missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = non_blank(lookup(SUPABASE_URL_VAR))?;
        let key = non_blank(lookup(SUPABASE_KEY_VAR))?;
        Some(Self { url, key })
    }
}

// values are kept as given; whitespace only decides emptiness
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// keep the key out of logs
impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"***")
            .finish()
    }
}

/// Load `.env` from the current directory or a parent, if there is one.
///
/// Variables already set in the environment win. A missing file is fine.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => debug!("Ignoring unreadable .env file: {}", e),
    }
}

/// Load a specific env file, failing if it exists but cannot be parsed
pub fn load_dotenv_from<P: AsRef<Path>>(path: P) -> Result<()> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(()) => {
            debug!("Loaded environment from {:?}", path.as_ref());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).context(format!("Failed to load env file: {:?}", path.as_ref())),
    }
}

/// Parse an env file into a config without touching the process environment
pub fn config_from_dotenv_file<P: AsRef<Path>>(path: P) -> Result<Option<SupabaseConfig>> {
    let entries = dotenvy::from_path_iter(path.as_ref())
        .context(format!("Failed to open env file: {:?}", path.as_ref()))?
        .collect::<std::result::Result<Vec<(String, String)>, _>>()
        .context(format!("Failed to parse env file: {:?}", path.as_ref()))?;

    Ok(SupabaseConfig::from_lookup(|name| {
        entries
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }))
}
