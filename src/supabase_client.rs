//! Supabase client module
//!
//! Blocking PostgREST client used as the production `TableStore`. Each insert
//! is a `POST {url}/rest/v1/{table}` with the record as the JSON body.

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use crate::config::SupabaseConfig;
use crate::record::Record;
use crate::store::{InsertResult, StoreError, TableStore};

const REST_PATH: &str = "rest/v1";
const APIKEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Error body returned by PostgREST
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Blocking client for a Supabase project's REST endpoint
pub struct SupabaseClient {
    base_url: Url,
    headers: HeaderMap,
    /// Built on first use, from inside the blocking worker
    http: OnceLock<Client>,
}

impl SupabaseClient {
    /// Validate the config and prepare auth headers.
    ///
    /// No network traffic happens here.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let trimmed = config.url.trim().trim_end_matches('/');
        let base_url = Url::parse(&format!("{}/", trimmed))
            .map_err(|e| StoreError::InvalidConfig(format!("bad url {:?}: {}", config.url, e)))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(StoreError::InvalidConfig(format!(
                "url {:?} is not an http(s) endpoint",
                config.url
            )));
        }

        let headers = Self::auth_headers(&config.key)?;

        Ok(Self {
            base_url,
            headers,
            http: OnceLock::new(),
        })
    }

    fn auth_headers(key: &str) -> Result<HeaderMap, StoreError> {
        let invalid = |_| StoreError::InvalidConfig("key is not a valid header value".to_string());

        let mut headers = HeaderMap::new();
        let mut apikey = HeaderValue::from_str(key).map_err(invalid)?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(invalid)?;
        bearer.set_sensitive(true);

        headers.insert(HeaderName::from_static(APIKEY_HEADER), apikey);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Endpoint for inserts into `table`
    pub fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidConfig(format!("cannot extend url {}", self.base_url)))?
            .pop_if_empty()
            .extend(REST_PATH.split('/'))
            .push(table);
        Ok(url)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn http(&self) -> Result<&Client, StoreError> {
        if let Some(client) = self.http.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .default_headers(self.headers.clone())
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build http client: {}", e)))?;
        // a concurrent first use may have won; either client is fine
        Ok(self.http.get_or_init(|| client))
    }

    /// Turn a non-2xx response body into a `StoreError::Api`
    fn api_error(status: u16, body: &str) -> StoreError {
        match serde_json::from_str::<PostgrestError>(body) {
            Ok(parsed) => StoreError::Api {
                status,
                code: parsed.code,
                message: parsed.message.unwrap_or_else(|| body.trim().to_string()),
                details: parsed.details,
                hint: parsed.hint,
            },
            Err(_) => StoreError::Api {
                status,
                code: None,
                message: body.trim().to_string(),
                details: None,
                hint: None,
            },
        }
    }

    fn parse_success(status: u16, body: &str) -> Result<InsertResult, StoreError> {
        let data = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?
        };
        Ok(InsertResult { status, data })
    }
}

impl TableStore for SupabaseClient {
    fn insert(&self, table: &str, record: &Record) -> Result<InsertResult, StoreError> {
        let url = self.table_url(table)?;
        debug!("POST {} ({} fields)", url, record.len());

        let response = self
            .http()?
            .post(url)
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
            .json(record)
            .send()
            .map_err(|e| StoreError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| StoreError::Transport(format!("failed to read response body: {}", e.without_url())))?;

        if status.is_success() {
            Self::parse_success(status.as_u16(), &body)
        } else {
            Err(Self::api_error(status.as_u16(), &body))
        }
    }
}
