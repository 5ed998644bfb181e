//! Record Loader (Remote Table) for the Airtable REST API.
//!
//! `GET {api_url}/v0/{base}/{table}` returns pages of
//! `{"records": [...], "offset": "..."}`. The loader follows `offset` until a
//! page arrives without one. 429, 5xx, and transport failures are retried
//! per [`RetryPolicy`]; auth and not-found responses fail immediately.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use airsync_core::{
    timestamp::parse_timestamp, ApiKey, FieldMapping, Identifier, Record, RecordError, RecordSet,
    SyncConfig,
};

use crate::error::LoadError;
use crate::retry::RetryPolicy;

/// Airtable's maximum page size.
pub const PAGE_SIZE: &str = "100";

/// Airtable reports a missing table (or one the token cannot see) as 403.
const MODEL_NOT_FOUND: &str = "INVALID_PERMISSIONS_OR_MODEL_NOT_FOUND";

const USER_AGENT: &str = concat!("airsync/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListRecordsPage {
    #[serde(default)]
    records: Vec<AirtableRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirtableRecord {
    id: String,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking Airtable list-records client.
#[derive(Debug)]
pub struct AirtableClient {
    agent: ureq::Agent,
    api_url: String,
    api_key: ApiKey,
    retry: RetryPolicy,
}

impl AirtableClient {
    /// `api_url` is the API root, e.g. `https://api.airtable.com`.
    pub fn new(
        api_url: impl Into<String>,
        api_key: ApiKey,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key,
            retry,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.timeout,
            RetryPolicy::from(&config.retry),
        )
    }

    /// Fetch every record of `table` in `base`, following pagination.
    pub fn fetch_all(
        &self,
        base: &str,
        table: &str,
        fields: &FieldMapping,
    ) -> Result<RecordSet, LoadError> {
        let url = format!(
            "{}/v0/{}/{}",
            self.api_url,
            urlencoding::encode(base),
            urlencoding::encode(table)
        );

        let mut set = RecordSet::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();
        let mut pages = 0u32;
        let mut skipped = 0usize;

        loop {
            let page = self.fetch_page(&url, base, table, cursor.as_deref())?;
            pages += 1;
            tracing::debug!(table, page = pages, records = page.records.len(), "fetched Airtable page");

            for raw in page.records {
                let record_id = raw.id.clone();
                match to_record(raw, fields, table)? {
                    Some(record) => set
                        .insert(record)
                        .map_err(|source| record_err(table, &record_id, source))?,
                    None => skipped += 1,
                }
            }

            match page.offset {
                Some(next) if !next.is_empty() => {
                    if !seen_cursors.insert(next.clone()) {
                        return Err(LoadError::Decode {
                            table: table.to_string(),
                            message: format!("pagination cursor '{next}' repeated"),
                        });
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        tracing::info!(table, pages, records = set.len(), skipped, "loaded Airtable records");
        Ok(set)
    }

    fn fetch_page(
        &self,
        url: &str,
        base: &str,
        table: &str,
        cursor: Option<&str>,
    ) -> Result<ListRecordsPage, LoadError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let mut request = self
                .agent
                .get(url)
                .set("Authorization", &format!("Bearer {}", self.api_key.expose()))
                .query("pageSize", PAGE_SIZE);
            if let Some(cursor) = cursor {
                request = request.query("offset", cursor);
            }

            let (message, retry_after) = match request.call() {
                // A body cut short by the network is retried like a transport error.
                Ok(response) => match response.into_string() {
                    Ok(body) => {
                        return serde_json::from_str::<ListRecordsPage>(&body).map_err(|e| {
                            LoadError::Decode {
                                table: table.to_string(),
                                message: e.to_string(),
                            }
                        });
                    }
                    Err(e) => (format!("reading response body: {e}"), None),
                },
                Err(ureq::Error::Status(status, response)) => {
                    let retry_after = retry_after(&response);
                    let body = response.into_string().unwrap_or_default();
                    let (kind, message) = airtable_error(&body);
                    match classify(status, kind.as_deref()) {
                        StatusClass::Auth => {
                            return Err(LoadError::Auth {
                                table: table.to_string(),
                                status,
                                message,
                            })
                        }
                        StatusClass::NotFound => {
                            return Err(LoadError::NotFound {
                                base: base.to_string(),
                                table: table.to_string(),
                                status,
                                message,
                            })
                        }
                        StatusClass::Fatal => {
                            return Err(LoadError::Remote {
                                table: table.to_string(),
                                status,
                                message,
                            })
                        }
                        StatusClass::Retryable => (format!("HTTP {status}: {message}"), retry_after),
                    }
                }
                Err(ureq::Error::Transport(transport)) => (transport.to_string(), None),
            };

            if attempt >= self.retry.max_attempts {
                return Err(LoadError::Transient {
                    table: table.to_string(),
                    attempts: attempt,
                    message,
                });
            }

            let wait = self.retry.delay_for(attempt - 1, retry_after);
            tracing::warn!(
                table,
                attempt,
                max_attempts = self.retry.max_attempts,
                wait_ms = wait.as_millis() as u64,
                error = %message,
                "retrying Airtable request"
            );
            thread::sleep(wait);
        }
    }
}

// ---------------------------------------------------------------------------
// Response classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Auth,
    NotFound,
    Retryable,
    Fatal,
}

fn classify(status: u16, kind: Option<&str>) -> StatusClass {
    match status {
        403 if kind == Some(MODEL_NOT_FOUND) => StatusClass::NotFound,
        401 | 403 => StatusClass::Auth,
        404 => StatusClass::NotFound,
        429 | 500..=599 => StatusClass::Retryable,
        _ => StatusClass::Fatal,
    }
}

/// Extract `(type, message)` from `{"error": {...}}` or `{"error": "TYPE"}`.
fn airtable_error(body: &str) -> (Option<String>, String) {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    match parsed.get("error") {
        Some(Value::Object(obj)) => {
            let kind = obj.get("type").and_then(Value::as_str).map(str::to_string);
            let message = obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| kind.clone())
                .unwrap_or_else(|| "no error message".to_string());
            (kind, message)
        }
        Some(Value::String(kind)) => (Some(kind.clone()), kind.clone()),
        _ => {
            let snippet = body.trim();
            if snippet.is_empty() {
                (None, "empty response body".to_string())
            } else {
                (None, snippet.chars().take(200).collect())
            }
        }
    }
}

fn retry_after(response: &ureq::Response) -> Option<Duration> {
    response
        .header("retry-after")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

// ---------------------------------------------------------------------------
// Record mapping
// ---------------------------------------------------------------------------

fn record_err(table: &str, record_id: &str, source: RecordError) -> LoadError {
    LoadError::Record {
        source_name: format!("Airtable table '{table}'"),
        location: format!("record {record_id}"),
        source,
    }
}

/// Map one Airtable record. Records without an identifier are skipped.
fn to_record(
    raw: AirtableRecord,
    fields: &FieldMapping,
    table: &str,
) -> Result<Option<Record>, LoadError> {
    let identifier = match raw.fields.get(&fields.identifier) {
        Some(Value::String(s)) => Identifier::parse(s).ok(),
        _ => None,
    };
    let Some(identifier) = identifier else {
        tracing::warn!(table, record = %raw.id, "skipping Airtable record without identifier");
        return Ok(None);
    };

    let updated_at = match raw.fields.get(&fields.timestamp) {
        Some(Value::String(s)) => parse_timestamp(s),
        Some(Value::Null) | None => Err(RecordError::MissingTimestamp),
        Some(other) => Err(RecordError::InvalidTimestamp {
            value: other.to_string(),
        }),
    }
    .map_err(|source| record_err(table, &raw.id, source))?;

    let mut record = Record::new(identifier, updated_at);
    for name in &fields.passthrough {
        if let Some(text) = raw.fields.get(name).and_then(field_text) {
            record = record.with_field(name.as_str(), text);
        }
    }
    Ok(Some(record))
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
