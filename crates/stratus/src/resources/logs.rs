//! Log queries against instances and services.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Error;
use crate::rest::ResourceClient;
use crate::types::Field;

/// Response header carrying the token for the next page of results.
pub const PAGE_TOKEN_HEADER: &str = "X-Log-Page-Token";

/// Facade for the `logs/` endpoint.
#[derive(Clone, Debug)]
pub struct Logs {
    rest: ResourceClient,
}

/// A single log line.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<String>,
    #[serde(
        rename = "@timestamp",
        default,
        skip_serializing_if = "Field::is_absent"
    )]
    pub timestamp: Field<String>,
    #[serde(rename = "log", default, skip_serializing_if = "Field::is_absent")]
    pub message: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub stream: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub tag: Field<String>,
}

/// One page of a log query. Immutable once returned.
#[derive(Clone, Debug, Default)]
pub struct LogPage {
    /// Log lines in server order.
    pub records: Vec<LogRecord>,
    /// Token for the following page, absent on the last page.
    pub next_page_token: Option<String>,
}

/// Filters for a log query.
#[derive(Clone, Debug, Default)]
pub struct LogQuery {
    /// Maximum number of lines to return.
    pub size: Option<u32>,
    /// Only lines at or after this timestamp.
    pub after: Option<DateTime<FixedOffset>>,
    /// Only lines before this timestamp.
    pub before: Option<DateTime<FixedOffset>>,
    /// Continuation token from a previous page.
    pub page_token: Option<String>,
}

impl LogQuery {
    fn apply(&self, url: &mut url::Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(size) = self.size {
            pairs.append_pair("size", &size.to_string());
        }
        if let Some(after) = &self.after {
            pairs.append_pair("after", &after.to_rfc3339());
        }
        if let Some(before) = &self.before {
            pairs.append_pair("before", &before.to_rfc3339());
        }
        if let Some(token) = &self.page_token {
            pairs.append_pair("page_token", token);
        }
    }
}

impl Logs {
    pub(crate) fn new(rest: ResourceClient) -> Self {
        Self { rest }
    }

    /// Query log lines across all services of an instance.
    #[instrument(skip(self, query))]
    pub async fn list_by_instance(
        &self,
        instance_url: &str,
        query: &LogQuery,
    ) -> Result<LogPage, Error> {
        self.list("instance", instance_url, query).await
    }

    /// Query log lines of a single service.
    #[instrument(skip(self, query))]
    pub async fn list_by_service(
        &self,
        service_url: &str,
        query: &LogQuery,
    ) -> Result<LogPage, Error> {
        self.list("service", service_url, query).await
    }

    async fn list(&self, filter: &str, target: &str, query: &LogQuery) -> Result<LogPage, Error> {
        let mut url = self.rest.endpoint("logs/");
        url.query_pairs_mut().append_pair(filter, target);
        query.apply(&mut url);

        let (records, meta) = self.rest.get::<Vec<LogRecord>>(url).await?;
        Ok(LogPage {
            records,
            next_page_token: meta.header(PAGE_TOKEN_HEADER).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_reads_renamed_keys() {
        let record: LogRecord = serde_json::from_value(json!({
            "id": "1",
            "@timestamp": "2026-08-27T10:00:00+00:00",
            "log": "booted",
            "stream": "stdout"
        }))
        .unwrap();
        assert_eq!(record.message, Field::Value("booted".into()));
        assert_eq!(
            record.timestamp,
            Field::Value("2026-08-27T10:00:00+00:00".into())
        );
        assert_eq!(record.tag, Field::Absent);
    }

    #[test]
    fn query_appends_rfc3339_bounds() {
        let after = DateTime::parse_from_rfc3339("2026-08-27T10:00:00+02:00").unwrap();
        let query = LogQuery {
            size: Some(100),
            after: Some(after),
            ..LogQuery::default()
        };
        let mut url = url::Url::parse("https://api.stratus.run/logs/").unwrap();
        query.apply(&mut url);
        let query_string = url.query().unwrap();
        assert!(query_string.contains("size=100"));
        assert!(query_string.contains("after=2026-08-27T10"));
    }
}
