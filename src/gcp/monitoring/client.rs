//! # Monitoring API Client Logic
//!
//! Runs MQL queries through `projects.timeSeries.query` of the Cloud
//! Monitoring API v3 and collects every page of the result.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::{check_status, encode_path_segment};
use crate::error::{Error, Result};
use crate::gcp::auth::TokenSource;
use crate::gcp::monitoring::types::*;

pub const MONITORING_API_BASE: &str = "https://monitoring.googleapis.com/v3";

pub struct MonitoringClient {
    http: reqwest::Client,
    tokens: Arc<TokenSource>,
    base_url: String,
}

impl MonitoringClient {
    pub async fn connect(http: reqwest::Client, tokens: Arc<TokenSource>) -> Result<Self> {
        tokens.bearer().await?;
        debug!("monitoring client ready");
        Ok(MonitoringClient {
            http,
            tokens,
            base_url: MONITORING_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Runs `query` against `project_id`, following page tokens until the
    /// result is exhausted. An empty result is not an error.
    pub async fn query_time_series(&self, project_id: &str, query: &str) -> Result<Vec<TimeSeriesData>> {
        let fail = |message: String| Error::Query {
            project: project_id.to_string(),
            message,
        };
        let url = query_url(&self.base_url, project_id);

        let mut result = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let body = QueryTimeSeriesRequest {
                query,
                page_token: page_token.as_deref(),
            };
            let res = self
                .http
                .post(&url)
                .header("Authorization", self.tokens.bearer().await?.header_value())
                .json(&body)
                .send()
                .await
                .map_err(|e| fail(format!("could not list time series: {}", e)))?;
            let res = check_status(res)
                .await
                .map_err(|e| fail(format!("could not list time series: {}", e)))?;
            let page: QueryTimeSeriesResponse = res.json().await.map_err(|e| fail(e.to_string()))?;

            for partial in &page.partial_errors {
                warn!(project_id, "partial query error: {}", partial);
            }
            result.extend(page.time_series_data);
            if page.next_page_token.is_empty() {
                break;
            }
            page_token = Some(page.next_page_token);
        }

        debug!(project_id, series = result.len(), "time series query finished");
        Ok(result)
    }
}

fn query_url(base_url: &str, project_id: &str) -> String {
    format!(
        "{}/projects/{}/timeSeries:query",
        base_url.trim_end_matches('/'),
        encode_path_segment(project_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_query_url() {
        assert_eq!(
            query_url(MONITORING_API_BASE, "my-project-id"),
            "https://monitoring.googleapis.com/v3/projects/my-project-id/timeSeries:query"
        );
    }

    #[test]
    fn request_omits_missing_page_token() {
        let first = QueryTimeSeriesRequest {
            query: "fetch gce_instance",
            page_token: None,
        };
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            json!({"query": "fetch gce_instance"})
        );
        let next = QueryTimeSeriesRequest {
            query: "fetch gce_instance",
            page_token: Some("abc"),
        };
        assert_eq!(serde_json::to_value(&next).unwrap()["pageToken"], "abc");
    }

    #[test]
    fn parses_query_pages() {
        let page: QueryTimeSeriesResponse = serde_json::from_value(json!({
            "timeSeriesDescriptor": {
                "labelDescriptors": [{"key": "resource.pod_name"}],
                "pointDescriptors": [{"key": "value_limit_utilization_max", "valueType": "DOUBLE"}]
            },
            "timeSeriesData": [{
                "labelValues": [{"stringValue": "pod-a"}],
                "pointData": [
                    {
                        "values": [{"doubleValue": 0.75}],
                        "timeInterval": {
                            "startTime": "2024-05-01T12:00:00Z",
                            "endTime": "2024-05-01T12:01:00Z"
                        }
                    },
                    {
                        "values": [{"int64Value": "3"}],
                        "timeInterval": {"endTime": "2024-05-01T12:00:00Z"}
                    }
                ]
            }],
            "nextPageToken": "next"
        }))
        .unwrap();

        assert_eq!(page.next_page_token, "next");
        let series = &page.time_series_data[0];
        assert_eq!(series.label_values[0].string_value.as_deref(), Some("pod-a"));
        assert_eq!(series.point_data[0].values[0].as_f64(), Some(0.75));
        assert_eq!(series.point_data[1].values[0].as_f64(), Some(3.0));
        assert!(series.point_data[1].time_interval.start_time.is_none());

        let last: QueryTimeSeriesResponse = serde_json::from_str("{}").unwrap();
        assert!(last.time_series_data.is_empty());
        assert!(last.next_page_token.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn query_smoke() -> anyhow::Result<()> {
        let (Ok(key), Ok(query)) = (
            std::env::var("GOOGLE_SERVICE_ACCOUNT_KEY"),
            std::env::var("MONITORING_TEST_QUERY"),
        ) else {
            eprintln!("GOOGLE_SERVICE_ACCOUNT_KEY or MONITORING_TEST_QUERY not set; skipping");
            return Ok(());
        };
        let tokens = Arc::new(TokenSource::new(key.as_bytes(), vec![])?);
        let project = tokens.project_id().to_string();
        let client = MonitoringClient::connect(reqwest::Client::new(), tokens).await?;
        let _ = client.query_time_series(&project, &query).await?;
        Ok(())
    }
}
