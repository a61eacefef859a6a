use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct QueryTimeSeriesRequest<'a> {
    pub query: &'a str,
    #[serde(rename = "pageToken")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

#[derive(Debug, Deserialize, Default)]
pub struct QueryTimeSeriesResponse {
    #[serde(rename = "timeSeriesDescriptor")]
    #[serde(default)]
    pub time_series_descriptor: Option<Value>,
    #[serde(rename = "timeSeriesData")]
    #[serde(default)]
    pub time_series_data: Vec<TimeSeriesData>,
    #[serde(rename = "nextPageToken")]
    #[serde(default)]
    pub next_page_token: String,
    #[serde(rename = "partialErrors")]
    #[serde(default)]
    pub partial_errors: Vec<Value>,
}

/// One time series: its label values and its points, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TimeSeriesData {
    #[serde(rename = "labelValues")]
    #[serde(default)]
    pub label_values: Vec<LabelValue>,
    #[serde(rename = "pointData")]
    #[serde(default)]
    pub point_data: Vec<PointData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LabelValue {
    #[serde(rename = "boolValue")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
    /// int64 values travel as decimal strings.
    #[serde(rename = "int64Value")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int64_value: Option<String>,
    #[serde(rename = "stringValue")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PointData {
    #[serde(default)]
    pub values: Vec<TypedValue>,
    #[serde(rename = "timeInterval")]
    #[serde(default)]
    pub time_interval: TimeInterval,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TimeInterval {
    #[serde(rename = "startTime")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "endTime")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// A point value. Exactly one field is set by the service.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TypedValue {
    #[serde(rename = "boolValue")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
    #[serde(rename = "int64Value")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int64_value: Option<String>,
    #[serde(rename = "doubleValue")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(rename = "stringValue")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(rename = "distributionValue")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_value: Option<Value>,
}

impl TypedValue {
    /// The numeric reading of a double or int64 value.
    pub fn as_f64(&self) -> Option<f64> {
        if let Some(v) = self.double_value {
            return Some(v);
        }
        self.int64_value.as_deref().and_then(|s| s.parse::<i64>().ok()).map(|v| v as f64)
    }
}
