//! Work report DTOs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::common::{DateTime, IntBool, User};
use super::project::Task;

/// Report period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub id: i64,
    pub userid: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    pub send_at: Option<DateTime>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub user: Option<User>,
    pub recipient: Vec<User>,
    pub read_status: IntBool,
    pub read_at: Option<DateTime>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub read_users: Vec<ReadUser>,
    pub unread_users: Vec<UnreadUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadUser {
    pub userid: i64,
    pub read_at: Option<DateTime>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnreadUser {
    pub userid: i64,
    pub user: Option<User>,
}

/// A generated report draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportTemplate {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    pub tasks: Vec<Task>,
    pub time_range: TimeRange,
    pub recipient: Vec<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// Unread report counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnreadSummary {
    pub total: i64,
    pub day: i64,
    pub week: i64,
    pub month: i64,
    pub by_type: HashMap<String, i64>,
    pub last_time: Option<DateTime>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportListRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReportKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Time range filter, only honored for received reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportStoreRequest {
    /// Set to edit an existing report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub title: String,
    /// HTML body.
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipient: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_at: Option<String>,
}
