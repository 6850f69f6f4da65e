//! Work report endpoints.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::client::{require, require_any, require_id, DooTaskClient};
use crate::error::Result;
use crate::http::{HttpMethod, Transport};
use crate::types::{
    Page, Report, ReportDetail, ReportKind, ReportListRequest, ReportStoreRequest,
    ReportTemplate, UnreadSummary, User,
};

/// Operations on daily, weekly and monthly reports.
pub struct ReportService<'c, T> {
    client: &'c DooTaskClient<T>,
}

impl<'c, T: Transport> ReportService<'c, T> {
    pub(crate) fn new(client: &'c DooTaskClient<T>) -> Self {
        Self { client }
    }

    fn get<R: DeserializeOwned, B: Serialize + ?Sized>(&self, action: &str, body: &B) -> Result<R> {
        let path = format!("/api/report/{action}");
        self.client.call(HttpMethod::Get, &path, &[], Some(body))
    }

    /// Reports the current user sent.
    pub fn my(&self, req: &ReportListRequest) -> Result<Page<Report>> {
        self.get("my", req)
    }

    /// Reports addressed to the current user.
    pub fn receive(&self, req: &ReportListRequest) -> Result<Page<Report>> {
        self.get("receive", req)
    }

    pub fn detail(&self, report_id: i64) -> Result<ReportDetail> {
        require_id("report_id", report_id)?;
        self.get("detail", &json!({ "report_id": report_id }))
    }

    /// Save and send a report, or edit one when `req.report_id` is set.
    pub fn store(&self, req: &ReportStoreRequest) -> Result<ReportDetail> {
        require("title", &req.title)?;
        require("content", &req.content)?;
        self.get("store", req)
    }

    /// A pre-filled report for the period containing `time` (`YYYY-MM-DD`).
    pub fn template(&self, kind: ReportKind, time: &str) -> Result<ReportTemplate> {
        require("time", time)?;
        self.get("template", &json!({ "type": kind, "time": time }))
    }

    pub fn mark(&self, report_id: i64, read: bool) -> Result<()> {
        require_id("report_id", report_id)?;
        let kind = if read { "read" } else { "unread" };
        self.client.call_unit(
            HttpMethod::Get,
            "/api/report/mark",
            &[],
            Some(&json!({ "report_id": report_id, "type": kind })),
        )
    }

    /// Mark several reports read at once.
    pub fn read(&self, report_ids: &[i64]) -> Result<()> {
        require_any("report_ids", report_ids)?;
        self.client.call_unit(
            HttpMethod::Get,
            "/api/report/read",
            &[],
            Some(&json!({ "report_ids": report_ids })),
        )
    }

    /// Unread counters; `None` counts every period.
    pub fn unread(&self, kind: Option<ReportKind>) -> Result<UnreadSummary> {
        match kind {
            Some(kind) => self.get("unread", &json!({ "type": kind })),
            None => self.get("unread", &json!({})),
        }
    }

    /// Recipients of the last report of this kind.
    pub fn last_submitter(&self, kind: ReportKind) -> Result<Vec<User>> {
        self.get("last_submitter", &json!({ "type": kind }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{ApiError, ErrorKind};
    use crate::services::testing::{body, last, recording_client};

    #[test]
    fn my_accepts_bare_array_as_single_page() {
        let (client, seen) = recording_client(r#"{"ret":1,"data":[{"id":1,"type":"day","title":"Mon"}]}"#);
        let page = client
            .reports()
            .my(&ReportListRequest {
                kind: Some(ReportKind::Day),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.len(), 1);
        assert!(!page.has_more());
        let req = last(&seen);
        assert_eq!(req.url, "http://dootask.local/api/report/my");
        assert_eq!(body(&req), json!({"type": "day"}));
    }

    #[test]
    fn template_sends_kind_and_date() {
        let (client, seen) =
            recording_client(r#"{"ret":1,"data":{"type":"week","title":"W23","tasks":[]}}"#);
        let template = client.reports().template(ReportKind::Week, "2024-06-03").unwrap();
        assert_eq!(template.title, "W23");
        assert_eq!(body(&last(&seen)), json!({"type": "week", "time": "2024-06-03"}));
    }

    #[test]
    fn unread_without_kind_sends_empty_object() {
        let (client, seen) = recording_client(r#"{"ret":1,"data":{"total":3,"day":3}}"#);
        let summary = client.reports().unread(None).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(body(&last(&seen)), json!({}));
    }

    #[test]
    fn envelope_failure_is_surfaced() {
        let (client, _) = recording_client(r#"{"ret":0,"msg":"report not found","data":{}}"#);
        let err = client.reports().detail(404).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Envelope);
        assert_eq!(err.server_message(), Some("report not found"));
    }

    #[test]
    fn read_requires_ids() {
        let (client, seen) = recording_client(r#"{"ret":1}"#);
        assert!(matches!(
            client.reports().read(&[]),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(seen.borrow().is_empty());
    }
}
