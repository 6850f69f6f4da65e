//! Project, column, task, workflow and log DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{DateTime, IntArray, IntBool, User};

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// A project as it appears in listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub dialog_id: i64,
    pub owner: IntArray,
    pub owner_user: Vec<User>,
    pub userid: i64,
    pub personal: IntBool,
    pub flow: Value,
    pub archive_days: i64,
    pub archive_method: String,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub archived_at: Option<DateTime>,
    pub top_at: Option<DateTime>,
}

/// A project with its columns and members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub columns: Vec<ProjectColumn>,
    #[serde(rename = "project_user")]
    pub members: Vec<ProjectMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectColumn {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub color: String,
    pub sort: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub userid: i64,
    pub owner: IntBool,
    pub created_at: Option<DateTime>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInvite {
    pub code: String,
    pub link: String,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub column_id: i64,
    pub parent_id: i64,
    pub name: String,
    pub content: Option<String>,
    pub color: Option<String>,
    pub owner: IntArray,
    pub assist: IntArray,
    pub owner_user: Vec<User>,
    pub assist_user: Vec<User>,
    pub start_at: Option<DateTime>,
    pub end_at: Option<DateTime>,
    pub complete_at: Option<DateTime>,
    pub archived_at: Option<DateTime>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub dialog_id: i64,
    pub sort: i64,
    pub sub_tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskContent {
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDialog {
    pub dialog_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFile {
    pub id: i64,
    pub task_id: i64,
    pub name: String,
    pub size: i64,
    pub ext: String,
    pub path: String,
    pub thumb: String,
    pub userid: i64,
    pub created_at: Option<DateTime>,
}

/// A download or export link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadUrl {
    pub url: String,
}

/// A queued export job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportJob {
    pub task_id: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Workflows and logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flow {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub status: String,
    pub turns: Vec<Value>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFlow {
    pub flows: Vec<Flow>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLog {
    pub id: i64,
    pub project_id: i64,
    pub task_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub detail: String,
    pub record: Value,
    pub userid: i64,
    pub user: Option<User>,
    pub created_at: Option<DateTime>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectListRequest {
    /// `no` (default), `yes` or `all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "pagesize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectAddRequest {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Initial column names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// `open` or `close`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub personal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectUpdateRequest {
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_method: Option<String>,
}

/// Member changes for [`ProjectService::user`](crate::services::ProjectService::user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberAction {
    Add,
    Delete,
    Owner,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    /// `all`, `completed` or `uncompleted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "pagesize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskAddRequest {
    pub project_id: i64,
    pub column_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owner: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assist: Vec<i64>,
    /// Upstream timestamp, `YYYY-MM-DD HH:MM:SS`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
}

/// Completion change for a task update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Completion {
    /// Mark complete at the given timestamp.
    At(String),
    /// `false` reopens the task.
    Flag(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdateRequest {
    pub task_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_at: Option<Completion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowSaveRequest {
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<i64>,
    pub name: String,
    pub turns: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskExportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "pagesize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn project_detail_flattens_project_fields() {
        let detail: ProjectDetail = serde_json::from_value(json!({
            "id": 42,
            "name": "Acme Project",
            "owner": 7,
            "personal": "0",
            "columns": [{"id": 1, "project_id": 42, "name": "Todo"}],
            "project_user": [{"id": 3, "project_id": 42, "userid": 7, "owner": 1}]
        }))
        .unwrap();
        assert_eq!(detail.project.id, 42);
        assert_eq!(detail.project.owner.as_slice(), &[7]);
        assert!(!detail.project.personal.get());
        assert_eq!(detail.columns[0].name, "Todo");
        assert!(detail.members[0].owner.get());
    }

    #[test]
    fn task_nests_sub_tasks() {
        let task: Task = serde_json::from_value(json!({
            "id": 1,
            "name": "Ship",
            "owner": [2, 3],
            "sub_tasks": [{"id": 2, "parent_id": 1, "name": "Tag"}]
        }))
        .unwrap();
        assert_eq!(task.sub_tasks.len(), 1);
        assert_eq!(task.sub_tasks[0].parent_id, 1);
    }

    #[test]
    fn completion_serializes_as_time_or_false() {
        let reopen = TaskUpdateRequest {
            task_id: 4,
            complete_at: Some(Completion::Flag(false)),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(reopen).unwrap(),
            json!({"task_id": 4, "complete_at": false})
        );
        let done = Completion::At("2024-06-01 12:00:00".to_string());
        assert_eq!(serde_json::to_value(done).unwrap(), json!("2024-06-01 12:00:00"));
    }

    #[test]
    fn member_action_uses_upstream_words() {
        assert_eq!(serde_json::to_value(MemberAction::Owner).unwrap(), json!("owner"));
    }
}
