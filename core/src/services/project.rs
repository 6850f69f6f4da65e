//! Project, column, task, workflow and log endpoints.
//!
//! Nearly everything here is a GET carrying a JSON body under
//! `/api/project/`. Only task creation, task updates, sorting and saving a
//! workflow are POSTs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::client::{require, require_any, require_id, DooTaskClient};
use crate::error::Result;
use crate::http::{HttpMethod, Transport};
use crate::types::{
    DownloadUrl, ExportJob, Flow, FlowSaveRequest, LogListRequest, MemberAction, Page, Project,
    ProjectAddRequest, ProjectColumn, ProjectDetail, ProjectInvite, ProjectListRequest,
    ProjectLog, ProjectUpdateRequest, Task, TaskAddRequest, TaskContent, TaskDialog,
    TaskExportRequest, TaskFile, TaskFlow, TaskListRequest, TaskUpdateRequest,
};

/// Operations on projects and everything inside them.
pub struct ProjectService<'c, T> {
    client: &'c DooTaskClient<T>,
}

impl<'c, T: Transport> ProjectService<'c, T> {
    pub(crate) fn new(client: &'c DooTaskClient<T>) -> Self {
        Self { client }
    }

    fn send<R, B>(&self, method: HttpMethod, action: &str, body: &B) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let path = format!("/api/project/{action}");
        self.client.call(method, &path, &[], Some(body))
    }

    fn get<R: DeserializeOwned, B: Serialize + ?Sized>(&self, action: &str, body: &B) -> Result<R> {
        self.send(HttpMethod::Get, action, body)
    }

    fn get_unit<B: Serialize + ?Sized>(&self, action: &str, body: &B) -> Result<()> {
        let path = format!("/api/project/{action}");
        self.client
            .call_unit(HttpMethod::Get, &path, &[], Some(body))
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn lists(&self, req: &ProjectListRequest) -> Result<Page<Project>> {
        self.get("lists", req)
    }

    pub fn one(&self, project_id: i64) -> Result<ProjectDetail> {
        require_id("project_id", project_id)?;
        self.get("one", &json!({ "project_id": project_id }))
    }

    pub fn add(&self, req: &ProjectAddRequest) -> Result<ProjectDetail> {
        require("name", &req.name)?;
        self.get("add", req)
    }

    pub fn update(&self, req: &ProjectUpdateRequest) -> Result<ProjectDetail> {
        require_id("project_id", req.project_id)?;
        self.get("update", req)
    }

    /// Hand ownership of a project to another user.
    pub fn transfer(&self, project_id: i64, userid: i64) -> Result<()> {
        require_id("project_id", project_id)?;
        require_id("userid", userid)?;
        self.get_unit("transfer", &json!({ "project_id": project_id, "userid": userid }))
    }

    pub fn exit(&self, project_id: i64) -> Result<()> {
        require_id("project_id", project_id)?;
        self.get_unit("exit", &json!({ "project_id": project_id }))
    }

    /// Archive a project, or restore it when `archive` is false.
    pub fn archived(&self, project_id: i64, archive: bool) -> Result<()> {
        require_id("project_id", project_id)?;
        let kind = if archive { "archive" } else { "reduction" };
        self.get_unit("archived", &json!({ "project_id": project_id, "type": kind }))
    }

    pub fn remove(&self, project_id: i64) -> Result<()> {
        require_id("project_id", project_id)?;
        self.get_unit("remove", &json!({ "project_id": project_id }))
    }

    /// Pin or unpin a project.
    pub fn top(&self, project_id: i64, top: bool) -> Result<()> {
        require_id("project_id", project_id)?;
        let kind = if top { "add" } else { "delete" };
        self.get_unit("top", &json!({ "project_id": project_id, "type": kind }))
    }

    /// Add or remove members, or make them owners.
    pub fn user(&self, project_id: i64, action: MemberAction, userids: &[i64]) -> Result<()> {
        require_id("project_id", project_id)?;
        require_any("userids", userids)?;
        let body = json!({ "project_id": project_id, "type": action, "userids": userids });
        self.get_unit("user", &body)
    }

    pub fn invite(&self, project_id: i64) -> Result<ProjectInvite> {
        require_id("project_id", project_id)?;
        self.get("invite", &json!({ "project_id": project_id }))
    }

    /// The project an invite code points at.
    pub fn invite_info(&self, code: &str) -> Result<Project> {
        require("code", code)?;
        self.get("invite/info", &json!({ "code": code }))
    }

    pub fn invite_join(&self, code: &str) -> Result<ProjectDetail> {
        require("code", code)?;
        self.get("invite/join", &json!({ "code": code }))
    }

    // -----------------------------------------------------------------------
    // Columns
    // -----------------------------------------------------------------------

    pub fn column_lists(&self, project_id: i64) -> Result<Vec<ProjectColumn>> {
        require_id("project_id", project_id)?;
        self.get("column/lists", &json!({ "project_id": project_id }))
    }

    pub fn column_add(&self, project_id: i64, name: &str, color: Option<&str>) -> Result<ProjectColumn> {
        require_id("project_id", project_id)?;
        require("name", name)?;
        let mut body = json!({ "project_id": project_id, "name": name });
        if let Some(color) = color {
            body["color"] = Value::from(color);
        }
        self.get("column/add", &body)
    }

    pub fn column_update(
        &self,
        column_id: i64,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<ProjectColumn> {
        require_id("column_id", column_id)?;
        let mut body = json!({ "column_id": column_id });
        if let Some(name) = name {
            body["name"] = Value::from(name);
        }
        if let Some(color) = color {
            body["color"] = Value::from(color);
        }
        self.get("column/update", &body)
    }

    pub fn column_remove(&self, column_id: i64) -> Result<()> {
        require_id("column_id", column_id)?;
        self.get_unit("column/remove", &json!({ "column_id": column_id }))
    }

    pub fn column_one(&self, column_id: i64) -> Result<ProjectColumn> {
        require_id("column_id", column_id)?;
        self.get("column/one", &json!({ "column_id": column_id }))
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn task_lists(&self, req: &TaskListRequest) -> Result<Page<Task>> {
        self.get("task/lists", req)
    }

    /// Lightweight task listing without owners or sub-tasks.
    pub fn task_easy_lists(&self, project_id: Option<i64>, status: Option<&str>) -> Result<Vec<Task>> {
        let mut body = json!({});
        if let Some(project_id) = project_id {
            body["project_id"] = Value::from(project_id);
        }
        if let Some(status) = status {
            body["status"] = Value::from(status);
        }
        self.get("task/easylists", &body)
    }

    pub fn task_one(&self, task_id: i64) -> Result<Task> {
        require_id("task_id", task_id)?;
        self.get("task/one", &json!({ "task_id": task_id }))
    }

    pub fn task_content(&self, task_id: i64) -> Result<TaskContent> {
        require_id("task_id", task_id)?;
        self.get("task/content", &json!({ "task_id": task_id }))
    }

    pub fn task_add(&self, req: &TaskAddRequest) -> Result<Task> {
        require_id("project_id", req.project_id)?;
        require("name", &req.name)?;
        self.send(HttpMethod::Post, "task/add", req)
    }

    pub fn task_add_sub(&self, task_id: i64, name: &str) -> Result<Task> {
        require_id("task_id", task_id)?;
        require("name", name)?;
        self.get("task/addsub", &json!({ "task_id": task_id, "name": name }))
    }

    pub fn task_update(&self, req: &TaskUpdateRequest) -> Result<Task> {
        require_id("task_id", req.task_id)?;
        self.send(HttpMethod::Post, "task/update", req)
    }

    /// The dialog attached to a task, created on first use.
    pub fn task_dialog(&self, task_id: i64) -> Result<TaskDialog> {
        require_id("task_id", task_id)?;
        self.get("task/dialog", &json!({ "task_id": task_id }))
    }

    pub fn task_archived(&self, task_id: i64, archive: bool) -> Result<()> {
        require_id("task_id", task_id)?;
        let kind = if archive { "archive" } else { "reduction" };
        self.get_unit("task/archived", &json!({ "task_id": task_id, "type": kind }))
    }

    pub fn task_remove(&self, task_id: i64) -> Result<()> {
        require_id("task_id", task_id)?;
        self.get_unit("task/remove", &json!({ "task_id": task_id }))
    }

    /// Roll a task back to the state recorded in a log entry.
    pub fn task_reset_from_log(&self, log_id: i64) -> Result<()> {
        require_id("log_id", log_id)?;
        self.get_unit("task/resetfromlog", &json!({ "log_id": log_id }))
    }

    pub fn task_move(&self, task_id: i64, project_id: i64, column_id: i64) -> Result<()> {
        require_id("task_id", task_id)?;
        require_id("project_id", project_id)?;
        require_id("column_id", column_id)?;
        let body = json!({ "task_id": task_id, "project_id": project_id, "column_id": column_id });
        self.get_unit("task/move", &body)
    }

    /// Reorder tasks; `task_ids` is the new order.
    pub fn sort(&self, project_id: i64, task_ids: &[i64]) -> Result<()> {
        require_id("project_id", project_id)?;
        require_any("task_ids", task_ids)?;
        self.client.call_unit(
            HttpMethod::Post,
            "/api/project/sort",
            &[],
            Some(&json!({ "project_id": project_id, "task_ids": task_ids })),
        )
    }

    // -----------------------------------------------------------------------
    // Task files
    // -----------------------------------------------------------------------

    pub fn task_files(&self, task_id: i64) -> Result<Vec<TaskFile>> {
        require_id("task_id", task_id)?;
        self.get("task/files", &json!({ "task_id": task_id }))
    }

    pub fn task_file_delete(&self, file_id: i64) -> Result<()> {
        require_id("file_id", file_id)?;
        self.get_unit("task/filedelete", &json!({ "file_id": file_id }))
    }

    pub fn task_file_detail(&self, file_id: i64) -> Result<TaskFile> {
        require_id("file_id", file_id)?;
        self.get("task/filedetail", &json!({ "file_id": file_id }))
    }

    pub fn task_file_down(&self, file_id: i64) -> Result<DownloadUrl> {
        require_id("file_id", file_id)?;
        self.get("task/filedown", &json!({ "file_id": file_id }))
    }

    // -----------------------------------------------------------------------
    // Workflows
    // -----------------------------------------------------------------------

    pub fn task_flow(&self, task_id: i64) -> Result<TaskFlow> {
        require_id("task_id", task_id)?;
        self.get("task/flow", &json!({ "task_id": task_id }))
    }

    pub fn flow_list(&self, project_id: i64) -> Result<Vec<Flow>> {
        require_id("project_id", project_id)?;
        self.get("flow/list", &json!({ "project_id": project_id }))
    }

    /// Create a workflow, or replace one when `req.flow_id` is set.
    pub fn flow_save(&self, req: &FlowSaveRequest) -> Result<Flow> {
        require_id("project_id", req.project_id)?;
        require("name", &req.name)?;
        self.send(HttpMethod::Post, "flow/save", req)
    }

    pub fn flow_delete(&self, flow_id: i64) -> Result<()> {
        require_id("flow_id", flow_id)?;
        self.get_unit("flow/delete", &json!({ "flow_id": flow_id }))
    }

    // -----------------------------------------------------------------------
    // Exports and logs
    // -----------------------------------------------------------------------

    /// Queue an export; poll it with [`task_down`](Self::task_down).
    pub fn task_export(&self, req: &TaskExportRequest) -> Result<ExportJob> {
        self.get("task/export", req)
    }

    pub fn task_export_overdue(&self, project_id: Option<i64>) -> Result<ExportJob> {
        let body = match project_id {
            Some(project_id) => json!({ "project_id": project_id }),
            None => json!({}),
        };
        self.get("task/exportoverdue", &body)
    }

    pub fn task_down(&self, export_id: &str) -> Result<DownloadUrl> {
        require("task_id", export_id)?;
        self.get("task/down", &json!({ "task_id": export_id }))
    }

    pub fn log_lists(&self, req: &LogListRequest) -> Result<Page<ProjectLog>> {
        self.get("log/lists", req)
    }
}
