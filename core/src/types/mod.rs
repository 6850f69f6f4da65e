//! Wire DTOs for the DooTask API.
//!
//! # Design
//! Response types derive `Deserialize` with `#[serde(default)]` so fields
//! the upstream omits or nulls fall back to empty values instead of failing
//! the whole payload. Request types derive `Serialize` and skip unset
//! optional fields, which the upstream treats as "leave unchanged".
//! Field names follow the wire (`userid`, `pagesize`); `type` is exposed as
//! `kind`.

pub mod common;
pub mod dialog;
pub mod file;
pub mod project;
pub mod report;
pub mod users;

pub use common::{DateTime, IntArray, IntBool, Page, PageQuery, User};
pub use dialog::{
    CreateDialogRequest, Dialog, DialogListRequest, DialogMember, DialogMessage,
    DialogMessagesRequest, LastMessage, SendTextRequest, UpdateDialogRequest,
};
pub use file::{
    DownloadPack, File, FileAddRequest, FileContent, FileHistory, FileLink, FileLinkRequest,
    FileRef, FileSearchRequest, FileShare, FileShareUpdateRequest, FileUpdateAt, FileUploadRequest,
    FileUser,
};
pub use project::{
    Completion, DownloadUrl, ExportJob, Flow, FlowSaveRequest, LogListRequest, MemberAction,
    Project, ProjectAddRequest, ProjectColumn, ProjectDetail, ProjectInvite, ProjectListRequest,
    ProjectLog, ProjectMember, ProjectUpdateRequest, Task, TaskAddRequest, TaskContent,
    TaskDialog, TaskExportRequest, TaskFile, TaskFlow, TaskListRequest, TaskUpdateRequest,
};
pub use report::{
    ReadUser, Report, ReportDetail, ReportKind, ReportListRequest, ReportStoreRequest,
    ReportTemplate, TimeRange, UnreadSummary, UnreadUser,
};
pub use users::{
    Bot, Department, Device, Favorite, FavoriteState, ObjectKind, RecentBrowse, Tag, TaskBrowse,
    TokenExpire,
};
