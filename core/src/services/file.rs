//! File and folder endpoints.

use serde_json::{json, Map, Value};

use crate::client::{require, require_any, require_id, DooTaskClient};
use crate::error::Result;
use crate::http::{HttpMethod, Transport};
use crate::types::{
    DownloadPack, File, FileAddRequest, FileContent, FileHistory, FileLink, FileLinkRequest,
    FileRef, FileSearchRequest, FileShare, FileShareUpdateRequest, FileUpdateAt,
    FileUploadRequest, Page, PageQuery,
};

use super::yes_no;

/// Operations on the shared drive.
pub struct FileService<'c, T> {
    client: &'c DooTaskClient<T>,
}

impl<'c, T: Transport> FileService<'c, T> {
    pub(crate) fn new(client: &'c DooTaskClient<T>) -> Self {
        Self { client }
    }

    /// Files in a folder; `None` lists the root.
    pub fn lists(&self, pid: Option<i64>) -> Result<Vec<File>> {
        let query: Vec<(&str, String)> = pid.map(|pid| ("pid", pid.to_string())).into_iter().collect();
        self.client
            .call(HttpMethod::Get, "/api/file/lists", &query, None::<&()>)
    }

    /// One file by id or share code.
    pub fn one(&self, id: impl Into<FileRef>) -> Result<File> {
        let id = checked_ref(id.into())?;
        self.client
            .call(HttpMethod::Get, "/api/file/one", &[("id", id.to_string())], None::<&()>)
    }

    pub fn search(&self, req: &FileSearchRequest) -> Result<Vec<File>> {
        let mut query = Vec::new();
        if let Some(link) = &req.link {
            query.push(("link", link.clone()));
        }
        if let Some(key) = &req.key {
            query.push(("key", key.clone()));
        }
        if let Some(take) = req.take {
            query.push(("take", take.to_string()));
        }
        self.client
            .call(HttpMethod::Get, "/api/file/search", &query, None::<&()>)
    }

    /// Create a file or folder, or rename one when `req.id` is set.
    pub fn add(&self, req: &FileAddRequest) -> Result<File> {
        require("name", &req.name)?;
        require("type", &req.kind)?;
        self.client
            .call(HttpMethod::Get, "/api/file/add", &[], Some(req))
    }

    pub fn copy(&self, id: i64) -> Result<File> {
        require_id("id", id)?;
        self.client
            .call(HttpMethod::Get, "/api/file/copy", &[], Some(&json!({ "id": id })))
    }

    /// Move files into folder `pid` (`0` for the root).
    pub fn move_files(&self, ids: &[i64], pid: i64) -> Result<Vec<File>> {
        require_any("ids", ids)?;
        self.client.call(
            HttpMethod::Get,
            "/api/file/move",
            &[],
            Some(&json!({ "ids": ids, "pid": pid })),
        )
    }

    pub fn remove(&self, ids: &[i64]) -> Result<Vec<File>> {
        require_any("ids", ids)?;
        self.client
            .call(HttpMethod::Get, "/api/file/remove", &[], Some(&json!({ "ids": ids })))
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Last update time of a file's content.
    pub fn content_update_at(&self, id: impl Into<FileRef>) -> Result<FileUpdateAt> {
        let id = checked_ref(id.into())?;
        let query = [("id", id.to_string()), ("only_update_at", "yes".to_string())];
        self.client
            .call(HttpMethod::Get, "/api/file/content", &query, None::<&()>)
    }

    /// Download a file's content, or one historical version of it.
    pub fn content_raw(&self, id: impl Into<FileRef>, history_id: Option<i64>) -> Result<Vec<u8>> {
        let id = checked_ref(id.into())?;
        let mut query = vec![("id", id.to_string()), ("down", "yes".to_string())];
        if let Some(history_id) = history_id {
            query.push(("history_id", history_id.to_string()));
        }
        self.client
            .call_raw(HttpMethod::Get, "/api/file/content", &query, None::<&()>)
    }

    pub fn content_save(&self, id: i64, content: &Value) -> Result<FileContent> {
        require_id("id", id)?;
        self.client.call(
            HttpMethod::Get,
            "/api/file/content/save",
            &[],
            Some(&json!({ "id": id, "content": content })),
        )
    }

    /// Token for opening the file in the office editor.
    pub fn office_token(&self, id: i64) -> Result<Map<String, Value>> {
        require_id("id", id)?;
        self.client.call(
            HttpMethod::Get,
            "/api/file/office/token",
            &[("id", id.to_string())],
            None::<&()>,
        )
    }

    /// Save content coming back from the office editor.
    pub fn content_office(&self, id: i64, content: &Value) -> Result<Map<String, Value>> {
        require_id("id", id)?;
        self.client.call(
            HttpMethod::Get,
            "/api/file/content/office",
            &[],
            Some(&json!({ "id": id, "content": content })),
        )
    }

    pub fn content_upload(&self, req: &FileUploadRequest) -> Result<Value> {
        self.client
            .call(HttpMethod::Get, "/api/file/content/upload", &[], Some(req))
    }

    pub fn content_history(&self, id: i64, page: PageQuery) -> Result<Page<FileHistory>> {
        require_id("id", id)?;
        let mut query = vec![("id", id.to_string())];
        if let Some(p) = page.page {
            query.push(("page", p.to_string()));
        }
        if let Some(size) = page.page_size {
            query.push(("pagesize", size.to_string()));
        }
        self.client
            .call(HttpMethod::Get, "/api/file/content/history", &query, None::<&()>)
    }

    pub fn content_restore(&self, id: i64, history_id: i64) -> Result<()> {
        require_id("id", id)?;
        require_id("history_id", history_id)?;
        self.client.call_unit(
            HttpMethod::Get,
            "/api/file/content/restore",
            &[],
            Some(&json!({ "id": id, "history_id": history_id })),
        )
    }

    // -----------------------------------------------------------------------
    // Sharing
    // -----------------------------------------------------------------------

    pub fn share(&self, id: i64) -> Result<FileShare> {
        require_id("id", id)?;
        self.client
            .call(HttpMethod::Get, "/api/file/share", &[], Some(&json!({ "id": id })))
    }

    pub fn share_update(&self, req: &FileShareUpdateRequest) -> Result<File> {
        require_id("id", req.id)?;
        self.client
            .call(HttpMethod::Get, "/api/file/share/update", &[], Some(req))
    }

    /// Leave a folder someone shared with you.
    pub fn share_out(&self, id: i64) -> Result<()> {
        require_id("id", id)?;
        self.client
            .call_unit(HttpMethod::Get, "/api/file/share/out", &[], Some(&json!({ "id": id })))
    }

    pub fn link(&self, req: &FileLinkRequest) -> Result<FileLink> {
        require_id("id", req.id)?;
        let body = json!({
            "id": req.id,
            "refresh": yes_no(req.refresh),
            "guest_access": yes_no(req.guest_access),
        });
        self.client
            .call(HttpMethod::Get, "/api/file/link", &[], Some(&body))
    }

    // -----------------------------------------------------------------------
    // Downloads
    // -----------------------------------------------------------------------

    /// Start packing files into one archive.
    pub fn download_pack(&self, ids: &[i64], name: Option<&str>) -> Result<DownloadPack> {
        require_any("ids", ids)?;
        let mut body = json!({ "ids": ids });
        if let Some(name) = name {
            body["name"] = Value::from(name);
        }
        self.client
            .call(HttpMethod::Get, "/api/file/download/pack", &[], Some(&body))
    }

    /// Fetch a packed archive by its key.
    pub fn download_pack_file(&self, key: &str) -> Result<Vec<u8>> {
        require("key", key)?;
        self.client.call_raw(
            HttpMethod::Get,
            "/api/file/download/pack",
            &[("key", key.to_string())],
            None::<&()>,
        )
    }

    pub fn download_confirm(&self, key: &str) -> Result<Vec<u8>> {
        require("key", key)?;
        self.client.call_raw(
            HttpMethod::Get,
            "/api/file/download/confirm",
            &[("key", key.to_string())],
            None::<&()>,
        )
    }
}

fn checked_ref(id: FileRef) -> Result<FileRef> {
    match &id {
        FileRef::Id(n) => require_id("id", *n)?,
        FileRef::Code(code) => require("id", code)?,
    }
    Ok(id)
}
