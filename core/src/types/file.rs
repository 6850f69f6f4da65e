//! File and folder DTOs.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{DateTime, IntBool};

/// A file or folder in the shared drive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub id: i64,
    /// Parent folder, `0` at the root.
    pub pid: i64,
    /// Comma-separated ancestor ids.
    pub pids: Option<String>,
    pub cid: Option<i64>,
    pub name: String,
    /// `folder`, `document`, `mind`, `drawio`, `word`, `excel`, `ppt`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub ext: Option<String>,
    pub size: Option<i64>,
    pub userid: i64,
    pub share: IntBool,
    pub guest_access: IntBool,
    pub pshare: Option<i64>,
    pub created_id: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub deleted_at: Option<DateTime>,
    pub permission: Option<i64>,
}

/// Identifies a file either by numeric id or by share-link code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileRef {
    Id(i64),
    Code(String),
}

impl From<i64> for FileRef {
    fn from(id: i64) -> Self {
        FileRef::Id(id)
    }
}

impl From<&str> for FileRef {
    fn from(code: &str) -> Self {
        FileRef::Code(code.to_string())
    }
}

impl From<String> for FileRef {
    fn from(code: String) -> Self {
        FileRef::Code(code)
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRef::Id(id) => write!(f, "{id}"),
            FileRef::Code(code) => f.write_str(code),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContent {
    pub id: i64,
    pub fid: i64,
    pub content: Value,
    pub text: Option<String>,
    pub size: i64,
    pub userid: i64,
    pub created_at: Option<DateTime>,
}

/// Answer of a content request made with `only_update_at=yes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUpdateAt {
    pub id: i64,
    pub update_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHistory {
    pub id: i64,
    pub size: i64,
    pub userid: i64,
    pub created_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUser {
    pub file_id: i64,
    pub userid: i64,
    /// `0` read-only, `1` read-write.
    pub permission: i64,
}

/// Share settings of a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileShare {
    pub id: i64,
    pub list: Vec<FileUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLink {
    pub id: i64,
    pub code: String,
    pub url: String,
    pub guest_access: IntBool,
    pub num: i64,
}

/// A pack-download job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadPack {
    /// Key for [`download_pack_file`](crate::services::FileService::download_pack_file).
    pub key: String,
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSearchRequest {
    /// Search by share link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Default 50, at most 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<u32>,
}

/// Create a file, or rename one when `id` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileAddRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileUploadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<i64>,
    /// Overwrite an existing file with the same name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<IntBool>,
    #[serde(rename = "webkitRelativePath", skip_serializing_if = "Option::is_none")]
    pub webkit_relative_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileShareUpdateRequest {
    pub id: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub userids: Vec<i64>,
    /// `0` read-only, `1` read-write, `-1` remove.
    pub permission: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<IntBool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileLinkRequest {
    pub id: i64,
    pub refresh: bool,
    pub guest_access: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn file_ref_serializes_untagged() {
        assert_eq!(serde_json::to_value(FileRef::from(5)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(FileRef::from("ab12")).unwrap(), json!("ab12"));
        assert_eq!(FileRef::from(5).to_string(), "5");
    }

    #[test]
    fn file_decodes_loose_share_flag() {
        let file: File = serde_json::from_value(json!({
            "id": 8,
            "pid": 0,
            "name": "Roadmap",
            "type": "document",
            "share": 1,
            "userid": 2,
            "created_at": "2024-01-01 00:00:00",
            "deleted_at": null
        }))
        .unwrap();
        assert_eq!(file.kind, "document");
        assert!(file.share.get());
        assert_eq!(file.deleted_at, None);
    }

    #[test]
    fn download_pack_keeps_unknown_fields() {
        let pack: DownloadPack =
            serde_json::from_value(json!({"key": "k1", "name": "all.zip", "total": 3})).unwrap();
        assert_eq!(pack.key, "k1");
        assert_eq!(pack.extra.get("total"), Some(&json!(3)));
    }
}
