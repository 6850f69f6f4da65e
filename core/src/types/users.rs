//! User account, device, favorite, tag and browsing-history DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{DateTime, IntBool};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bot {
    pub id: i64,
    #[serde(alias = "userid")]
    pub user_id: i64,
    pub nickname: String,
    pub email: String,
    #[serde(alias = "userimg")]
    pub avatar: String,
    pub created_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub id: i64,
    pub userid: i64,
    pub name: String,
    pub device: String,
    pub ip: String,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// Kinds of objects a user can favorite or browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Task,
    Project,
    File,
    Message,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoriteState {
    pub is_favorite: IntBool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Favorite {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub target_id: i64,
    pub remark: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    /// The favorited object; its shape depends on `kind`.
    #[serde(flatten)]
    pub related: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentBrowse {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub target_id: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    #[serde(flatten)]
    pub related: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: i64,
    pub userid: i64,
    pub name: String,
    /// Number of users who endorsed the tag.
    pub recognition: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskBrowse {
    pub id: i64,
    pub task_id: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub task: Value,
}

/// Token expiry information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenExpire {
    pub expire_at: Option<DateTime>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn favorite_keeps_related_object() {
        let fav: Favorite = serde_json::from_value(json!({
            "id": 1,
            "type": "task",
            "target_id": 9,
            "remark": null,
            "task": {"id": 9, "name": "Ship"}
        }))
        .unwrap();
        assert_eq!(fav.kind, "task");
        assert_eq!(fav.related["task"]["name"], "Ship");
    }

    #[test]
    fn favorite_state_accepts_numeric_flag() {
        let state: FavoriteState = serde_json::from_value(json!({"is_favorite": 1})).unwrap();
        assert!(state.is_favorite.get());
    }
}
