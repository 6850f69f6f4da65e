//! Dialog (chat session) DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{DateTime, IntBool};

/// A chat session: a direct conversation, a group, or a task/project room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialog {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub group_type: String,
    pub session_id: i64,
    pub name: String,
    pub avatar: String,
    pub owner_id: i64,
    pub link_id: i64,
    pub top_userid: i64,
    pub top_msg_id: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub deleted_at: Option<DateTime>,
    pub top_at: Option<DateTime>,
    pub last_at: Option<DateTime>,
    pub mark_unread: IntBool,
    pub silence: IntBool,
    pub hide: IntBool,
    pub color: String,
    pub unread: i64,
    pub unread_one: i64,
    pub mention: i64,
    pub people: i64,
    pub people_user: i64,
    pub people_bot: i64,
    pub todo_num: i64,
    pub last_msg: Option<LastMessage>,
    pub pinyin: String,
    pub bot: IntBool,
    pub dialog_user: Value,
    pub group_info: Value,
}

/// Preview of the newest message in a dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastMessage {
    pub id: i64,
    pub userid: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub msg: Value,
    pub created_at: Option<DateTime>,
    pub percentage: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogMember {
    pub id: i64,
    pub dialog_id: i64,
    #[serde(alias = "userid")]
    pub user_id: i64,
    pub role: i64,
    pub status: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub joined_at: Option<DateTime>,
    pub left_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogMessage {
    pub id: i64,
    pub dialog_id: i64,
    #[serde(alias = "userid")]
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: Value,
    pub msg: Value,
    pub reply_id: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
    pub is_read: IntBool,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateDialogRequest {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub avatar: String,
    pub members: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateDialogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DialogListRequest {
    pub page: u32,
    pub page_size: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendTextRequest {
    pub dialog_id: i64,
    pub text: String,
    /// `md` for markdown, omitted for HTML.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<i64>,
    /// Send without notifying members.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub silence: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DialogMessagesRequest {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn dialog_decodes_with_loose_flags_and_missing_fields() {
        let dialog: Dialog = serde_json::from_value(json!({
            "id": 12,
            "type": "group",
            "name": "Release crew",
            "silence": "1",
            "bot": 0,
            "created_at": "2024-03-02 10:00:00",
            "top_at": null
        }))
        .unwrap();
        assert_eq!(dialog.id, 12);
        assert_eq!(dialog.kind, "group");
        assert!(dialog.silence.get());
        assert!(!dialog.bot.get());
        assert!(dialog.created_at.is_some());
        assert!(dialog.top_at.is_none());
        assert!(dialog.last_msg.is_none());
    }

    #[test]
    fn send_text_omits_unset_options() {
        let body = serde_json::to_value(SendTextRequest {
            dialog_id: 3,
            text: "hello".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"dialog_id": 3, "text": "hello"}));
    }
}
