//! Dialog (chat) endpoints.

use serde_json::json;

use crate::client::{require, require_any, require_id, DooTaskClient};
use crate::error::Result;
use crate::http::{HttpMethod, Transport};
use crate::types::{
    CreateDialogRequest, Dialog, DialogListRequest, DialogMember, DialogMessage,
    DialogMessagesRequest, Page, SendTextRequest, UpdateDialogRequest,
};

use super::flag;

/// Operations on dialogs and their messages.
pub struct DialogService<'c, T> {
    client: &'c DooTaskClient<T>,
}

impl<'c, T: Transport> DialogService<'c, T> {
    pub(crate) fn new(client: &'c DooTaskClient<T>) -> Self {
        Self { client }
    }

    pub fn create(&self, req: &CreateDialogRequest) -> Result<Dialog> {
        require("name", &req.name)?;
        self.client
            .call(HttpMethod::Post, "/api/dialog/create", &[], Some(req))
    }

    pub fn lists(&self, req: &DialogListRequest) -> Result<Page<Dialog>> {
        self.client
            .call(HttpMethod::Get, "/api/dialog/lists", &[], Some(req))
    }

    pub fn detail(&self, dialog_id: i64) -> Result<Dialog> {
        require_id("dialog_id", dialog_id)?;
        let path = format!("/api/dialog/detail/{dialog_id}");
        self.client.call(HttpMethod::Get, &path, &[], None::<&()>)
    }

    pub fn update(&self, dialog_id: i64, req: &UpdateDialogRequest) -> Result<Dialog> {
        require_id("dialog_id", dialog_id)?;
        let path = format!("/api/dialog/update/{dialog_id}");
        self.client.call(HttpMethod::Put, &path, &[], Some(req))
    }

    pub fn delete(&self, dialog_id: i64) -> Result<()> {
        require_id("dialog_id", dialog_id)?;
        let path = format!("/api/dialog/delete/{dialog_id}");
        self.client
            .call_unit(HttpMethod::Delete, &path, &[], None::<&()>)
    }

    pub fn members(&self, dialog_id: i64) -> Result<Vec<DialogMember>> {
        require_id("dialog_id", dialog_id)?;
        let path = format!("/api/dialog/members/{dialog_id}");
        self.client.call(HttpMethod::Get, &path, &[], None::<&()>)
    }

    pub fn add_members(&self, dialog_id: i64, user_ids: &[i64]) -> Result<Vec<DialogMember>> {
        require_id("dialog_id", dialog_id)?;
        require_any("user_ids", user_ids)?;
        let path = format!("/api/dialog/members/{dialog_id}/add");
        self.client
            .call(HttpMethod::Post, &path, &[], Some(&json!({ "user_ids": user_ids })))
    }

    pub fn remove_members(&self, dialog_id: i64, user_ids: &[i64]) -> Result<()> {
        require_id("dialog_id", dialog_id)?;
        require_any("user_ids", user_ids)?;
        let path = format!("/api/dialog/members/{dialog_id}/remove");
        self.client
            .call_unit(HttpMethod::Post, &path, &[], Some(&json!({ "user_ids": user_ids })))
    }

    /// Send a text message. Markdown when `text_type` is `md`.
    pub fn send_text(&self, req: &SendTextRequest) -> Result<DialogMessage> {
        require_id("dialog_id", req.dialog_id)?;
        require("text", &req.text)?;
        self.client
            .call(HttpMethod::Post, "/api/dialog/msg/sendtext", &[], Some(req))
    }

    pub fn messages(&self, dialog_id: i64, req: &DialogMessagesRequest) -> Result<Page<DialogMessage>> {
        require_id("dialog_id", dialog_id)?;
        let path = format!("/api/dialog/{dialog_id}/messages");
        self.client.call(HttpMethod::Get, &path, &[], Some(req))
    }

    pub fn mark_read(&self, dialog_id: i64, message_ids: &[i64]) -> Result<()> {
        require_id("dialog_id", dialog_id)?;
        let path = format!("/api/dialog/{dialog_id}/messages/read");
        self.client.call_unit(
            HttpMethod::Post,
            &path,
            &[],
            Some(&json!({ "message_ids": message_ids })),
        )
    }

    pub fn delete_message(&self, dialog_id: i64, message_id: i64) -> Result<()> {
        require_id("dialog_id", dialog_id)?;
        require_id("message_id", message_id)?;
        let path = format!("/api/dialog/{dialog_id}/message/{message_id}/delete");
        self.client
            .call_unit(HttpMethod::Delete, &path, &[], None::<&()>)
    }

    pub fn set_top(&self, dialog_id: i64, top: bool) -> Result<()> {
        self.toggle(dialog_id, "top", json!({ "is_top": flag(top) }))
    }

    pub fn set_mute(&self, dialog_id: i64, mute: bool) -> Result<()> {
        self.toggle(dialog_id, "mute", json!({ "is_mute": flag(mute) }))
    }

    pub fn set_archive(&self, dialog_id: i64, archive: bool) -> Result<()> {
        self.toggle(dialog_id, "archive", json!({ "is_archive": flag(archive) }))
    }

    fn toggle(&self, dialog_id: i64, action: &str, body: serde_json::Value) -> Result<()> {
        require_id("dialog_id", dialog_id)?;
        let path = format!("/api/dialog/{dialog_id}/{action}");
        self.client
            .call_unit(HttpMethod::Post, &path, &[], Some(&body))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::services::testing::{body, last, recording_client};

    #[test]
    fn detail_puts_id_in_path() {
        let (client, seen) =
            recording_client(r#"{"ret":1,"msg":"","data":{"id":12,"name":"crew"}}"#);
        let dialog = client.dialog().detail(12).unwrap();
        assert_eq!(dialog.id, 12);
        let req = last(&seen);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://dootask.local/api/dialog/detail/12");
        assert!(req.body.is_none());
    }

    #[test]
    fn members_accepts_single_object_payload() {
        let (client, _) = recording_client(r#"{"ret":1,"data":{"id":1,"dialog_id":4,"userid":7}}"#);
        let members = client.dialog().members(4).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, 7);
    }

    #[test]
    fn toggles_send_numeric_flags() {
        let (client, seen) = recording_client(r#"{"ret":1,"msg":"ok","data":[]}"#);
        client.dialog().set_mute(5, true).unwrap();
        let req = last(&seen);
        assert_eq!(req.url, "http://dootask.local/api/dialog/5/mute");
        assert_eq!(body(&req), json!({"is_mute": 1}));

        client.dialog().set_archive(5, false).unwrap();
        assert_eq!(body(&last(&seen)), json!({"is_archive": 0}));
    }

    #[test]
    fn add_members_rejects_empty_list_before_sending() {
        let (client, seen) = recording_client(r#"{"ret":1}"#);
        let err = client.dialog().add_members(5, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn send_text_posts_body() {
        let (client, seen) =
            recording_client(r#"{"ret":1,"data":{"id":99,"dialog_id":3,"userid":1,"type":"text"}}"#);
        let msg = client
            .dialog()
            .send_text(&SendTextRequest {
                dialog_id: 3,
                text: "deploy done".to_string(),
                text_type: Some("md".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(msg.id, 99);
        let req = last(&seen);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(body(&req)["text_type"], "md");
    }
}
