//! Current-user endpoints: devices, bots, favorites, tags and history.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::client::{require, require_id, DooTaskClient};
use crate::error::Result;
use crate::http::{HttpMethod, Transport};
use crate::types::{
    Bot, Department, Device, Favorite, FavoriteState, ObjectKind, Page, PageQuery, RecentBrowse,
    Tag, TaskBrowse, TokenExpire,
};

/// Operations on the signed-in user's account.
pub struct UsersService<'c, T> {
    client: &'c DooTaskClient<T>,
}

/// Listing filter shared by favorites and recent history.
#[derive(Serialize)]
struct Filtered {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<ObjectKind>,
    #[serde(flatten)]
    page: PageQuery,
}

impl<'c, T: Transport> UsersService<'c, T> {
    pub(crate) fn new(client: &'c DooTaskClient<T>) -> Self {
        Self { client }
    }

    fn send<R, B>(&self, method: HttpMethod, action: &str, body: &B) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let path = format!("/api/users/{action}");
        self.client.call(method, &path, &[], Some(body))
    }

    fn send_unit<B: Serialize + ?Sized>(&self, method: HttpMethod, action: &str, body: &B) -> Result<()> {
        let path = format!("/api/users/{action}");
        self.client.call_unit(method, &path, &[], Some(body))
    }

    /// Year-in-review statistics; `None` means the current year.
    pub fn annual_report(&self, year: Option<i32>) -> Result<Value> {
        let body = match year {
            Some(year) => json!({ "year": year }),
            None => json!({}),
        };
        self.send(HttpMethod::Get, "annual/report", &body)
    }

    pub fn app_sort(&self) -> Result<Map<String, Value>> {
        self.send(HttpMethod::Get, "appsort", &json!({}))
    }

    pub fn save_app_sort(&self, sorts: &Map<String, Value>) -> Result<Map<String, Value>> {
        self.send(HttpMethod::Post, "appsort/save", &json!({ "sorts": sorts }))
    }

    // -----------------------------------------------------------------------
    // Bots and devices
    // -----------------------------------------------------------------------

    pub fn delete_bot(&self, bot_id: i64) -> Result<()> {
        require_id("bot_id", bot_id)?;
        self.send_unit(HttpMethod::Get, "bot/delete", &json!({ "bot_id": bot_id }))
    }

    pub fn bot_list(&self, page: PageQuery) -> Result<Page<Bot>> {
        self.send(HttpMethod::Get, "bot/list", &page)
    }

    /// AI bots the user can talk to.
    pub fn search_ai(&self) -> Result<Vec<Bot>> {
        self.send(HttpMethod::Get, "search/ai", &json!({}))
    }

    pub fn edit_device(&self, device_id: i64, name: &str) -> Result<()> {
        require_id("device_id", device_id)?;
        require("name", name)?;
        let body = json!({ "device_id": device_id, "name": name });
        self.send_unit(HttpMethod::Get, "device/edit", &body)
    }

    pub fn device_list(&self) -> Result<Vec<Device>> {
        self.send(HttpMethod::Get, "device/list", &json!({}))
    }

    /// Sign a device out.
    pub fn logout_device(&self, device_id: i64) -> Result<()> {
        require_id("device_id", device_id)?;
        self.send_unit(HttpMethod::Get, "device/logout", &json!({ "device_id": device_id }))
    }

    // -----------------------------------------------------------------------
    // Account
    // -----------------------------------------------------------------------

    /// Extended profile fields; `None` means the current user.
    pub fn extra(&self, user_id: Option<i64>) -> Result<Value> {
        let body = match user_id {
            Some(user_id) => json!({ "user_id": user_id }),
            None => json!({}),
        };
        self.send(HttpMethod::Get, "extra", &body)
    }

    /// Admin only.
    pub fn sync_department(&self) -> Result<()> {
        self.send_unit(HttpMethod::Get, "department/sync", &json!({}))
    }

    pub fn info_departments(&self) -> Result<Vec<Department>> {
        self.send(HttpMethod::Get, "info/departments", &json!({}))
    }

    pub fn logout(&self) -> Result<()> {
        self.send_unit(HttpMethod::Get, "logout", &json!({}))
    }

    pub fn token_expire(&self) -> Result<TokenExpire> {
        self.send(HttpMethod::Get, "token/expire", &json!({}))
    }

    // -----------------------------------------------------------------------
    // Favorites and history
    // -----------------------------------------------------------------------

    pub fn favorite_check(&self, kind: ObjectKind, id: i64) -> Result<FavoriteState> {
        require_id("id", id)?;
        self.send(HttpMethod::Get, "favorite/check", &json!({ "type": kind, "id": id }))
    }

    pub fn favorite_remark(&self, kind: ObjectKind, id: i64, remark: &str) -> Result<()> {
        require_id("id", id)?;
        let body = json!({ "type": kind, "id": id, "remark": remark });
        self.send_unit(HttpMethod::Post, "favorite/remark", &body)
    }

    /// Flip the favorite flag and return the new state.
    pub fn favorite_toggle(&self, kind: ObjectKind, id: i64) -> Result<FavoriteState> {
        require_id("id", id)?;
        self.send(HttpMethod::Post, "favorite/toggle", &json!({ "type": kind, "id": id }))
    }

    pub fn favorites(&self, kind: Option<ObjectKind>, page: PageQuery) -> Result<Page<Favorite>> {
        self.send(HttpMethod::Get, "favorites", &Filtered { kind, page })
    }

    /// Drop all favorites, or only those of `kind`.
    pub fn clean_favorites(&self, kind: Option<ObjectKind>) -> Result<()> {
        let body = Filtered {
            kind,
            page: PageQuery::default(),
        };
        self.send_unit(HttpMethod::Post, "favorites/clean", &body)
    }

    pub fn recent_browse(&self, kind: Option<ObjectKind>, page: PageQuery) -> Result<Page<RecentBrowse>> {
        self.send(HttpMethod::Get, "recent/browse", &Filtered { kind, page })
    }

    pub fn delete_recent(&self, id: i64) -> Result<()> {
        require_id("id", id)?;
        self.send_unit(HttpMethod::Post, "recent/delete", &json!({ "id": id }))
    }

    pub fn task_browse(&self, page: PageQuery) -> Result<Page<TaskBrowse>> {
        self.send(HttpMethod::Get, "task/browse", &page)
    }

    pub fn save_task_browse(&self, task_id: i64) -> Result<()> {
        require_id("task_id", task_id)?;
        self.send_unit(HttpMethod::Get, "task/browse_save", &json!({ "task_id": task_id }))
    }

    pub fn clean_task_browse(&self) -> Result<()> {
        self.send_unit(HttpMethod::Post, "task/browse_clean", &json!({}))
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    pub fn tags_lists(&self, user_id: Option<i64>) -> Result<Vec<Tag>> {
        let body = match user_id {
            Some(user_id) => json!({ "user_id": user_id }),
            None => json!({}),
        };
        self.send(HttpMethod::Get, "tags/lists", &body)
    }

    pub fn add_tag(&self, name: &str) -> Result<Tag> {
        require("name", name)?;
        self.send(HttpMethod::Post, "tags/add", &json!({ "name": name }))
    }

    pub fn update_tag(&self, tag_id: i64, name: &str) -> Result<Tag> {
        require_id("tag_id", tag_id)?;
        require("name", name)?;
        self.send(HttpMethod::Post, "tags/update", &json!({ "tag_id": tag_id, "name": name }))
    }

    pub fn delete_tag(&self, tag_id: i64) -> Result<()> {
        require_id("tag_id", tag_id)?;
        self.send_unit(HttpMethod::Post, "tags/delete", &json!({ "tag_id": tag_id }))
    }

    /// Endorse someone else's tag.
    pub fn recognize_tag(&self, tag_id: i64) -> Result<()> {
        require_id("tag_id", tag_id)?;
        self.send_unit(HttpMethod::Post, "tags/recognize", &json!({ "tag_id": tag_id }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::services::testing::{body, last, recording_client};

    #[test]
    fn tags_lists_wraps_single_object() {
        let (client, seen) =
            recording_client(r#"{"ret":1,"data":{"id":3,"userid":1,"name":"rustacean","recognition":2}}"#);
        let tags = client.users().tags_lists(Some(1)).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].recognition, 2);
        let req = last(&seen);
        assert_eq!(req.url, "http://dootask.local/api/users/tags/lists");
        assert_eq!(body(&req), json!({"user_id": 1}));
    }

    #[test]
    fn add_tag_unwraps_single_element_array() {
        let (client, seen) = recording_client(r#"{"ret":1,"data":[{"id":9,"name":"oncall"}]}"#);
        let tag = client.users().add_tag("oncall").unwrap();
        assert_eq!(tag.id, 9);
        assert_eq!(last(&seen).method, HttpMethod::Post);
    }

    #[test]
    fn task_browse_accepts_bare_array() {
        let (client, _) = recording_client(r#"{"ret":1,"data":[{"id":1,"task_id":4},{"id":2,"task_id":5}]}"#);
        let page = client.users().task_browse(PageQuery::default()).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn favorites_filter_flattens_paging() {
        let (client, seen) = recording_client(r#"{"ret":1,"data":{"data":[],"total":0}}"#);
        let page = client
            .users()
            .favorites(Some(ObjectKind::Project), PageQuery::new(2, 10))
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(
            body(&last(&seen)),
            json!({"type": "project", "page": 2, "pagesize": 10})
        );
    }

    #[test]
    fn device_list_tolerates_empty_data() {
        let (client, _) = recording_client(r#"{"ret":1,"data":null}"#);
        assert!(client.users().device_list().unwrap().is_empty());
    }

    #[test]
    fn update_tag_requires_name() {
        let (client, seen) = recording_client(r#"{"ret":1}"#);
        assert_eq!(client.users().update_tag(3, " ").unwrap_err().kind(), ErrorKind::Request);
        assert!(seen.borrow().is_empty());
    }
}
