use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app_with_token, DOWNLOAD_BYTES, DOWNLOAD_KEY};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "test-token";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// A request shaped like the SDK sends it: token header and a JSON body,
/// even on GET.
fn api_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("Token", TOKEN)
        .body(body.to_string())
        .unwrap()
}

// --- authentication ---

#[tokio::test]
async fn missing_token_fails_inside_envelope() {
    let resp = app_with_token(TOKEN)
        .oneshot(
            Request::builder()
                .uri("/api/project/lists")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ret"], -1);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let resp = app_with_token("other")
        .oneshot(api_request("GET", "/api/report/unread", ""))
        .await
        .unwrap();

    assert_eq!(body_json(resp).await["ret"], -1);
}

// --- payload quirks ---

#[tokio::test]
async fn single_tag_is_a_bare_object() {
    let resp = app_with_token(TOKEN)
        .oneshot(api_request("GET", "/api/users/tags/lists", "{}"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["ret"], 1);
    assert!(body["data"].is_object());
    assert_eq!(body["data"]["name"], "rustacean");
}

#[tokio::test]
async fn added_tag_is_wrapped_in_array() {
    let resp = app_with_token(TOKEN)
        .oneshot(api_request("POST", "/api/users/tags/add", r#"{"name":"oncall"}"#))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "oncall");
}

#[tokio::test]
async fn unknown_dialog_is_ret_zero() {
    let resp = app_with_token(TOKEN)
        .oneshot(api_request("GET", "/api/dialog/detail/999", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ret"], 0);
    assert!(!body["msg"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn file_lists_filters_by_parent() {
    let resp = app_with_token(TOKEN)
        .oneshot(api_request("GET", "/api/file/lists?pid=1", ""))
        .await
        .unwrap();

    let body = body_json(resp).await;
    let files = body["data"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "Roadmap");
}

// --- downloads and failures ---

#[tokio::test]
async fn download_confirm_serves_raw_bytes() {
    let uri = format!("/api/file/download/confirm?key={DOWNLOAD_KEY}");
    let resp = app_with_token(TOKEN)
        .oneshot(api_request("GET", &uri, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(body_bytes(resp).await.as_ref(), DOWNLOAD_BYTES);
}

#[tokio::test]
async fn crash_is_plain_text_500() {
    let resp = app_with_token(TOKEN)
        .oneshot(Request::builder().uri("/api/system/crash").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(resp).await.as_ref(), b"upstream exploded");
}

// --- project lifecycle ---

#[tokio::test]
async fn project_lifecycle() {
    use tower::Service;

    let mut app = app_with_token(TOKEN).into_service();

    // add
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(
            "GET",
            "/api/project/add",
            r#"{"name":"Launch","columns":["Todo","Done"]}"#,
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["ret"], 1);
    assert_eq!(body["data"]["columns"].as_array().unwrap().len(), 2);
    let id = body["data"]["id"].as_i64().unwrap();

    // one
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request("GET", "/api/project/one", &format!(r#"{{"project_id":{id}}}"#)))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["name"], "Launch");

    // lists
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request("GET", "/api/project/lists", "{}"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["total"], 1);

    // remove
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request("GET", "/api/project/remove", &format!(r#"{{"project_id":{id}}}"#)))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["ret"], 1);
    assert!(body["data"].is_string());

    // one after remove
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request("GET", "/api/project/one", &format!(r#"{{"project_id":{id}}}"#)))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["ret"], 0);
}
