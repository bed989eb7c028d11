use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "test-key";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("ApiKey", KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("ApiKey", KEY)
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app(KEY)
        .oneshot(Request::builder().uri("/consent/").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let resp = app(KEY)
        .oneshot(
            Request::builder()
                .uri("/subjects/abc")
                .header("ApiKey", "nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- consents ---

#[tokio::test]
async fn list_consents_empty() {
    let resp = app(KEY).oneshot(get("/consent/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn create_consent_returns_assigned_ids() {
    let resp = app(KEY)
        .oneshot(json_request(
            "POST",
            "/consent/",
            json!({"subject": {"email": "ada@example.com"}, "preferences": {"newsletter": true}}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert!(body["id"].is_string());
    assert!(body["subject_id"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn create_consent_keeps_supplied_timestamp() {
    let resp = app(KEY)
        .oneshot(json_request(
            "POST",
            "/consent/",
            json!({"subject": {"id": "s1"}, "timestamp": "2024-01-01T00:00:00+00:00"}),
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["timestamp"], "2024-01-01T00:00:00+00:00");
    assert_eq!(body["subject_id"], "s1");
}

#[tokio::test]
async fn create_consent_without_subject_returns_422() {
    let resp = app(KEY)
        .oneshot(json_request("POST", "/consent/", json!({"subject": false})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_consent_not_found() {
    let resp = app(KEY).oneshot(get("/consent/missing")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- subjects ---

#[tokio::test]
async fn update_subject_not_found() {
    let resp = app(KEY)
        .oneshot(json_request("PUT", "/subjects/missing", json!({"email": "x@y.z"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn consent_lifecycle() {
    use tower::Service;

    let mut app = app(KEY).into_service();

    // create subject
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/subjects/", json!({"email": "ada@example.com"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let subject = body_json(resp).await;
    let subject_id = subject["id"].as_str().unwrap().to_string();
    assert_eq!(subject["verified"], false);

    // update subject: partial
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/subjects/{subject_id}"),
            json!({"first_name": "Ada"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["email"], "ada@example.com"); // unchanged
    assert_eq!(updated["first_name"], "Ada");

    // create consent for that subject
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/consent/",
            json!({"subject": {"id": subject_id}, "source": "private"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["subject_id"], subject_id.as_str());
    let consent_id = created["id"].as_str().unwrap().to_string();

    // get consent: subject is embedded in full
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/consent/{consent_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let consent = body_json(resp).await;
    assert_eq!(consent["subject"]["first_name"], "Ada");
    assert_eq!(consent["source"], "private");

    // list filtered by subject
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/consent/?subject_id={subject_id}")))
        .await
        .unwrap();
    let consents = body_json(resp).await;
    assert_eq!(consents.as_array().unwrap().len(), 1);

    // list filtered by a subject with no consents
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/consent/?subject_id=nobody"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!([]));
}
