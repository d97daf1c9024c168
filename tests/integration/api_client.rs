use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use rental_desk::{
    config::ApiConfig,
    models::{
        report::{ReportType, ReturnCondition},
        session::Credentials,
    },
    repository::{AuthBackend, DataBackend, Repository, RestClient, SessionStore},
    AppError,
};

use crate::stub_server::{route, StubServer};

const ANON_KEY: &str = "anon-key";
const USER_ID: &str = "7d4f0a8e-1b52-4d6c-9d8e-0c0c2f3a1b11";

fn session_json(access_token: &str, expires_at: i64) -> String {
    json!({
        "access_token": access_token,
        "refresh_token": "refresh-1",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": expires_at,
        "user": { "id": USER_ID, "email": "desk@example.com" }
    })
    .to_string()
}

fn far_future() -> i64 {
    chrono::Utc::now().timestamp() + 3600
}

fn repository(server: &StubServer, store: SessionStore) -> Repository {
    let config = ApiConfig {
        url: format!("{}/", server.url),
        anon_key: ANON_KEY.to_string(),
        ..Default::default()
    };
    Repository::with_client(RestClient::new(&config).unwrap(), store)
}

#[tokio::test]
async fn sign_in_then_fetch_history_with_user_token() {
    let history = json!([
        {
            "id": 7,
            "created_at": "2024-05-02T10:15:00+00:00",
            "type": "returned",
            "return_condition": "damaged",
            "item_name": "Party tent",
            "quantity": 2,
            "notes": null,
            "damage_notes": "Torn flap",
            "rentals": { "renter_name": "Jane Smith", "rent_date": "2024-04-28", "return_date": "2024-05-02" }
        },
        {
            "id": 6,
            "created_at": "2024-05-01T08:00:00+00:00",
            "type": "sold",
            "rentals": { "renter_name": "Bob Jones" }
        }
    ]);
    let server = StubServer::start(vec![
        route("POST", "/auth/v1/token", 200, session_json("user-token", far_future())),
        route("GET", "/rest/v1/reports", 200, history.to_string()),
    ])
    .await;

    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let repo = repository(&server, SessionStore::new(session_file.clone()));

    let session = assert_ok!(
        repo.auth
            .sign_in_with_password(&Credentials::new("desk@example.com", "secret"))
            .await
    );
    assert_eq!(session.access_token, "user-token");
    assert!(session_file.exists());

    let records = assert_ok!(repo.return_history().await);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].return_condition, Some(ReturnCondition::Damaged));
    assert_eq!(records[0].renter_name(), Some("Jane Smith"));
    assert_eq!(records[1].report_type, ReportType::Sold);
    assert_eq!(records[1].condition_label(), "good");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);

    let sign_in = &requests[0];
    assert_eq!(sign_in.method, "POST");
    assert_eq!(sign_in.target, "/auth/v1/token?grant_type=password");
    assert_eq!(sign_in.header("apikey"), Some(ANON_KEY));
    assert_eq!(sign_in.header("authorization"), Some("Bearer anon-key"));
    let body: serde_json::Value = serde_json::from_str(&sign_in.body).unwrap();
    assert_eq!(body, json!({ "email": "desk@example.com", "password": "secret" }));

    let fetch = &requests[1];
    assert_eq!(fetch.method, "GET");
    assert_eq!(fetch.header("authorization"), Some("Bearer user-token"));
    assert!(fetch.target.contains("order=created_at.desc"));
    assert!(fetch.target.contains("select="));
    assert!(fetch.target.contains("type=in."));
}

#[tokio::test]
async fn rejected_sign_in_carries_provider_message() {
    let server = StubServer::start(vec![route(
        "POST",
        "/auth/v1/token",
        400,
        r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
    )])
    .await;
    let repo = repository(&server, SessionStore::in_memory());

    let err = assert_err!(
        repo.auth
            .sign_in_with_password(&Credentials::new("desk@example.com", "nope"))
            .await
    );
    match err {
        AppError::Remote { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid login credentials");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(assert_ok!(repo.auth.get_session().await).is_none());
}

#[tokio::test]
async fn saved_session_is_restored_and_cleared_on_sign_out() {
    let server = StubServer::start(vec![
        route("GET", "/auth/v1/user", 200, json!({ "id": USER_ID, "email": "desk@example.com" }).to_string()),
        route("POST", "/auth/v1/logout", 204, ""),
    ])
    .await;

    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    std::fs::write(&session_file, session_json("saved-token", far_future())).unwrap();

    let repo = repository(&server, SessionStore::new(session_file.clone()));
    let user = assert_ok!(repo.auth.get_user().await).unwrap();
    assert_eq!(user.id, Uuid::parse_str(USER_ID).unwrap());

    assert_ok!(repo.auth.sign_out().await);
    assert!(!session_file.exists());
    assert!(assert_ok!(repo.auth.get_session().await).is_none());

    let requests = server.requests();
    assert_eq!(requests[0].header("authorization"), Some("Bearer saved-token"));
    assert_eq!(requests[1].path(), "/auth/v1/logout");
    assert_eq!(requests[1].header("authorization"), Some("Bearer saved-token"));
}

#[tokio::test]
async fn expired_session_is_refreshed() {
    let server = StubServer::start(vec![route(
        "POST",
        "/auth/v1/token",
        200,
        session_json("fresh-token", far_future()),
    )])
    .await;

    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    std::fs::write(&session_file, session_json("stale-token", 1_600_000_000)).unwrap();

    let repo = repository(&server, SessionStore::new(session_file));
    let session = assert_ok!(repo.auth.get_session().await).unwrap();
    assert_eq!(session.access_token, "fresh-token");

    let refresh = &server.requests()[0];
    assert_eq!(refresh.target, "/auth/v1/token?grant_type=refresh_token");
    assert!(refresh.body.contains("refresh-1"));
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let server = StubServer::start(vec![route(
        "GET",
        "/rest/v1/profiles",
        406,
        r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#,
    )])
    .await;
    let repo = repository(&server, SessionStore::in_memory());

    let err = assert_err!(repo.profile_by_id(Uuid::new_v4()).await);
    assert!(matches!(err, AppError::NotFound(_)));

    let request = &server.requests()[0];
    assert_eq!(request.header("accept"), Some("application/vnd.pgrst.object+json"));
    assert!(request.target.contains("select=*") || request.target.contains("select=%2A"));
}

#[tokio::test]
async fn password_reset_sends_redirect() {
    let server = StubServer::start(vec![route("POST", "/auth/v1/recover", 200, "{}")]).await;
    let repo = repository(&server, SessionStore::in_memory());

    assert_ok!(
        repo.auth
            .reset_password_for_email("desk@example.com", "https://desk.example.com/reset.html")
            .await
    );

    let request = &server.requests()[0];
    assert!(request.target.starts_with("/auth/v1/recover?redirect_to="));
    assert!(request.target.contains("reset.html"));
    assert_eq!(request.body, r#"{"email":"desk@example.com"}"#);
}
