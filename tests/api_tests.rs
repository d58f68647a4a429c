use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use guildpost::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // One connection so every query sees the same in-memory database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;
    // Cheap argon2 parameters to keep the suite fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = guildpost::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    guildpost::api::router(state).await
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str, password: &str, habby_id: &str) -> Response<Body> {
    send_json(
        app,
        "POST",
        "/register-user",
        serde_json::json!({
            "username": username,
            "password": password,
            "habby_id": habby_id,
        }),
        None,
    )
    .await
}

/// Logs in and returns the session cookie to attach to later requests.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = send_json(
        app,
        "POST",
        "/login",
        serde_json::json!({ "username": username, "password": password }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn first_registration_becomes_admin() {
    let app = spawn_app().await;

    let response = register(&app, "alice", "secret", "H-ALICE").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "admin");

    let response = register(&app, "bob", "secret", "H-BOB").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "member");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = spawn_app().await;

    assert_eq!(
        register(&app, "carol", "secret", "H-CAROL").await.status(),
        StatusCode::CREATED
    );

    let response = register(&app, "carol", "other", "H-OTHER").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = register(&app, "carol2", "other", "H-CAROL").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_requires_all_fields() {
    let app = spawn_app().await;

    let response = send_json(
        &app,
        "POST",
        "/register-user",
        serde_json::json!({ "username": "dave", "password": "" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failure_is_opaque() {
    let app = spawn_app().await;
    register(&app, "dave", "secret", "H-DAVE").await;

    let wrong_password = send_json(
        &app,
        "POST",
        "/login",
        serde_json::json!({ "username": "dave", "password": "nope" }),
        None,
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_user = send_json(
        &app,
        "POST",
        "/login",
        serde_json::json!({ "username": "nobody", "password": "nope" }),
        None,
    )
    .await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    // Same error body whether the username exists or not.
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_user).await;
    assert_eq!(a["error"], b["error"]);
}

#[tokio::test]
async fn session_lifecycle() {
    let app = spawn_app().await;
    register(&app, "erin", "secret", "H-ERIN").await;

    let response = get(&app, "/session", None).await;
    let body = body_json(response).await;
    assert_eq!(body["isLoggedIn"], false);

    let cookie = login(&app, "erin", "secret").await;

    let response = get(&app, "/session", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["isLoggedIn"], true);
    assert_eq!(body["user"]["username"], "erin");
    assert_eq!(body["user"]["habby_id"], "H-ERIN");

    let response = send_json(&app, "POST", "/logout", serde_json::json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/session", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["isLoggedIn"], false);
}

#[tokio::test]
async fn user_list_requires_leadership() {
    let app = spawn_app().await;
    register(&app, "admin", "secret", "H-ADMIN").await;
    register(&app, "member", "secret", "H-MEMBER").await;

    let response = get(&app, "/users", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let member_cookie = login(&app, "member", "secret").await;
    let response = get(&app, "/users", Some(&member_cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_cookie = login(&app, "admin", "secret").await;
    let response = get(&app, "/users", Some(&admin_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    // Ordered by role, so the admin row comes first, with profile data joined in.
    assert_eq!(users[0]["username"], "admin");
    assert_eq!(users[0]["nick"], "admin");
}

async fn user_id_by_name(app: &Router, admin_cookie: &str, username: &str) -> i64 {
    let body = body_json(get(app, "/users", Some(admin_cookie)).await).await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == username)
        .expect("user should be listed")["id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn role_update_rules() {
    let app = spawn_app().await;
    register(&app, "admin", "secret", "H-ADMIN").await;
    register(&app, "bob", "secret", "H-BOB").await;

    let admin_cookie = login(&app, "admin", "secret").await;
    let bob_id = user_id_by_name(&app, &admin_cookie, "bob").await;
    let admin_id = user_id_by_name(&app, &admin_cookie, "admin").await;

    // Members cannot touch roles at all.
    let bob_cookie = login(&app, "bob", "secret").await;
    let response = send_json(
        &app,
        "PUT",
        &format!("/users/{admin_id}/role"),
        serde_json::json!({ "role": "member" }),
        Some(&bob_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Promotion to leader works.
    let response = send_json(
        &app,
        "PUT",
        &format!("/users/{bob_id}/role"),
        serde_json::json!({ "role": "leader" }),
        Some(&admin_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Admin is not assignable through this endpoint.
    let response = send_json(
        &app,
        "PUT",
        &format!("/users/{bob_id}/role"),
        serde_json::json!({ "role": "admin" }),
        Some(&admin_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Admins cannot demote themselves.
    let response = send_json(
        &app,
        "PUT",
        &format!("/users/{admin_id}/role"),
        serde_json::json!({ "role": "member" }),
        Some(&admin_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown target id is a silent no-op.
    let response = send_json(
        &app,
        "PUT",
        "/users/9999/role",
        serde_json::json!({ "role": "leader" }),
        Some(&admin_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_rules() {
    let app = spawn_app().await;
    register(&app, "admin", "secret", "H-ADMIN").await;
    register(&app, "lead", "secret", "H-LEAD").await;
    register(&app, "member", "secret", "H-MEMBER").await;

    let admin_cookie = login(&app, "admin", "secret").await;
    let lead_id = user_id_by_name(&app, &admin_cookie, "lead").await;
    let admin_id = user_id_by_name(&app, &admin_cookie, "admin").await;
    let member_id = user_id_by_name(&app, &admin_cookie, "member").await;

    send_json(
        &app,
        "PUT",
        &format!("/users/{lead_id}/role"),
        serde_json::json!({ "role": "leader" }),
        Some(&admin_cookie),
    )
    .await;

    let lead_cookie = login(&app, "lead", "secret").await;

    // Leaders cannot delete admins or themselves.
    let response = get_delete(&app, admin_id, &lead_cookie).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = get_delete(&app, lead_id, &lead_cookie).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Leaders may delete members.
    let response = get_delete(&app, member_id, &lead_cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Already deleted.
    let response = get_delete(&app, member_id, &admin_cookie).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Cascade removed the profile too.
    let response = get(&app, "/profile/H-MEMBER", Some(&admin_cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Admins may delete leaders.
    let response = get_delete(&app, lead_id, &admin_cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn get_delete(app: &Router, id: i64, cookie: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/{id}"))
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn profile_partial_update_and_ownership() {
    let app = spawn_app().await;
    register(&app, "frank", "secret", "H-FRANK").await;
    let cookie = login(&app, "frank", "secret").await;

    let response = send_json(
        &app,
        "PUT",
        "/profile",
        serde_json::json!({ "habby_id": "H-FRANK", "atk": 123.5 }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A later update of a different field leaves atk untouched.
    let response = send_json(
        &app,
        "PUT",
        "/profile",
        serde_json::json!({ "habby_id": "H-FRANK", "nick": "Franky" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Unauthenticated reads are rejected.
    let response = get(&app, "/profile/H-FRANK", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(get(&app, "/profile/H-FRANK", Some(&cookie)).await).await;
    assert_eq!(body["data"]["atk"], 123.5);
    assert_eq!(body["data"]["nick"], "Franky");

    // Someone else's profile is off limits.
    let response = send_json(
        &app,
        "PUT",
        "/profile",
        serde_json::json!({ "habby_id": "H-OTHER", "atk": 1.0 }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A body with no editable fields is rejected.
    let response = send_json(
        &app,
        "PUT",
        "/profile",
        serde_json::json!({ "habby_id": "H-FRANK" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // An explicit null counts as absent, not as a request to clear the stat.
    let response = send_json(
        &app,
        "PUT",
        "/profile",
        serde_json::json!({ "habby_id": "H-FRANK", "atk": null }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(get(&app, "/profile/H-FRANK", Some(&cookie)).await).await;
    assert_eq!(body["data"]["atk"], 123.5);

    // No session at all.
    let response = send_json(
        &app,
        "PUT",
        "/profile",
        serde_json::json!({ "habby_id": "H-FRANK", "atk": 1.0 }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_users_minimum_query_length() {
    let app = spawn_app().await;
    register(&app, "frank", "secret", "H-FRANK").await;

    let response = get(&app, "/search-users?query=fra", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&app, "frank", "secret").await;

    let body = body_json(get(&app, "/search-users?query=f", Some(&cookie)).await).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // A single multibyte character is still below the minimum length.
    let body = body_json(get(&app, "/search-users?query=%C3%A9", Some(&cookie)).await).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let body = body_json(get(&app, "/search-users?query=fra", Some(&cookie)).await).await;
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["habby_id"], "H-FRANK");
    assert_eq!(hits[0]["nick"], "frank");
}

#[tokio::test]
async fn season_creation_and_listing() {
    let app = spawn_app().await;
    register(&app, "admin", "secret", "H-ADMIN").await;
    register(&app, "member", "secret", "H-MEMBER").await;

    let payload = serde_json::json!({
        "startDate": "2025-06-01",
        "endDate": "2025-06-14",
        "participants": [
            { "habby_id": "H-MEMBER", "name": "member", "fase": 12, "r1": 3, "r2": 4, "r3": 5, "total": 12 },
            { "habby_id": null, "name": "guest", "fase": 8, "r1": 2, "r2": 3, "r3": 3 }
        ]
    });

    let response = send_json(&app, "POST", "/seasons", payload.clone(), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let member_cookie = login(&app, "member", "secret").await;
    let response = send_json(&app, "POST", "/seasons", payload.clone(), Some(&member_cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_cookie = login(&app, "admin", "secret").await;

    let response = send_json(
        &app,
        "POST",
        "/seasons",
        serde_json::json!({ "startDate": "", "endDate": "2025-06-14" }),
        Some(&admin_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_json(&app, "POST", "/seasons", payload, Some(&admin_cookie)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert!(body["data"]["seasonId"].is_i64());

    // Listing is public and includes the roster.
    let body = body_json(get(&app, "/seasons", None).await).await;
    let seasons = body.as_array().unwrap();
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0]["start_date"], "2025-06-01");
    assert_eq!(seasons[0]["participants"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn history_reports_latest_participation() {
    let app = spawn_app().await;
    register(&app, "admin", "secret", "H-ADMIN").await;
    let cookie = login(&app, "admin", "secret").await;

    let season = |start: &str, end: &str, fase: i64| {
        serde_json::json!({
            "startDate": start,
            "endDate": end,
            "participants": [
                { "habby_id": "H-P1", "name": "p1", "fase": fase, "r1": 0, "r2": 0, "r3": 0 },
                { "habby_id": "H-P2", "name": "p2", "fase": 20, "r1": 0, "r2": 0, "r3": 0 }
            ]
        })
    };

    let response = send_json(
        &app,
        "POST",
        "/seasons",
        season("2025-05-01", "2025-05-14", 10),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = send_json(
        &app,
        "POST",
        "/seasons",
        season("2025-06-01", "2025-06-14", 15),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(get(&app, "/history/H-P1", Some(&cookie)).await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["fase_acesso"], 15);
    // Second behind H-P2's fase 20 in the latest season.
    assert_eq!(body["data"]["position"], 2);
    assert_eq!(body["data"]["evolution"], 5);
    assert_eq!(body["data"]["start_date"], "2025-06-01");

    // A player who never competed yields null, not 404.
    let body = body_json(get(&app, "/history/H-NOBODY", Some(&cookie)).await).await;
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn home_content_roundtrip() {
    let app = spawn_app().await;
    register(&app, "admin", "secret", "H-ADMIN").await;
    register(&app, "member", "secret", "H-MEMBER").await;

    // Seeded singleton row with empty fields.
    let body = body_json(get(&app, "/home-content", None).await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["requirements"].as_array().unwrap().len(), 0);

    let payload = serde_json::json!({
        "leader": "Alice",
        "focus": "PvE",
        "league": "Diamond",
        "requirements": ["be active", "join discord"],
        "about_us": "A friendly guild",
        "content_section": "Welcome!"
    });

    let response = send_json(&app, "PUT", "/home-content", payload.clone(), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let member_cookie = login(&app, "member", "secret").await;
    let response = send_json(&app, "PUT", "/home-content", payload.clone(), Some(&member_cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_cookie = login(&app, "admin", "secret").await;
    let response = send_json(&app, "PUT", "/home-content", payload, Some(&admin_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(get(&app, "/home-content", None).await).await;
    assert_eq!(body["data"]["leader"], "Alice");
    assert_eq!(
        body["data"]["requirements"],
        serde_json::json!(["be active", "join discord"])
    );
}
