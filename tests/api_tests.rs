use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use scribe::config::Config;
use scribe::state::SharedState;
use serde_json::{Value, json};
use tower::ServiceExt;

const PASSWORD: &str = "correct-horse";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;
    config
}

async fn spawn_app() -> (Router, Arc<SharedState>) {
    let shared = Arc::new(
        SharedState::new(test_config())
            .await
            .expect("Failed to create shared state"),
    );
    let state = scribe::api::create_app_state(shared.clone(), None);
    (scribe::api::router(state), shared)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers `name` and returns the bearer token from the response.
async fn register(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({"user": {
            "username": name,
            "email": format!("{name}@example.com"),
            "password": PASSWORD,
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["data"]["user"]["token"].as_str().unwrap().to_string()
}

async fn create_article(app: &Router, token: &str, title: &str, tags: &[&str]) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/articles",
        Some(token),
        Some(json!({"article": {
            "title": title,
            "description": "desc",
            "body": "body text",
            "tagList": tags,
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    body["article"].clone()
}

#[tokio::test]
async fn register_login_and_current_user() {
    let (app, _) = spawn_app().await;
    let token = register(&app, "jake").await;

    let (status, body) = send(&app, "GET", "/api/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 10000);
    assert_eq!(body["data"]["user"]["username"], "jake");
    assert_eq!(body["data"]["user"]["email"], "jake@example.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"user": {"email": "JAKE@example.com", "password": PASSWORD}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["user"]["token"].as_str().unwrap();
    assert_ne!(rotated, token);

    // The previous token no longer authenticates after login.
    let (status, _) = send(&app, "GET", "/api/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/api/user", Some(rotated), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let (app, _) = spawn_app().await;
    register(&app, "jake").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/users/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"user": {"email": "jake@example.com", "password": PASSWORD}}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .expect("login sets a session cookie");

    let request = Request::builder()
        .uri("/api/user")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let (app, _) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 10003);
    assert!(body["errors"]["body"].is_array());

    let (status, _) = send(&app, "GET", "/api/user", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/articles",
        None,
        Some(json!({"article": {"title": "t", "description": "d", "body": "b"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 10003);
}

#[tokio::test]
async fn registration_errors() {
    let (app, _) = spawn_app().await;
    register(&app, "jake").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({"user": {"username": "jake", "email": "other@example.com", "password": PASSWORD}})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 10001);

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({"user": {"username": "anne", "email": "not-an-email", "password": PASSWORD}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 10008);

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({"user": {"username": "anne"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 10008);
}

#[tokio::test]
async fn login_errors() {
    let (app, _) = spawn_app().await;
    register(&app, "jake").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"user": {"email": "nobody@example.com", "password": PASSWORD}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10002);

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"user": {"email": "jake@example.com", "password": "wrong-password"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 10009);
}

#[tokio::test]
async fn confirm_and_update_user() {
    let (app, shared) = spawn_app().await;
    let token = register(&app, "jake").await;

    let user = shared
        .store
        .get_user_by_username("jake")
        .await
        .unwrap()
        .unwrap();
    let confirm_token = shared
        .store
        .get_user_confirm_token(user.id)
        .await
        .unwrap()
        .expect("registration issues a confirmation token");

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/confirm",
        Some(&token),
        Some(json!({"user": {"token": "bogus"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 10008);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/confirm",
        Some(&token),
        Some(json!({"user": {"token": confirm_token}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/user",
        Some(&token),
        Some(json!({"user": {"bio": "I like to skateboard", "image": "https://i.example/j.png"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["bio"], "I like to skateboard");
    assert_eq!(body["data"]["user"]["image"], "https://i.example/j.png");
    assert_eq!(body["data"]["user"]["username"], "jake");
}

#[tokio::test]
async fn article_lifecycle() {
    let (app, _) = spawn_app().await;
    let jake = register(&app, "jake").await;
    let anne = register(&app, "anne").await;

    let article = create_article(&app, &jake, "How to train your dragon", &["dragons", "training"]).await;
    assert_eq!(article["slug"], "how-to-train-your-dragon");
    assert_eq!(article["tagList"], json!(["dragons", "training"]));
    assert_eq!(article["favorited"], false);
    assert_eq!(article["favoritesCount"], 0);
    assert_eq!(article["author"]["username"], "jake");

    let (status, body) = send(&app, "GET", "/api/articles/how-to-train-your-dragon", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["title"], "How to train your dragon");

    let (status, body) = send(
        &app,
        "POST",
        "/api/articles",
        Some(&anne),
        Some(json!({"article": {"title": "How to train your dragon", "description": "d", "body": "b"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 10005);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/articles/how-to-train-your-dragon",
        Some(&anne),
        Some(json!({"article": {"body": "hijacked"}})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 10006);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/articles/how-to-train-your-dragon",
        Some(&jake),
        Some(json!({"article": {"title": "Did you train your dragon"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["slug"], "did-you-train-your-dragon");

    let (status, body) = send(&app, "GET", "/api/articles/how-to-train-your-dragon", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10004);

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/articles/did-you-train-your-dragon",
        Some(&jake),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/articles/did-you-train-your-dragon", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_and_listing_filters() {
    let (app, _) = spawn_app().await;
    let jake = register(&app, "jake").await;
    let anne = register(&app, "anne").await;

    create_article(&app, &jake, "First post", &["intro"]).await;
    create_article(&app, &jake, "Second post", &["rust"]).await;
    create_article(&app, &anne, "Anne writes", &["rust"]).await;

    let (status, body) = send(&app, "POST", "/api/articles/first-post/favorite", Some(&anne), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["favorited"], true);
    assert_eq!(body["article"]["favoritesCount"], 1);

    // Favoriting twice is idempotent.
    let (_, body) = send(&app, "POST", "/api/articles/first-post/favorite", Some(&anne), None).await;
    assert_eq!(body["article"]["favoritesCount"], 1);

    let (_, body) = send(&app, "GET", "/api/articles", None, None).await;
    assert_eq!(body["articlesCount"], 3);
    assert_eq!(body["articles"][0]["title"], "Anne writes");

    let (_, body) = send(&app, "GET", "/api/articles?tag=rust", None, None).await;
    assert_eq!(body["articlesCount"], 2);

    let (_, body) = send(&app, "GET", "/api/articles?author=jake&limit=1", None, None).await;
    assert_eq!(body["articlesCount"], 2);
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/api/articles?favorited=anne", Some(&anne), None).await;
    assert_eq!(body["articlesCount"], 1);
    assert_eq!(body["articles"][0]["slug"], "first-post");
    assert_eq!(body["articles"][0]["favorited"], true);

    let (_, body) = send(&app, "GET", "/api/articles?tag=unknown", None, None).await;
    assert_eq!(body["articlesCount"], 0);

    let (status, body) = send(&app, "GET", "/api/articles?limit=abc", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 10008);

    let (_, body) = send(&app, "DELETE", "/api/articles/first-post/favorite", Some(&anne), None).await;
    assert_eq!(body["article"]["favorited"], false);
    assert_eq!(body["article"]["favoritesCount"], 0);

    let (_, body) = send(&app, "GET", "/api/tags", None, None).await;
    assert_eq!(body["code"], 10000);
    assert_eq!(body["data"]["tags"], json!(["intro", "rust"]));
}

#[tokio::test]
async fn comments_flow() {
    let (app, _) = spawn_app().await;
    let jake = register(&app, "jake").await;
    let anne = register(&app, "anne").await;
    create_article(&app, &jake, "Commented", &[]).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/articles/commented/comments",
        Some(&anne),
        Some(json!({"comment": {"body": "Nice!"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comment"]["author"]["username"], "anne");
    let first_id = body["comment"]["id"].as_i64().unwrap();

    send(
        &app,
        "POST",
        "/api/articles/commented/comments",
        Some(&jake),
        Some(json!({"comment": {"body": "Thanks"}})),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/articles/commented/comments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["body"], "Nice!");
    assert_eq!(comments[1]["body"], "Thanks");

    let uri = format!("/api/articles/commented/comments/{first_id}");
    let (status, body) = send(&app, "DELETE", &uri, Some(&jake), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 10006);

    let (status, _) = send(&app, "DELETE", &uri, Some(&anne), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", &uri, Some(&anne), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10004);

    let (status, body) = send(
        &app,
        "POST",
        "/api/articles/commented/comments",
        Some(&anne),
        Some(json!({"comment": {"body": "   "}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 10008);

    let (status, body) = send(&app, "GET", "/api/articles/missing/comments", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10004);
}

#[tokio::test]
async fn follow_and_feed() {
    let (app, _) = spawn_app().await;
    let jake = register(&app, "jake").await;
    let anne = register(&app, "anne").await;
    create_article(&app, &jake, "Jake on rust", &[]).await;

    let (_, body) = send(&app, "GET", "/api/articles/feed", Some(&anne), None).await;
    assert_eq!(body["articlesCount"], 0);

    let (status, body) = send(&app, "POST", "/api/profiles/jake/follow", Some(&anne), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile"]["username"], "jake");
    assert_eq!(body["data"]["profile"]["following"], true);

    let (_, body) = send(&app, "GET", "/api/profiles/jake", Some(&anne), None).await;
    assert_eq!(body["data"]["profile"]["following"], true);
    let (_, body) = send(&app, "GET", "/api/profiles/jake", None, None).await;
    assert_eq!(body["data"]["profile"]["following"], false);

    let (_, body) = send(&app, "GET", "/api/articles/feed", Some(&anne), None).await;
    assert_eq!(body["articlesCount"], 1);
    assert_eq!(body["articles"][0]["author"]["following"], true);

    let (status, body) = send(&app, "POST", "/api/profiles/anne/follow", Some(&anne), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10007);

    let (status, body) = send(&app, "GET", "/api/profiles/nobody", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10004);

    let (_, body) = send(&app, "DELETE", "/api/profiles/jake/follow", Some(&anne), None).await;
    assert_eq!(body["data"]["profile"]["following"], false);

    let (status, _) = send(&app, "GET", "/api/articles/feed", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleting_article_removes_comments_and_favorites() {
    let (app, shared) = spawn_app().await;
    let jake = register(&app, "jake").await;
    let anne = register(&app, "anne").await;
    create_article(&app, &jake, "Short lived", &["gone"]).await;

    send(&app, "POST", "/api/articles/short-lived/favorite", Some(&anne), None).await;
    send(
        &app,
        "POST",
        "/api/articles/short-lived/comments",
        Some(&anne),
        Some(json!({"comment": {"body": "bye"}})),
    )
    .await;

    let article = shared
        .store
        .get_article_by_slug("short-lived")
        .await
        .unwrap()
        .unwrap();

    let (status, _) = send(&app, "DELETE", "/api/articles/short-lived", Some(&jake), None).await;
    assert_eq!(status, StatusCode::OK);

    assert!(shared.store.list_comments(article.id).await.unwrap().is_empty());
    assert!(
        shared
            .store
            .favorite_counts(&[article.id])
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let (app, _) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 10000);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);

    let (status, body) = send(&app, "GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10004);
    assert!(body["errors"]["body"][0].as_str().unwrap().contains("/api/nope"));
}

#[tokio::test]
async fn malformed_path_values_use_the_envelope() {
    let (app, _) = spawn_app().await;
    let jake = register(&app, "jake").await;
    create_article(&app, &jake, "Has comments", &[]).await;

    for id in ["abc", "99999999999"] {
        let uri = format!("/api/articles/has-comments/comments/{id}");
        let (status, body) = send(&app, "DELETE", &uri, Some(&jake), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "id {id}");
        assert_eq!(body["code"], 10008);
        assert!(body["errors"]["body"].is_array());
    }
}

#[tokio::test]
async fn huge_offsets_return_an_empty_page() {
    let (app, _) = spawn_app().await;
    let jake = register(&app, "jake").await;
    create_article(&app, &jake, "Only one", &[]).await;

    for uri in [
        "/api/articles?offset=9223372036854775808",
        "/api/articles?offset=18446744073709551615",
        "/api/articles/feed?offset=9223372036854775808",
    ] {
        let (status, body) = send(&app, "GET", uri, Some(&jake), None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body["articles"].as_array().unwrap().is_empty());
    }

    let (_, body) = send(&app, "GET", "/api/articles?offset=9223372036854775808", None, None).await;
    assert_eq!(body["articlesCount"], 1);
}

#[tokio::test]
async fn blank_fields_and_missing_articles() {
    let (app, _) = spawn_app().await;
    let jake = register(&app, "jake").await;
    create_article(&app, &jake, "Kept", &[]).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/articles/missing/comments",
        Some(&jake),
        Some(json!({"comment": {"body": "  "}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10004);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/articles/kept",
        Some(&jake),
        Some(json!({"article": {"description": "   "}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 10008);
}
