//! HTTP-level tests: the session middleware in front of the GraphQL endpoint

mod common;

use actix_web::{test, web, App};
use chrono::Duration;
use common::{signup, test_schema, SECRET};
use crypto_core::issue_token;
use serde_json::{json, Value};
use share_api::middleware::SessionMiddleware;
use share_api::routes::configure_routes;
use share_api::schema::AppSchema;

const CURRENT_USER: &str = "{ getCurrentUser { username email } }";

async fn post_graphql(schema: AppSchema, query: &str, authorization: Option<&str>) -> Value {
    let app = test::init_service(
        App::new()
            .wrap(SessionMiddleware::new(SECRET))
            .app_data(web::Data::new(schema))
            .configure(configure_routes(false)),
    )
    .await;

    let mut req = test::TestRequest::post()
        .uri("/graphql")
        .set_json(json!({ "query": query }));
    if let Some(value) = authorization {
        req = req.insert_header(("Authorization", value));
    }

    test::call_and_read_body_json(&app, req.to_request()).await
}

#[actix_web::test]
async fn test_request_without_token_is_anonymous() {
    let schema = test_schema();
    signup(&schema, "alice").await;

    let body = post_graphql(schema, CURRENT_USER, None).await;

    assert!(body.get("errors").is_none());
    assert!(body["data"]["getCurrentUser"].is_null());
}

#[actix_web::test]
async fn test_blank_token_after_signout_is_anonymous() {
    let schema = test_schema();

    let body = post_graphql(schema, CURRENT_USER, Some("")).await;

    assert!(body.get("errors").is_none());
    assert!(body["data"]["getCurrentUser"].is_null());
}

#[actix_web::test]
async fn test_valid_token_resolves_current_user() {
    let schema = test_schema();
    signup(&schema, "alice").await;
    let token = issue_token("alice", "alice@example.com", SECRET, Duration::hours(1)).unwrap();

    let body = post_graphql(schema, CURRENT_USER, Some(&token)).await;

    assert_eq!(body["data"]["getCurrentUser"]["username"], "alice");
    assert_eq!(body["data"]["getCurrentUser"]["email"], "alice@example.com");
}

#[actix_web::test]
async fn test_bearer_prefix_accepted() {
    let schema = test_schema();
    signup(&schema, "alice").await;
    let token = issue_token("alice", "alice@example.com", SECRET, Duration::hours(1)).unwrap();

    let body = post_graphql(schema, CURRENT_USER, Some(&format!("Bearer {token}"))).await;

    assert_eq!(body["data"]["getCurrentUser"]["username"], "alice");
}

#[actix_web::test]
async fn test_expired_token_yields_authentication_error() {
    let schema = test_schema();
    signup(&schema, "alice").await;
    let expired = issue_token("alice", "alice@example.com", SECRET, Duration::seconds(-5)).unwrap();

    let body = post_graphql(schema, CURRENT_USER, Some(&expired)).await;

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0]["message"],
        "Your session has expired. Please sign in again."
    );
    assert_eq!(errors[0]["extensions"]["name"], "AuthenticationError");
}

#[actix_web::test]
async fn test_forged_token_yields_authentication_error() {
    let schema = test_schema();
    let forged = issue_token("alice", "alice@example.com", "not-the-secret", Duration::hours(1))
        .unwrap();

    let body = post_graphql(schema, "{ health }", Some(&forged)).await;

    assert_eq!(body["errors"][0]["extensions"]["name"], "AuthenticationError");
}

#[actix_web::test]
async fn test_health_and_schema_endpoints() {
    let app = test::init_service(
        App::new()
            .wrap(SessionMiddleware::new(SECRET))
            .app_data(web::Data::new(test_schema()))
            .configure(configure_routes(true)),
    )
    .await;

    let health = test::call_and_read_body(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(health.as_ref(), b"ok");

    let sdl = test::call_and_read_body(
        &app,
        test::TestRequest::get().uri("/graphql/schema").to_request(),
    )
    .await;
    let sdl = String::from_utf8(sdl.to_vec()).unwrap();
    assert!(sdl.contains("infiniteScrollPosts"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/playground").to_request()).await;
    assert!(resp.status().is_success());
}
