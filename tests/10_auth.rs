mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn signup_login_and_reject_bad_password() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (_token, username) = common::signup_and_login(server, "auth").await?;

    // Same username again conflicts
    let resp = client
        .post(format!("{}/api/v1/users/signup", server.base_url))
        .json(&json!({
            "username": username,
            "email": format!("other_{}@example.com", username),
            "password": "test-pass-1",
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Wrong password is rejected without detail
    let resp = client
        .post(format!("{}/api/v1/users/auth/login", server.base_url))
        .json(&json!({ "username": username, "password": "wrong-pass-1" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn signup_validates_input_shape() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/users/signup", server.base_url))
        .json(&json!({
            "username": "x",
            "email": "not-an-email",
            "password": "short",
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"].get("username").is_some());
    assert!(body["field_errors"].get("email").is_some());
    assert!(body["field_errors"].get("password").is_some());

    Ok(())
}

#[tokio::test]
async fn protected_routes_require_token() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/v1/workouts/http-refs", server.base_url))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
