mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn duplicate_name_is_scoped_per_owner() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token_u1, _) = common::signup_and_login(server, "refs_u1").await?;
    let (token_u2, _) = common::signup_and_login(server, "refs_u2").await?;
    let name = common::unique_title("Ref");

    // Create for user 1 succeeds and is custom
    let resp = client
        .post(format!("{}/api/v1/workouts/http-refs", server.base_url))
        .bearer_auth(&token_u1)
        .json(&json!({ "name": name, "ref": "http://example.com/a" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    assert_eq!(created["is_custom"], true);

    // Same name for the same user is a duplicate
    let resp = client
        .post(format!("{}/api/v1/workouts/http-refs", server.base_url))
        .bearer_auth(&token_u1)
        .json(&json!({ "name": name, "ref": "http://example.com/b" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Title duplicate");

    // Same name for a different user is fine
    let resp = client
        .post(format!("{}/api/v1/workouts/http-refs", server.base_url))
        .bearer_auth(&token_u2)
        .json(&json!({ "name": name, "ref": "http://example.com/c" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn partial_update_diff_rules() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "refs_diff").await?;
    let name = common::unique_title("Diff ref");

    let resp = client
        .post(format!("{}/api/v1/workouts/http-refs", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": name, "ref": "http://example.com/v", "description": "watch me" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    let id = created["id"].as_str().unwrap().to_string();
    let url = format!("{}/api/v1/workouts/http-refs/{}", server.base_url, id);

    // Empty payload: nothing to update
    let resp = client.patch(&url).bearer_auth(&token).json(&json!({})).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "No updates requested");

    // One field equal to stored fails, even next to a real change
    let resp = client
        .patch(&url)
        .bearer_auth(&token)
        .json(&json!({ "ref": "http://example.com/v", "description": "new text" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Field values are not different: ref");

    // Verify nothing was applied by the rejected patch
    let resp = client.get(&url).bearer_auth(&token).send().await?;
    let current: Value = resp.json().await?;
    assert_eq!(current["description"], "watch me");

    // A genuinely different field is applied
    let resp = client
        .patch(&url)
        .bearer_auth(&token)
        .json(&json!({ "description": "new text" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await?;
    assert_eq!(updated["description"], "new text");

    Ok(())
}

#[tokio::test]
async fn custom_flavor_is_fenced_from_default_endpoints() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "refs_fence").await?;
    let name = common::unique_title("Fenced ref");

    let resp = client
        .post(format!("{}/api/v1/workouts/http-refs", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": name, "ref": "http://example.com/f" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    let id = created["id"].as_str().unwrap();

    // Custom record through the default read endpoint
    let resp = client
        .get(format!("{}/api/v1/workouts/http-refs/default/{}", server.base_url, id))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Custom resource has been requested instead of default");

    // Another user cannot read, update or delete it
    let (other_token, _) = common::signup_and_login(server, "refs_other").await?;
    let url = format!("{}/api/v1/workouts/http-refs/{}", server.base_url, id);

    let resp = client.get(&url).bearer_auth(&other_token).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "User-resource mismatch");

    let resp = client
        .patch(&url)
        .bearer_auth(&other_token)
        .json(&json!({ "description": "mine now" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client.delete(&url).bearer_auth(&other_token).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The owner deletes it; a second delete is NotFound
    let resp = client.delete(&url).bearer_auth(&token).send().await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = client.delete(&url).bearer_auth(&token).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn list_returns_defaults_plus_own_customs() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token_a, _) = common::signup_and_login(server, "refs_list_a").await?;
    let (token_b, _) = common::signup_and_login(server, "refs_list_b").await?;

    let mine = common::unique_title("Mine");
    let theirs = common::unique_title("Theirs");

    for (token, name) in [(&token_a, &mine), (&token_b, &theirs)] {
        let resp = client
            .post(format!("{}/api/v1/workouts/http-refs", server.base_url))
            .bearer_auth(token)
            .json(&json!({ "name": name, "ref": "http://example.com/l" }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Caller A sees their own custom but not B's
    let resp = client
        .get(format!("{}/api/v1/workouts/http-refs?page_size=100", server.base_url))
        .bearer_auth(&token_a)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await?;
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&mine.as_str()));
    assert!(!names.contains(&theirs.as_str()));

    // Defaults-only endpoint never shows customs
    let resp = client
        .get(format!("{}/api/v1/workouts/http-refs/default?page_size=100", server.base_url))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await?;
    for item in page["items"].as_array().unwrap() {
        assert_eq!(item["is_custom"], false);
    }

    Ok(())
}
