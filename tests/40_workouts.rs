mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_exercise(server: &common::TestServer, token: &str, title: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/api/v1/workouts/body-parts", server.base_url))
        .send()
        .await?;
    let parts: Value = resp.json().await?;
    let part_id = parts[0]["id"].as_str().context("no seeded body parts")?;

    let resp = client
        .post(format!("{}/api/v1/workouts/exercises", server.base_url))
        .bearer_auth(token)
        .json(&json!({ "title": title, "body_part_ids": [part_id] }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::CREATED, "exercise create failed: {}", resp.text().await?);
    let created: Value = resp.json().await?;
    Ok(created["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn workout_requires_at_least_one_exercise() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "wk_req").await?;

    let resp = client
        .post(format!("{}/api/v1/workouts", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": common::unique_title("Empty workout"), "exercise_ids": [] }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Empty required relation: exercises");

    Ok(())
}

#[tokio::test]
async fn workout_round_trip_with_sorted_relations() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "wk_round").await?;
    let ex_a = create_exercise(server, &token, &common::unique_title("Squat")).await?;
    let ex_b = create_exercise(server, &token, &common::unique_title("Lunge")).await?;

    let resp = client
        .post(format!("{}/api/v1/workouts", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": common::unique_title("Leg day"),
            "exercise_ids": [ex_a, ex_b],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    let id = created["id"].as_str().unwrap();

    // Relations come back sorted ascending by id, whatever the input order
    let resp = client
        .get(format!("{}/api/v1/workouts/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await?;
    let ids: Vec<&str> = fetched["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 2);

    Ok(())
}

#[tokio::test]
async fn foreign_custom_exercise_cannot_be_grouped() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token_a, _) = common::signup_and_login(server, "wk_own_a").await?;
    let (token_b, _) = common::signup_and_login(server, "wk_own_b").await?;
    let foreign_exercise = create_exercise(server, &token_b, &common::unique_title("B move")).await?;

    let resp = client
        .post(format!("{}/api/v1/workouts", server.base_url))
        .bearer_auth(&token_a)
        .json(&json!({
            "title": common::unique_title("Stolen workout"),
            "exercise_ids": [foreign_exercise],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "User-resource mismatch");

    Ok(())
}

#[tokio::test]
async fn default_endpoints_never_leak_custom_workouts() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "wk_leak").await?;
    let exercise = create_exercise(server, &token, &common::unique_title("Secret move")).await?;

    let resp = client
        .post(format!("{}/api/v1/workouts", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": common::unique_title("Secret workout"),
            "exercise_ids": [exercise],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    let id = created["id"].as_str().unwrap();

    // Unauthenticated access through the custom endpoint is refused outright
    let resp = client.get(format!("{}/api/v1/workouts/{}", server.base_url, id)).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await?;
    assert!(body.get("title").is_none());

    // The public default endpoint refuses the flavor without the body
    let resp = client
        .get(format!("{}/api/v1/workouts/default/{}", server.base_url, id))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Custom resource has been requested instead of default");
    assert!(body.get("title").is_none());

    Ok(())
}
