mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn body_part_ids(server: &common::TestServer, count: usize) -> Result<Vec<String>> {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/api/v1/workouts/body-parts", server.base_url))
        .send()
        .await?;
    let parts: Value = resp.json().await?;
    let ids = parts
        .as_array()
        .context("body parts not an array")?
        .iter()
        .take(count)
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    anyhow::ensure!(ids.len() == count, "not enough seeded body parts");
    Ok(ids)
}

#[tokio::test]
async fn create_resolves_relations_atomically() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "ex_create").await?;
    let parts = body_part_ids(server, 2).await?;

    // Empty http ref list is allowed; the required body part list is not
    let resp = client
        .post(format!("{}/api/v1/workouts/exercises", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": common::unique_title("Push-up"),
            "body_part_ids": parts,
            "http_ref_ids": [],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    assert_eq!(created["is_custom"], true);
    assert_eq!(created["http_refs"].as_array().unwrap().len(), 0);
    assert_eq!(created["body_parts"].as_array().unwrap().len(), 2);

    let resp = client
        .post(format!("{}/api/v1/workouts/exercises", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": common::unique_title("No parts"),
            "body_part_ids": [],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Empty required relation: body_parts");

    // One unknown id fails the whole creation, however many others are valid
    let resp = client
        .post(format!("{}/api/v1/workouts/exercises", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": common::unique_title("Ghost ref"),
            "body_part_ids": parts,
            "http_ref_ids": ["00000000-0000-0000-0000-000000000001"],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Invalid nested object");

    Ok(())
}

#[tokio::test]
async fn title_duplicate_rejected_before_anything_is_written() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "ex_dup").await?;
    let parts = body_part_ids(server, 1).await?;

    let first = common::unique_title("First");
    let second = common::unique_title("Second");

    for title in [&first, &second] {
        let resp = client
            .post(format!("{}/api/v1/workouts/exercises", server.base_url))
            .bearer_auth(&token)
            .json(&json!({ "title": title, "body_part_ids": parts }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Find the second exercise's id
    let resp = client
        .get(format!("{}/api/v1/workouts/exercises?title={}&page_size=10", server.base_url, second))
        .bearer_auth(&token)
        .send()
        .await?;
    let page: Value = resp.json().await?;
    let id = page["items"][0]["id"].as_str().context("created exercise not listed")?.to_string();

    // Renaming it to the first title is a duplicate; stored title unchanged
    let url = format!("{}/api/v1/workouts/exercises/{}", server.base_url, id);
    let resp = client.patch(&url).bearer_auth(&token).json(&json!({ "title": first })).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Title duplicate");

    let resp = client.get(&url).bearer_auth(&token).send().await?;
    let current: Value = resp.json().await?;
    assert_eq!(current["title"], second);

    Ok(())
}

#[tokio::test]
async fn foreign_custom_refs_cannot_be_attached() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token_a, _) = common::signup_and_login(server, "ex_own_a").await?;
    let (token_b, _) = common::signup_and_login(server, "ex_own_b").await?;
    let parts = body_part_ids(server, 1).await?;

    // B owns a custom http ref
    let resp = client
        .post(format!("{}/api/v1/workouts/http-refs", server.base_url))
        .bearer_auth(&token_b)
        .json(&json!({ "name": common::unique_title("B ref"), "ref": "http://example.com/b" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let foreign_ref: Value = resp.json().await?;
    let foreign_id = foreign_ref["id"].as_str().unwrap();

    // A cannot reference it
    let resp = client
        .post(format!("{}/api/v1/workouts/exercises", server.base_url))
        .bearer_auth(&token_a)
        .json(&json!({
            "title": common::unique_title("Stolen ref"),
            "body_part_ids": parts,
            "http_ref_ids": [foreign_id],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "User-resource mismatch");

    Ok(())
}

#[tokio::test]
async fn deleting_an_exercise_leaves_its_refs_alive() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "ex_del").await?;
    let parts = body_part_ids(server, 1).await?;

    let resp = client
        .post(format!("{}/api/v1/workouts/http-refs", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": common::unique_title("Kept ref"), "ref": "http://example.com/k" }))
        .send()
        .await?;
    let http_ref: Value = resp.json().await?;
    let ref_id = http_ref["id"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{}/api/v1/workouts/exercises", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": common::unique_title("Doomed"),
            "body_part_ids": parts,
            "http_ref_ids": [ref_id],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let exercise: Value = resp.json().await?;
    let exercise_id = exercise["id"].as_str().unwrap();

    let resp = client
        .delete(format!("{}/api/v1/workouts/exercises/{}", server.base_url, exercise_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The referenced http ref is still independently retrievable
    let resp = client
        .get(format!("{}/api/v1/workouts/http-refs/{}", server.base_url, ref_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn relation_lists_replace_the_whole_set() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (token, _) = common::signup_and_login(server, "ex_rel").await?;
    let parts = body_part_ids(server, 3).await?;

    let resp = client
        .post(format!("{}/api/v1/workouts/exercises", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": common::unique_title("Replace"),
            "body_part_ids": [parts[0], parts[1]],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    let id = created["id"].as_str().unwrap();
    let url = format!("{}/api/v1/workouts/exercises/{}", server.base_url, id);

    // Supplying a new list swaps the set wholesale
    let resp = client
        .patch(&url)
        .bearer_auth(&token)
        .json(&json!({ "body_part_ids": [parts[2]] }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await?;
    let names: Vec<&str> = updated["body_parts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![parts[2].as_str()]);

    // The required relation cannot be emptied
    let resp = client
        .patch(&url)
        .bearer_auth(&token)
        .json(&json!({ "body_part_ids": [] }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Empty required relation: body_parts");

    Ok(())
}
