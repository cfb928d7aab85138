use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

async fn wait_until_ready(client: &TestClient) {
    let max_retries = 30;
    for attempt in 1..=max_retries {
        match client.get("/health").await {
            Ok(resp) if resp.status().is_success() => return,
            _ => {
                println!("Waiting for API server... (attempt {}/{})", attempt, max_retries);
                sleep(Duration::from_secs(2)).await;
            }
        }
    }
    panic!("API server is not responding after {} attempts", max_retries);
}

/// Runs against a live server, e.g. one started with a PostgreSQL backend.
/// `TEST_API_BASE_URL=http://localhost:8080 cargo test -- --ignored`
#[tokio::test]
#[ignore]
async fn test_song_library_live_workflow() {
    let base_url =
        std::env::var("TEST_API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let client = TestClient::new(base_url);
    wait_until_ready(&client).await;

    // Unique group so reruns against the same database stay independent
    let group = format!("Queen {}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());

    println!("1. Creating song with lyrics");
    let response = client
        .post(
            "/songs",
            json!({
                "group": group,
                "title": "Bohemian Rhapsody",
                "release_date": "1975-10-31",
                "link": "https://example.com/bohemian",
                "lyrics": [
                    { "verse_number": 1, "text": "Is this the real life?" },
                    { "verse_number": 2, "text": "Is this just fantasy?" }
                ]
            }),
        )
        .await
        .expect("Failed to create song");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let song_id = body["song"]["id"].as_i64().unwrap();
    assert_eq!(body["song"]["lyrics"].as_array().unwrap().len(), 2);

    println!("2. Listing by group");
    let response = client
        .get(&format!("/songs?group={}", group.replace(' ', "%20")))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["id"], song_id);

    println!("3. Updating the link");
    let response = client
        .put(
            &format!("/songs/{song_id}"),
            json!({ "link": "https://example.com/updated" }),
        )
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["song"]["link"], "https://example.com/updated");
    assert_eq!(body["song"]["title"], "Bohemian Rhapsody");

    println!("4. Adding a lyric, then one for a missing song");
    let response = client
        .post(
            "/lyrics",
            json!({ "song_id": song_id, "verse_number": 3, "text": "Caught in a landslide" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let lyric_id = body["lyric"]["id"].as_i64().unwrap();

    let response = client
        .post(
            "/lyrics",
            json!({ "song_id": i64::MAX, "verse_number": 1, "text": "orphan" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    println!("5. A song with an unstorable verse is not stored at all");
    let rejected_group = format!("{group} rejected");
    let response = client
        .post(
            "/songs",
            json!({
                "group": rejected_group,
                "title": "Bohemian Rhapsody",
                "lyrics": [
                    { "verse_number": 1, "text": "Is this the real life?" },
                    { "verse_number": 2, "text": "bad\u{0}byte" }
                ]
            }),
        )
        .await
        .unwrap();
    assert!(!response.status().is_success());
    let response = client
        .get(&format!("/songs?group={}", rejected_group.replace(' ', "%20")))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 0);

    println!("6. Deleting the song removes its lyrics");
    let response = client.delete(&format!("/songs/{song_id}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(&format!("/songs/{song_id}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = client.get(&format!("/lyrics/{lyric_id}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
