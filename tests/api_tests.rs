use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tempfile::TempDir;

use folio_api::{
    api::{create_router, AppState},
    db::InMemoryCatalog,
    error::{AppError, AppResult},
    services::{ArtifactStore, FileArtifactStore, Recommender, Summarizer, Trainer},
};

struct EchoSummarizer;

#[async_trait::async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, content: &str) -> AppResult<String> {
        Ok(format!("Summary: {}", content))
    }
}

struct Harness {
    catalog: InMemoryCatalog,
    artifacts: Arc<FileArtifactStore>,
    server: TestServer,
    _dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let catalog = InMemoryCatalog::new();
        let artifacts = Arc::new(FileArtifactStore::new(dir.path().join("model.json")));

        let state = AppState::new(
            Recommender::new(
                Arc::new(catalog.clone()),
                artifacts.clone(),
                Duration::from_secs(5),
            ),
            Arc::new(EchoSummarizer),
        );
        let server = TestServer::new(create_router(state)).unwrap();

        Self {
            catalog,
            artifacts,
            server,
            _dir: dir,
        }
    }

    fn trainer(&self) -> Trainer {
        Trainer::new(Arc::new(self.catalog.clone()), self.artifacts.clone()).with_n_estimators(10)
    }

    fn recommender(&self) -> Recommender {
        Recommender::new(
            Arc::new(self.catalog.clone()),
            self.artifacts.clone(),
            Duration::from_secs(5),
        )
    }
}

#[tokio::test]
async fn test_health_check() {
    let harness = Harness::new();
    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-abc"),
        )
        .await;

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-abc"
    );
}

#[tokio::test]
async fn test_scenario_a_only_query_genre_returned() {
    let harness = Harness::new();
    let fiction = harness.catalog.add_book("Emma", "Jane Austen", "Fiction", 1815).await;
    let non_fiction = harness
        .catalog
        .add_book("Sapiens", "Yuval Noah Harari", "Non-Fiction", 2011)
        .await;
    harness.catalog.add_review(fiction.id, 5, "Witty").await.unwrap();
    harness.catalog.add_review(fiction.id, 3, "Long").await.unwrap();
    harness.catalog.add_review(non_fiction.id, 4, "Sweeping").await.unwrap();
    harness.trainer().run().await.unwrap();

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=Fiction&year_published=2020")
        .await;

    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0],
        json!({
            "title": "Emma",
            "author": "Jane Austen",
            "year_published": 1815,
            "average_rating": 4.0
        })
    );
}

#[tokio::test]
async fn test_scenario_b_unrated_book_sorts_last() {
    let harness = Harness::new();
    harness.catalog.add_book("Draft", "Anon", "Fiction", 2019).await;
    let rated = harness.catalog.add_book("Classic", "Famous", "Fiction", 1950).await;
    harness.catalog.add_review(rated.id, 5, "Superb").await.unwrap();
    harness.catalog.add_review(rated.id, 4, "Great").await.unwrap();
    harness.trainer().run().await.unwrap();

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=Fiction&year_published=2021")
        .await;

    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Classic");
    assert_eq!(results[0]["average_rating"], 4.5);
    assert_eq!(results[1]["title"], "Draft");
    assert!(results[1]["average_rating"].is_null());
}

#[tokio::test]
async fn test_scenario_c_empty_catalog_never_writes_artifact() {
    let harness = Harness::new();

    let result = harness.trainer().run().await;
    assert!(matches!(result, Err(AppError::InsufficientData)));
    assert!(harness.artifacts.load().await.unwrap().is_none());
    assert!(!harness.artifacts.path().exists());

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=Fiction&year_published=2020")
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"], "Model not found. Please train the model first.");
}

#[tokio::test]
async fn test_scenario_d_unseen_genre_still_succeeds() {
    let harness = Harness::new();
    let fiction = harness.catalog.add_book("Emma", "Jane Austen", "Fiction", 1815).await;
    let horror = harness.catalog.add_book("It", "Stephen King", "Horror", 1986).await;
    harness.catalog.add_review(fiction.id, 4, "Charming").await.unwrap();
    harness.catalog.add_review(horror.id, 2, "Too scary").await.unwrap();
    harness.trainer().run().await.unwrap();

    let outcome = harness
        .recommender()
        .recommend_detailed(Some("SciFi"), Some("1999"))
        .await
        .unwrap();
    assert_eq!(outcome.dropped_columns, vec!["genre=SciFi".to_string()]);
    assert!(outcome.predicted_rating.is_some());
    assert!(outcome.results.is_empty());

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=SciFi&year_published=1999")
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_ranking_is_sorted_capped_and_genre_filtered() {
    let harness = Harness::new();
    for (i, rating) in [2, 5, 3, 4, 1, 5, 3].iter().enumerate() {
        let book = harness
            .catalog
            .add_book(&format!("Fiction {}", i), "Writer", "Fiction", 2000 + i as i32)
            .await;
        harness.catalog.add_review(book.id, *rating, "ok").await.unwrap();
    }
    let poetry = harness.catalog.add_book("Odes", "Poet", "Poetry", 1820).await;
    harness.catalog.add_review(poetry.id, 5, "Lyrical").await.unwrap();
    harness.trainer().run().await.unwrap();

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=Fiction&year_published=2005")
        .await;

    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 5);
    let ratings: Vec<f64> = results
        .iter()
        .map(|r| r["average_rating"].as_f64().unwrap())
        .collect();
    assert_eq!(ratings, vec![5.0, 5.0, 4.0, 3.0, 3.0]);
    assert!(results.iter().all(|r| r["author"] == "Writer"));
}

#[tokio::test]
async fn test_retraining_replaces_artifact() {
    let harness = Harness::new();
    let book = harness.catalog.add_book("Emma", "Jane Austen", "Fiction", 1815).await;
    harness.catalog.add_review(book.id, 4, "Charming").await.unwrap();

    let first = harness.trainer().run().await.unwrap();
    let horror = harness.catalog.add_book("It", "Stephen King", "Horror", 1986).await;
    harness.catalog.add_review(horror.id, 2, "Too scary").await.unwrap();
    let second = harness.trainer().run().await.unwrap();

    let current = harness.artifacts.load().await.unwrap().unwrap();
    assert_ne!(first.version, second.version);
    assert_eq!(current.version, second.version);
    assert!(current.schema.contains("genre=Horror"));
}

#[tokio::test]
async fn test_large_noisy_catalog_still_serves_recommendations() {
    let harness = Harness::new();
    let genres = ["Fantasy", "Fiction", "History", "Mystery", "Poetry", "Science"];
    let mut rng = StdRng::seed_from_u64(11);
    for i in 0..1600 {
        let book = harness
            .catalog
            .add_book(
                &format!("Book {}", i),
                "Writer",
                genres[i % genres.len()],
                rng.gen_range(1800..=2020),
            )
            .await;
        let rating = rng.gen_range(1..=5);
        harness.catalog.add_review(book.id, rating, "Noted").await.unwrap();
    }

    let artifact = harness.trainer().with_n_estimators(3).run().await.unwrap();
    assert_eq!(artifact.summary.eligible_rows, 1600);

    let reloaded = harness.artifacts.load().await.unwrap().unwrap();
    assert_eq!(reloaded.version, artifact.version);

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=Mystery&year_published=1950")
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 5);
}

#[tokio::test]
async fn test_genre_is_matched_verbatim() {
    let harness = Harness::new();
    let book = harness.catalog.add_book("Emma", "Jane Austen", "Fiction", 1815).await;
    harness.catalog.add_review(book.id, 4, "Charming").await.unwrap();
    harness.trainer().run().await.unwrap();

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=%20Fiction&year_published=2020")
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert!(results.is_empty());

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=%20%20&year_published=2020")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_parameters_are_bad_request() {
    let harness = Harness::new();
    let book = harness.catalog.add_book("Emma", "Jane Austen", "Fiction", 1815).await;
    harness.catalog.add_review(book.id, 4, "Charming").await.unwrap();
    harness.trainer().run().await.unwrap();

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=Fiction")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = harness
        .server
        .get("/api/v1/recommendations?genre=Fiction&year_published=soon")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_summary() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/api/v1/generate-summary")
        .json(&json!({ "content": "A long story" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["summary"], "Summary: A long story");

    let response = harness
        .server
        .post("/api/v1/generate-summary")
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
