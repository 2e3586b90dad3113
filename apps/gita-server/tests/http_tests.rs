use std::path::PathBuf;
use std::sync::Arc;

use gita_core::config::{GenerationSettings, IndexSettings};
use gita_core::corpus::Corpus;
use gita_embed::FakeEmbedder;
use gita_rag::{Pipeline, Synthesizer};
use gita_server::{router, DailyVerse};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp { base: String, _tmp: TempDir }

async fn spawn_app(generation_endpoint: String) -> anyhow::Result<TestApp> {
    let tmp = tempfile::tempdir()?;
    let corpus_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/verse.json");
    let corpus = Arc::new(Corpus::load(&corpus_path)?);
    let index = IndexSettings { db_dir: tmp.path().join("lancedb").to_string_lossy().into_owned(), table: "gita".into() };
    let generation = GenerationSettings { endpoint: generation_endpoint, api_token: Some("test-token".into()), timeout_secs: 5, ..GenerationSettings::default() };
    let pipeline = Arc::new(Pipeline::new(corpus, Arc::new(FakeEmbedder::new(64)), index, Synthesizer::new(generation)?));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, router(pipeline)).await });
    Ok(TestApp { base: format!("http://{addr}"), _tmp: tmp })
}

async fn post_query(app: &TestApp, body: Value) -> anyhow::Result<(u16, Value)> {
    let resp = reqwest::Client::new().post(format!("{}/query", app.base)).json(&body).send().await?;
    Ok((resp.status().as_u16(), resp.json().await?))
}

#[tokio::test]
async fn query_answers_a_cited_verse() -> anyhow::Result<()> {
    let app = spawn_app("http://127.0.0.1:9/unused".into()).await?;
    let (status, body) = post_query(&app, json!({ "q": "chapter 2 verse 47" })).await?;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "answer": "You have the right to perform your actions, but never to the fruits of actions.", "usedVerses": true }));

    let (status, body) = post_query(&app, json!({ "q": "chapter 99 verse 1" })).await?;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "answer": "Sorry, I couldn't find that verse in the Gita.", "usedVerses": true }));
    Ok(())
}

#[tokio::test]
async fn malformed_questions_get_400() -> anyhow::Result<()> {
    let app = spawn_app("http://127.0.0.1:9/unused".into()).await?;
    let expected = json!({ "answer": "Please enter a question.", "usedVerses": false });
    for body in [json!({ "q": "" }), json!({ "q": "   " }), json!({}), json!({ "q": 42 })] {
        let (status, resp) = post_query(&app, body).await?;
        assert_eq!(status, 400);
        assert_eq!(resp, expected);
    }

    let resp = reqwest::Client::new()
        .post(format!("{}/query", app.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);
    Ok(())
}

#[tokio::test]
async fn generation_failure_gets_500() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).mount(&server).await;
    let app = spawn_app(format!("{}/generate", server.uri())).await?;

    let (status, body) = post_query(&app, json!({ "q": "what does Krishna say about duty" })).await?;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "answer": "Error generating response", "usedVerses": true }));
    Ok(())
}

#[tokio::test]
async fn unreachable_generation_service_gets_500() -> anyhow::Result<()> {
    let closed = std::net::TcpListener::bind("127.0.0.1:0")?;
    let endpoint = format!("http://{}/generate", closed.local_addr()?);
    drop(closed);
    let app = spawn_app(endpoint).await?;

    let (status, body) = post_query(&app, json!({ "q": "what does Krishna say about duty" })).await?;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "answer": "Error generating response", "usedVerses": true }));
    Ok(())
}

#[tokio::test]
async fn open_question_returns_generated_answer() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": " Do your duty without attachment. " }])))
        .mount(&server)
        .await;
    let app = spawn_app(format!("{}/generate", server.uri())).await?;

    let (status, body) = post_query(&app, json!({ "q": "what does Krishna say about duty" })).await?;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "answer": "Do your duty without attachment.", "usedVerses": true }));
    Ok(())
}

#[tokio::test]
async fn health_debug_and_daily_verse() -> anyhow::Result<()> {
    let app = spawn_app("http://127.0.0.1:9/unused".into()).await?;
    let client = reqwest::Client::new();

    let health: Value = client.get(format!("{}/health", app.base)).send().await?.json().await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["corpus_records"], 7);

    let dump: Value = client.get(format!("{}/debug", app.base)).send().await?.json().await?;
    assert_eq!(dump["count"], 7);
    let entries = dump["entries"].as_array().expect("entries array");
    assert!(entries.iter().any(|e| e["id"] == "18.66" && e["metadata"]["chapter"] == 18));

    let health: Value = client.get(format!("{}/health", app.base)).send().await?.json().await?;
    assert_eq!(health["index_ready"], true);

    // 1 January is day 1 of the year; the second shipped verse comes up.
    let daily: DailyVerse = client.get(format!("{}/daily-verse?date=2026-01-01", app.base)).send().await?.json().await?;
    assert_eq!(daily.id, "2.48");
    assert!(!daily.translation.is_empty());
    Ok(())
}

#[tokio::test]
async fn cors_allows_any_origin() -> anyhow::Result<()> {
    let app = spawn_app("http://127.0.0.1:9/unused".into()).await?;
    let resp = reqwest::Client::new()
        .get(format!("{}/health", app.base))
        .header("origin", "http://localhost:3000")
        .send()
        .await?;
    assert_eq!(resp.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()), Some("*"));
    Ok(())
}
