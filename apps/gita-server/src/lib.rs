//! HTTP surface of the verse question-answering service.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query as QueryParams, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use gita_core::error::Error;
use gita_rag::Pipeline;
use gita_vector::IndexEntry;

/// `RUST_LOG` wins; otherwise `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/query", post(handle_query))
        .route("/debug", get(handle_debug))
        .route("/daily-verse", get(handle_daily_verse))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

fn error_response(err: &Error) -> Response {
    let status = if err.is_client_error() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR };
    (status, Json(err.to_response())).into_response()
}

/// `q` must be a string; anything else is treated like an empty question.
fn question_from(payload: Result<Json<Value>, JsonRejection>) -> Result<String, Error> {
    let Json(body) = payload.map_err(|e| Error::MalformedQuestion(e.body_text()))?;
    match body.get("q") {
        Some(Value::String(q)) => Ok(q.clone()),
        Some(_) => Err(Error::MalformedQuestion("`q` must be a string".into())),
        None => Err(Error::MalformedQuestion("missing `q`".into())),
    }
}

async fn handle_query(State(pipeline): State<Arc<Pipeline>>, payload: Result<Json<Value>, JsonRejection>) -> Response {
    let result = match question_from(payload) {
        Ok(q) => pipeline.answer(&q).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(answer) => Json(answer).into_response(),
        Err(e) if e.is_client_error() => {
            warn!(error = %e, "rejected question");
            error_response(&e)
        }
        Err(e) => {
            error!(error = %e, "query failed");
            error_response(&e)
        }
    }
}

#[derive(Serialize)]
struct DebugDump {
    table: String,
    count: usize,
    entries: Vec<IndexEntry>,
}

async fn handle_debug(State(pipeline): State<Arc<Pipeline>>) -> Response {
    let index = match pipeline.index().await {
        Ok(index) => index,
        Err(e) => {
            error!(error = %e, "index unavailable for debug dump");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "index unavailable" }))).into_response();
        }
    };
    match index.entries().await {
        Ok(entries) => Json(DebugDump { table: index.name().to_string(), count: entries.len(), entries }).into_response(),
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to scan index");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "index unavailable" }))).into_response()
        }
    }
}

#[derive(Deserialize)]
struct DailyVerseParams {
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyVerse {
    pub id: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub translation: String,
}

/// Verse for today in local time, or for `?date=YYYY-MM-DD`.
async fn handle_daily_verse(State(pipeline): State<Arc<Pipeline>>, QueryParams(params): QueryParams<DailyVerseParams>) -> Json<DailyVerse> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    let record = pipeline.corpus().verse_of_the_day(date);
    Json(DailyVerse {
        id: record.id.clone(),
        chapter: record.chapter,
        verse: record.verse,
        text: record.original_text.clone(),
        translation: record.display_text().to_string(),
    })
}

async fn handle_health(State(pipeline): State<Arc<Pipeline>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "corpus_records": pipeline.corpus().len(),
        "index_ready": pipeline.index_ready(),
    }))
}
