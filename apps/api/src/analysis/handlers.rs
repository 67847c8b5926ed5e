//! Axum route handlers for the AI endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::analysis::extract::extract_resume_text;
use crate::analysis::store::NewAnalysis;
use crate::analysis::targets::AiTarget;
use crate::errors::AppError;
use crate::models::analysis::AnalysisRow;
use crate::state::AppState;
use crate::streaming::decoder::DONE_SENTINEL;
use crate::streaming::{BearerSession, Envelope, StreamEvent};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub output: String,
    pub created_at: DateTime<Utc>,
}

struct ResumeUpload {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
    job_description: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ai/:target/stream
///
/// Relays an AI function to the browser as server-sent events. Deltas keep
/// the upstream `choices[0].delta.content` shape, completion is `[DONE]`,
/// and failures arrive as an `error` event carrying `{kind, message}`.
pub async fn handle_stream(
    State(state): State<AppState>,
    Path(target): Path<String>,
    BearerSession(session): BearerSession,
    Json(envelope): Json<Envelope>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let target: AiTarget = target.parse()?;
    info!(
        function = %target,
        history = envelope.messages.as_ref().map_or(0, Vec::len),
        "relaying AI stream"
    );

    let events = state
        .stream
        .events(
            target.as_str(),
            envelope,
            Arc::new(session),
            CancellationToken::new(),
        )
        .map(|event| Ok::<_, Infallible>(to_sse_event(event)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// POST /api/v1/resumes/analyze
///
/// Multipart upload: `file` (PDF or text) and optional `job_description`.
/// Runs `analyze-resume` to completion and stores the result.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    BearerSession(session): BearerSession,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    let resume_text = extract_resume_text(
        &upload.file_name,
        upload.content_type.as_deref(),
        upload.bytes,
    )
    .await?;
    let input_chars = i32::try_from(resume_text.chars().count()).unwrap_or(i32::MAX);

    let mut envelope = Envelope::new()
        .field("resume_text", resume_text)
        .field("file_name", upload.file_name.clone());
    if let Some(jd) = upload.job_description {
        envelope = envelope.field("job_description", jd);
    }

    info!(file = %upload.file_name, input_chars, "analyzing resume");
    let output = state
        .stream
        .complete(AiTarget::AnalyzeResume.as_str(), &envelope, &session)
        .await?;
    if output.trim().is_empty() {
        return Err(AppError::Ai("analyze-resume returned no text".to_string()));
    }

    let row = state
        .store
        .insert(NewAnalysis {
            target: AiTarget::AnalyzeResume.as_str().to_string(),
            source_name: upload.file_name,
            input_chars,
            output,
        })
        .await?;
    info!(analysis_id = %row.id, "resume analysis stored");

    Ok(Json(AnalyzeResponse {
        analysis_id: row.id,
        output: row.output,
        created_at: row.created_at,
    }))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisRow>, AppError> {
    let row = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?;
    Ok(Json(row))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn to_sse_event(event: StreamEvent) -> Event {
    match event {
        StreamEvent::Delta(text) => Event::default()
            .data(json!({ "choices": [{ "delta": { "content": text } }] }).to_string()),
        StreamEvent::Done => Event::default().data(DONE_SENTINEL),
        StreamEvent::Error(err) => Event::default()
            .event("error")
            .data(json!({ "kind": err.kind, "message": err.message }).to_string()),
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<ResumeUpload, AppError> {
    let mut file: Option<(String, Option<String>, Bytes)> = None;
    let mut job_description = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, content_type, bytes));
            }
            Some("job_description") => {
                let text = field.text().await.map_err(multipart_error)?;
                if !text.trim().is_empty() {
                    job_description = Some(text);
                }
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    Ok(ResumeUpload {
        file_name,
        content_type,
        bytes,
        job_description,
    })
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}
