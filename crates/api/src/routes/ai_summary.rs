//! `ai-summary` edge function: turns a petition transcript into structured
//! fields with the LLM.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use domain::models::summary::{validate_transcript, SummarizeRequest, SummaryResponse};
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::middleware::metrics::record_ai_summary;
use crate::middleware::user_auth::{edge_failure, AuthenticatedUser};

/// POST /functions/v1/ai-summary
pub async fn summarize(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(user_id = %user.user_id, error = %rejection, "Malformed ai-summary body");
            record_ai_summary("invalid_request", start.elapsed().as_secs_f64());
            return edge_failure(StatusCode::BAD_REQUEST, "Request body must be valid JSON");
        }
    };

    let transcript = match validate_transcript(request.transcript.as_deref()) {
        Ok(transcript) => transcript,
        Err(e) => {
            record_ai_summary("invalid_request", start.elapsed().as_secs_f64());
            return edge_failure(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match state.summarizer.summarize(transcript).await {
        Ok(extracted) => {
            let elapsed = start.elapsed();
            record_ai_summary("success", elapsed.as_secs_f64());
            info!(
                user_id = %user.user_id,
                transcript_chars = transcript.chars().count(),
                duration_ms = elapsed.as_millis() as u64,
                "Transcript summarized"
            );

            Json(SummaryResponse {
                success: true,
                extracted_data: extracted,
                processing_time: elapsed.as_millis() as u64,
            })
            .into_response()
        }
        Err(e) => {
            record_ai_summary(e.outcome(), start.elapsed().as_secs_f64());
            error!(user_id = %user.user_id, error = %e, "Transcript summary failed");
            edge_failure(e.status_code(), e.public_message())
        }
    }
}
