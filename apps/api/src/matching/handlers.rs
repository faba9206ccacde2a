//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::cache::CacheStats;
use crate::models::{ExperienceLevel, MatchResult};
use crate::state::AppState;
use crate::store::{MatchFilters, NewInterview, NewJobPosting};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Query-string parameters for both match endpoints: pool filters plus the
/// optional free-text steer forwarded to the AI pass.
#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    pub posted_within_days: Option<i32>,
    pub job_type: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub ai_prompt: Option<String>,
}

impl MatchQuery {
    fn filters(&self) -> MatchFilters {
        MatchFilters {
            posted_within_days: self.posted_within_days,
            job_type: self.job_type.clone(),
            experience_level: self.experience_level,
            location: self.location.clone(),
            company: self.company.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub subject_id: Uuid,
    pub matches: Vec<MatchResult>,
    /// How many of the returned matches carry an AI-derived score.
    pub enhanced_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CacheClearedResponse {
    pub cleared: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs/:id/matches
///
/// Ranks the (filtered) candidate pool against one job posting, AI-enhanced
/// where available, sorted descending by score.
pub async fn handle_candidate_matches(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchListResponse>, AppError> {
    let matches = state
        .orchestrator
        .candidate_matches(job_id, &query.filters(), query.ai_prompt.as_deref())
        .await?;

    Ok(Json(build_response(job_id, matches)))
}

/// GET /api/v1/candidates/:id/matches
///
/// Ranks the (filtered) job pool against one candidate profile.
pub async fn handle_job_matches(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchListResponse>, AppError> {
    let matches = state
        .orchestrator
        .job_matches(candidate_id, &query.filters(), query.ai_prompt.as_deref())
        .await?;

    Ok(Json(build_response(candidate_id, matches)))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<NewJobPosting>,
) -> Result<Json<CreatedResponse>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }

    let id = state.store.create_job(request).await?;
    Ok(Json(CreatedResponse { id }))
}

/// POST /api/v1/interviews
///
/// Both sides must exist before an interview is recorded.
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(request): Json<NewInterview>,
) -> Result<Json<CreatedResponse>, AppError> {
    state.store.fetch_job(request.job_id).await?;
    state.store.fetch_candidate(request.candidate_id).await?;

    let id = state.store.create_interview(request).await?;
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/v1/matches/cache
pub async fn handle_cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.orchestrator.cache().stats())
}

/// POST /api/v1/matches/cache/clear
pub async fn handle_cache_clear(State(state): State<AppState>) -> Json<CacheClearedResponse> {
    state.orchestrator.cache().clear();
    Json(CacheClearedResponse { cleared: true })
}

fn build_response(subject_id: Uuid, matches: Vec<MatchResult>) -> MatchListResponse {
    let enhanced_count = matches.iter().filter(|m| m.enhanced).count();
    MatchListResponse {
        subject_id,
        matches,
        enhanced_count,
    }
}
