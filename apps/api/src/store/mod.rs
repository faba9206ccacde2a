//! Data-store boundary.
//!
//! The matching core reads candidate and job records through the
//! [`MatchStore`] trait and never touches the database directly; the
//! concrete PostgreSQL implementation lives in [`postgres`]. Job-post and
//! interview creation sit here too as boundary writes; they are not part
//! of the scoring core.

pub mod postgres;

pub use postgres::PgMatchStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CandidateProfile, ExperienceLevel, JobPosting, JobSalary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    /// A persisted row that cannot be converted into a valid domain
    /// record (half-stated salary band, unknown level, ...).
    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Pool filters for the list reads. One struct serves both pools: fields
/// that do not apply to a pool (posting-date window for candidates, say)
/// are ignored by that read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchFilters {
    /// Jobs only: posted within the last N days.
    pub posted_within_days: Option<i32>,
    /// Jobs: exact job type. Candidates: preferred job types contain it.
    pub job_type: Option<String>,
    /// Jobs: exact level. Candidates: years fall inside the level's band.
    pub experience_level: Option<ExperienceLevel>,
    /// Free-text location substring, case-insensitive.
    pub location: Option<String>,
    /// Jobs only: free-text company substring, case-insensitive.
    pub company: Option<String>,
}

/// Input record for a job-post creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJobPosting {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub job_type: String,
    pub experience_level: ExperienceLevel,
    pub skills_required: Vec<String>,
    pub salary: Option<JobSalary>,
    pub preferred_language: Option<String>,
    pub description: String,
}

/// Input record for an interview creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInterview {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Record-shaped reads and boundary writes against the recruiting store.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn fetch_candidate(&self, id: Uuid) -> Result<CandidateProfile, StoreError>;

    async fn fetch_job(&self, id: Uuid) -> Result<JobPosting, StoreError>;

    async fn list_candidates(
        &self,
        filters: &MatchFilters,
    ) -> Result<Vec<CandidateProfile>, StoreError>;

    async fn list_jobs(&self, filters: &MatchFilters) -> Result<Vec<JobPosting>, StoreError>;

    async fn create_job(&self, job: NewJobPosting) -> Result<Uuid, StoreError>;

    async fn create_interview(&self, interview: NewInterview) -> Result<Uuid, StoreError>;
}
