//! PostgreSQL implementation of the store boundary.
//!
//! Raw rows are converted to domain records on the way out; a row that
//! fails conversion surfaces as [`StoreError::Invalid`] rather than a
//! half-populated profile.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::matching::sub_scores::experience_band;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;
use crate::models::{CandidateProfile, JobPosting, JobSalary};
use crate::store::{MatchFilters, MatchStore, NewInterview, NewJobPosting, StoreError};

const CANDIDATE_COLUMNS: &str = "id, full_name, skills, experience_years, current_location, \
     preferred_locations, willing_to_relocate, preferred_job_types, \
     target_salary_min, target_salary_max, languages, created_at";

const JOB_COLUMNS: &str = "id, title, company, location, job_type, experience_level, \
     skills_required, salary_type, salary_min, salary_max, salary_fixed, \
     preferred_language, description, posted_at";

pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn fetch_candidate(&self, id: Uuid) -> Result<CandidateProfile, StoreError> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("candidate {id}")))?;

        CandidateProfile::try_from(row)
    }

    async fn fetch_job(&self, id: Uuid) -> Result<JobPosting, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("job {id}")))?;

        JobPosting::try_from(row)
    }

    async fn list_candidates(
        &self,
        filters: &MatchFilters,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE 1=1"
        ));

        if let Some(job_type) = &filters.job_type {
            query.push(" AND ");
            query.push_bind(job_type.clone());
            query.push(" ILIKE ANY(preferred_job_types)");
        }
        if let Some((min, max)) = filters.experience_level.and_then(experience_band) {
            query.push(" AND experience_years BETWEEN ");
            query.push_bind(min);
            query.push(" AND ");
            query.push_bind(max);
        }
        if let Some(location) = &filters.location {
            query.push(" AND current_location ILIKE ");
            query.push_bind(format!("%{location}%"));
        }
        query.push(" ORDER BY created_at DESC");

        let rows: Vec<CandidateRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(CandidateProfile::try_from).collect()
    }

    async fn list_jobs(&self, filters: &MatchFilters) -> Result<Vec<JobPosting>, StoreError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE 1=1"));

        if let Some(days) = filters.posted_within_days {
            query.push(" AND posted_at > NOW() - make_interval(days => ");
            query.push_bind(days);
            query.push(")");
        }
        if let Some(job_type) = &filters.job_type {
            query.push(" AND job_type ILIKE ");
            query.push_bind(job_type.clone());
        }
        if let Some(level) = filters.experience_level {
            query.push(" AND experience_level = ");
            query.push_bind(level.as_str());
        }
        if let Some(location) = &filters.location {
            query.push(" AND location ILIKE ");
            query.push_bind(format!("%{location}%"));
        }
        if let Some(company) = &filters.company {
            query.push(" AND company ILIKE ");
            query.push_bind(format!("%{company}%"));
        }
        query.push(" ORDER BY posted_at DESC");

        let rows: Vec<JobRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(JobPosting::try_from).collect()
    }

    async fn create_job(&self, job: NewJobPosting) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let (salary_type, salary_min, salary_max, salary_fixed) = flatten_salary(job.salary);

        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, title, company, location, job_type, experience_level,
                 skills_required, salary_type, salary_min, salary_max, salary_fixed,
                 preferred_language, description, posted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())
            "#,
        )
        .bind(id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.job_type)
        .bind(job.experience_level.as_str())
        .bind(&job.skills_required)
        .bind(salary_type)
        .bind(salary_min)
        .bind(salary_max)
        .bind(salary_fixed)
        .bind(&job.preferred_language)
        .bind(&job.description)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn create_interview(&self, interview: NewInterview) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO interviews (id, job_id, candidate_id, scheduled_at, notes, status)
            VALUES ($1, $2, $3, $4, $5, 'scheduled')
            "#,
        )
        .bind(id)
        .bind(interview.job_id)
        .bind(interview.candidate_id)
        .bind(interview.scheduled_at)
        .bind(&interview.notes)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}

/// Inverse of the row conversion in `models::job`: one discriminator
/// column plus nullable amounts.
fn flatten_salary(
    salary: Option<JobSalary>,
) -> (
    Option<&'static str>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
) {
    match salary {
        None => (None, None, None, None),
        Some(JobSalary::Negotiable) => (Some("negotiable"), None, None, None),
        Some(JobSalary::Fixed { fixed }) => (Some("fixed"), None, None, Some(fixed)),
        Some(JobSalary::Range { min, max }) => (Some("range"), Some(min), Some(max), None),
    }
}
