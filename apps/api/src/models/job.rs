use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::StoreError;

/// Seniority band a posting targets. Only entry/mid/senior carry a
/// years-of-experience bucket; lead and executive score neutrally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::Executive => "executive",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entry" => Ok(ExperienceLevel::Entry),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            "lead" => Ok(ExperienceLevel::Lead),
            "executive" => Ok(ExperienceLevel::Executive),
            other => Err(format!("unknown experience level '{other}'")),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compensation attached to a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JobSalary {
    Fixed { fixed: i64 },
    Range { min: i64, max: i64 },
    Negotiable,
}

/// Job posting as consumed by the matching engine. Immutable input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub job_type: String,
    pub experience_level: ExperienceLevel,
    pub skills_required: Vec<String>,
    pub salary: Option<JobSalary>,
    pub preferred_language: Option<String>,
    pub description: String,
    pub posted_at: DateTime<Utc>,
}

/// Raw posting row as stored in PostgreSQL. Salary is flattened into a
/// discriminator column plus nullable amounts; the conversion below is the
/// only place that shape is interpreted.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub job_type: String,
    pub experience_level: String,
    pub skills_required: Vec<String>,
    pub salary_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_fixed: Option<i64>,
    pub preferred_language: Option<String>,
    pub description: String,
    pub posted_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobPosting {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, StoreError> {
        let experience_level = row
            .experience_level
            .parse::<ExperienceLevel>()
            .map_err(|e| StoreError::Invalid(format!("job {}: {e}", row.id)))?;

        let salary = match row.salary_type.as_deref() {
            None => None,
            Some("negotiable") => Some(JobSalary::Negotiable),
            Some("fixed") => {
                let fixed = row.salary_fixed.ok_or_else(|| {
                    StoreError::Invalid(format!("job {}: fixed salary without amount", row.id))
                })?;
                Some(JobSalary::Fixed { fixed })
            }
            Some("range") => match (row.salary_min, row.salary_max) {
                (Some(min), Some(max)) if min <= max => Some(JobSalary::Range { min, max }),
                _ => {
                    return Err(StoreError::Invalid(format!(
                        "job {}: salary range must have ordered min/max",
                        row.id
                    )))
                }
            },
            Some(other) => {
                return Err(StoreError::Invalid(format!(
                    "job {}: unknown salary type '{other}'",
                    row.id
                )))
            }
        };

        Ok(JobPosting {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            job_type: row.job_type,
            experience_level,
            skills_required: row.skills_required,
            salary,
            preferred_language: row.preferred_language,
            description: row.description,
            posted_at: row.posted_at,
        })
    }
}
