use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::StoreError;

/// A candidate's acceptable salary band (annual, same currency as postings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBand {
    pub min: i64,
    pub max: i64,
}

/// Candidate profile as consumed by the matching engine.
///
/// Immutable input: produced by the store boundary, never mutated by
/// scoring. Absent optional fields mean "insufficient signal", not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub full_name: String,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub current_location: Option<String>,
    pub preferred_locations: Vec<String>,
    pub willing_to_relocate: bool,
    pub preferred_job_types: Vec<String>,
    pub target_salary: Option<SalaryBand>,
    pub languages: Vec<String>,
}

/// Raw candidate row as stored in PostgreSQL.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub full_name: String,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub current_location: Option<String>,
    pub preferred_locations: Vec<String>,
    pub willing_to_relocate: bool,
    pub preferred_job_types: Vec<String>,
    pub target_salary_min: Option<i64>,
    pub target_salary_max: Option<i64>,
    pub languages: Vec<String>,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for CandidateProfile {
    type Error = StoreError;

    /// Boundary validation: a half-stated salary band is a data defect,
    /// not a missing signal.
    fn try_from(row: CandidateRow) -> Result<Self, StoreError> {
        let target_salary = match (row.target_salary_min, row.target_salary_max) {
            (Some(min), Some(max)) if min <= max => Some(SalaryBand { min, max }),
            (Some(min), Some(max)) => {
                return Err(StoreError::Invalid(format!(
                    "candidate {}: inverted salary band {min}..{max}",
                    row.id
                )))
            }
            (None, None) => None,
            _ => {
                return Err(StoreError::Invalid(format!(
                    "candidate {}: salary band must have both bounds or neither",
                    row.id
                )))
            }
        };

        Ok(CandidateProfile {
            id: row.id,
            full_name: row.full_name,
            skills: row.skills,
            experience_years: row.experience_years,
            current_location: row.current_location,
            preferred_locations: row.preferred_locations,
            willing_to_relocate: row.willing_to_relocate,
            preferred_job_types: row.preferred_job_types,
            target_salary,
            languages: row.languages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_row() -> CandidateRow {
        CandidateRow {
            id: Uuid::new_v4(),
            full_name: "Asha Rao".to_string(),
            skills: vec!["React".to_string(), "Node".to_string()],
            experience_years: Some(6.0),
            current_location: Some("Berlin".to_string()),
            preferred_locations: vec!["Berlin".to_string(), "Remote".to_string()],
            willing_to_relocate: false,
            preferred_job_types: vec!["full-time".to_string()],
            target_salary_min: Some(70_000),
            target_salary_max: Some(90_000),
            languages: vec!["English".to_string(), "German".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_with_salary_band() {
        let profile = CandidateProfile::try_from(base_row()).unwrap();
        assert_eq!(
            profile.target_salary,
            Some(SalaryBand {
                min: 70_000,
                max: 90_000
            })
        );
    }

    #[test]
    fn test_row_without_salary_converts_to_none() {
        let mut row = base_row();
        row.target_salary_min = None;
        row.target_salary_max = None;
        let profile = CandidateProfile::try_from(row).unwrap();
        assert!(profile.target_salary.is_none());
    }

    #[test]
    fn test_half_stated_salary_band_is_rejected() {
        let mut row = base_row();
        row.target_salary_max = None;
        assert!(CandidateProfile::try_from(row).is_err());
    }

    #[test]
    fn test_inverted_salary_band_is_rejected() {
        let mut row = base_row();
        row.target_salary_min = Some(90_000);
        row.target_salary_max = Some(70_000);
        assert!(CandidateProfile::try_from(row).is_err());
    }
}
