#![allow(dead_code)]

//! Deterministic blended match score.
//!
//! The canonical formula blends the five factor scores with fixed weights.
//! A factor with no signal still contributes its full weight at its default;
//! there is no renormalization. That keeps scores stable across partially
//! filled profiles: adding a field never re-weights the others.

use serde::Serialize;

use crate::matching::sub_scores::{
    experience_score, job_type_score, language_score, location_score, salary_score, skills_score,
};
use crate::models::{CandidateProfile, JobPosting};

/// Canonical weights, used everywhere in the product.
pub const UNIFIED_WEIGHTS: Weights = Weights {
    skills: 0.40,
    experience: 0.20,
    language: 0.20,
    location: 0.10,
    salary: 0.10,
};

/// Historical candidate-centric weights. Experience heavier, and the
/// job-type preference factor in place of language. Kept only so old
/// scores can be reproduced; no runtime path uses this table.
pub const LEGACY_WEIGHTS: LegacyWeights = LegacyWeights {
    skills: 0.40,
    experience: 0.25,
    job_type: 0.15,
    location: 0.10,
    salary: 0.10,
};

#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub skills: f64,
    pub experience: f64,
    pub language: f64,
    pub location: f64,
    pub salary: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.language + self.location + self.salary
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LegacyWeights {
    pub skills: f64,
    pub experience: f64,
    pub job_type: f64,
    pub location: f64,
    pub salary: f64,
}

impl LegacyWeights {
    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.job_type + self.location + self.salary
    }
}

/// Per-factor scores for one candidate/job pair, plus the blended total.
/// Recomputed per pair, never persisted.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBreakdown {
    pub skills: u32,
    pub experience: u32,
    pub language: u32,
    pub location: u32,
    pub salary: u32,
    pub total: u32,
}

/// Computes the per-factor breakdown and blended score for one pair.
pub fn compute_breakdown(candidate: &CandidateProfile, job: &JobPosting) -> ScoreBreakdown {
    let skills = skills_score(&job.skills_required, &candidate.skills);
    let experience = experience_score(job.experience_level, candidate.experience_years);
    let language = language_score(job.preferred_language.as_deref(), &candidate.languages);
    let location = location_score(
        candidate.current_location.as_deref(),
        job.location.as_deref(),
        candidate.willing_to_relocate,
        &candidate.preferred_locations,
    );
    let salary = salary_score(candidate.target_salary.as_ref(), job.salary.as_ref());

    let w = UNIFIED_WEIGHTS;
    let total = (skills as f64 * w.skills
        + experience as f64 * w.experience
        + language as f64 * w.language
        + location as f64 * w.location
        + salary as f64 * w.salary)
        .round()
        .clamp(0.0, 100.0) as u32;

    ScoreBreakdown {
        skills,
        experience,
        language,
        location,
        salary,
        total,
    }
}

/// The baseline compatibility score: deterministic, pure, in [0,100].
pub fn compute_score(candidate: &CandidateProfile, job: &JobPosting) -> u32 {
    compute_breakdown(candidate, job).total
}

/// The legacy candidate-centric score. Historical parity only.
pub fn compute_score_legacy(candidate: &CandidateProfile, job: &JobPosting) -> u32 {
    let w = LEGACY_WEIGHTS;
    let skills = skills_score(&job.skills_required, &candidate.skills) as f64;
    let experience = experience_score(job.experience_level, candidate.experience_years) as f64;
    let job_type = job_type_score(&candidate.preferred_job_types, &job.job_type) as f64;
    let location = location_score(
        candidate.current_location.as_deref(),
        job.location.as_deref(),
        candidate.willing_to_relocate,
        &candidate.preferred_locations,
    ) as f64;
    let salary = salary_score(candidate.target_salary.as_ref(), job.salary.as_ref()) as f64;

    (skills * w.skills
        + experience * w.experience
        + job_type * w.job_type
        + location * w.location
        + salary * w.salary)
        .round()
        .clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::{ExperienceLevel, JobSalary, SalaryBand};

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            id: Uuid::new_v4(),
            full_name: "Asha Rao".to_string(),
            skills: vec!["React".to_string(), "Node".to_string()],
            experience_years: Some(6.0),
            current_location: Some("Berlin".to_string()),
            preferred_locations: vec!["Berlin".to_string()],
            willing_to_relocate: false,
            preferred_job_types: vec!["full-time".to_string()],
            target_salary: Some(SalaryBand {
                min: 70_000,
                max: 90_000,
            }),
            languages: vec!["English".to_string()],
        }
    }

    fn job() -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            title: "Senior Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: Some("Berlin".to_string()),
            job_type: "full-time".to_string(),
            experience_level: ExperienceLevel::Senior,
            skills_required: vec!["React".to_string(), "Node".to_string(), "AWS".to_string()],
            salary: Some(JobSalary::Range {
                min: 80_000,
                max: 110_000,
            }),
            preferred_language: Some("English".to_string()),
            description: "Own the matching pipeline end to end.".to_string(),
            posted_at: Utc::now(),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((UNIFIED_WEIGHTS.sum() - 1.0).abs() < 1e-9);
        assert!((LEGACY_WEIGHTS.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_matches_documented_example() {
        // skills round(100×2/3)=67, experience 100 (6 within [5,8]),
        // language 100, location 100, salary 100
        let breakdown = compute_breakdown(&candidate(), &job());
        assert_eq!(breakdown.skills, 67);
        assert_eq!(breakdown.experience, 100);
        assert_eq!(breakdown.language, 100);
        assert_eq!(breakdown.location, 100);
        assert_eq!(breakdown.salary, 100);
        // 67×0.4 + 100×0.2 + 100×0.2 + 100×0.1 + 100×0.1 = 86.8 → 87
        assert_eq!(breakdown.total, 87);
    }

    #[test]
    fn test_score_is_deterministic() {
        let c = candidate();
        let j = job();
        assert_eq!(compute_score(&c, &j), compute_score(&c, &j));
    }

    #[test]
    fn test_score_stays_in_range_at_extremes() {
        let mut empty = candidate();
        empty.skills.clear();
        empty.experience_years = None;
        empty.current_location = None;
        empty.preferred_locations.clear();
        empty.target_salary = None;
        empty.languages.clear();

        let score = compute_score(&empty, &job());
        assert!(score <= 100);

        let full = compute_score(&candidate(), &job());
        assert!(full <= 100);
    }

    #[test]
    fn test_missing_factor_contributes_default_without_renormalization() {
        // Dropping languages flips the language factor from 100 to 0; the
        // other factors keep their weights, so the total drops by exactly
        // round(0.2 × 100) = 20.
        let with = compute_score(&candidate(), &job());
        let mut c = candidate();
        c.languages.clear();
        let without = compute_score(&c, &job());
        assert_eq!(with - without, 20);
    }

    #[test]
    fn test_legacy_formula_diverges_from_unified() {
        // A candidate whose preferred job type matches but who shares no
        // language signal scores differently under the two tables.
        let mut c = candidate();
        c.languages.clear();
        let j = job();
        // unified: 67×0.4 + 100×0.2 + 0×0.2 + 100×0.1 + 100×0.1 = 66.8 → 67
        assert_eq!(compute_score(&c, &j), 67);
        // legacy: 67×0.4 + 100×0.25 + 100×0.15 + 100×0.1 + 100×0.1 = 86.8 → 87
        assert_eq!(compute_score_legacy(&c, &j), 87);
    }

    #[test]
    fn test_nothing_known_scores_from_defaults_alone() {
        let blank = CandidateProfile {
            id: Uuid::new_v4(),
            full_name: "Unknown".to_string(),
            skills: vec![],
            experience_years: None,
            current_location: None,
            preferred_locations: vec![],
            willing_to_relocate: false,
            preferred_job_types: vec![],
            target_salary: None,
            languages: vec![],
        };
        // skills 0, experience 50, language 0, location 50, salary 60:
        // 0×0.4 + 50×0.2 + 0×0.2 + 50×0.1 + 60×0.1 = 21
        assert_eq!(compute_score(&blank, &job()), 21);
    }
}
