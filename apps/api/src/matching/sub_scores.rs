//! Per-factor compatibility scores.
//!
//! One pure scoring function per factor, each returning an integer in
//! [0,100]. Absent optional inputs mean "insufficient signal" and score the
//! documented neutral/zero default; nothing here errors.

use crate::models::{ExperienceLevel, JobSalary, SalaryBand};

/// Default when a factor has no usable signal on either side.
pub const NEUTRAL: u32 = 50;

// --- language ---
const LANGUAGE_MISMATCH: u32 = 40;

// --- location ---
const LOCATION_EXACT: u32 = 100;
const RELOCATE_TO_PREFERRED: u32 = 90;
const RELOCATE_OPEN: u32 = 70;
const REGION_OVERLAP: u32 = 60;
const LOCATION_MISMATCH: u32 = 30;

// --- salary ---
const SALARY_NEGOTIABLE: u32 = 80;
const SALARY_UNSTATED_TARGET: u32 = 60;
const SALARY_FIXED_BELOW_TARGET: u32 = 30;
const SALARY_FIXED_ABOVE_TARGET: u32 = 80;
const SALARY_RANGE_SHORTFALL: u32 = 20;
const SALARY_RANGE_EXCEEDS_TARGET: u32 = 60;

// --- experience ---
/// Overqualification penalty bottoms out at 30% (score floor 70).
const OVERQUALIFIED_FLOOR: f64 = 0.7;
const OVERQUALIFIED_DECAY_YEARS: f64 = 10.0;

// --- job type (legacy candidate-centric formula only) ---
const JOB_TYPE_MISMATCH: u32 = 30;

/// Share of required skills the candidate covers, as a 0–100 integer.
///
/// A required skill counts as covered when it substring-matches any
/// candidate skill, case-insensitively, in either direction ("React"
/// covers "React.js" and vice versa). Empty input on either side is no
/// signal and scores 0.
pub fn skills_score(required: &[String], candidate: &[String]) -> u32 {
    if required.is_empty() || candidate.is_empty() {
        return 0;
    }

    let candidate_lower: Vec<String> = candidate
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let matched = required
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|req| {
            !req.is_empty()
                && candidate_lower
                    .iter()
                    .any(|have| have.contains(req.as_str()) || req.contains(have.as_str()))
        })
        .count();

    (100.0 * matched as f64 / required.len() as f64).round() as u32
}

/// Years-of-experience band per level. Lead/executive carry no band and
/// score neutrally; seniority there is not a years question.
pub(crate) fn experience_band(level: ExperienceLevel) -> Option<(f64, f64)> {
    match level {
        ExperienceLevel::Entry => Some((0.0, 2.0)),
        ExperienceLevel::Mid => Some((2.0, 5.0)),
        ExperienceLevel::Senior => Some((5.0, 8.0)),
        ExperienceLevel::Lead | ExperienceLevel::Executive => None,
    }
}

/// Fit between a posting's seniority band and the candidate's years.
///
/// Inside the band → 100. Below it, linear decay toward 0 across the
/// band's lower bound. Above it, a gentle decay capped so that
/// overqualification never costs more than 30%. Unknown band or unknown
/// years → [`NEUTRAL`].
pub fn experience_score(level: ExperienceLevel, years: Option<f64>) -> u32 {
    let Some((min, max)) = experience_band(level) else {
        return NEUTRAL;
    };
    let Some(years) = years else {
        return NEUTRAL;
    };
    let years = years.max(0.0);

    if years >= min && years <= max {
        return 100;
    }

    if years < min {
        // min > 0 here: the entry band starts at zero and years are clamped non-negative
        let gap = min - years;
        return (100.0 * (1.0 - gap / min)).max(0.0).round() as u32;
    }

    let excess = years - max;
    (100.0 * (1.0 - excess / OVERQUALIFIED_DECAY_YEARS).max(OVERQUALIFIED_FLOOR)).round() as u32
}

/// 100 when any candidate language substring-matches the posting's
/// preferred language (either direction), 40 otherwise. Missing either
/// side → 0.
pub fn language_score(preferred: Option<&str>, languages: &[String]) -> u32 {
    let Some(preferred) = preferred.map(str::trim).filter(|p| !p.is_empty()) else {
        return 0;
    };
    if languages.is_empty() {
        return 0;
    }

    let preferred = preferred.to_lowercase();
    let hit = languages
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .any(|l| l.contains(&preferred) || preferred.contains(&l));

    if hit {
        100
    } else {
        LANGUAGE_MISMATCH
    }
}

/// Geographic fit, highest-signal rule first: exact match, then
/// relocation willingness (boosted when the job sits in a preferred
/// location), then comma-segment overlap ("Berlin, DE" vs "Munich, DE"),
/// then mismatch. Missing either location → [`NEUTRAL`].
pub fn location_score(
    candidate_location: Option<&str>,
    job_location: Option<&str>,
    willing_to_relocate: bool,
    preferred_locations: &[String],
) -> u32 {
    let candidate = candidate_location.map(str::trim).filter(|s| !s.is_empty());
    let job = job_location.map(str::trim).filter(|s| !s.is_empty());
    let (Some(candidate), Some(job)) = (candidate, job) else {
        return NEUTRAL;
    };

    let candidate = candidate.to_lowercase();
    let job = job.to_lowercase();

    if candidate == job {
        return LOCATION_EXACT;
    }

    if willing_to_relocate {
        let preferred_hit = preferred_locations
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .any(|p| p.contains(&job) || job.contains(&p));
        return if preferred_hit {
            RELOCATE_TO_PREFERRED
        } else {
            RELOCATE_OPEN
        };
    }

    if segments(&candidate).any(|c| segments(&job).any(|j| c == j)) {
        return REGION_OVERLAP;
    }

    LOCATION_MISMATCH
}

fn segments(location: &str) -> impl Iterator<Item = &str> + '_ {
    location.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Compensation fit between the candidate's target band and the
/// posting's offer. A negotiable posting is a mild positive regardless
/// of the candidate side; an unstated candidate target is a mild
/// unknown. Posting with no salary at all → [`NEUTRAL`].
pub fn salary_score(target: Option<&SalaryBand>, offered: Option<&JobSalary>) -> u32 {
    let Some(offered) = offered else {
        return NEUTRAL;
    };

    match offered {
        JobSalary::Negotiable => SALARY_NEGOTIABLE,
        JobSalary::Fixed { fixed } => {
            let Some(band) = target else {
                return SALARY_UNSTATED_TARGET;
            };
            if *fixed >= band.min && *fixed <= band.max {
                100
            } else if *fixed < band.min {
                SALARY_FIXED_BELOW_TARGET
            } else {
                SALARY_FIXED_ABOVE_TARGET
            }
        }
        JobSalary::Range { min, max } => {
            let Some(band) = target else {
                return SALARY_UNSTATED_TARGET;
            };
            if *min <= band.max && band.min <= *max {
                100
            } else if band.min > *max {
                SALARY_RANGE_SHORTFALL
            } else {
                SALARY_RANGE_EXCEEDS_TARGET
            }
        }
    }
}

/// Whether the posting's job type sits in the candidate's preferred set.
/// Used only by the legacy candidate-centric formula; the unified scorer
/// weights language instead.
#[allow(dead_code)]
pub fn job_type_score(preferred_types: &[String], job_type: &str) -> u32 {
    if preferred_types.is_empty() {
        return NEUTRAL;
    }
    let hit = preferred_types
        .iter()
        .any(|p| p.trim().eq_ignore_ascii_case(job_type.trim()));
    if hit {
        100
    } else {
        JOB_TYPE_MISMATCH
    }
}
