//! Prompt constants and builders for the enhancement pass.

use crate::matching::scorer::ScoreBreakdown;
use crate::models::{CandidateProfile, JobPosting, JobSalary};

/// Role context and scoring rubric for every enhancement call.
pub const MATCH_SYSTEM: &str = "\
    You are a senior technical recruiter evaluating one candidate against one \
    job posting. Reply in plain prose, not JSON. Structure your reply with \
    these labeled sections: 'Match Score: N' on a 0-100 scale, 'Analysis:' \
    with two or three sentences, 'Strengths:' as a bulleted list, 'Concerns:' \
    as a bulleted list, and 'Recommendation:' with one sentence. Weigh skills \
    coverage highest, then experience fit and language, then location and \
    salary alignment.";

/// Job descriptions are truncated to this many characters in the user
/// prompt; past this point they stop adding signal and start costing
/// tokens.
pub const DESCRIPTION_TRUNCATE_CHARS: usize = 500;

/// Serializes one candidate/job pair (plus the deterministic baseline) into
/// the user prompt. `extra_instruction` is the caller-supplied free-text
/// steer, if any.
pub fn build_match_prompt(
    candidate: &CandidateProfile,
    job: &JobPosting,
    baseline: &ScoreBreakdown,
    extra_instruction: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Candidate:\n\
         - Skills: {skills}\n\
         - Experience: {experience} years\n\
         - Location: {location} (willing to relocate: {relocate})\n\
         - Languages: {languages}\n\
         - Target salary: {target_salary}\n\
         \n\
         Job:\n\
         - Title: {title} at {company}\n\
         - Level: {level}, type: {job_type}\n\
         - Required skills: {required}\n\
         - Location: {job_location}\n\
         - Salary: {salary}\n\
         - Description: {description}\n\
         \n\
         Deterministic baseline: {total}/100 \
         (skills {s}, experience {e}, language {l}, location {lo}, salary {sa}).",
        skills = join_or_none(&candidate.skills),
        experience = candidate
            .experience_years
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        location = candidate.current_location.as_deref().unwrap_or("unknown"),
        relocate = candidate.willing_to_relocate,
        languages = join_or_none(&candidate.languages),
        target_salary = candidate
            .target_salary
            .map(|band| format!("{}-{}", band.min, band.max))
            .unwrap_or_else(|| "unstated".to_string()),
        title = job.title,
        company = job.company,
        level = job.experience_level,
        job_type = job.job_type,
        required = join_or_none(&job.skills_required),
        job_location = job.location.as_deref().unwrap_or("unknown"),
        salary = describe_salary(job.salary.as_ref()),
        description = truncate_chars(&job.description, DESCRIPTION_TRUNCATE_CHARS),
        total = baseline.total,
        s = baseline.skills,
        e = baseline.experience,
        l = baseline.language,
        lo = baseline.location,
        sa = baseline.salary,
    );

    if let Some(extra) = extra_instruction.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str("\n\nAdditional instruction: ");
        prompt.push_str(extra);
    }

    prompt
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none listed".to_string()
    } else {
        items.join(", ")
    }
}

fn describe_salary(salary: Option<&JobSalary>) -> String {
    match salary {
        None => "unstated".to_string(),
        Some(JobSalary::Negotiable) => "negotiable".to_string(),
        Some(JobSalary::Fixed { fixed }) => format!("fixed {fixed}"),
        Some(JobSalary::Range { min, max }) => format!("{min}-{max}"),
    }
}

/// Character-boundary-safe truncation.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
