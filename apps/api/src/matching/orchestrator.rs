//! AI-enhancement orchestration.
//!
//! Flow per match request: fetch subject + pool → baseline score for every
//! pool member → (if the completion client is configured) sequential AI
//! pass over the first [`AI_ENHANCEMENT_LIMIT`] members in pool order →
//! merge → sort descending by final score.
//!
//! Failure semantics: subject/pool fetch failures are fatal and propagate;
//! a failed AI call is recovered per member with the exact deterministic
//! baseline and a canned insight; parser misses never surface at all.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, CompletionClient};
use crate::matching::cache::AgentCache;
use crate::matching::prompts::{build_match_prompt, MATCH_SYSTEM};
use crate::matching::response_parser::parse_enhancement;
use crate::matching::scorer::{compute_breakdown, ScoreBreakdown};
use crate::models::{CandidateProfile, JobPosting, MatchResult};
use crate::store::{MatchFilters, MatchStore};

/// At most this many pool members get an AI call per request, taken in
/// original pool order. Everyone past the cap keeps the baseline score.
pub const AI_ENHANCEMENT_LIMIT: usize = 10;

/// Insight text for members scored by the deterministic path alone.
pub const BASELINE_INSIGHTS: &str = "Deterministic compatibility score from skills, \
     experience, language, location, and salary alignment.";

/// Insight text when the AI call for a member failed and the baseline was
/// substituted.
pub const AI_FAILED_INSIGHTS: &str =
    "AI analysis failed; deterministic compatibility score shown instead.";

const BASELINE_RECOMMENDATION: &str =
    "Review the profile directly; no AI assessment was made for this match.";

pub struct MatchOrchestrator {
    store: Arc<dyn MatchStore>,
    llm: Arc<dyn CompletionClient>,
    /// Reserved for short-circuiting repeat requests. The fetch path does
    /// not consult it yet (see DESIGN.md).
    cache: AgentCache<Vec<MatchResult>>,
}

impl MatchOrchestrator {
    pub fn new(store: Arc<dyn MatchStore>, llm: Arc<dyn CompletionClient>) -> Self {
        Self {
            store,
            llm,
            cache: AgentCache::new(),
        }
    }

    pub fn cache(&self) -> &AgentCache<Vec<MatchResult>> {
        &self.cache
    }

    /// Ranks the candidate pool against one job posting. The subject of
    /// every returned result is the job.
    pub async fn candidate_matches(
        &self,
        job_id: Uuid,
        filters: &MatchFilters,
        ai_prompt: Option<&str>,
    ) -> Result<Vec<MatchResult>, AppError> {
        let job = self.store.fetch_job(job_id).await?;
        let pool = self.store.list_candidates(filters).await?;
        info!("Scoring {} candidates against job {job_id}", pool.len());

        let pairs: Vec<(&CandidateProfile, &JobPosting)> =
            pool.iter().map(|candidate| (candidate, &job)).collect();
        let results = self
            .score_pool(job.id, &pairs, |(candidate, _)| candidate.id, ai_prompt)
            .await;
        Ok(results)
    }

    /// Ranks the job pool against one candidate. The subject of every
    /// returned result is the candidate.
    pub async fn job_matches(
        &self,
        candidate_id: Uuid,
        filters: &MatchFilters,
        ai_prompt: Option<&str>,
    ) -> Result<Vec<MatchResult>, AppError> {
        let candidate = self.store.fetch_candidate(candidate_id).await?;
        let pool = self.store.list_jobs(filters).await?;
        info!("Scoring {} jobs against candidate {candidate_id}", pool.len());

        let pairs: Vec<(&CandidateProfile, &JobPosting)> =
            pool.iter().map(|job| (&candidate, job)).collect();
        let results = self
            .score_pool(candidate.id, &pairs, |(_, job)| job.id, ai_prompt)
            .await;
        Ok(results)
    }

    /// Shared scoring pipeline over an ordered pool of pairs.
    async fn score_pool(
        &self,
        subject_id: Uuid,
        pairs: &[(&CandidateProfile, &JobPosting)],
        counterpart_id: impl Fn(&(&CandidateProfile, &JobPosting)) -> Uuid,
        ai_prompt: Option<&str>,
    ) -> Vec<MatchResult> {
        // Baseline pass over the whole pool. Pure, never fails.
        let baselines: Vec<ScoreBreakdown> = pairs
            .iter()
            .map(|(candidate, job)| compute_breakdown(candidate, job))
            .collect();

        let enhance = self.llm.is_configured();
        if !enhance {
            info!("Completion client not configured; returning baseline-only matches");
        }

        let mut results = Vec::with_capacity(pairs.len());
        for (index, (pair, baseline)) in pairs.iter().zip(&baselines).enumerate() {
            let counterpart = counterpart_id(pair);
            // Bounded, sequential AI pass: pool order, one call at a time,
            // no retry on failure for a member.
            let result = if enhance && index < AI_ENHANCEMENT_LIMIT {
                self.enhance_pair(subject_id, counterpart, pair.0, pair.1, baseline, ai_prompt)
                    .await
            } else {
                baseline_result(subject_id, counterpart, baseline)
            };
            results.push(result);
        }

        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }

    async fn enhance_pair(
        &self,
        subject_id: Uuid,
        counterpart_id: Uuid,
        candidate: &CandidateProfile,
        job: &JobPosting,
        baseline: &ScoreBreakdown,
        ai_prompt: Option<&str>,
    ) -> MatchResult {
        let messages = vec![
            ChatMessage::system(MATCH_SYSTEM),
            ChatMessage::user(build_match_prompt(candidate, job, baseline, ai_prompt)),
        ];

        match self.llm.complete(&messages).await {
            Ok(reply) => {
                let parsed = parse_enhancement(&reply);
                MatchResult {
                    subject_id,
                    counterpart_id,
                    score: (parsed.score * 100.0).round() as u32,
                    insights: parsed.insights,
                    recommendation: parsed.recommendation,
                    strengths: parsed.strengths,
                    concerns: parsed.concerns,
                    enhanced: true,
                }
            }
            Err(e) => {
                warn!(
                    "AI enhancement failed for candidate {} / job {}: {e}",
                    candidate.id, job.id
                );
                let mut result = baseline_result(subject_id, counterpart_id, baseline);
                result.insights = AI_FAILED_INSIGHTS.to_string();
                result
            }
        }
    }
}

fn baseline_result(subject_id: Uuid, counterpart_id: Uuid, baseline: &ScoreBreakdown) -> MatchResult {
    MatchResult {
        subject_id,
        counterpart_id,
        score: baseline.total,
        insights: BASELINE_INSIGHTS.to_string(),
        recommendation: BASELINE_RECOMMENDATION.to_string(),
        strengths: vec![],
        concerns: vec![],
        enhanced: false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::llm_client::LlmError;
    use crate::matching::scorer::compute_score;
    use crate::models::{ExperienceLevel, JobSalary, SalaryBand};
    use crate::store::{NewInterview, NewJobPosting, StoreError};

    // ── fakes ───────────────────────────────────────────────────────────

    struct FakeStore {
        job: JobPosting,
        candidates: Vec<CandidateProfile>,
        fail_fetch: bool,
    }

    #[async_trait]
    impl MatchStore for FakeStore {
        async fn fetch_candidate(&self, id: Uuid) -> Result<CandidateProfile, StoreError> {
            self.candidates
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("candidate {id}")))
        }

        async fn fetch_job(&self, id: Uuid) -> Result<JobPosting, StoreError> {
            if self.fail_fetch {
                return Err(StoreError::NotFound(format!("job {id}")));
            }
            Ok(self.job.clone())
        }

        async fn list_candidates(
            &self,
            _filters: &MatchFilters,
        ) -> Result<Vec<CandidateProfile>, StoreError> {
            Ok(self.candidates.clone())
        }

        async fn list_jobs(&self, _filters: &MatchFilters) -> Result<Vec<JobPosting>, StoreError> {
            Ok(vec![self.job.clone()])
        }

        async fn create_job(&self, _job: NewJobPosting) -> Result<Uuid, StoreError> {
            unimplemented!("not exercised in orchestrator tests")
        }

        async fn create_interview(&self, _interview: NewInterview) -> Result<Uuid, StoreError> {
            unimplemented!("not exercised in orchestrator tests")
        }
    }

    /// Scripted completion backend: fixed reply, optional failures on
    /// specific call indices, call counting.
    struct FakeLlm {
        configured: bool,
        reply: String,
        fail_on: HashSet<usize>,
        calls: Mutex<usize>,
    }

    impl FakeLlm {
        fn configured(reply: &str) -> Self {
            Self {
                configured: true,
                reply: reply.to_string(),
                fail_on: HashSet::new(),
                calls: Mutex::new(0),
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                reply: String::new(),
                fail_on: HashSet::new(),
                calls: Mutex::new(0),
            }
        }

        fn failing_on(mut self, indices: &[usize]) -> Self {
            self.fail_on = indices.iter().copied().collect();
            self
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl CompletionClient for FakeLlm {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            let mut calls = self.calls.lock().unwrap();
            let index = *calls;
            *calls += 1;
            if self.fail_on.contains(&index) {
                return Err(LlmError::Api {
                    status: 500,
                    message: "scripted failure".to_string(),
                });
            }
            Ok(self.reply.clone())
        }
    }

    // ── fixtures ────────────────────────────────────────────────────────

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
            description: "Own the matching pipeline.".to_string(),
            posted_at: Utc::now(),
        }
    }

    /// Candidates with progressively weaker skill coverage, so baselines
    /// strictly decrease in pool order.
    fn candidates(count: usize) -> Vec<CandidateProfile> {
        let all_skills = ["React", "Node", "AWS"];
        (0..count)
            .map(|i| CandidateProfile {
                id: Uuid::new_v4(),
                full_name: format!("Candidate {i}"),
                skills: all_skills
                    .iter()
                    .take(3usize.saturating_sub(i % 4))
                    .map(|s| s.to_string())
                    .collect(),
                experience_years: Some(6.0),
                current_location: Some("Berlin".to_string()),
                preferred_locations: vec![],
                willing_to_relocate: false,
                preferred_job_types: vec!["full-time".to_string()],
                target_salary: Some(SalaryBand {
                    min: 70_000,
                    max: 90_000,
                }),
                languages: vec!["English".to_string()],
            })
            .collect()
    }

    fn orchestrator(store: FakeStore, llm: FakeLlm) -> (MatchOrchestrator, Arc<FakeLlm>) {
        let llm = Arc::new(llm);
        let orchestrator = MatchOrchestrator::new(Arc::new(store), llm.clone());
        (orchestrator, llm)
    }

    // ── tests ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unconfigured_client_yields_baseline_only() {
        let pool = candidates(4);
        let job = job();
        let expected: Vec<u32> = pool.iter().map(|c| compute_score(c, &job)).collect();

        let store = FakeStore {
            job: job.clone(),
            candidates: pool,
            fail_fetch: false,
        };
        let (orchestrator, llm) = orchestrator(store, FakeLlm::unconfigured());

        let results = orchestrator
            .candidate_matches(job.id, &MatchFilters::default(), None)
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| !r.enhanced));
        assert_eq!(llm.call_count(), 0);

        let mut scores: Vec<u32> = results.iter().map(|r| r.score).collect();
        scores.sort_unstable();
        let mut expected_sorted = expected;
        expected_sorted.sort_unstable();
        assert_eq!(scores, expected_sorted);
    }

    #[tokio::test]
    async fn test_enhanced_members_use_parsed_score() {
        let store = FakeStore {
            job: job(),
            candidates: candidates(2),
            fail_fetch: false,
        };
        let job_id = store.job.id;
        let (orchestrator, _) = orchestrator(
            store,
            FakeLlm::configured("Match Score: 95\n\nRecommendation: Interview this week."),
        );

        let results = orchestrator
            .candidate_matches(job_id, &MatchFilters::default(), None)
            .await
            .unwrap();

        assert!(results.iter().all(|r| r.enhanced));
        assert!(results.iter().all(|r| r.score == 95));
        assert_eq!(results[0].recommendation, "Interview this week.");
    }

    #[tokio::test]
    async fn test_failed_ai_call_falls_back_to_exact_baseline() {
        let pool = candidates(3);
        let job = job();
        let baselines: Vec<u32> = pool.iter().map(|c| compute_score(c, &job)).collect();

        let store = FakeStore {
            job: job.clone(),
            candidates: pool,
            fail_fetch: false,
        };
        // Second AI call fails; the others return a high score.
        let (orchestrator, _) =
            orchestrator(store, FakeLlm::configured("Score: 99").failing_on(&[1]));

        let results = orchestrator
            .candidate_matches(job.id, &MatchFilters::default(), None)
            .await
            .unwrap();

        let fallen_back: Vec<&MatchResult> = results.iter().filter(|r| !r.enhanced).collect();
        assert_eq!(fallen_back.len(), 1);
        assert_eq!(fallen_back[0].score, baselines[1]);
        assert_eq!(fallen_back[0].insights, AI_FAILED_INSIGHTS);

        // one failure never aborts the batch
        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.enhanced).count(), 2);
    }

    #[tokio::test]
    async fn test_enhancement_is_capped_at_limit_in_pool_order() {
        let store = FakeStore {
            job: job(),
            candidates: candidates(15),
            fail_fetch: false,
        };
        let job_id = store.job.id;
        let (orchestrator, llm) = orchestrator(store, FakeLlm::configured("Score: 55"));

        let results = orchestrator
            .candidate_matches(job_id, &MatchFilters::default(), None)
            .await
            .unwrap();

        assert_eq!(results.len(), 15);
        assert_eq!(llm.call_count(), AI_ENHANCEMENT_LIMIT);
        assert_eq!(
            results.iter().filter(|r| r.enhanced).count(),
            AI_ENHANCEMENT_LIMIT
        );
    }

    #[tokio::test]
    async fn test_results_are_sorted_descending_by_score() {
        let store = FakeStore {
            job: job(),
            candidates: candidates(12),
            fail_fetch: false,
        };
        let job_id = store.job.id;
        // Enhanced members get 55 while baseline members keep their own
        // totals, a mix that exercises the merge.
        let (orchestrator, _) = orchestrator(store, FakeLlm::configured("Score: 55"));

        let results = orchestrator
            .candidate_matches(job_id, &MatchFilters::default(), None)
            .await
            .unwrap();

        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_subject_fetch_failure_is_fatal() {
        let store = FakeStore {
            job: job(),
            candidates: candidates(2),
            fail_fetch: true,
        };
        let job_id = store.job.id;
        let (orchestrator, llm) = orchestrator(store, FakeLlm::configured("Score: 90"));

        let result = orchestrator
            .candidate_matches(job_id, &MatchFilters::default(), None)
            .await;

        assert!(result.is_err());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_job_matches_direction_is_symmetric() {
        let pool = candidates(1);
        let candidate_id = pool[0].id;
        let store = FakeStore {
            job: job(),
            candidates: pool,
            fail_fetch: false,
        };
        let job_id = store.job.id;
        let (orchestrator, _) = orchestrator(store, FakeLlm::unconfigured());

        let results = orchestrator
            .job_matches(candidate_id, &MatchFilters::default(), None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].subject_id, candidate_id);
        assert_eq!(results[0].counterpart_id, job_id);
    }

    /// Pins the documented dead wiring: the fetch path never touches the
    /// cache, so a hit can never be served under the current pipeline.
    #[tokio::test]
    async fn test_cache_never_serves_a_hit_under_current_wiring() {
        let store = FakeStore {
            job: job(),
            candidates: candidates(5),
            fail_fetch: false,
        };
        let job_id = store.job.id;
        let (orchestrator, _) = orchestrator(store, FakeLlm::configured("Score: 80"));

        let _ = orchestrator
            .candidate_matches(job_id, &MatchFilters::default(), None)
            .await
            .unwrap();
        let _ = orchestrator
            .candidate_matches(job_id, &MatchFilters::default(), None)
            .await
            .unwrap();

        assert_eq!(orchestrator.cache().stats().size, 0);
    }
}
