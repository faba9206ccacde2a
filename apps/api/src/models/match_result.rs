use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scored pairing between the request's subject and a pool member.
///
/// `score` is always populated: AI-derived when enhancement succeeded for
/// this member, otherwise the deterministic baseline. Built fresh per
/// request and never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub subject_id: Uuid,
    pub counterpart_id: Uuid,
    pub score: u32,
    pub insights: String,
    pub recommendation: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    /// True only when the AI pass produced this member's score.
    pub enhanced: bool,
}
