//! Candidate↔job matching engine.
//!
//! `sub_scores` and `scorer` are the deterministic core; `orchestrator`
//! wraps them with the optional AI-enhancement pass, `response_parser`
//! mines the LLM's freeform replies, and `cache` holds the (reserved)
//! match-result store.

pub mod cache;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod response_parser;
pub mod scorer;
pub mod sub_scores;
