pub mod candidate;
pub mod job;
pub mod match_result;

pub use candidate::{CandidateProfile, SalaryBand};
pub use job::{ExperienceLevel, JobPosting, JobSalary};
pub use match_result::MatchResult;
