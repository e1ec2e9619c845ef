// src/extractors/mod.rs
pub mod assets;
pub mod criminal;
pub mod document;
pub mod fields;
pub mod liabilities;
pub mod patterns;
pub mod record;
pub mod rows;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use record::{extract_candidate, CandidateOutcome, CandidateRecord, FailedRecord};
pub use patterns::SectionPatterns;
