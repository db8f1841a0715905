//! Feature extraction for candidate/job matching.
//!
//! Provides pure functions for computing features used in scoring:
//! - Skill normalization (casing, qualifiers, synonyms)
//! - Text tokenization and token-overlap similarity
//! - Education level detection
//! - Dimension scorers (skill, experience, education) and semantic score scaling

pub mod education;
pub mod scorers;
pub mod skills;
pub mod text;

pub use education::{detect_education, highest_education};
pub use scorers::{
    education_match, experience_match, job_semantic_text, semantic_score, skill_match,
    skill_overlap, SkillOverlap,
};
pub use skills::{normalize_skill, normalize_skill_set};
pub use text::{token_overlap_similarity, tokenize};
