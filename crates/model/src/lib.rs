//! Core domain model for talentmatch candidate ranking.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `JobRequirement`: What a job posting asks of applicants
//! - `CandidateProfile`: One applicant's parsed résumé
//! - `ScoreBreakdown` / `MatchResult`: Per-candidate scoring output
//! - `ScoringConfig`: Weights, tier thresholds and level penalties
//! - `Insight`: Reviewer-facing observations about a match

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Seniority required by a job or held by a candidate.
///
/// Ordered: `Entry < Mid < Senior < Executive`.
/// Deserializes through [`ExperienceLevel::parse`], so `"Senior"`,
/// `"Mid-Level"` and `"c-level"` are all accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

/// A level descriptor that matched no known level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} level: {value:?}")]
pub struct LevelParseError {
    kind: &'static str,
    value: String,
}

/// Lowercase, drop apostrophes and dots, and treat `-`/`_` as spaces.
fn level_key(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|&c| !matches!(c, '.' | '\'' | '’'))
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl TryFrom<String> for ExperienceLevel {
    type Error = LevelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(LevelParseError {
            kind: "experience",
            value,
        })
    }
}

impl Default for ExperienceLevel {
    fn default() -> Self {
        Self::Entry
    }
}

impl ExperienceLevel {
    /// Position on the ordinal scale (entry = 0).
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Bucket a number of years onto the level scale.
    ///
    /// Returns `None` for negative or non-finite input.
    pub fn from_years(years: f32) -> Option<Self> {
        if !years.is_finite() || years < 0.0 {
            return None;
        }

        let level = if years < 2.0 {
            Self::Entry
        } else if years < 5.0 {
            Self::Mid
        } else if years < 10.0 {
            Self::Senior
        } else {
            Self::Executive
        };

        Some(level)
    }

    /// Lenient parse of a free-text level descriptor.
    pub fn parse(s: &str) -> Option<Self> {
        let key = level_key(s);
        let key = key.strip_suffix(" level").unwrap_or(&key);

        match key {
            "entry" | "junior" | "jr" | "intern" | "graduate" => Some(Self::Entry),
            "mid" | "middle" | "intermediate" => Some(Self::Mid),
            "senior" | "sr" | "lead" | "principal" | "staff" => Some(Self::Senior),
            "executive" | "exec" | "director" | "vp" | "head" | "c" | "chief" => {
                Some(Self::Executive)
            }
            _ => None,
        }
    }
}

/// Highest degree attained or required.
///
/// Ordered: `HighSchool < Associate < Bachelor < Master < Doctorate`.
/// Deserializes through [`EducationLevel::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

impl TryFrom<String> for EducationLevel {
    type Error = LevelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(LevelParseError {
            kind: "education",
            value,
        })
    }
}

impl EducationLevel {
    /// Lenient parse of a level name such as `"Bachelor's"`, `"PhD"` or
    /// `"high-school"`.
    pub fn parse(s: &str) -> Option<Self> {
        let key = level_key(s);
        let key = key.strip_suffix(" degree").unwrap_or(&key);

        match key {
            "high school" | "highschool" | "secondary" | "diploma" | "ged" => {
                Some(Self::HighSchool)
            }
            "associate" | "associates" => Some(Self::Associate),
            "bachelor" | "bachelors" | "undergraduate" | "ba" | "bs" | "bsc" => {
                Some(Self::Bachelor)
            }
            "master" | "masters" | "graduate" | "ma" | "ms" | "msc" | "mba" => Some(Self::Master),
            "doctorate" | "doctoral" | "phd" | "doctor" => Some(Self::Doctorate),
            _ => None,
        }
    }

    /// Position on the ordinal scale. No detectable education sits at 0,
    /// one step below high school.
    pub fn ordinal_of(level: Option<Self>) -> u8 {
        match level {
            None => 0,
            Some(level) => level as u8 + 1,
        }
    }
}

/// Errors for a job that cannot be ranked against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Job is missing an id")]
    MissingJobId,

    #[error("Job {job_id} states neither required skills nor a description")]
    NoRequirements { job_id: String },
}

/// Errors for scoring configuration that cannot produce meaningful scores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Scoring weights must be non-negative and sum to 1.0, got {sum:.4}")]
    InvalidWeights { sum: f64 },
}

/// The structured requirements of one job posting.
///
/// Read-only input owned by the job store; immutable for a ranking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequirement {
    /// Job identifier
    pub job_id: String,

    /// Required skills as written by the employer
    #[serde(default)]
    pub required_skills: Vec<String>,

    /// Required seniority
    #[serde(default)]
    pub experience_level: ExperienceLevel,

    /// Job category (e.g. "Engineering")
    #[serde(default)]
    pub category: String,

    /// Free-text job description
    #[serde(default)]
    pub description: String,

    /// Minimum education, if the job states one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_education: Option<EducationLevel>,
}

impl JobRequirement {
    pub fn new(job_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            required_skills: Vec::new(),
            experience_level: ExperienceLevel::default(),
            category: String::new(),
            description: description.into(),
            min_education: None,
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_experience_level(mut self, level: ExperienceLevel) -> Self {
        self.experience_level = level;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_min_education(mut self, level: EducationLevel) -> Self {
        self.min_education = Some(level);
        self
    }

    /// Check that the job is complete enough to rank against.
    ///
    /// Blank skill strings are ignored rather than rejected; a job with no
    /// skills is still valid as long as it has a description.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.job_id.trim().is_empty() {
            return Err(ValidationError::MissingJobId);
        }

        let has_skills = self.required_skills.iter().any(|s| !s.trim().is_empty());
        if !has_skills && self.description.trim().is_empty() {
            return Err(ValidationError::NoRequirements {
                job_id: self.job_id.clone(),
            });
        }

        Ok(())
    }
}

/// A résumé-derived level is free text; one odd value must not reject the
/// whole profile.
fn lenient_experience_level<'de, D>(deserializer: D) -> Result<Option<ExperienceLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ExperienceLevel::parse))
}

/// One applicant's parsed résumé, as supplied by the applicant-tracking store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    /// Applicant identifier
    pub candidate_id: String,

    /// Application this profile was submitted with
    #[serde(default)]
    pub application_id: String,

    /// Skills extracted from the résumé
    #[serde(default)]
    pub skills: Vec<String>,

    /// Total years of professional experience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<f32>,

    /// Self-reported or inferred seniority; unrecognized values read as absent
    #[serde(
        default,
        deserialize_with = "lenient_experience_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub experience_level: Option<ExperienceLevel>,

    /// Education descriptors (e.g. "B.Sc. Computer Science")
    #[serde(default)]
    pub education: Vec<String>,

    /// Free résumé/profile text used for semantic comparison
    #[serde(default)]
    pub resume_text: String,

    /// Shortlist state from the application store
    #[serde(default)]
    pub is_shortlisted: bool,
}

impl CandidateProfile {
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            application_id: String::new(),
            skills: Vec::new(),
            experience_years: None,
            experience_level: None,
            education: Vec::new(),
            resume_text: String::new(),
            is_shortlisted: false,
        }
    }

    pub fn with_application(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = application_id.into();
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_experience_years(mut self, years: f32) -> Self {
        self.experience_years = Some(years);
        self
    }

    pub fn with_experience_level(mut self, level: ExperienceLevel) -> Self {
        self.experience_level = Some(level);
        self
    }

    pub fn with_education<I, S>(mut self, education: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.education = education.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resume_text(mut self, text: impl Into<String>) -> Self {
        self.resume_text = text.into();
        self
    }

    pub fn shortlisted(mut self, is_shortlisted: bool) -> Self {
        self.is_shortlisted = is_shortlisted;
        self
    }

    /// The candidate's level: the higher of the stated level and the
    /// bucketed years of experience.
    pub fn effective_experience_level(&self) -> Option<ExperienceLevel> {
        let from_years = self.experience_years.and_then(ExperienceLevel::from_years);
        match (self.experience_level, from_years) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether the profile has enough signal to score at all.
    ///
    /// Unusable profiles have no skills, no résumé text and no experience.
    pub fn is_usable(&self) -> bool {
        let has_skills = self.skills.iter().any(|s| !s.trim().is_empty());
        let has_text = !self.resume_text.trim().is_empty();
        let has_experience = self.effective_experience_level().is_some();
        has_skills || has_text || has_experience
    }
}

/// Per-dimension match percentages. Each value is in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub semantic_match: u8,
    pub skill_match: u8,
    pub experience_match: u8,
    pub education_match: u8,
}

impl ScoreBreakdown {
    /// Build a breakdown, clamping each dimension to 100.
    pub fn new(semantic: u8, skill: u8, experience: u8, education: u8) -> Self {
        Self {
            semantic_match: semantic.min(100),
            skill_match: skill.min(100),
            experience_match: experience.min(100),
            education_match: education.min(100),
        }
    }
}

/// Coarse quality band derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Excellent, Tier::Good, Tier::Fair, Tier::Poor];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }

    /// Lenient parse (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "poor" => Some(Self::Poor),
            _ => None,
        }
    }
}

/// Inclusive lower bounds for each tier; anything below `fair` is poor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub excellent: u8,
    pub good: u8,
    pub fair: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellent: 85,
            good: 70,
            fair: 50,
        }
    }
}

impl TierThresholds {
    pub fn tier_for(&self, overall_score: u8) -> Tier {
        if overall_score >= self.excellent {
            Tier::Excellent
        } else if overall_score >= self.good {
            Tier::Good
        } else if overall_score >= self.fair {
            Tier::Fair
        } else {
            Tier::Poor
        }
    }
}

/// Weight of each dimension in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub skill: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.35,
            skill: 0.30,
            experience: 0.20,
            education: 0.15,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.semantic + self.skill + self.experience + self.education
    }

    /// Weights must be finite, non-negative and sum to 1.0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.sum();
        let each_valid = [self.semantic, self.skill, self.experience, self.education]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);

        if !each_valid || (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidWeights { sum });
        }
        Ok(())
    }

    /// Weighted sum of a breakdown, rounded half-up to an integer in `0..=100`.
    ///
    /// Weights are resolved to integer basis points first so the rounding
    /// never depends on floating-point representation.
    pub fn combine(&self, breakdown: &ScoreBreakdown) -> u8 {
        let weighted: u64 = [
            (self.semantic, breakdown.semantic_match),
            (self.skill, breakdown.skill_match),
            (self.experience, breakdown.experience_match),
            (self.education, breakdown.education_match),
        ]
        .iter()
        .map(|(weight, score)| {
            basis_points(*weight).saturating_mul(u64::from((*score).min(100)))
        })
        .fold(0u64, u64::saturating_add);

        (weighted.saturating_add(5_000) / 10_000).min(100) as u8
    }
}

fn basis_points(weight: f64) -> u64 {
    if weight.is_finite() && weight > 0.0 {
        (weight * 10_000.0).round() as u64
    } else {
        0
    }
}

/// All tunable scoring constants in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub tiers: TierThresholds,
    /// Points lost per experience level below the requirement
    pub experience_penalty: u8,
    /// Points lost per education level below the requirement
    pub education_penalty: u8,
    /// Upper bound on insights attached to one result
    pub max_insights: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            tiers: TierThresholds::default(),
            experience_penalty: 30,
            education_penalty: 30,
            max_insights: 5,
        }
    }
}

/// The scored outcome for one candidate against one job.
///
/// `overall_score` and `tier` are always derived from the breakdown and
/// cannot be set independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub candidate_id: String,
    pub application_id: String,
    overall_score: u8,
    tier: Tier,
    breakdown: ScoreBreakdown,
    matched_skills: BTreeSet<String>,
    missing_skills: BTreeSet<String>,
    /// Reviewer-facing observations, in rule order
    pub insights: Vec<String>,
    /// 1-based position after sorting; 0 until ranked
    pub rank: usize,
    /// Mirrors the application store; never changed by scoring
    pub is_shortlisted: bool,
    /// Semantic dimension fell back to 0 (timeout or service failure)
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub semantic_unavailable: bool,
}

impl MatchResult {
    pub fn new(
        candidate: &CandidateProfile,
        breakdown: ScoreBreakdown,
        matched_skills: BTreeSet<String>,
        missing_skills: BTreeSet<String>,
        config: &ScoringConfig,
    ) -> Self {
        let overall_score = config.weights.combine(&breakdown);
        Self {
            candidate_id: candidate.candidate_id.clone(),
            application_id: candidate.application_id.clone(),
            overall_score,
            tier: config.tiers.tier_for(overall_score),
            breakdown,
            matched_skills,
            missing_skills,
            insights: Vec::new(),
            rank: 0,
            is_shortlisted: candidate.is_shortlisted,
            semantic_unavailable: false,
        }
    }

    pub fn overall_score(&self) -> u8 {
        self.overall_score
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    pub fn matched_skills(&self) -> &BTreeSet<String> {
        &self.matched_skills
    }

    pub fn missing_skills(&self) -> &BTreeSet<String> {
        &self.missing_skills
    }
}

/// Tally over one ranking run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSummary {
    /// Candidates ranked (excludes skipped)
    pub total: usize,
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
    /// Candidates excluded as unusable
    #[serde(default)]
    pub skipped: usize,
    /// Ranked candidates whose semantic dimension degraded to 0
    #[serde(default)]
    pub semantic_unavailable: usize,
    /// Semantic scoring failed for at least half of the ranked candidates
    #[serde(default)]
    pub degraded: bool,
}

impl RankingSummary {
    pub fn record(&mut self, tier: Tier) {
        self.total += 1;
        match tier {
            Tier::Excellent => self.excellent += 1,
            Tier::Good => self.good += 1,
            Tier::Fair => self.fair += 1,
            Tier::Poor => self.poor += 1,
        }
    }

    pub fn count(&self, tier: Tier) -> usize {
        match tier {
            Tier::Excellent => self.excellent,
            Tier::Good => self.good,
            Tier::Fair => self.fair,
            Tier::Poor => self.poor,
        }
    }
}

/// Ranked results for one job plus their summary.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub results: Vec<MatchResult>,
    pub summary: RankingSummary,
}

impl Ranking {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            summary: RankingSummary::default(),
        }
    }
}

/// Observations derived from a match breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum Insight {
    /// Most required skills are present
    StrongSkillAlignment { skill_match: u8 },

    /// A handful of required skills are missing
    FewMissingSkills { skills: Vec<String> },

    /// Many required skills are missing
    ManyMissingSkills { missing: usize, required: usize },

    /// Candidate seniority is well below the requirement
    ExperienceGap { experience_match: u8 },

    /// Candidate education is well below the requirement
    EducationGap { education_match: u8 },

    /// Profile text fits the job even though the skill list does not
    ContextualFitDespiteGaps { semantic_match: u8, skill_match: u8 },

    /// Skill list fits but profile text does not
    ContextMismatch { semantic_match: u8 },

    /// Semantic similarity could not be computed
    SemanticUnavailable,
}

impl Insight {
    /// Get a short label for this insight.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongSkillAlignment { .. } => "Strong Skills",
            Self::FewMissingSkills { .. } => "Few Missing Skills",
            Self::ManyMissingSkills { .. } => "Skill Gaps",
            Self::ExperienceGap { .. } => "Experience Gap",
            Self::EducationGap { .. } => "Education Gap",
            Self::ContextualFitDespiteGaps { .. } => "Contextual Fit",
            Self::ContextMismatch { .. } => "Context Mismatch",
            Self::SemanticUnavailable => "Semantic Unavailable",
        }
    }

    /// The reviewer-facing sentence stored on a `MatchResult`.
    pub fn message(&self) -> String {
        match self {
            Self::StrongSkillAlignment { .. } => "Strong skill alignment".to_string(),
            Self::FewMissingSkills { skills } => format!(
                "Missing only {} key skill(s): {}",
                skills.len(),
                skills.join(", ")
            ),
            Self::ManyMissingSkills { missing, required } => {
                format!("Missing {} of {} required skills", missing, required)
            }
            Self::ExperienceGap { .. } => "Experience level below job requirement".to_string(),
            Self::EducationGap { .. } => "Education below stated requirement".to_string(),
            Self::ContextualFitDespiteGaps { .. } => {
                "Strong contextual fit despite skill-list gaps".to_string()
            }
            Self::ContextMismatch { .. } => {
                "Skill list matches but profile context differs from job description".to_string()
            }
            Self::SemanticUnavailable => {
                "Semantic match unavailable; score excludes contextual fit".to_string()
            }
        }
    }

    /// Whether this insight flags a weakness rather than a strength.
    pub fn is_concern(&self) -> bool {
        !matches!(
            self,
            Self::StrongSkillAlignment { .. } | Self::ContextualFitDespiteGaps { .. }
        )
    }
}
