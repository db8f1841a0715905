//! Scoring and ranking of candidates for a job.
//!
//! Takes a job and its applicants, scores every applicant on four
//! dimensions, aggregates the breakdown into an overall score and tier,
//! annotates insights, and returns a deterministically sorted, ranked list
//! with a summary tally.
//!
//! Candidates are scored concurrently, bounded by `RankConfig::max_concurrency`.
//! The only suspension point is the semantic similarity call, which is
//! subject to `RankConfig::semantic_timeout_ms`.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use talentmatch_explain::annotate;
use talentmatch_features::{
    education_match, experience_match, job_semantic_text, semantic_score, skill_overlap,
    SkillOverlap,
};
use talentmatch_model::{
    CandidateProfile, ConfigError, JobRequirement, MatchResult, Ranking, RankingSummary,
    ScoreBreakdown, ScoringConfig, ValidationError,
};
use talentmatch_similarity::SimilarityBackend;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Errors that abort a whole ranking run.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("Invalid job: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid scoring config: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration for the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Weights, tier thresholds and penalties
    pub scoring: ScoringConfig,
    /// Maximum candidates scored at once
    pub max_concurrency: usize,
    /// Time allowed for one semantic similarity call
    pub semantic_timeout_ms: u64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            max_concurrency: 8,
            semantic_timeout_ms: 2_000,
        }
    }
}

impl RankConfig {
    pub fn semantic_timeout(&self) -> Duration {
        Duration::from_millis(self.semantic_timeout_ms)
    }

    fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

/// How the semantic dimension resolved for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticOutcome {
    /// Similarity computed and scaled to 0-100
    Scored(u8),
    /// Job description or résumé text is empty
    NoText,
    /// The backend did not answer within the timeout
    TimedOut,
    /// The backend returned an error
    Failed,
}

impl SemanticOutcome {
    pub fn score(self) -> u8 {
        match self {
            Self::Scored(score) => score.min(100),
            Self::NoText | Self::TimedOut | Self::Failed => 0,
        }
    }

    /// True when the score is 0 because the backend could not be used.
    pub fn is_unavailable(self) -> bool {
        matches!(self, Self::TimedOut | Self::Failed)
    }
}

/// Resolve the semantic dimension through a similarity backend.
///
/// Never fails: timeouts and backend errors degrade to 0.
pub async fn semantic_outcome<B: SimilarityBackend>(
    backend: &B,
    job_text: Option<&str>,
    candidate: &CandidateProfile,
    timeout: Duration,
) -> SemanticOutcome {
    let Some(job_text) = job_text else {
        return SemanticOutcome::NoText;
    };
    if candidate.resume_text.trim().is_empty() {
        return SemanticOutcome::NoText;
    }

    match tokio::time::timeout(timeout, backend.similarity(job_text, &candidate.resume_text)).await
    {
        Ok(Ok(similarity)) => SemanticOutcome::Scored(semantic_score(similarity)),
        Ok(Err(e)) => {
            tracing::warn!(
                candidate_id = %candidate.candidate_id,
                backend = backend.name(),
                error = %e,
                "Semantic similarity failed; scoring dimension as 0"
            );
            SemanticOutcome::Failed
        }
        Err(_) => {
            tracing::warn!(
                candidate_id = %candidate.candidate_id,
                backend = backend.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Semantic similarity timed out; scoring dimension as 0"
            );
            SemanticOutcome::TimedOut
        }
    }
}

fn build_result(
    candidate: &CandidateProfile,
    breakdown: ScoreBreakdown,
    overlap: SkillOverlap,
    config: &ScoringConfig,
) -> MatchResult {
    MatchResult::new(candidate, breakdown, overlap.matched, overlap.missing, config)
}

/// Combine a breakdown into a result: overall score, tier and skill sets.
///
/// Pure; the skill sets come from the same normalized intersection as the
/// skill dimension and are independent of the weights.
pub fn aggregate(
    job: &JobRequirement,
    candidate: &CandidateProfile,
    breakdown: ScoreBreakdown,
    config: &ScoringConfig,
) -> MatchResult {
    build_result(candidate, breakdown, skill_overlap(job, candidate), config)
}

/// Score one candidate end to end, given its semantic outcome.
pub fn score_candidate(
    job: &JobRequirement,
    candidate: &CandidateProfile,
    semantic: SemanticOutcome,
    config: &ScoringConfig,
) -> MatchResult {
    let overlap = skill_overlap(job, candidate);
    let breakdown = ScoreBreakdown::new(
        semantic.score(),
        overlap.score(),
        experience_match(job, candidate, config.experience_penalty),
        education_match(job, candidate, config.education_penalty),
    );

    let mut result = build_result(candidate, breakdown, overlap, config);
    result.semantic_unavailable = semantic.is_unavailable();
    annotate(&mut result, config.max_insights);
    result
}

/// Ranking order: overall score desc, skill match desc, candidate id asc.
pub fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.overall_score()
        .cmp(&a.overall_score())
        .then_with(|| b.breakdown().skill_match.cmp(&a.breakdown().skill_match))
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        .then_with(|| a.application_id.cmp(&b.application_id))
}

/// Sort into ranking order and assign ranks 1..=N.
pub fn sort_and_rank(results: &mut [MatchResult]) {
    results.sort_by(compare_results);
    for (position, result) in results.iter_mut().enumerate() {
        result.rank = position + 1;
    }
}

/// Tally tiers and degradation over ranked results.
pub fn summarize(results: &[MatchResult], skipped: usize) -> RankingSummary {
    let mut summary = RankingSummary {
        skipped,
        ..Default::default()
    };

    for result in results {
        summary.record(result.tier());
        if result.semantic_unavailable {
            summary.semantic_unavailable += 1;
        }
    }

    summary.degraded = summary.total > 0 && summary.semantic_unavailable * 2 >= summary.total;
    summary
}

/// Ranks every applicant for a job against one similarity backend.
pub struct Ranker<B> {
    backend: Arc<B>,
    config: RankConfig,
}

impl<B> Ranker<B>
where
    B: SimilarityBackend + Send + Sync + 'static,
{
    pub fn new(backend: B, config: RankConfig) -> Self {
        Self::with_shared(Arc::new(backend), config)
    }

    /// Create a ranker over a backend shared with other rankers.
    pub fn with_shared(backend: Arc<B>, config: RankConfig) -> Self {
        Self { backend, config }
    }

    /// Score, sort and rank all candidates for a job.
    ///
    /// Fails only when the job itself is invalid. Unusable candidates are
    /// excluded and counted in `summary.skipped`; semantic timeouts and
    /// backend errors degrade that dimension to 0 for that candidate.
    pub async fn rank_all(
        &self,
        job: &JobRequirement,
        candidates: &[CandidateProfile],
    ) -> Result<Ranking, RankError> {
        self.config.scoring.weights.validate()?;
        job.validate()?;

        let (usable, unusable): (Vec<&CandidateProfile>, Vec<&CandidateProfile>) =
            candidates.iter().partition(|c| c.is_usable());

        for candidate in &unusable {
            tracing::warn!(
                job_id = %job.job_id,
                candidate_id = %candidate.candidate_id,
                "Skipping candidate with no skills, text or experience"
            );
        }

        if usable.is_empty() {
            tracing::info!(job_id = %job.job_id, skipped = unusable.len(), "No candidates to rank");
            let mut ranking = Ranking::empty();
            ranking.summary.skipped = unusable.len();
            return Ok(ranking);
        }

        tracing::info!(
            job_id = %job.job_id,
            candidates = usable.len(),
            skipped = unusable.len(),
            concurrency = self.config.concurrency(),
            backend = self.backend.name(),
            "Ranking candidates"
        );
        if !self.backend.is_deterministic() {
            tracing::debug!(
                backend = self.backend.name(),
                "Similarity backend is nondeterministic; reruns may reorder candidates"
            );
        }

        let job = Arc::new(job.clone());
        let job_text = Arc::new(job_semantic_text(&job));
        let scoring = Arc::new(self.config.scoring.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency()));
        let timeout = self.config.semantic_timeout();

        let mut tasks = JoinSet::new();
        for candidate in usable {
            let candidate = candidate.clone();
            let backend = Arc::clone(&self.backend);
            let job = Arc::clone(&job);
            let job_text = Arc::clone(&job_text);
            let scoring = Arc::clone(&scoring);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let semantic =
                    semantic_outcome(backend.as_ref(), job_text.as_deref(), &candidate, timeout)
                        .await;
                score_candidate(&job, &candidate, semantic, &scoring)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!(
                        job_id = %job.job_id,
                        error = %e,
                        "Scoring task failed; candidate excluded"
                    );
                    failed += 1;
                }
            }
        }

        sort_and_rank(&mut results);
        let summary = summarize(&results, unusable.len() + failed);

        tracing::info!(
            job_id = %job.job_id,
            total = summary.total,
            excellent = summary.excellent,
            good = summary.good,
            fair = summary.fair,
            poor = summary.poor,
            skipped = summary.skipped,
            semantic_unavailable = summary.semantic_unavailable,
            "Ranking complete"
        );
        if summary.degraded {
            tracing::warn!(
                job_id = %job.job_id,
                semantic_unavailable = summary.semantic_unavailable,
                "Semantic scoring mostly unavailable; ranking is limited"
            );
        }

        Ok(Ranking { results, summary })
    }
}
