//! Filtering, sorting and paging of ranked results.
//!
//! Serves the views on the candidate ranking page: by tier, shortlisted
//! only, score range, a required skill, re-sorted by any dimension. The
//! `rank` on each result always reflects the full, unfiltered ordering.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use talentmatch_features::normalize_skill;
use talentmatch_model::{MatchResult, Tier};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Invalid score range: {min}..={max}")]
    InvalidScoreRange { min: u8, max: u8 },
    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),
    #[error("Unknown tier: {0}")]
    UnknownTier(String),
}

/// Field to order results by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Rank,
    OverallScore,
    SemanticMatch,
    SkillMatch,
    ExperienceMatch,
    EducationMatch,
}

impl SortKey {
    /// Rank reads best-first ascending; scores read best-first descending.
    pub fn default_direction(self) -> SortDirection {
        match self {
            Self::Rank => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    fn value(self, result: &MatchResult) -> usize {
        let breakdown = result.breakdown();
        match self {
            Self::Rank => result.rank,
            Self::OverallScore => result.overall_score().into(),
            Self::SemanticMatch => breakdown.semantic_match.into(),
            Self::SkillMatch => breakdown.skill_match.into(),
            Self::ExperienceMatch => breakdown.experience_match.into(),
            Self::EducationMatch => breakdown.education_match.into(),
        }
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "rank" => Ok(Self::Rank),
            "overall" | "overallscore" | "score" => Ok(Self::OverallScore),
            "semantic" | "semanticmatch" => Ok(Self::SemanticMatch),
            "skill" | "skills" | "skillmatch" => Ok(Self::SkillMatch),
            "experience" | "experiencematch" => Ok(Self::ExperienceMatch),
            "education" | "educationmatch" => Ok(Self::EducationMatch),
            _ => Err(QueryError::UnknownSortKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Parse a tier name, as typed into a filter box or CLI flag.
pub fn parse_tier(s: &str) -> Result<Tier, QueryError> {
    Tier::parse(s).ok_or_else(|| QueryError::UnknownTier(s.to_string()))
}

/// A view over ranked results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultQuery {
    /// Keep only these tiers (empty = all)
    pub tiers: Vec<Tier>,
    /// Keep only shortlisted applications
    pub shortlisted_only: bool,
    /// Inclusive lower bound on overall score
    pub min_score: Option<u8>,
    /// Inclusive upper bound on overall score
    pub max_score: Option<u8>,
    /// Keep only candidates whose matched skills include this one
    pub skill: Option<String>,
    pub sort_by: SortKey,
    /// Defaults to the sort key's natural direction
    pub direction: Option<SortDirection>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ResultQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tiers(mut self, tiers: Vec<Tier>) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn shortlisted_only(mut self) -> Self {
        self.shortlisted_only = true;
        self
    }

    pub fn with_score_range(mut self, min: Option<u8>, max: Option<u8>) -> Self {
        self.min_score = min;
        self.max_score = max;
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    pub fn sorted_by(mut self, key: SortKey, direction: Option<SortDirection>) -> Self {
        self.sort_by = key;
        self.direction = direction;
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        let min = self.min_score.unwrap_or(0);
        let max = self.max_score.unwrap_or(100);
        if min > max || max > 100 {
            return Err(QueryError::InvalidScoreRange { min, max });
        }
        Ok(())
    }

    fn matches(&self, result: &MatchResult, skill: Option<&str>) -> bool {
        if !self.tiers.is_empty() && !self.tiers.contains(&result.tier()) {
            return false;
        }
        if self.shortlisted_only && !result.is_shortlisted {
            return false;
        }

        let score = result.overall_score();
        if self.min_score.is_some_and(|min| score < min) {
            return false;
        }
        if self.max_score.is_some_and(|max| score > max) {
            return false;
        }

        match skill {
            Some(skill) => result.matched_skills().contains(skill),
            None => true,
        }
    }

    fn compare(&self, a: &MatchResult, b: &MatchResult) -> Ordering {
        let direction = self
            .direction
            .unwrap_or_else(|| self.sort_by.default_direction());

        let primary = self.sort_by.value(a).cmp(&self.sort_by.value(b));
        let primary = match direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };

        primary
            .then_with(|| a.rank.cmp(&b.rank))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    }

    /// Apply the view to a ranked result list.
    pub fn apply(&self, results: &[MatchResult]) -> Result<Vec<MatchResult>, QueryError> {
        self.validate()?;

        let skill = self
            .skill
            .as_deref()
            .map(normalize_skill)
            .filter(|s| !s.is_empty());

        let mut selected: Vec<&MatchResult> = results
            .iter()
            .filter(|r| self.matches(r, skill.as_deref()))
            .collect();

        selected.sort_by(|a, b| self.compare(a, b));

        Ok(selected
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use talentmatch_model::{CandidateProfile, ScoreBreakdown, ScoringConfig};

    fn result(
        id: &str,
        rank: usize,
        breakdown: ScoreBreakdown,
        matched: &[&str],
        shortlisted: bool,
    ) -> MatchResult {
        let mut r = MatchResult::new(
            &CandidateProfile::new(id).shortlisted(shortlisted),
            breakdown,
            matched.iter().map(|s| s.to_string()).collect(),
            BTreeSet::new(),
            &ScoringConfig::default(),
        );
        r.rank = rank;
        r
    }

    // overall: a=94 excellent, b=76 good, c=55 fair, d=20 poor
    fn results() -> Vec<MatchResult> {
        vec![
            result(
                "a",
                1,
                ScoreBreakdown::new(90, 90, 100, 100),
                &["react", "node.js"],
                false,
            ),
            result("b", 2, ScoreBreakdown::new(50, 100, 80, 80), &["react", "sql"], true),
            result("c", 3, ScoreBreakdown::new(70, 20, 70, 70), &[], true),
            result("d", 4, ScoreBreakdown::new(20, 20, 20, 20), &["sql"], false),
        ]
    }

    fn ids(results: &[MatchResult]) -> Vec<&str> {
        results.iter().map(|r| r.candidate_id.as_str()).collect()
    }

    #[test]
    fn test_fixture_tiers() {
        let tiers: Vec<Tier> = results().iter().map(|r| r.tier()).collect();
        assert_eq!(tiers, vec![Tier::Excellent, Tier::Good, Tier::Fair, Tier::Poor]);
    }

    #[test]
    fn test_default_query_keeps_rank_order() {
        let all = ResultQuery::new().apply(&results()).unwrap();
        assert_eq!(ids(&all), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_filter_by_tier_and_shortlist() {
        let view = ResultQuery::new()
            .with_tiers(vec![Tier::Good, Tier::Poor])
            .apply(&results())
            .unwrap();
        assert_eq!(ids(&view), vec!["b", "d"]);

        let shortlisted = ResultQuery::new().shortlisted_only().apply(&results()).unwrap();
        assert_eq!(ids(&shortlisted), vec!["b", "c"]);
        assert_eq!(shortlisted[0].rank, 2);
    }

    #[test]
    fn test_score_range() {
        let view = ResultQuery::new()
            .with_score_range(Some(55), Some(94))
            .apply(&results())
            .unwrap();
        assert_eq!(ids(&view), vec!["a", "b", "c"]);

        let err = ResultQuery::new()
            .with_score_range(Some(80), Some(20))
            .apply(&results())
            .unwrap_err();
        assert_eq!(err, QueryError::InvalidScoreRange { min: 80, max: 20 });

        assert!(ResultQuery::new()
            .with_score_range(None, Some(101))
            .validate()
            .is_err());
    }

    #[test]
    fn test_skill_filter_normalizes() {
        let view = ResultQuery::new().with_skill("NodeJS").apply(&results()).unwrap();
        assert_eq!(ids(&view), vec!["a"]);

        let view = ResultQuery::new().with_skill("SQL").apply(&results()).unwrap();
        assert_eq!(ids(&view), vec!["b", "d"]);
    }

    #[test]
    fn test_sort_by_dimension() {
        let view = ResultQuery::new()
            .sorted_by(SortKey::SkillMatch, None)
            .apply(&results())
            .unwrap();
        // b=100, a=90, then c and d tie at 20 and fall back to rank
        assert_eq!(ids(&view), vec!["b", "a", "c", "d"]);

        let view = ResultQuery::new()
            .sorted_by(SortKey::SemanticMatch, Some(SortDirection::Ascending))
            .apply(&results())
            .unwrap();
        assert_eq!(ids(&view), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_pagination() {
        let page = ResultQuery::new().page(1, 2).apply(&results()).unwrap();
        assert_eq!(ids(&page), vec!["b", "c"]);

        let past_end = ResultQuery::new().page(10, 2).apply(&results()).unwrap();
        assert!(past_end.is_empty());
    }

    #[test]
    fn test_parse_sort_key_and_tier() {
        assert_eq!("overallScore".parse::<SortKey>().unwrap(), SortKey::OverallScore);
        assert_eq!("skill-match".parse::<SortKey>().unwrap(), SortKey::SkillMatch);
        assert_eq!("Rank".parse::<SortKey>().unwrap(), SortKey::Rank);
        assert!(matches!(
            "salary".parse::<SortKey>(),
            Err(QueryError::UnknownSortKey(_))
        ));

        assert_eq!(parse_tier("GOOD").unwrap(), Tier::Good);
        assert!(parse_tier("great").is_err());
    }
}
