//! Insight generation for candidate match review.
//!
//! Converts a match breakdown into reviewer-facing insights and structured
//! explanations suitable for display on the ranking and application review
//! pages. Rules run in a fixed order and the output is fully determined by
//! the input.

use serde::{Deserialize, Serialize};
use talentmatch_model::{Insight, MatchResult};

/// Skill match at or above this is a strength.
pub const STRONG_SKILL_MATCH: u8 = 80;
/// Up to this many missing skills are listed by name.
pub const FEW_MISSING_SKILLS: usize = 3;
/// Experience match below this is a gap.
pub const EXPERIENCE_GAP_BELOW: u8 = 50;
/// Education match below this is a gap.
pub const EDUCATION_GAP_BELOW: u8 = 50;
/// Semantic match at or above this is a strong contextual fit.
pub const STRONG_SEMANTIC_MATCH: u8 = 80;
/// Skill match below this counts as a skill-list gap.
pub const WEAK_SKILL_MATCH_BELOW: u8 = 50;
/// Semantic match below this counts as a context mismatch.
pub const WEAK_SEMANTIC_MATCH_BELOW: u8 = 30;

/// A structured explanation for one insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Short summary (1 line)
    pub summary: String,

    /// Detailed explanation (1-2 sentences)
    pub detail: String,

    /// How much this should worry a reviewer (0.0 - 1.0)
    pub severity: f32,

    /// Evidence items supporting this explanation
    pub evidence: Vec<EvidenceItem>,
}

/// A piece of evidence supporting an insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Type of evidence
    pub kind: String,

    /// The specific value or match
    pub value: String,

    /// Optional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Derive insights for a scored candidate, in rule order, at most `max`.
///
/// Rules:
/// 1. strong skill alignment (skill match >= 80, job lists skills)
/// 2. a few missing skills (1 to 3), listed by name
/// 3. many missing skills (more than 3), counted
/// 4. experience gap (experience match < 50)
/// 5. education gap (education match < 50)
/// 6. contextual fit despite skill gaps (semantic >= 80, skill < 50)
/// 7. context mismatch (skill >= 80, semantic < 30, semantic available)
/// 8. semantic dimension unavailable
pub fn generate_insights(result: &MatchResult, max: usize) -> Vec<Insight> {
    let breakdown = result.breakdown();
    let matched = result.matched_skills();
    let missing = result.missing_skills();
    let required = matched.len() + missing.len();

    let mut insights = Vec::new();

    if required > 0 && breakdown.skill_match >= STRONG_SKILL_MATCH {
        insights.push(Insight::StrongSkillAlignment {
            skill_match: breakdown.skill_match,
        });
    }

    if !missing.is_empty() && missing.len() <= FEW_MISSING_SKILLS {
        insights.push(Insight::FewMissingSkills {
            skills: missing.iter().cloned().collect(),
        });
    } else if missing.len() > FEW_MISSING_SKILLS {
        insights.push(Insight::ManyMissingSkills {
            missing: missing.len(),
            required,
        });
    }

    if breakdown.experience_match < EXPERIENCE_GAP_BELOW {
        insights.push(Insight::ExperienceGap {
            experience_match: breakdown.experience_match,
        });
    }

    if breakdown.education_match < EDUCATION_GAP_BELOW {
        insights.push(Insight::EducationGap {
            education_match: breakdown.education_match,
        });
    }

    if breakdown.semantic_match >= STRONG_SEMANTIC_MATCH
        && breakdown.skill_match < WEAK_SKILL_MATCH_BELOW
    {
        insights.push(Insight::ContextualFitDespiteGaps {
            semantic_match: breakdown.semantic_match,
            skill_match: breakdown.skill_match,
        });
    }

    if required > 0
        && !result.semantic_unavailable
        && breakdown.skill_match >= STRONG_SKILL_MATCH
        && breakdown.semantic_match < WEAK_SEMANTIC_MATCH_BELOW
    {
        insights.push(Insight::ContextMismatch {
            semantic_match: breakdown.semantic_match,
        });
    }

    if result.semantic_unavailable {
        insights.push(Insight::SemanticUnavailable);
    }

    insights.truncate(max);
    insights
}

/// Replace a result's insight strings with freshly generated ones.
pub fn annotate(result: &mut MatchResult, max: usize) {
    result.insights = generate_insights(result, max)
        .iter()
        .map(Insight::message)
        .collect();
}

/// Generate the structured explanation for a single insight.
pub fn explain_insight(insight: &Insight) -> Explanation {
    match insight {
        Insight::StrongSkillAlignment { skill_match } => Explanation {
            summary: insight.message(),
            detail: format!(
                "The candidate lists {}% of the job's required skills. \
                 Skill coverage is unlikely to be a blocker.",
                skill_match
            ),
            severity: 0.0,
            evidence: vec![EvidenceItem {
                kind: "skill_match".to_string(),
                value: skill_match.to_string(),
                context: None,
            }],
        },

        Insight::FewMissingSkills { skills } => Explanation {
            summary: insight.message(),
            detail: format!(
                "The résumé does not mention {}. \
                 A short conversation may confirm whether these are real gaps.",
                skills.join(", ")
            ),
            severity: 0.3,
            evidence: skills
                .iter()
                .map(|skill| EvidenceItem {
                    kind: "missing_skill".to_string(),
                    value: skill.clone(),
                    context: None,
                })
                .collect(),
        },

        Insight::ManyMissingSkills { missing, required } => Explanation {
            summary: insight.message(),
            detail: format!(
                "{} of the {} required skills are absent from the résumé. \
                 The candidate may need significant ramp-up.",
                missing, required
            ),
            severity: 0.7,
            evidence: vec![EvidenceItem {
                kind: "missing_skill_count".to_string(),
                value: missing.to_string(),
                context: Some(format!("{} required", required)),
            }],
        },

        Insight::ExperienceGap { experience_match } => Explanation {
            summary: insight.message(),
            detail: format!(
                "Experience alignment is {}%. \
                 The candidate's seniority is below the level the role asks for.",
                experience_match
            ),
            severity: 0.6,
            evidence: vec![EvidenceItem {
                kind: "experience_match".to_string(),
                value: experience_match.to_string(),
                context: None,
            }],
        },

        Insight::EducationGap { education_match } => Explanation {
            summary: insight.message(),
            detail: format!(
                "Education alignment is {}%. \
                 The stated minimum education is not evident in the profile.",
                education_match
            ),
            severity: 0.5,
            evidence: vec![EvidenceItem {
                kind: "education_match".to_string(),
                value: education_match.to_string(),
                context: None,
            }],
        },

        Insight::ContextualFitDespiteGaps {
            semantic_match,
            skill_match,
        } => Explanation {
            summary: insight.message(),
            detail: format!(
                "The profile reads {}% similar to the job description while the \
                 skill list covers only {}%. The skill list may be incomplete.",
                semantic_match, skill_match
            ),
            severity: 0.1,
            evidence: vec![
                EvidenceItem {
                    kind: "semantic_match".to_string(),
                    value: semantic_match.to_string(),
                    context: None,
                },
                EvidenceItem {
                    kind: "skill_match".to_string(),
                    value: skill_match.to_string(),
                    context: None,
                },
            ],
        },

        Insight::ContextMismatch { semantic_match } => Explanation {
            summary: insight.message(),
            detail: format!(
                "The skills line up but the profile text is only {}% similar to \
                 the job description. Check that the experience is relevant.",
                semantic_match
            ),
            severity: 0.4,
            evidence: vec![EvidenceItem {
                kind: "semantic_match".to_string(),
                value: semantic_match.to_string(),
                context: None,
            }],
        },

        Insight::SemanticUnavailable => Explanation {
            summary: insight.message(),
            detail: "The similarity service timed out or returned an error. \
                     The overall score omits contextual fit for this candidate."
                .to_string(),
            severity: 0.2,
            evidence: vec![],
        },
    }
}

/// Each insight on a result paired with its explanation.
pub fn explain_result(result: &MatchResult, max: usize) -> Vec<(Insight, Explanation)> {
    generate_insights(result, max)
        .into_iter()
        .map(|insight| {
            let explanation = explain_insight(&insight);
            (insight, explanation)
        })
        .collect()
}

/// One-line summary of a result for list views.
pub fn summarize_match(result: &MatchResult) -> String {
    let level = result.tier().label().to_uppercase();

    if result.insights.is_empty() {
        return format!(
            "{} MATCH ({}): no notable observations",
            level,
            result.overall_score()
        );
    }

    format!(
        "{} MATCH ({}): {}",
        level,
        result.overall_score(),
        result.insights.join("; ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use talentmatch_model::{CandidateProfile, ScoreBreakdown, ScoringConfig};

    fn result(breakdown: ScoreBreakdown, matched: &[&str], missing: &[&str]) -> MatchResult {
        let to_set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
        MatchResult::new(
            &CandidateProfile::new("c1"),
            breakdown,
            to_set(matched),
            to_set(missing),
            &ScoringConfig::default(),
        )
    }

    #[test]
    fn test_strong_alignment_with_few_missing() {
        let r = result(
            ScoreBreakdown::new(60, 80, 100, 100),
            &["go", "rust", "sql", "docker"],
            &["kubernetes"],
        );
        let messages: Vec<String> = generate_insights(&r, 5).iter().map(Insight::message).collect();
        assert_eq!(
            messages,
            vec![
                "Strong skill alignment".to_string(),
                "Missing only 1 key skill(s): kubernetes".to_string(),
            ]
        );
    }

    #[test]
    fn test_many_missing_and_gaps_in_order() {
        let r = result(
            ScoreBreakdown::new(85, 20, 40, 10),
            &["rust"],
            &["go", "sql", "docker", "aws"],
        );
        assert_eq!(
            generate_insights(&r, 5),
            vec![
                Insight::ManyMissingSkills { missing: 4, required: 5 },
                Insight::ExperienceGap { experience_match: 40 },
                Insight::EducationGap { education_match: 10 },
                Insight::ContextualFitDespiteGaps { semantic_match: 85, skill_match: 20 },
            ]
        );
    }

    #[test]
    fn test_context_mismatch() {
        let r = result(ScoreBreakdown::new(10, 100, 100, 100), &["rust"], &[]);
        assert_eq!(
            generate_insights(&r, 5),
            vec![
                Insight::StrongSkillAlignment { skill_match: 100 },
                Insight::ContextMismatch { semantic_match: 10 },
            ]
        );
    }

    #[test]
    fn test_semantic_unavailable_replaces_mismatch() {
        let mut r = result(ScoreBreakdown::new(0, 100, 100, 100), &["rust"], &[]);
        r.semantic_unavailable = true;
        assert_eq!(
            generate_insights(&r, 5),
            vec![
                Insight::StrongSkillAlignment { skill_match: 100 },
                Insight::SemanticUnavailable,
            ]
        );
    }

    #[test]
    fn test_no_skill_praise_without_required_skills() {
        let r = result(ScoreBreakdown::new(50, 100, 100, 100), &[], &[]);
        assert!(generate_insights(&r, 5).is_empty());
    }

    #[test]
    fn test_cap_and_determinism() {
        let r = result(
            ScoreBreakdown::new(85, 20, 0, 0),
            &["rust"],
            &["go", "sql", "docker", "aws"],
        );
        assert_eq!(generate_insights(&r, 2).len(), 2);
        assert_eq!(generate_insights(&r, 0), Vec::<Insight>::new());
        assert_eq!(generate_insights(&r, 5), generate_insights(&r, 5));
    }

    #[test]
    fn test_annotate_and_summary() {
        let mut r = result(ScoreBreakdown::new(90, 90, 100, 100), &["rust"], &["go"]);
        annotate(&mut r, 5);
        assert_eq!(r.insights[0], "Strong skill alignment");
        assert_eq!(
            summarize_match(&r),
            "EXCELLENT MATCH (94): Strong skill alignment; Missing only 1 key skill(s): go"
        );
    }

    #[test]
    fn test_summary_without_insights() {
        let r = result(ScoreBreakdown::new(60, 60, 60, 60), &[], &[]);
        assert_eq!(summarize_match(&r), "FAIR MATCH (60): no notable observations");
    }

    #[test]
    fn test_explain_result_follows_insight_order() {
        let mut r = result(ScoreBreakdown::new(0, 100, 100, 100), &["rust"], &[]);
        r.semantic_unavailable = true;

        let explained = explain_result(&r, 5);
        let labels: Vec<&str> = explained.iter().map(|(insight, _)| insight.label()).collect();
        assert_eq!(labels, vec!["Strong Skills", "Semantic Unavailable"]);
        assert!(explained[1].1.detail.contains("timed out or returned an error"));
    }

    #[test]
    fn test_experience_gap_detail_holds_for_any_penalty() {
        // one level below with a 60-point penalty still lands under 50
        let explanation = explain_insight(&Insight::ExperienceGap { experience_match: 40 });
        assert!(explanation.detail.contains("40%"));
        assert!(!explanation.detail.contains("two levels"));
    }

    #[test]
    fn test_explain_missing_skills() {
        let insight = Insight::FewMissingSkills {
            skills: vec!["go".into(), "sql".into()],
        };
        let explanation = explain_insight(&insight);
        assert_eq!(explanation.evidence.len(), 2);
        assert!(explanation.detail.contains("go, sql"));
        let strength = explain_insight(&Insight::StrongSkillAlignment { skill_match: 90 });
        assert!(strength.severity < explanation.severity);
    }
}
