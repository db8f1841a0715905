//! Dimension scorers.
//!
//! Skill, experience and education scorers take a job and a candidate and
//! return an integer in `0..=100`. The semantic dimension goes through a
//! similarity backend; only its scaling and job-side text live here.
//! Missing optional data never fails a scorer; it degrades to a neutral or
//! zero score instead.

use std::collections::BTreeSet;

use serde::Serialize;
use talentmatch_model::{CandidateProfile, EducationLevel, ExperienceLevel, JobRequirement};

use crate::education::highest_education;
use crate::skills::normalize_skill_set;

/// Scale a similarity in `[0, 1]` to a percentage. NaN scores 0.
pub fn semantic_score(similarity: f32) -> u8 {
    if similarity.is_nan() {
        return 0;
    }
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// The job-side text compared against a résumé: description plus category.
///
/// Returns `None` when the description is blank.
pub fn job_semantic_text(job: &JobRequirement) -> Option<String> {
    if job.description.trim().is_empty() {
        return None;
    }

    let category = job.category.trim();
    if category.is_empty() {
        Some(job.description.clone())
    } else {
        Some(format!("{}\n{}", category, job.description))
    }
}

/// Normalized required skills split into those the candidate has and lacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillOverlap {
    pub matched: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

impl SkillOverlap {
    /// Number of distinct normalized required skills.
    pub fn required(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// `matched / required` as a rounded percentage.
    ///
    /// A job with no required skills scores 100: there is nothing to fail on.
    pub fn score(&self) -> u8 {
        let required = self.required();
        if required == 0 {
            return 100;
        }
        ((self.matched.len() * 100 + required / 2) / required) as u8
    }
}

/// Split the job's normalized skills by presence in the candidate's.
pub fn skill_overlap(job: &JobRequirement, candidate: &CandidateProfile) -> SkillOverlap {
    let required = normalize_skill_set(&job.required_skills);
    let held = normalize_skill_set(&candidate.skills);

    let (matched, missing) = required.into_iter().partition(|skill| held.contains(skill));

    SkillOverlap { matched, missing }
}

/// Skill match percentage.
pub fn skill_match(job: &JobRequirement, candidate: &CandidateProfile) -> u8 {
    skill_overlap(job, candidate).score()
}

/// At or above the requirement scores 100; each level below loses `penalty`.
fn level_score(required: u8, actual: u8, penalty: u8) -> u8 {
    if actual >= required {
        return 100;
    }
    let lost = u32::from(required - actual) * u32::from(penalty);
    100u32.saturating_sub(lost) as u8
}

/// Experience match percentage.
///
/// A candidate with no experience signal is placed at entry level.
pub fn experience_match(job: &JobRequirement, candidate: &CandidateProfile, penalty: u8) -> u8 {
    let actual = candidate
        .effective_experience_level()
        .unwrap_or(ExperienceLevel::Entry);
    level_score(job.experience_level.ordinal(), actual.ordinal(), penalty)
}

/// Education match percentage; 100 when the job states no minimum.
pub fn education_match(job: &JobRequirement, candidate: &CandidateProfile, penalty: u8) -> u8 {
    let Some(minimum) = job.min_education else {
        return 100;
    };

    let attained = highest_education(&candidate.education);
    level_score(
        EducationLevel::ordinal_of(Some(minimum)),
        EducationLevel::ordinal_of(attained),
        penalty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn job(skills: &[&str]) -> JobRequirement {
        JobRequirement::new("job-1", "Build web applications with React and Node")
            .with_skills(skills.iter().copied())
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_skill_overlap_example() {
        let job = job(&["React", "Node.js", "SQL"]);
        let candidate = CandidateProfile::new("a").with_skills(["react", "node"]);

        let overlap = skill_overlap(&job, &candidate);
        assert_eq!(overlap.matched, set(&["node.js", "react"]));
        assert_eq!(overlap.missing, set(&["sql"]));
        assert_eq!(overlap.score(), 67);
    }

    #[test]
    fn test_skill_match_exact_set() {
        let job = job(&["Rust", "Docker", "k8s"]);
        let candidate = CandidateProfile::new("a").with_skills(["kubernetes", "docker", "rust"]);
        assert_eq!(skill_match(&job, &candidate), 100);
    }

    #[test]
    fn test_skill_match_no_overlap() {
        let job = job(&["Rust", "Docker"]);
        let candidate = CandidateProfile::new("a").with_skills(["excel"]);
        assert_eq!(skill_match(&job, &candidate), 0);

        let empty = CandidateProfile::new("b");
        assert_eq!(skill_match(&job, &empty), 0);
    }

    #[test]
    fn test_skill_match_empty_requirements_policy() {
        let job = job(&[]);
        let candidate = CandidateProfile::new("a").with_skills(["excel"]);
        assert_eq!(skill_match(&job, &candidate), 100);
        assert_eq!(skill_match(&job, &CandidateProfile::new("b")), 100);
    }

    #[test]
    fn test_matched_and_missing_partition_required() {
        let job = job(&["React", "react.js", "SQL", "Go", "Experience with Docker"]);
        let candidate = CandidateProfile::new("a").with_skills(["golang", "docker", "php"]);

        let overlap = skill_overlap(&job, &candidate);
        let union: BTreeSet<String> = overlap.matched.union(&overlap.missing).cloned().collect();
        assert_eq!(union, normalize_skill_set(&job.required_skills));
        assert!(overlap.matched.is_disjoint(&overlap.missing));
        assert_eq!(overlap.required(), 4);
    }

    #[test]
    fn test_experience_levels_below() {
        let job = job(&[]).with_experience_level(ExperienceLevel::Senior);

        let entry = CandidateProfile::new("a").with_experience_level(ExperienceLevel::Entry);
        assert_eq!(experience_match(&job, &entry, 30), 40);

        let mid = CandidateProfile::new("b").with_experience_years(3.0);
        assert_eq!(experience_match(&job, &mid, 30), 70);

        let exec = CandidateProfile::new("c").with_experience_level(ExperienceLevel::Executive);
        assert_eq!(experience_match(&job, &exec, 30), 100);
    }

    #[test]
    fn test_experience_floor_and_unknown() {
        let job = job(&[]).with_experience_level(ExperienceLevel::Executive);
        let unknown = CandidateProfile::new("a");
        // three levels below at 40 points each would go negative
        assert_eq!(experience_match(&job, &unknown, 40), 0);
        assert_eq!(experience_match(&job, &unknown, 30), 10);
    }

    #[test]
    fn test_education_match() {
        let no_minimum = job(&[]);
        let candidate = CandidateProfile::new("a");
        assert_eq!(education_match(&no_minimum, &candidate, 30), 100);

        let needs_masters = job(&[]).with_min_education(EducationLevel::Master);
        let bachelor = CandidateProfile::new("b").with_education(["BSc Physics"]);
        assert_eq!(education_match(&needs_masters, &bachelor, 30), 70);

        let doctor = CandidateProfile::new("c").with_education(["PhD Chemistry"]);
        assert_eq!(education_match(&needs_masters, &doctor, 30), 100);

        // no education: master is ordinal 4, nothing is 0
        assert_eq!(education_match(&needs_masters, &candidate, 30), 0);

        // the trailing state code must not read as a master's degree
        let located =
            CandidateProfile::new("d").with_education(["BS Computer Science, Boston, MA"]);
        assert_eq!(education_match(&needs_masters, &located, 30), 70);
    }

    #[test]
    fn test_job_semantic_text() {
        let job = job(&[]).with_category("Engineering");
        assert_eq!(
            job_semantic_text(&job).as_deref(),
            Some("Engineering\nBuild web applications with React and Node")
        );

        let no_description = JobRequirement::new("j", "  ").with_category("Engineering");
        assert_eq!(job_semantic_text(&no_description), None);
    }

    #[test]
    fn test_semantic_score_scaling() {
        assert_eq!(semantic_score(0.0), 0);
        assert_eq!(semantic_score(0.506), 51);
        assert_eq!(semantic_score(1.5), 100);
        assert_eq!(semantic_score(-0.2), 0);
        assert_eq!(semantic_score(f32::NAN), 0);
    }
}
