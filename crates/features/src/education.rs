//! Education level detection from free-text descriptors.

use talentmatch_model::EducationLevel;

fn level_for_token(token: &str) -> Option<EducationLevel> {
    match token {
        "phd" | "doctorate" | "doctoral" | "dphil" | "edd" => Some(EducationLevel::Doctorate),
        "master" | "masters" | "msc" | "mba" | "meng" | "mtech" | "mphil" => {
            Some(EducationLevel::Master)
        }
        "bachelor" | "bachelors" | "bsc" | "beng" | "btech" | "undergraduate"
        | "baccalaureate" => Some(EducationLevel::Bachelor),
        "associate" | "associates" | "aas" => Some(EducationLevel::Associate),
        "diploma" | "ged" | "secondary" => Some(EducationLevel::HighSchool),
        _ => None,
    }
}

/// Two-letter degree abbreviations that double as state codes or product
/// names ("Boston, MA", "MS Office").
fn level_for_short_form(token: &str) -> Option<EducationLevel> {
    match token {
        "ms" | "ma" => Some(EducationLevel::Master),
        "bs" | "ba" => Some(EducationLevel::Bachelor),
        _ => None,
    }
}

const NOT_A_DEGREE_AFTER: &[&str] = &[
    "office", "excel", "word", "access", "project", "teams", "windows", "dos", "sql",
];

/// A short form counts only when it opens a clause: the descriptor's first
/// clause, or a later one where it is followed by "in" or "of".
fn short_form_level(clause: &[&str], first_clause: bool) -> Option<EducationLevel> {
    let (&head, rest) = clause.split_first()?;
    let level = level_for_short_form(head)?;

    match rest.first() {
        Some(next) if NOT_A_DEGREE_AFTER.contains(next) => None,
        Some(&"in") | Some(&"of") => Some(level),
        _ if first_clause => Some(level),
        _ => None,
    }
}

/// Detect the highest education level named in one descriptor.
///
/// Dots and apostrophes are removed first so "Ph.D.", "B.Sc." and
/// "Master's" read as single tokens. The descriptor is split into clauses
/// on `,`, `;`, `|`, `/` and parentheses.
pub fn detect_education(descriptor: &str) -> Option<EducationLevel> {
    let cleaned: String = descriptor
        .to_lowercase()
        .chars()
        .filter(|&c| !matches!(c, '.' | '\'' | '\u{2019}'))
        .collect();

    let clauses: Vec<Vec<&str>> = cleaned
        .split(|c: char| matches!(c, ',' | ';' | '|' | '/' | '(' | ')'))
        .map(|clause| {
            clause
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|tokens| !tokens.is_empty())
        .collect();

    clauses
        .iter()
        .enumerate()
        .flat_map(|(index, tokens)| {
            let high_school = tokens
                .windows(2)
                .any(|pair| pair[0] == "high" && pair[1] == "school")
                .then_some(EducationLevel::HighSchool);

            tokens
                .iter()
                .filter_map(|t| level_for_token(t))
                .chain(high_school)
                .chain(short_form_level(tokens, index == 0))
        })
        .max()
}

/// Highest level across all descriptors.
pub fn highest_education(descriptors: &[String]) -> Option<EducationLevel> {
    descriptors.iter().filter_map(|d| detect_education(d)).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_abbreviations() {
        assert_eq!(detect_education("Ph.D. in Physics"), Some(EducationLevel::Doctorate));
        assert_eq!(detect_education("B.Sc. Computer Science"), Some(EducationLevel::Bachelor));
        assert_eq!(detect_education("M.B.A."), Some(EducationLevel::Master));
        assert_eq!(detect_education("Master's of Engineering"), Some(EducationLevel::Master));
    }

    #[test]
    fn test_detect_high_school() {
        assert_eq!(detect_education("High School Diploma"), Some(EducationLevel::HighSchool));
        assert_eq!(detect_education("Lincoln High School"), Some(EducationLevel::HighSchool));
    }

    #[test]
    fn test_short_forms_open_a_clause() {
        assert_eq!(detect_education("MS Computer Science"), Some(EducationLevel::Master));
        assert_eq!(detect_education("BA History"), Some(EducationLevel::Bachelor));
        assert_eq!(detect_education("M.S. in Physics"), Some(EducationLevel::Master));
        assert_eq!(
            detect_education("State University, MA in Economics"),
            Some(EducationLevel::Master)
        );
    }

    #[test]
    fn test_state_codes_and_products_are_not_degrees() {
        assert_eq!(
            detect_education("BS Computer Science, Boston, MA"),
            Some(EducationLevel::Bachelor)
        );
        assert_eq!(
            detect_education("Bachelor of Arts, Worcester MA"),
            Some(EducationLevel::Bachelor)
        );
        assert_eq!(detect_education("Certified MS Office Specialist"), None);
        assert_eq!(detect_education("MS Office certification"), None);
    }

    #[test]
    fn test_detect_nothing() {
        assert_eq!(detect_education("Self-taught"), None);
        assert_eq!(detect_education(""), None);
    }

    #[test]
    fn test_highest_across_descriptors() {
        let education = vec![
            "High school diploma".to_string(),
            "BA History".to_string(),
            "MSc Data Science".to_string(),
        ];
        assert_eq!(highest_education(&education), Some(EducationLevel::Master));
        assert_eq!(highest_education(&[]), None);
    }
}
