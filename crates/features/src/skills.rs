//! Skill normalization.
//!
//! Job postings and résumés spell the same skill many ways ("JS",
//! "JavaScript", "Node", "node.js", "experience with React"). Every skill is
//! reduced to one canonical token before it is compared.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// Canonical token → aliases. Every canonical token maps to itself.
const SYNONYMS: &[(&str, &[&str])] = &[
    // Languages
    ("javascript", &["js", "java script", "ecmascript", "es6", "es2015"]),
    ("typescript", &["ts", "type script"]),
    ("python", &["py", "python3", "python 3", "python2"]),
    ("java", &["java8", "java11", "java17", "openjdk", "core java"]),
    ("c#", &["csharp", "c sharp"]),
    ("c++", &["cpp", "cplusplus", "c plus plus"]),
    (".net", &["dotnet", "dot net", ".net core", "net core"]),
    ("go", &["golang", "go lang"]),
    ("rust", &["rust lang", "rustlang"]),
    ("php", &["php7", "php8"]),
    ("ruby", &["ruby lang"]),
    ("kotlin", &["kotlin jvm"]),
    ("swift", &["swiftui", "ios swift"]),
    ("sql", &["structured query language", "t-sql", "tsql"]),
    ("html", &["html5"]),
    ("css", &["css3"]),
    // Frameworks and runtimes
    ("node.js", &["node", "nodejs", "node js"]),
    ("react", &["reactjs", "react.js", "react js", "react 18"]),
    ("react native", &["react-native", "reactnative"]),
    ("vue", &["vue.js", "vuejs", "vue js", "vue3", "vue2"]),
    ("angular", &["angularjs", "angular.js", "angular2+"]),
    ("next.js", &["nextjs", "next js"]),
    ("express", &["express.js", "expressjs", "express js"]),
    ("django", &["django rest framework", "drf"]),
    ("flask", &["python flask"]),
    ("spring", &["spring boot", "springboot"]),
    ("ruby on rails", &["rails", "ror"]),
    ("sass", &["scss"]),
    ("tailwind", &["tailwindcss", "tailwind css"]),
    ("graphql", &["graph ql"]),
    ("rest api", &["rest", "restful", "restful api", "rest apis", "restful apis"]),
    // Data stores
    ("postgresql", &["postgres", "psql", "pg"]),
    ("mysql", &["my sql", "mariadb"]),
    ("mongodb", &["mongo", "mongo db"]),
    ("redis", &["redis cache"]),
    ("elasticsearch", &["elastic search"]),
    // Cloud and operations
    ("aws", &["amazon web services", "amazon aws"]),
    ("gcp", &["google cloud", "google cloud platform"]),
    ("azure", &["microsoft azure", "ms azure"]),
    ("docker", &["dockerfile", "docker compose"]),
    ("kubernetes", &["k8s", "kube"]),
    ("terraform", &["hashicorp terraform"]),
    ("ci/cd", &["cicd", "ci cd", "continuous integration"]),
    ("git", &["git scm"]),
    ("linux", &["gnu/linux"]),
    // Data science
    ("machine learning", &["ml"]),
    ("artificial intelligence", &["ai"]),
    ("deep learning", &["deeplearning", "dl"]),
    ("natural language processing", &["nlp"]),
    ("tensorflow", &["tf"]),
    ("pytorch", &["torch", "py torch"]),
    ("pandas", &["python pandas"]),
    ("numpy", &["numerical python"]),
    // Practices and tools
    ("agile", &["agile methodology", "agile methodologies"]),
    ("ui/ux", &["ux/ui", "ux", "ui design", "ux design", "user experience"]),
    ("excel", &["ms excel", "microsoft excel"]),
    ("figma", &["figma design"]),
];

/// Leading phrases that qualify a skill without changing it.
const QUALIFIER_PREFIXES: &[&str] = &[
    "working knowledge of ",
    "experience with ",
    "experience in ",
    "proficient in ",
    "proficiency in ",
    "knowledge of ",
    "familiarity with ",
    "familiar with ",
    "expert in ",
    "expertise in ",
    "strong ",
    "solid ",
    "advanced ",
    "basic ",
];

/// Trailing words that qualify a skill without changing it.
const QUALIFIER_SUFFIXES: &[&str] = &[
    " programming",
    " development",
    " framework",
    " experience",
    " skills",
    " language",
];

static ALIAS_TO_CANONICAL: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (canonical, aliases) in SYNONYMS {
        for alias in *aliases {
            map.insert(*alias, *canonical);
        }
    }
    // Canonical tokens always win over an alias with the same spelling.
    for (canonical, _) in SYNONYMS {
        map.insert(*canonical, *canonical);
    }
    map
});

/// Separator-insensitive keys ("node js", "node-js", "nodejs" all collapse).
static COMPACT_TO_CANONICAL: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (canonical, aliases) in SYNONYMS {
        map.entry(compact_key(canonical)).or_insert(*canonical);
        for alias in *aliases {
            map.entry(compact_key(alias)).or_insert(*canonical);
        }
    }
    map
});

fn compact_key(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !matches!(c, ' ' | '.' | '-' | '_'))
        .collect()
}

fn is_edge_punctuation(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            ',' | ';' | ':' | '!' | '?' | '"' | '\'' | '(' | ')' | '[' | ']' | '{' | '}' | '*'
                | '-' | '/' | '|' | '•' | '\u{00b7}'
        )
}

fn trim_edges(s: &str) -> &str {
    s.trim_start_matches(is_edge_punctuation)
        .trim_end_matches(|c: char| is_edge_punctuation(c) || c == '.')
}

/// Lowercase, drop parenthesized asides, collapse whitespace, trim edges.
fn basic_clean(input: &str) -> String {
    let mut depth = 0usize;
    let without_parens: String = input
        .chars()
        .filter(|&c| match c {
            '(' => {
                depth += 1;
                false
            }
            ')' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect();

    let collapsed = without_parens
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    trim_edges(&collapsed).to_string()
}

/// Repeatedly strip qualifier phrases until nothing changes.
fn strip_qualifiers(input: &str) -> String {
    let mut current = trim_edges(input).to_string();

    loop {
        let next = strip_one_qualifier(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_one_qualifier(s: &str) -> String {
    for prefix in QUALIFIER_PREFIXES {
        if let Some(rest) = s.strip_prefix(prefix) {
            let rest = trim_edges(rest);
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }

    for suffix in QUALIFIER_SUFFIXES {
        if let Some(rest) = s.strip_suffix(suffix) {
            let rest = trim_edges(rest);
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }

    s.to_string()
}

fn lookup_canonical(token: &str) -> Option<&'static str> {
    if token.is_empty() {
        return None;
    }

    if let Some(canonical) = ALIAS_TO_CANONICAL.get(token) {
        return Some(*canonical);
    }

    COMPACT_TO_CANONICAL.get(&compact_key(token)).copied()
}

/// Reduce a skill string to its canonical token.
///
/// Deterministic and idempotent: `normalize_skill(&normalize_skill(s)) ==
/// normalize_skill(s)`. Unknown skills pass through lowercased and trimmed.
pub fn normalize_skill(skill: &str) -> String {
    let cleaned = basic_clean(skill);
    if let Some(canonical) = lookup_canonical(&cleaned) {
        return canonical.to_string();
    }

    let stripped = strip_qualifiers(&cleaned);
    if let Some(canonical) = lookup_canonical(&stripped) {
        return canonical.to_string();
    }

    stripped
}

/// Normalize a skill list into a sorted set, dropping blanks.
pub fn normalize_skill_set(skills: &[String]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| !s.is_empty())
        .collect()
}
