//! Symptom / nutrient classification.
//!
//! A query is first scored against a small bilingual dictionary. A decisive
//! score yields a [`QueryClass`] directly; a query naming both a symptom and a
//! nutrient equally often resolves to [`TIE_BREAK`]. A query matching nothing
//! is left to the configured [`ClassificationStrategy`]:
//!
//! - [`Combined`](ClassificationStrategy::Combined) folds classification into
//!   the generation call with a self-selecting prompt (one round trip).
//! - [`TwoCall`](ClassificationStrategy::TwoCall) asks the generation service
//!   for a label first and parses it with [`parse_label`]; anything that does
//!   not parse falls back to [`TIE_BREAK`].

use serde::{Deserialize, Serialize};

/// What a query denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClass {
    Symptom,
    Nutrient,
}

impl QueryClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryClass::Symptom => "symptom",
            QueryClass::Nutrient => "nutrient",
        }
    }
}

impl std::fmt::Display for QueryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class chosen whenever a query cannot be resolved otherwise.
pub const TIE_BREAK: QueryClass = QueryClass::Symptom;

/// How unresolved queries are classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStrategy {
    /// Let the generation call pick the template itself.
    #[default]
    Combined,
    /// Ask for a label in a separate call, then pick the template locally.
    TwoCall,
}

/// Result of local classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Settled locally.
    Resolved(QueryClass),
    /// No dictionary evidence either way; defer to the strategy.
    Unresolved,
}

impl Classification {
    /// Settle the classification, falling back to [`TIE_BREAK`].
    pub fn resolve(self) -> QueryClass {
        match self {
            Classification::Resolved(class) => class,
            Classification::Unresolved => TIE_BREAK,
        }
    }
}

const NUTRIENT_TERMS: &[&str] = &[
    "비타민",
    "vitamin",
    "철분",
    "iron",
    "칼슘",
    "calcium",
    "마그네슘",
    "magnesium",
    "아연",
    "zinc",
    "셀레늄",
    "selenium",
    "칼륨",
    "potassium",
    "오메가",
    "omega",
    "단백질",
    "protein",
    "엽산",
    "folate",
    "folic",
    "비오틴",
    "biotin",
    "콜라겐",
    "collagen",
    "루테인",
    "lutein",
    "유산균",
    "프로바이오틱스",
    "probiotic",
    "식이섬유",
    "fiber",
    "코엔자임",
    "coq10",
    "나이아신",
    "niacin",
    "요오드",
    "iodine",
    "밀크씨슬",
    "아르기닌",
    "글루타민",
];

const SYMPTOM_TERMS: &[&str] = &[
    "탈모",
    "hair loss",
    "피로",
    "fatigue",
    "tired",
    "두통",
    "headache",
    "불면",
    "insomnia",
    "변비",
    "constipation",
    "빈혈",
    "anemia",
    "여드름",
    "acne",
    "떨림",
    "twitch",
    "twitching",
    "저림",
    "numb",
    "numbness",
    "통증",
    "pain",
    "어지러",
    "dizzy",
    "dizziness",
    "부종",
    "swelling",
    "소화불량",
    "indigestion",
    "스트레스",
    "stress",
    "우울",
    "depression",
    "depressed",
    "건조",
    "dry",
    "갈라",
    "쥐가",
    "cramp",
    "면역력",
    "감기",
    "cold",
    "부족",
    "결핍",
    "deficiency",
    "deficient",
];

/// Dictionary-based classifier.
///
/// Matching is by case-insensitive substring, so `"비타민D"` matches
/// `"비타민"` and `"Hair Loss"` matches `"hair loss"`.
#[derive(Debug, Clone)]
pub struct Classifier {
    nutrient_terms: Vec<String>,
    symptom_terms: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Classifier seeded with the built-in term lists.
    pub fn new() -> Self {
        Self {
            nutrient_terms: NUTRIENT_TERMS.iter().map(|t| t.to_string()).collect(),
            symptom_terms: SYMPTOM_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Add a nutrient term.
    pub fn nutrient_term(mut self, term: impl Into<String>) -> Self {
        self.nutrient_terms.push(term.into().to_lowercase());
        self
    }

    /// Add a symptom term.
    pub fn symptom_term(mut self, term: impl Into<String>) -> Self {
        self.symptom_terms.push(term.into().to_lowercase());
        self
    }

    /// Classify locally.
    ///
    /// Equal non-zero evidence for both classes resolves to [`TIE_BREAK`];
    /// no evidence at all is [`Classification::Unresolved`].
    pub fn classify(&self, query: &str) -> Classification {
        let query = query.trim().to_lowercase();
        let nutrient = count_hits(&query, &self.nutrient_terms);
        let symptom = count_hits(&query, &self.symptom_terms);

        match nutrient.cmp(&symptom) {
            std::cmp::Ordering::Greater => Classification::Resolved(QueryClass::Nutrient),
            std::cmp::Ordering::Less => Classification::Resolved(QueryClass::Symptom),
            std::cmp::Ordering::Equal if nutrient == 0 => Classification::Unresolved,
            std::cmp::Ordering::Equal => Classification::Resolved(TIE_BREAK),
        }
    }
}

/// Number of terms that occur in `query`.
///
/// Hangul terms match as plain substrings since Korean attaches particles
/// and units directly (`비타민D`). ASCII terms must form whole words,
/// allowing a plural `s`/`es` and trailing digits (`omega3`), so `iron`
/// does not fire inside `environment` nor `pain` inside `painting`.
fn count_hits(query: &str, terms: &[String]) -> usize {
    terms
        .iter()
        .filter(|t| {
            if t.is_ascii() {
                contains_word(query, t)
            } else {
                query.contains(t.as_str())
            }
        })
        .count()
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, _)| {
        let starts_word = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_ascii_alphanumeric());
        let rest = &haystack[start + word.len()..];
        let rest = rest
            .strip_prefix("es")
            .or_else(|| rest.strip_prefix('s'))
            .unwrap_or(rest);
        let ends_word = rest.chars().next().is_none_or(|c| !c.is_ascii_alphabetic());
        starts_word && ends_word
    })
}

/// Parse a label emitted by the generation service.
///
/// Accepts exactly one of `SYMPTOM`, `NUTRIENT`, `증상`, `영양소`, ignoring
/// case, surrounding whitespace, quotes and trailing punctuation. Anything
/// else, including replies that mention both, is `None`.
pub fn parse_label(reply: &str) -> Option<QueryClass> {
    let label = reply
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase();
    match label.as_str() {
        "symptom" | "증상" => Some(QueryClass::Symptom),
        "nutrient" | "영양소" => Some(QueryClass::Nutrient),
        _ => None,
    }
}
