//! Keyword routing
//!
//! Classifies free text by case-insensitive substring containment against
//! fixed keyword sets. No tokenization and no ranking: a set matches when any
//! one of its keywords occurs anywhere in the lowercased input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    keywords: &'static [&'static str],
}

impl KeywordSet {
    pub const fn new(keywords: &'static [&'static str]) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }

    /// `lowered` must already be lowercase.
    fn matches_lowered(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matches_lowered(&text.to_lowercase())
    }
}

/// Questions that would benefit from organization-wide protocols.
pub const ORG_TRIGGERS: KeywordSet = KeywordSet::new(
    &["protocol", "treatment", "guideline", "diabetes", "management", "emergency"],
);

pub const HEART_TERMS: KeywordSet = KeywordSet::new(
    &["heart", "cardiac", "cardio", "hypertension", "blood pressure", "cholesterol"],
);

pub const DIABETES_TERMS: KeywordSet = KeywordSet::new(
    &["diabetes", "diabetic", "glucose", "insulin", "a1c", "blood sugar"],
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTopics {
    pub needs_org: bool,
    pub is_heart: bool,
    pub is_diabetes: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryClassifier {
    org: KeywordSet,
    heart: KeywordSet,
    diabetes: KeywordSet,
}

impl QueryClassifier {
    pub fn new() -> Self {
        Self {
            org: ORG_TRIGGERS,
            heart: HEART_TERMS,
            diabetes: DIABETES_TERMS,
        }
    }

    pub fn classify(&self, text: &str) -> QueryTopics {
        let lowered = text.to_lowercase();
        let topics = QueryTopics {
            needs_org: self.org.matches_lowered(&lowered),
            is_heart: self.heart.matches_lowered(&lowered),
            is_diabetes: self.diabetes.matches_lowered(&lowered),
        };
        tracing::debug!(
            needs_org = topics.needs_org,
            is_heart = topics.is_heart,
            is_diabetes = topics.is_diabetes,
            "classified query"
        );
        topics
    }
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new()
    }
}
