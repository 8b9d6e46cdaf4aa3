//! Keyword-based categorization of files by name.
//!
//! Rules are kept in an ordered list and evaluated top to bottom. The first
//! rule with a keyword contained in the lowercased filename decides the
//! category, so a file such as `english_essay.pdf` lands in `English` even
//! though `pdf` is also a `Documents` keyword.
//!
//! # Examples
//!
//! ```
//! use coursetidy::category::Classifier;
//!
//! let classifier = Classifier::default();
//! assert_eq!(classifier.classify("Algebra_Notes.txt"), "Math");
//! assert_eq!(classifier.classify("english_essay.pdf"), "English");
//! assert_eq!(classifier.classify("random.xyz"), "Other");
//! ```
use serde::{Deserialize, Serialize};

/// Label used when no rule matches.
pub const DEFAULT_FALLBACK_CATEGORY: &str = "Other";

/// A category label and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Folder name for the category.
    pub name: String,
    /// Substrings matched against the lowercased filename.
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// Creates a rule, lowercasing its keywords.
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|kw| kw.to_lowercase()).collect(),
        }
    }

    /// Returns true if any keyword occurs in `lowercase_name`.
    fn matches(&self, lowercase_name: &str) -> bool {
        self.keywords.iter().any(|kw| lowercase_name.contains(kw.as_str()))
    }
}

/// The built-in subject table, in evaluation order.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Math",
            &["math", "mathematics", "calculus", "calc", "algebra", "geometry"],
        ),
        CategoryRule::new(
            "English",
            &["english", "comp", "composition", "eng", "lit", "literature"],
        ),
        CategoryRule::new(
            "Science",
            &["science", "biology", "bio", "chemistry", "physics"],
        ),
        CategoryRule::new(
            "History",
            &["history", "hist", "government", "civics", "gov", "social studies"],
        ),
        CategoryRule::new(
            "Language",
            &["spanish", "french", "german", "language", "lang"],
        ),
        CategoryRule::new("Art", &["art", "drawing", "painting", "sketch"]),
        CategoryRule::new("Documents", &["doc", "docx", "pdf", "txt"]),
        CategoryRule::new("Images", &["jpg", "jpeg", "gif", "png"]),
    ]
}

/// Maps filenames to category labels using first-match rules.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl Classifier {
    /// Creates a classifier from rules in evaluation order.
    ///
    /// Keywords are lowercased here so callers may pass mixed-case tables.
    pub fn new(rules: Vec<CategoryRule>, fallback: impl Into<String>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| CategoryRule {
                name: rule.name,
                keywords: rule.keywords.iter().map(|kw| kw.to_lowercase()).collect(),
            })
            .collect();

        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Returns the category for `file_name`, or the fallback label.
    pub fn classify(&self, file_name: &str) -> &str {
        let name = file_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&name))
            .map(|rule| rule.name.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    /// The label returned when no rule matches.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules(), DEFAULT_FALLBACK_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("CALCULUS_HW.TXT"), "Math");
        assert_eq!(classifier.classify("Physics-Lab.docx"), "Science");
        assert_eq!(classifier.classify("Civics_Quiz"), "History");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let classifier = Classifier::default();
        // "pdf" is a Documents keyword but English is declared first
        assert_eq!(classifier.classify("english_essay.pdf"), "English");
        // "png" is an Images keyword but Art is declared first
        assert_eq!(classifier.classify("sketch.png"), "Art");
        // Only Documents matches
        assert_eq!(classifier.classify("receipt.pdf"), "Documents");
    }

    #[test]
    fn test_rule_order_decides_ties() {
        let forward = Classifier::new(
            vec![
                CategoryRule::new("Alpha", &["shared"]),
                CategoryRule::new("Beta", &["shared"]),
            ],
            "Other",
        );
        let reversed = Classifier::new(
            vec![
                CategoryRule::new("Beta", &["shared"]),
                CategoryRule::new("Alpha", &["shared"]),
            ],
            "Other",
        );

        assert_eq!(forward.classify("shared_file"), "Alpha");
        assert_eq!(reversed.classify("shared_file"), "Beta");
    }

    #[test]
    fn test_unmatched_name_falls_back() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("random.xyz"), "Other");
        assert_eq!(classifier.classify(""), "Other");
        assert_eq!(classifier.fallback(), "Other");
    }

    #[test]
    fn test_custom_fallback_label() {
        let classifier = Classifier::new(Vec::new(), "Unsorted");
        assert_eq!(classifier.classify("algebra.txt"), "Unsorted");
    }

    #[test]
    fn test_mixed_case_keywords_are_normalized() {
        let classifier = Classifier::new(
            vec![CategoryRule {
                name: "Music".to_string(),
                keywords: vec!["Guitar".to_string()],
            }],
            "Other",
        );
        assert_eq!(classifier.classify("guitar_tabs"), "Music");
        assert_eq!(classifier.rules()[0].keywords, vec!["guitar".to_string()]);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = Classifier::default();
        let names = ["bio_lab.pdf", "algebra_notes.txt", "random.xyz"];
        let first: Vec<String> = names
            .iter()
            .map(|n| classifier.classify(n).to_string())
            .collect();
        let second: Vec<String> = names
            .iter()
            .rev()
            .map(|n| classifier.classify(n).to_string())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["Science", "Math", "Other"]);
    }
}
