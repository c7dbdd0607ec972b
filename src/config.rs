//! Configuration types.
//!
//! Every word and phrase list the review engine matches against lives in
//! [`Vocabulary`], so alternate vocabularies can be loaded from JSON
//! without code changes. Orchestration settings come from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default body size limit: 10 MiB.
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Default number of emails pulled per cycle.
const DEFAULT_BATCH_SIZE: usize = 10;

/// Default delay between cycles: 5 minutes.
const DEFAULT_CYCLE_SECS: u64 = 300;

/// Where a [`Replacement`] phrase must sit to be replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Every occurrence.
    #[default]
    Anywhere,
    /// Only where followed by a space.
    Trailing,
    /// Only where a space sits on both sides.
    Spaced,
}

/// A literal phrase and the text that replaces it during repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub phrase: String,
    pub replacement: String,
    #[serde(default)]
    pub boundary: Boundary,
}

impl Replacement {
    fn new(phrase: &str, replacement: &str) -> Self {
        Self {
            phrase: phrase.into(),
            replacement: replacement.into(),
            boundary: Boundary::Anywhere,
        }
    }

    fn bounded(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Replace every occurrence of the phrase that satisfies its boundary.
    ///
    /// Matching is literal and case-sensitive. The boundary spaces are kept.
    pub fn apply(&self, text: &str) -> String {
        match self.boundary {
            Boundary::Anywhere => text.replace(&self.phrase, &self.replacement),
            Boundary::Trailing => text.replace(
                &format!("{} ", self.phrase),
                &format!("{} ", self.replacement),
            ),
            Boundary::Spaced => text.replace(
                &format!(" {} ", self.phrase),
                &format!(" {} ", self.replacement),
            ),
        }
    }
}

/// A risky claim: matches when every term occurs in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPattern {
    pub all_of: Vec<String>,
    /// Issue text reported when the pattern matches.
    pub issue: String,
}

impl RiskPattern {
    fn new(all_of: &[&str], issue: &str) -> Self {
        Self {
            all_of: all_of.iter().map(|t| t.to_string()).collect(),
            issue: issue.into(),
        }
    }
}

/// Word and phrase lists used by the quality checks, repair rules and
/// escalation policy. All entries are lowercase; matching lowercases the
/// text, not the vocabulary.
///
/// Missing categories in a JSON file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Known misspellings and their corrections.
    pub misspellings: Vec<Replacement>,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    pub brand_violations: Vec<String>,
    pub risk_patterns: Vec<RiskPattern>,
    /// Casual phrases and their professional replacements.
    pub casual_phrases: Vec<Replacement>,
    /// Phrases that count as a clear action item.
    pub action_indicators: Vec<String>,
    /// Phrases whose presence suppresses the appended next-steps line.
    pub action_markers: Vec<String>,
    /// Phrases whose presence suppresses the empathetic opener.
    pub empathy_markers: Vec<String>,
    /// Body keywords that route the email to a human.
    pub sensitive_keywords: Vec<String>,
    /// Sender fragments that route the email to a human.
    pub executive_markers: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            misspellings: vec![
                Replacement::new("teh", "the").bounded(Boundary::Trailing),
                Replacement::new("recieve", "receive").bounded(Boundary::Spaced),
                Replacement::new("occured", "occurred").bounded(Boundary::Spaced),
                Replacement::new("seperate", "separate").bounded(Boundary::Spaced),
                Replacement::new("definately", "definitely").bounded(Boundary::Spaced),
            ],
            positive_words: words(&["good", "great", "excellent", "happy", "pleased", "thank you"]),
            negative_words: words(&[
                "bad",
                "terrible",
                "awful",
                "unhappy",
                "disappointed",
                "angry",
            ]),
            brand_violations: words(&["robotic", "overly formal", "casual slang"]),
            risk_patterns: vec![
                RiskPattern::new(
                    &["guarantee", "service"],
                    "Making service guarantees without authority",
                ),
                RiskPattern::new(&["24/7 support"], "Incorrect information about support hours"),
            ],
            casual_phrases: vec![
                Replacement::new("lol", ""),
                Replacement::new("omg", ""),
                Replacement::new("hey guys", "Hello"),
                Replacement::new("what's up", "How are you"),
            ],
            action_indicators: words(&["please", "you should", "next steps", "we will", "i will"]),
            action_markers: words(&["please", "next steps", "will"]),
            empathy_markers: words(&["sorry", "understand", "apologize"]),
            sensitive_keywords: words(&["legal", "lawsuit", "complaint", "refund", "cancel"]),
            executive_markers: words(&["ceo", "executive"]),
        }
    }
}

impl Vocabulary {
    /// Load a vocabulary from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let vocabulary: Self = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Reject entries that would match every text.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lists: [(&str, Vec<&str>); 11] = [
            ("misspellings", self.misspellings.iter().map(|r| r.phrase.as_str()).collect()),
            ("positive_words", self.positive_words.iter().map(String::as_str).collect()),
            ("negative_words", self.negative_words.iter().map(String::as_str).collect()),
            ("brand_violations", self.brand_violations.iter().map(String::as_str).collect()),
            (
                "risk_patterns",
                self.risk_patterns
                    .iter()
                    .flat_map(|p| p.all_of.iter().map(String::as_str))
                    .collect(),
            ),
            ("casual_phrases", self.casual_phrases.iter().map(|r| r.phrase.as_str()).collect()),
            ("action_indicators", self.action_indicators.iter().map(String::as_str).collect()),
            ("action_markers", self.action_markers.iter().map(String::as_str).collect()),
            ("empathy_markers", self.empathy_markers.iter().map(String::as_str).collect()),
            ("sensitive_keywords", self.sensitive_keywords.iter().map(String::as_str).collect()),
            ("executive_markers", self.executive_markers.iter().map(String::as_str).collect()),
        ];

        for (key, entries) in lists {
            if entries.iter().any(|e| e.is_empty()) {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "entries must not be empty".into(),
                });
            }
            if entries.iter().any(|e| *e != e.to_lowercase()) {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "entries must be lowercase".into(),
                });
            }
        }

        if self.risk_patterns.iter().any(|p| p.all_of.is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "risk_patterns".into(),
                message: "each pattern needs at least one term".into(),
            });
        }

        Ok(())
    }
}

/// Review engine configuration.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub vocabulary: Vocabulary,
    /// Emails with larger bodies fail review instead of being scored.
    pub max_body_bytes: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Orchestration loop configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum emails fetched per cycle.
    pub batch_size: usize,
    /// Delay between cycles.
    pub cycle_interval: Duration,
    /// Optional JSON vocabulary overriding the defaults.
    pub vocabulary_path: Option<PathBuf>,
    /// When set, logs go to a daily rolling file in this directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            cycle_interval: Duration::from_secs(DEFAULT_CYCLE_SECS),
            vocabulary_path: None,
            log_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let batch_size = match lookup("EMAIL_REVIEW_BATCH_SIZE") {
            Some(raw) => parse_positive("EMAIL_REVIEW_BATCH_SIZE", &raw)? as usize,
            None => defaults.batch_size,
        };

        let cycle_interval = match lookup("EMAIL_REVIEW_CYCLE_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("EMAIL_REVIEW_CYCLE_SECS", &raw)?),
            None => defaults.cycle_interval,
        };

        Ok(Self {
            batch_size,
            cycle_interval,
            vocabulary_path: lookup("EMAIL_REVIEW_VOCAB_PATH").map(PathBuf::from),
            log_dir: lookup("EMAIL_REVIEW_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Build the engine configuration, loading the vocabulary file if one is set.
    pub fn review_config(&self) -> Result<ReviewConfig, ConfigError> {
        let vocabulary = match &self.vocabulary_path {
            Some(path) => Vocabulary::load(path)?,
            None => Vocabulary::default(),
        };
        Ok(ReviewConfig {
            vocabulary,
            ..ReviewConfig::default()
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key: key.into(),
            message: "must be greater than zero".into(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.into(),
            message: format!("{raw:?} is not a number: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_vocabulary_is_valid() {
        let vocab = Vocabulary::default();
        assert!(vocab.validate().is_ok());
        assert_eq!(vocab.misspellings.len(), 5);
        assert_eq!(vocab.casual_phrases[3].phrase, "what's up");
    }

    #[test]
    fn pipeline_defaults_when_env_empty() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.cycle_interval, Duration::from_secs(300));
        assert!(config.vocabulary_path.is_none());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn pipeline_reads_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("EMAIL_REVIEW_BATCH_SIZE", "25"),
            ("EMAIL_REVIEW_CYCLE_SECS", " 60 "),
            ("EMAIL_REVIEW_LOG_DIR", "/var/log/email-review"),
        ]))
        .unwrap();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.cycle_interval, Duration::from_secs(60));
        assert_eq!(
            config.log_dir.as_deref(),
            Some(Path::new("/var/log/email-review"))
        );
    }

    #[test]
    fn pipeline_rejects_bad_numbers() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("EMAIL_REVIEW_BATCH_SIZE", "ten")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "EMAIL_REVIEW_BATCH_SIZE"));

        let err = PipelineConfig::from_lookup(lookup_from(&[("EMAIL_REVIEW_CYCLE_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn vocabulary_file_overrides_only_given_categories() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sensitive_keywords": ["chargeback"]}}"#).unwrap();

        let vocab = Vocabulary::load(file.path()).unwrap();
        assert_eq!(vocab.sensitive_keywords, vec!["chargeback".to_string()]);
        assert_eq!(vocab.misspellings, Vocabulary::default().misspellings);
    }

    #[test]
    fn replacement_boundary_defaults_to_anywhere() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"misspellings": [
                {{"phrase": "acheive", "replacement": "achieve"}},
                {{"phrase": "wierd", "replacement": "weird", "boundary": "spaced"}}
            ]}}"#
        )
        .unwrap();

        let vocab = Vocabulary::load(file.path()).unwrap();
        assert_eq!(vocab.misspellings[0].boundary, Boundary::Anywhere);
        assert_eq!(vocab.misspellings[0].apply("acheived"), "achieved");
        assert_eq!(vocab.misspellings[1].apply("wierd ok"), "wierd ok");
        assert_eq!(vocab.misspellings[1].apply("so wierd ok"), "so weird ok");
    }

    #[test]
    fn vocabulary_file_rejects_empty_phrase() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"brand_violations": ["robotic", ""]}}"#).unwrap();

        let err = Vocabulary::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "brand_violations"));
    }

    #[test]
    fn vocabulary_rejects_uppercase_and_empty_risk_pattern() {
        let mut vocab = Vocabulary::default();
        vocab.executive_markers = vec!["CEO".into()];
        assert!(vocab.validate().is_err());

        let mut vocab = Vocabulary::default();
        vocab.risk_patterns.push(RiskPattern {
            all_of: vec![],
            issue: "never".into(),
        });
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn vocabulary_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Vocabulary::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn review_config_loads_vocabulary_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"executive_markers": ["vp"]}}"#).unwrap();

        let config = PipelineConfig {
            vocabulary_path: Some(file.path().to_path_buf()),
            ..PipelineConfig::default()
        };
        let review = config.review_config().unwrap();
        assert_eq!(review.vocabulary.executive_markers, vec!["vp".to_string()]);
        assert_eq!(review.max_body_bytes, 10 * 1024 * 1024);
    }
}
