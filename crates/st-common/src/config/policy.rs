//! Dialog policy: when the controller diagnoses, how much evidence it needs,
//! and how follow-up answers are matched against expected symptoms.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Schema version for policy configuration.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";

/// What causes the controller to attempt a diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Only an explicit trigger phrase ("done", "diagnose", ...).
    Phrase,
    /// Only reaching `minimum_symptom_threshold` collected symptoms.
    Count,
    /// Either of the above.
    #[default]
    PhraseOrCount,
}

/// How an expected symptom phrase is compared with recognized tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SymptomMatching {
    /// Some token equals the phrase.
    Exact,
    /// The phrase occurs inside the space-joined tokens ("night sweating"
    /// contains "sweating", "skin rash" needs both words in order).
    #[default]
    Substring,
}

impl SymptomMatching {
    /// Whether `tokens` carry evidence for the expected `phrase`.
    ///
    /// Both sides are compared lower-cased. No stemming, no edit distance.
    /// A token shorter than the phrase never matches on its own, so filler
    /// words like "a" or "i" cannot stand in for a symptom.
    pub fn matches_any<'a, I>(&self, phrase: &str, tokens: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let phrase = phrase
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");
        if phrase.is_empty() {
            return false;
        }
        let mut tokens = tokens
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        match self {
            SymptomMatching::Exact => tokens.any(|t| t == phrase),
            SymptomMatching::Substring => tokens.collect::<Vec<_>>().join(" ").contains(&phrase),
        }
    }
}

/// Dialog controller policy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DialogPolicy {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// What triggers a diagnosis attempt
    #[serde(default)]
    pub trigger: TriggerPolicy,

    /// Phrases that, typed as the whole message, request a diagnosis
    #[serde(default = "default_trigger_phrases")]
    pub trigger_phrases: Vec<String>,

    /// Collected-symptom count that auto-triggers a diagnosis attempt
    #[serde(default = "default_minimum_symptom_threshold")]
    pub minimum_symptom_threshold: usize,

    /// Minimum recognized symptoms required before inference runs
    #[serde(default = "default_min_evidence")]
    pub min_evidence: usize,

    /// Calibrated predictions below this top confidence ask for more symptoms
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Number of ranked candidates shown when confidence is low
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Matching policy for follow-up confirmation
    #[serde(default)]
    pub matching: SymptomMatching,
}

fn default_trigger_phrases() -> Vec<String> {
    [
        "done",
        "diagnose",
        "diagnose me",
        "that's all",
        "that is all",
        "that's it",
        "what do i have",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_minimum_symptom_threshold() -> usize {
    3
}

fn default_min_evidence() -> usize {
    3
}

fn default_confidence_threshold() -> f64 {
    0.4
}

fn default_max_candidates() -> usize {
    3
}

impl Default for DialogPolicy {
    fn default() -> Self {
        DialogPolicy {
            schema_version: POLICY_SCHEMA_VERSION.to_string(),
            trigger: TriggerPolicy::default(),
            trigger_phrases: default_trigger_phrases(),
            minimum_symptom_threshold: default_minimum_symptom_threshold(),
            min_evidence: default_min_evidence(),
            confidence_threshold: default_confidence_threshold(),
            max_candidates: default_max_candidates(),
            matching: SymptomMatching::default(),
        }
    }
}

impl DialogPolicy {
    /// Validate the policy semantically.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != POLICY_SCHEMA_VERSION {
            return Err(Error::InvalidPolicy(format!(
                "schema version mismatch: expected {}, got {}",
                POLICY_SCHEMA_VERSION, self.schema_version
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::InvalidPolicy(format!(
                "confidence_threshold must be in [0, 1] (got {})",
                self.confidence_threshold
            )));
        }
        if self.min_evidence == 0 {
            return Err(Error::InvalidPolicy(
                "min_evidence must be at least 1".to_string(),
            ));
        }
        if self.max_candidates == 0 {
            return Err(Error::InvalidPolicy(
                "max_candidates must be at least 1".to_string(),
            ));
        }
        let has_phrases = self.trigger_phrases.iter().any(|p| !p.trim().is_empty());
        let has_count = self.minimum_symptom_threshold >= 1;
        let usable = match self.trigger {
            TriggerPolicy::Phrase => has_phrases,
            TriggerPolicy::Count => has_count,
            TriggerPolicy::PhraseOrCount => has_phrases || has_count,
        };
        if !usable {
            return Err(Error::InvalidPolicy(format!(
                "trigger '{:?}' can never fire: needs a non-empty trigger phrase or \
                 minimum_symptom_threshold >= 1",
                self.trigger
            )));
        }
        Ok(())
    }

    /// Whether `raw_input` is, case-insensitively, one of the trigger phrases.
    pub fn is_trigger_phrase(&self, raw_input: &str) -> bool {
        let input = raw_input.trim().to_lowercase();
        !input.is_empty()
            && self
                .trigger_phrases
                .iter()
                .any(|p| p.trim().to_lowercase() == input)
    }

    /// Whether this turn should attempt a diagnosis.
    pub fn should_diagnose(&self, raw_input: &str, collected: usize) -> bool {
        let phrase = || self.is_trigger_phrase(raw_input);
        let count = || collected >= self.minimum_symptom_threshold;
        match self.trigger {
            TriggerPolicy::Phrase => phrase(),
            TriggerPolicy::Count => count(),
            TriggerPolicy::PhraseOrCount => phrase() || count(),
        }
    }
}
