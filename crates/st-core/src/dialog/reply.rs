//! Controller replies.
//!
//! Replies are data; [`Reply::text`] renders the user-facing sentence.

use serde::{Deserialize, Serialize};

use crate::inference::RankedLabel;

/// Outcome of one dialog turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// No token of the message is in the vocabulary.
    NothingRecognized,
    /// Symptoms were recorded; no diagnosis attempted yet.
    Acknowledged {
        recognized: Vec<String>,
        collected: usize,
    },
    /// A diagnosis was requested but there is not enough evidence.
    NeedMoreDetail { recognized: usize, required: usize },
    /// The backend is unsure; the top candidates are shown.
    LowConfidence { candidates: Vec<RankedLabel> },
    /// A disease is suspected; asking about expected symptoms.
    FollowUp {
        disease: String,
        missing: Vec<String>,
    },
    /// Every expected symptom was already reported.
    Diagnosis { disease: String },
    /// The follow-up answer matched a missing symptom.
    Confirmed {
        disease: String,
        matched: Vec<String>,
    },
    /// The follow-up answer matched nothing.
    NotConfirmed { disease: String },
    /// The backend failed; the conversation can continue.
    Unavailable,
}

impl Reply {
    /// Stable kind name, as serialized.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::NothingRecognized => "nothing_recognized",
            Reply::Acknowledged { .. } => "acknowledged",
            Reply::NeedMoreDetail { .. } => "need_more_detail",
            Reply::LowConfidence { .. } => "low_confidence",
            Reply::FollowUp { .. } => "follow_up",
            Reply::Diagnosis { .. } => "diagnosis",
            Reply::Confirmed { .. } => "confirmed",
            Reply::NotConfirmed { .. } => "not_confirmed",
            Reply::Unavailable => "unavailable",
        }
    }

    /// Whether this reply ends the current round and resets the session.
    pub fn completes_round(&self) -> bool {
        matches!(
            self,
            Reply::Diagnosis { .. } | Reply::Confirmed { .. } | Reply::NotConfirmed { .. }
        )
    }

    /// User-facing text.
    pub fn text(&self) -> String {
        match self {
            Reply::NothingRecognized => {
                "I didn't recognize any symptoms in that. Could you describe how you feel \
                 in other words?"
                    .to_string()
            }
            Reply::Acknowledged { recognized, .. } => format!(
                "Noted: {}. Any other symptoms? Say \"done\" when you'd like a diagnosis.",
                recognized.join(", ")
            ),
            Reply::NeedMoreDetail {
                recognized,
                required,
            } => format!(
                "I need more information to make a diagnosis: I recognized {} symptom{} \
                 but need at least {}. Please describe more symptoms.",
                recognized,
                if *recognized == 1 { "" } else { "s" },
                required
            ),
            Reply::LowConfidence { candidates } => {
                let list = candidates
                    .iter()
                    .map(|c| format!("{} ({:.0}%)", c.label, c.confidence * 100.0))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "I'm not confident yet. Possible conditions: {}. Can you tell me \
                     more about your symptoms?",
                    list
                )
            }
            Reply::FollowUp { disease, missing } => format!(
                "Your symptoms suggest {}. Do you also have any of these: {}?",
                disease,
                missing.join(", ")
            ),
            Reply::Diagnosis { disease } => format!(
                "Based on your symptoms, the most likely condition is {}. Please consult \
                 a healthcare professional to confirm.",
                disease
            ),
            Reply::Confirmed { disease, .. } => format!(
                "That is consistent with {}. Please consult a healthcare professional \
                 to confirm.",
                disease
            ),
            Reply::NotConfirmed { disease } => format!(
                "I couldn't confirm {} from your answer. Please consult a healthcare \
                 professional for an accurate diagnosis.",
                disease
            ),
            Reply::Unavailable => {
                "Sorry, I couldn't analyze your symptoms right now. Please try again."
                    .to_string()
            }
        }
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}
