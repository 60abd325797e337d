//! Per-conversation state.

use serde::{Deserialize, Serialize};
use st_common::SessionId;

/// Controller state; derived from `awaiting_followup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    /// Gathering symptoms until a diagnosis is triggered.
    Collecting,
    /// A disease is suspected and a follow-up answer is expected.
    AwaitingConfirmation,
}

impl std::fmt::Display for DialogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogState::Collecting => write!(f, "collecting"),
            DialogState::AwaitingConfirmation => write!(f, "awaiting_confirmation"),
        }
    }
}

/// One conversation's mutable state.
///
/// Owned by the caller (or a [`super::SessionStore`]) and passed to the
/// controller on every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub awaiting_followup: bool,
    pub suspected_disease: Option<String>,
    /// Expected symptoms not yet reported, in table order.
    pub missing_symptoms: Vec<String>,
    /// Recognized symptoms, first-seen order, no duplicates.
    collected_symptoms: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    pub fn with_id(id: SessionId) -> Self {
        Session {
            id,
            awaiting_followup: false,
            suspected_disease: None,
            missing_symptoms: Vec::new(),
            collected_symptoms: Vec::new(),
        }
    }

    pub fn state(&self) -> DialogState {
        if self.awaiting_followup {
            DialogState::AwaitingConfirmation
        } else {
            DialogState::Collecting
        }
    }

    pub fn collected_symptoms(&self) -> &[String] {
        &self.collected_symptoms
    }

    /// Add `symptom` unless already collected. Returns whether it was new.
    pub fn collect(&mut self, symptom: &str) -> bool {
        if self.collected_symptoms.iter().any(|s| s == symptom) {
            return false;
        }
        self.collected_symptoms.push(symptom.to_string());
        true
    }

    /// Enter the follow-up round for `disease`.
    pub fn await_confirmation(&mut self, disease: String, missing: Vec<String>) {
        self.awaiting_followup = true;
        self.suspected_disease = Some(disease);
        self.missing_symptoms = missing;
    }

    /// Back to a fresh conversation; the id is kept.
    pub fn reset(&mut self) {
        self.awaiting_followup = false;
        self.suspected_disease = None;
        self.missing_symptoms.clear();
        self.collected_symptoms.clear();
    }

    /// True when nothing distinguishes this session from a new one.
    pub fn is_fresh(&self) -> bool {
        !self.awaiting_followup
            && self.suspected_disease.is_none()
            && self.missing_symptoms.is_empty()
            && self.collected_symptoms.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
