//! The diagnostic dialog controller.
//!
//! A two-state machine per session:
//!
//! ```text
//!            trigger + enough evidence + expected symptoms missing
//! Collecting ───────────────────────────────────────────────▶ AwaitingConfirmation
//!     ▲                                                                │
//!     └──────────────── any answer (confirmed or not), reset ──────────┘
//! ```
//!
//! The controller holds only shared read-only state (backend, tokenizer,
//! policy, symptom table); all per-conversation state lives in [`Session`].
//! It never fails: backend errors become replies.

use std::sync::Arc;

use st_common::{DialogPolicy, Error, Result, SymptomTable};
use tracing::{debug, info, warn};

use super::reply::Reply;
use super::session::{DialogState, Session};
use crate::inference::DiagnosisBackend;
use crate::logging::{event_names, redact_for_log};
use crate::tokenize::Tokenizer;

/// Longest input prefix written to debug logs.
const LOGGED_INPUT_CHARS: usize = 80;

/// Drives conversations against a shared backend.
#[derive(Clone)]
pub struct DialogController {
    backend: Arc<dyn DiagnosisBackend>,
    tokenizer: Arc<dyn Tokenizer>,
    policy: DialogPolicy,
    symptoms: SymptomTable,
}

impl std::fmt::Debug for DialogController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogController")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .field("diseases", &self.symptoms.len())
            .finish()
    }
}

impl DialogController {
    /// Build a controller; the policy and symptom table are validated.
    pub fn new(
        backend: Arc<dyn DiagnosisBackend>,
        tokenizer: Arc<dyn Tokenizer>,
        policy: DialogPolicy,
        symptoms: SymptomTable,
    ) -> Result<Self> {
        policy.validate()?;
        symptoms.validate()?;
        Ok(DialogController {
            backend,
            tokenizer,
            policy,
            symptoms,
        })
    }

    pub fn policy(&self) -> &DialogPolicy {
        &self.policy
    }

    pub fn backend(&self) -> &dyn DiagnosisBackend {
        self.backend.as_ref()
    }

    /// Process one user message and advance `session`.
    pub fn handle_turn(&self, session: &mut Session, raw_input: &str) -> Reply {
        debug!(
            session_id = %session.id,
            input = %redact_for_log(raw_input, LOGGED_INPUT_CHARS),
            "Turn input"
        );

        let recognized = self.recognize(raw_input);
        if recognized.is_empty() {
            warn!(
                event = event_names::DIALOG_UNRECOGNIZED_SYMPTOMS,
                session_id = %session.id,
                state = %session.state(),
                "No recognized symptoms in message"
            );
        }
        for symptom in &recognized {
            session.collect(symptom);
        }

        let state_before = session.state();
        let reply = match state_before {
            DialogState::AwaitingConfirmation => self.confirm(session, &recognized),
            DialogState::Collecting => {
                if self
                    .policy
                    .should_diagnose(raw_input, session.collected_symptoms().len())
                {
                    self.diagnose(session)
                } else if recognized.is_empty() {
                    Reply::NothingRecognized
                } else {
                    Reply::Acknowledged {
                        collected: session.collected_symptoms().len(),
                        recognized,
                    }
                }
            }
        };

        info!(
            event = event_names::DIALOG_TURN,
            session_id = %session.id,
            backend = self.backend.name(),
            state_before = %state_before,
            state_after = %session.state(),
            collected = session.collected_symptoms().len(),
            reply = reply.kind(),
            "Dialog turn"
        );

        reply
    }

    /// Vocabulary tokens of `raw_input`, first-seen order, deduplicated.
    pub fn recognize(&self, raw_input: &str) -> Vec<String> {
        let vocabulary = self.backend.vocabulary();
        let mut recognized: Vec<String> = Vec::new();
        for token in self.tokenizer.tokenize(raw_input) {
            if vocabulary.contains_token(&token) && !recognized.contains(&token) {
                recognized.push(token);
            }
        }
        recognized
    }

    /// Expected symptoms of `disease` that no collected symptom matches.
    pub fn missing_symptoms(&self, disease: &str, collected: &[String]) -> Vec<String> {
        let Some(expected) = self.symptoms.expected(disease) else {
            return Vec::new();
        };
        expected
            .iter()
            .filter(|phrase| {
                !self
                    .policy
                    .matching
                    .matches_any(phrase, collected.iter().map(String::as_str))
            })
            .cloned()
            .collect()
    }

    fn confirm(&self, session: &mut Session, recognized: &[String]) -> Reply {
        let disease = session.suspected_disease.clone().unwrap_or_default();
        let matched: Vec<String> = session
            .missing_symptoms
            .iter()
            .filter(|phrase| {
                self.policy
                    .matching
                    .matches_any(phrase, recognized.iter().map(String::as_str))
            })
            .cloned()
            .collect();

        session.reset();
        debug!(
            event = event_names::DIALOG_SESSION_RESET,
            session_id = %session.id,
            "Follow-up round finished"
        );

        if matched.is_empty() {
            Reply::NotConfirmed { disease }
        } else {
            Reply::Confirmed { disease, matched }
        }
    }

    fn diagnose(&self, session: &mut Session) -> Reply {
        let evidence = session.collected_symptoms().to_vec();
        let required = self.policy.min_evidence;
        let recognized = self.backend.vocabulary().encode(&evidence).len();
        if recognized < required {
            return Reply::NeedMoreDetail {
                recognized,
                required,
            };
        }

        let prediction = match self.backend.predict(&evidence) {
            Ok(p) => p,
            Err(Error::EmptySequence) => {
                return Reply::NeedMoreDetail {
                    recognized: 0,
                    required,
                }
            }
            Err(e) => {
                warn!(
                    event = event_names::DIALOG_BACKEND_FAILED,
                    session_id = %session.id,
                    backend = self.backend.name(),
                    code = e.code(),
                    error = %e,
                    "Backend prediction failed"
                );
                return Reply::Unavailable;
            }
        };

        let Some(top) = prediction.top() else {
            return Reply::Unavailable;
        };

        if prediction.calibrated && top.confidence < self.policy.confidence_threshold {
            return Reply::LowConfidence {
                candidates: prediction.top_k(self.policy.max_candidates).to_vec(),
            };
        }

        let disease = top.label.clone();
        let missing = self.missing_symptoms(&disease, &evidence);
        if missing.is_empty() {
            session.reset();
            Reply::Diagnosis { disease }
        } else {
            session.await_confirmation(disease.clone(), missing.clone());
            Reply::FollowUp { disease, missing }
        }
    }
}
