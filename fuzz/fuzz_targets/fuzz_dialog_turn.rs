//! Fuzz target for dialog turns.
//!
//! Arbitrary message sequences and policies drive a controller over a small
//! fixed model; no turn may panic and sessions must stay consistent.

#![no_main]

use std::sync::{Arc, OnceLock};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use st_common::{DialogPolicy, SymptomMatching, SymptomTable, TrainingConfig, TriggerPolicy};
use st_core::dialog::{DialogController, DialogState, Session};
use st_core::model::{BackendKind, TrainedModel};
use st_core::tokenize::WordTokenizer;
use st_core::vocab::CorpusRecord;

#[derive(Debug, Arbitrary)]
struct Input {
    naive_bayes: bool,
    exact: bool,
    trigger: u8,
    threshold: u8,
    min_evidence: u8,
    turns: Vec<String>,
}

fn model() -> &'static TrainedModel {
    static MODEL: OnceLock<TrainedModel> = OnceLock::new();
    MODEL.get_or_init(|| {
        let corpus = [
            CorpusRecord::new("cough sneezing runny nose", "Common Cold"),
            CorpusRecord::new("fever chills sweating headache", "Malaria"),
            CorpusRecord::new("rash itching scaly skin", "Psoriasis"),
        ];
        TrainedModel::fit(&corpus, &WordTokenizer::new(), &TrainingConfig::default())
            .expect("fixed corpus trains")
    })
}

fuzz_target!(|input: Input| {
    let policy = DialogPolicy {
        trigger: match input.trigger % 3 {
            0 => TriggerPolicy::Phrase,
            1 => TriggerPolicy::Count,
            _ => TriggerPolicy::PhraseOrCount,
        },
        minimum_symptom_threshold: (input.threshold % 6) as usize + 1,
        min_evidence: (input.min_evidence % 4) as usize + 1,
        matching: if input.exact {
            SymptomMatching::Exact
        } else {
            SymptomMatching::Substring
        },
        ..DialogPolicy::default()
    };
    let kind = if input.naive_bayes {
        BackendKind::NaiveBayes
    } else {
        BackendKind::Hmm
    };
    let Ok(backend) = model().backend(kind) else {
        return;
    };
    let Ok(controller) = DialogController::new(
        backend,
        Arc::new(WordTokenizer::new()),
        policy,
        SymptomTable::default(),
    ) else {
        return;
    };

    let mut session = Session::new();
    for turn in input.turns.iter().take(32) {
        let reply = controller.handle_turn(&mut session, turn);
        if reply.completes_round() {
            assert!(session.is_fresh());
        }
        if session.state() == DialogState::AwaitingConfirmation {
            assert!(session.suspected_disease.is_some());
            assert!(!session.missing_symptoms.is_empty());
        }
    }
});
