//! End-to-end dialog scenarios over trained models.

use std::sync::Arc;

use st_common::{DialogPolicy, InitScheme, SymptomTable, TrainingConfig};
use st_core::dialog::{DialogController, DialogState, Reply, Session, SessionStore};
use st_core::inference::{decode, DiagnosisBackend};
use st_core::model::{BackendKind, TrainedModel};
use st_core::tokenize::WordTokenizer;
use st_core::vocab::CorpusRecord;
use std::collections::BTreeMap;

fn cold_flu_corpus() -> Vec<CorpusRecord> {
    vec![
        CorpusRecord::new("cough sneeze", "Cold"),
        CorpusRecord::new("fever chills", "Flu"),
    ]
}

fn triage_corpus() -> Vec<CorpusRecord> {
    vec![
        CorpusRecord::new("I keep sneezing and have a cough and a runny nose", "Common Cold"),
        CorpusRecord::new("cough, sore throat and sneezing all week", "Common Cold"),
        CorpusRecord::new("runny nose and congestion with a mild cough", "Common Cold"),
        CorpusRecord::new("high fever with chills and sweating every evening", "Malaria"),
        CorpusRecord::new("fever, chills, headache and nausea", "Malaria"),
        CorpusRecord::new("sweating and shivering chills after fever spikes", "Malaria"),
        CorpusRecord::new("itchy skin rash with red patches", "Psoriasis"),
        CorpusRecord::new("scaly rash and itching on my elbows", "Psoriasis"),
    ]
}

fn symptom_table() -> SymptomTable {
    let mut diseases = BTreeMap::new();
    diseases.insert(
        "Malaria".to_string(),
        vec!["fever".to_string(), "chills".to_string(), "sweating".to_string()],
    );
    diseases.insert(
        "Common Cold".to_string(),
        vec!["cough".to_string(), "sneezing".to_string(), "runny nose".to_string()],
    );
    diseases.insert(
        "Psoriasis".to_string(),
        vec!["rash".to_string(), "itching".to_string(), "scaly".to_string()],
    );
    SymptomTable {
        diseases,
        ..SymptomTable::default()
    }
}

fn model() -> TrainedModel {
    TrainedModel::fit(
        &triage_corpus(),
        &WordTokenizer::new(),
        &TrainingConfig::default(),
    )
    .unwrap()
}

fn controller(kind: BackendKind) -> DialogController {
    DialogController::new(
        model().backend(kind).unwrap(),
        Arc::new(WordTokenizer::new()),
        DialogPolicy::default(),
        symptom_table(),
    )
    .unwrap()
}

#[test]
fn fever_and_chills_decode_to_flu_across_seeds() {
    let mut flu = 0;
    let mut cold = 0;
    for seed in 0..20 {
        let training = TrainingConfig::default().with_init(InitScheme::default().with_seed(seed));
        let model = TrainedModel::fit(&cold_flu_corpus(), &WordTokenizer::new(), &training).unwrap();
        let obs = model.vocabulary.encode(&["fever", "chills"]);
        let path = decode(&obs, &model.hmm).unwrap();
        match model.vocabulary.state_label(path.terminal_state()) {
            Some("Flu") => flu += 1,
            Some("Cold") => cold += 1,
            other => panic!("unexpected state {other:?}"),
        }
    }
    assert!(flu > cold, "Flu {flu} vs Cold {cold}");
}

#[test]
fn trigger_with_two_symptoms_asks_for_more() {
    let c = controller(BackendKind::Hmm);
    let mut s = Session::new();
    c.handle_turn(&mut s, "cough");
    c.handle_turn(&mut s, "sneeze");
    let reply = c.handle_turn(&mut s, "done");
    assert!(matches!(reply, Reply::NeedMoreDetail { .. }), "{reply:?}");
    assert!(reply.text().contains("need more information"));
    assert_eq!(s.state(), DialogState::Collecting);
}

#[test]
fn hmm_backend_goes_to_follow_up_then_confirms() {
    let c = controller(BackendKind::Hmm);
    let mut s = Session::new();
    let reply = c.handle_turn(&mut s, "I have a fever with chills and a headache");
    let (disease, missing) = match reply {
        Reply::FollowUp { disease, missing } => (disease, missing),
        other => panic!("expected a follow-up, got {other:?}"),
    };
    assert_eq!(s.state(), DialogState::AwaitingConfirmation);
    assert_eq!(s.suspected_disease.as_deref(), Some(disease.as_str()));

    // Answer with a missing symptom the vocabulary knows.
    let answer = missing
        .iter()
        .find(|m| c.backend().vocabulary().contains_token(m))
        .expect("every table entry has a symptom from the corpus");
    let reply = c.handle_turn(&mut s, &format!("yes, {}", answer));
    assert!(matches!(reply, Reply::Confirmed { .. }), "{reply:?}");
    assert!(reply.completes_round());
    assert!(s.is_fresh());

    // Resetting an already fresh session changes nothing.
    let id = s.id.clone();
    s.reset();
    assert!(s.is_fresh());
    assert_eq!(s.id, id);
}

#[test]
fn naive_bayes_confirms_malaria_follow_up() {
    let c = controller(BackendKind::NaiveBayes);
    let mut s = Session::new();
    let reply = c.handle_turn(&mut s, "fever chills headache");
    assert_eq!(
        reply,
        Reply::FollowUp {
            disease: "Malaria".into(),
            missing: vec!["sweating".into()]
        }
    );
    let reply = c.handle_turn(&mut s, "yes, sweating at night");
    assert_eq!(
        reply,
        Reply::Confirmed {
            disease: "Malaria".into(),
            matched: vec!["sweating".into()]
        }
    );
    assert!(s.is_fresh());
}

#[test]
fn conversational_sentence_still_gets_follow_up() {
    let c = controller(BackendKind::NaiveBayes);
    let mut s = Session::new();
    let reply = c.handle_turn(&mut s, "I have a fever and headache and nausea");
    assert_eq!(
        reply,
        Reply::FollowUp {
            disease: "Malaria".into(),
            missing: vec!["chills".into(), "sweating".into()]
        }
    );
}

#[test]
fn refusal_with_filler_words_is_not_confirmed() {
    let c = controller(BackendKind::NaiveBayes);
    let mut s = Session::new();
    c.handle_turn(&mut s, "fever chills headache");
    assert_eq!(s.state(), DialogState::AwaitingConfirmation);
    // "i" and "have" are vocabulary tokens from the corpus.
    assert_eq!(c.recognize("no, I have not"), vec!["i", "have"]);
    let reply = c.handle_turn(&mut s, "no, I have not");
    assert_eq!(
        reply,
        Reply::NotConfirmed {
            disease: "Malaria".into()
        }
    );
    assert!(s.is_fresh());
}

#[test]
fn nothing_recognized_keeps_collecting() {
    let c = controller(BackendKind::Hmm);
    let mut s = Session::new();
    assert_eq!(c.handle_turn(&mut s, "hello, doctor"), Reply::NothingRecognized);
    assert!(s.is_fresh());
}

#[test]
fn trigger_without_recognized_symptoms_needs_more_detail() {
    let c = controller(BackendKind::NaiveBayes);
    let mut s = Session::new();
    let reply = c.handle_turn(&mut s, "diagnose me");
    assert_eq!(
        reply,
        Reply::NeedMoreDetail {
            recognized: 0,
            required: 3
        }
    );
}

#[test]
fn unrecognized_only_evidence_is_empty_sequence() {
    let model = model();
    for kind in [BackendKind::Hmm, BackendKind::NaiveBayes] {
        let backend = model.backend(kind).unwrap();
        let err = backend
            .predict(&["zzz".to_string(), "qqq".to_string()])
            .unwrap_err();
        assert!(matches!(err, st_common::Error::EmptySequence), "{kind}");
    }
}

#[test]
fn follow_up_without_missing_symptom_is_not_confirmed() {
    let c = controller(BackendKind::NaiveBayes);
    let mut s = Session::new();
    c.handle_turn(&mut s, "fever chills headache");
    assert_eq!(s.state(), DialogState::AwaitingConfirmation);
    let reply = c.handle_turn(&mut s, "no, just nausea");
    assert_eq!(
        reply,
        Reply::NotConfirmed {
            disease: "Malaria".into()
        }
    );
    assert!(s.is_fresh());
}

#[test]
fn sessions_in_a_store_are_isolated() {
    let c = controller(BackendKind::NaiveBayes);
    let mut store = SessionStore::new();
    let a = store.open();
    let b = store.open();

    store.handle_turn(&c, &a, "rash").unwrap();
    store.handle_turn(&c, &b, "fever").unwrap();
    store.handle_turn(&c, &b, "chills").unwrap();

    assert_eq!(store.get(&a).unwrap().collected_symptoms(), &["rash"]);
    assert_eq!(
        store.get(&b).unwrap().collected_symptoms(),
        &["fever", "chills"]
    );

    store.close(&a).unwrap();
    assert!(store.handle_turn(&c, &a, "rash").is_err());
}
