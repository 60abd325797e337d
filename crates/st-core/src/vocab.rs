//! Vocabulary and corpus indexing.
//!
//! States are the distinct disease labels, sorted so that state indices do
//! not depend on corpus row order. Observations are the distinct tokens in
//! first-discovery order. The index of a label or token is its identity in
//! every parameter matrix.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use st_common::{Error, Result};

use crate::tokenize::Tokenizer;

/// A labeled training row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub text: String,
    pub label: String,
}

impl CorpusRecord {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        CorpusRecord {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// States and observations with O(1) index lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "VocabularyRepr", into = "VocabularyRepr")]
pub struct Vocabulary {
    states: Vec<String>,
    observations: Vec<String>,
    observation_index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct VocabularyRepr {
    states: Vec<String>,
    observations: Vec<String>,
}

impl From<VocabularyRepr> for Vocabulary {
    fn from(repr: VocabularyRepr) -> Self {
        Vocabulary::from_parts(repr.states, repr.observations)
    }
}

impl From<Vocabulary> for VocabularyRepr {
    fn from(vocab: Vocabulary) -> Self {
        VocabularyRepr {
            states: vocab.states,
            observations: vocab.observations,
        }
    }
}

impl Vocabulary {
    /// Build from explicit lists.
    ///
    /// States are sorted and deduplicated; observations keep their order and
    /// only the first occurrence of a duplicate is kept.
    pub fn from_parts(mut states: Vec<String>, observations: Vec<String>) -> Self {
        states.sort();
        states.dedup();

        let mut observation_index = HashMap::with_capacity(observations.len());
        let mut unique = Vec::with_capacity(observations.len());
        for token in observations {
            if !observation_index.contains_key(&token) {
                observation_index.insert(token.clone(), unique.len());
                unique.push(token);
            }
        }

        Vocabulary {
            states,
            observations: unique,
            observation_index,
        }
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn observations(&self) -> &[String] {
        &self.observations
    }

    /// K, the number of hidden states.
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// V, the number of observation symbols.
    pub fn n_observations(&self) -> usize {
        self.observations.len()
    }

    pub fn state_index(&self, label: &str) -> Option<usize> {
        self.states.binary_search_by(|s| s.as_str().cmp(label)).ok()
    }

    pub fn state_label(&self, index: usize) -> Option<&str> {
        self.states.get(index).map(String::as_str)
    }

    pub fn observation_index(&self, token: &str) -> Option<usize> {
        self.observation_index.get(token).copied()
    }

    pub fn observation(&self, index: usize) -> Option<&str> {
        self.observations.get(index).map(String::as_str)
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.observation_index.contains_key(token)
    }

    /// Map tokens to observation indices, dropping unknown tokens.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<usize> {
        tokens
            .iter()
            .filter_map(|t| self.observation_index(t.as_ref()))
            .collect()
    }
}

/// The training view of a corpus.
#[derive(Debug, Clone)]
pub struct IndexedCorpus {
    pub vocabulary: Vocabulary,
    /// All non-empty sequences concatenated.
    pub sequences: Vec<usize>,
    /// Length of each retained sequence; sums to `sequences.len()`.
    pub lengths: Vec<usize>,
    /// State index of each retained sequence's label.
    pub sequence_labels: Vec<usize>,
}

impl IndexedCorpus {
    /// Iterate the retained sequences as slices.
    pub fn segments(&self) -> impl Iterator<Item = &[usize]> + '_ {
        let mut start = 0;
        self.lengths.iter().map(move |&len| {
            let seg = &self.sequences[start..start + len];
            start += len;
            seg
        })
    }

    pub fn n_sequences(&self) -> usize {
        self.lengths.len()
    }
}

/// Derive the vocabulary and training sequences from a labeled corpus.
///
/// Every token of every row enters the vocabulary, so with a fixed
/// vocabulary no token is unknown at training time; rows that tokenize to
/// nothing are skipped and do not contribute a zero-length sequence.
pub fn build(corpus: &[CorpusRecord], tokenizer: &dyn Tokenizer) -> Result<IndexedCorpus> {
    let tokenized: Vec<Vec<String>> = corpus.iter().map(|r| tokenizer.tokenize(&r.text)).collect();

    let states: Vec<String> = corpus.iter().map(|r| r.label.clone()).collect();
    let observations: Vec<String> = tokenized.iter().flatten().cloned().collect();
    let vocabulary = Vocabulary::from_parts(states, observations);

    let mut sequences = Vec::new();
    let mut lengths = Vec::new();
    let mut sequence_labels = Vec::new();

    for (record, tokens) in corpus.iter().zip(&tokenized) {
        let encoded = vocabulary.encode(tokens);
        if encoded.is_empty() {
            continue;
        }
        let label = vocabulary.state_index(&record.label).ok_or_else(|| {
            Error::InvalidModel(format!("label '{}' missing from vocabulary", record.label))
        })?;
        lengths.push(encoded.len());
        sequence_labels.push(label);
        sequences.extend(encoded);
    }

    if lengths.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    Ok(IndexedCorpus {
        vocabulary,
        sequences,
        lengths,
        sequence_labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::WordTokenizer;

    fn corpus() -> Vec<CorpusRecord> {
        vec![
            CorpusRecord::new("fever chills", "Flu"),
            CorpusRecord::new("...", "Cold"),
            CorpusRecord::new("sneeze cough fever", "Cold"),
        ]
    }

    #[test]
    fn states_sorted_observations_first_seen() {
        let indexed = build(&corpus(), &WordTokenizer::new()).unwrap();
        assert_eq!(indexed.vocabulary.states(), &["Cold", "Flu"]);
        assert_eq!(
            indexed.vocabulary.observations(),
            &["fever", "chills", "sneeze", "cough"]
        );
    }

    #[test]
    fn empty_rows_are_skipped_not_zero_length() {
        let indexed = build(&corpus(), &WordTokenizer::new()).unwrap();
        assert_eq!(indexed.lengths, vec![2, 3]);
        assert_eq!(indexed.sequences, vec![0, 1, 2, 3, 0]);
        assert_eq!(indexed.sequence_labels, vec![1, 0]);
        let segs: Vec<&[usize]> = indexed.segments().collect();
        assert_eq!(segs, vec![&[0, 1][..], &[2, 3, 0][..]]);
    }

    #[test]
    fn empty_corpus_fails() {
        let err = build(&[], &WordTokenizer::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));

        let blank = vec![CorpusRecord::new("  !! ", "Flu")];
        assert!(matches!(
            build(&blank, &WordTokenizer::new()),
            Err(Error::EmptyCorpus)
        ));
    }

    #[test]
    fn encode_drops_unknown_tokens() {
        let indexed = build(&corpus(), &WordTokenizer::new()).unwrap();
        let v = &indexed.vocabulary;
        assert_eq!(v.encode(&["cough", "headache", "fever"]), vec![3, 0]);
        assert!(v.encode(&["headache"]).is_empty());
        assert_eq!(v.state_index("Flu"), Some(1));
        assert_eq!(v.state_index("Malaria"), None);
    }

    #[test]
    fn serde_restores_lookup_index() {
        let indexed = build(&corpus(), &WordTokenizer::new()).unwrap();
        let json = serde_json::to_string(&indexed.vocabulary).unwrap();
        assert!(json.contains("\"observations\""));
        assert!(!json.contains("observation_index"));
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.observation_index("cough"), Some(3));
    }

    #[test]
    fn indices_map_back_to_tokens() {
        let indexed = build(&corpus(), &WordTokenizer::new()).unwrap();
        let v = &indexed.vocabulary;
        let decoded: Vec<&str> = indexed
            .sequences
            .iter()
            .filter_map(|&o| v.observation(o))
            .collect();
        assert_eq!(decoded, ["fever", "chills", "sneeze", "cough", "fever"]);
        assert_eq!(v.observation(99), None);
        assert_eq!(v.state_label(1), Some("Flu"));
    }
}
