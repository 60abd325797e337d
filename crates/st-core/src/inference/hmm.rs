//! Discrete Hidden Markov Model: Baum–Welch training and Viterbi decoding.
//!
//! States are disease labels and observations are symptom tokens. Training
//! is unsupervised EM over many independent sequences (one per corpus
//! record); decoding returns the single most likely state path.
//!
//! # Numerics
//!
//! The E-step uses the scaled forward/backward recursions: every forward
//! vector is normalized by its sum `c_t`, so `ln P(O | λ) = Σ_t ln c_t` and
//! nothing underflows regardless of sequence length. Viterbi runs entirely in
//! log space with `ln 0 = -inf`.
//!
//! # Reproducibility
//!
//! Initialization draws from a `StdRng` seeded from the configured `u64`.
//! Identical corpus, scheme, seed and iteration budget produce bit-identical
//! parameters.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use st_common::{Error, InitScheme, Result, TrainingConfig};
use st_math::{
    argmax_first, dirichlet, first_non_stochastic_row, is_stochastic, normalize_in_place,
    safe_ln, uniform_row, STOCHASTIC_TOLERANCE,
};
use tracing::{debug, info, warn};

use crate::logging::event_names;
use crate::vocab::IndexedCorpus;

/// Floor added to every random draw so initial rows have full support.
const INIT_FLOOR: f64 = 0.1;

/// HMM parameters λ = (π, A, B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmParams {
    /// Initial state distribution π (length K).
    pub start: Vec<f64>,
    /// Transition matrix A (K×K), row = source state.
    pub transition: Vec<Vec<f64>>,
    /// Emission matrix B (K×V), row = state.
    pub emission: Vec<Vec<f64>>,
}

impl HmmParams {
    /// Uniform π, A and B.
    pub fn uniform(n_states: usize, n_symbols: usize) -> Self {
        HmmParams {
            start: uniform_row(n_states),
            transition: vec![uniform_row(n_states); n_states],
            emission: vec![uniform_row(n_symbols); n_states],
        }
    }

    pub fn n_states(&self) -> usize {
        self.start.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.emission.first().map_or(0, Vec::len)
    }

    /// Check shapes and that π and every row of A and B are stochastic.
    pub fn validate(&self) -> Result<()> {
        let k = self.n_states();
        let v = self.n_symbols();
        if k == 0 || v == 0 {
            return Err(Error::InvalidModel(format!(
                "model needs at least one state and one symbol (K={}, V={})",
                k, v
            )));
        }
        if self.transition.len() != k || self.transition.iter().any(|r| r.len() != k) {
            return Err(Error::InvalidModel(format!(
                "transition matrix must be {}x{}",
                k, k
            )));
        }
        if self.emission.len() != k || self.emission.iter().any(|r| r.len() != v) {
            return Err(Error::InvalidModel(format!(
                "emission matrix must be {}x{}",
                k, v
            )));
        }
        if !is_stochastic(&self.start, STOCHASTIC_TOLERANCE) {
            return Err(Error::InvalidModel(
                "initial distribution does not sum to 1".to_string(),
            ));
        }
        if let Some(row) = first_non_stochastic_row(&self.transition, STOCHASTIC_TOLERANCE) {
            return Err(Error::InvalidModel(format!(
                "transition row {} does not sum to 1",
                row
            )));
        }
        if let Some(row) = first_non_stochastic_row(&self.emission, STOCHASTIC_TOLERANCE) {
            return Err(Error::InvalidModel(format!(
                "emission row {} does not sum to 1",
                row
            )));
        }
        Ok(())
    }

    fn check_observations(&self, obs: &[usize]) -> Result<()> {
        if obs.is_empty() {
            return Err(Error::EmptySequence);
        }
        let v = self.n_symbols();
        if let Some(&symbol) = obs.iter().find(|&&o| o >= v) {
            return Err(Error::UnknownSymbol {
                symbol,
                vocab_size: v,
            });
        }
        Ok(())
    }

    /// `ln P(obs | λ)` via the scaled forward recursion.
    pub fn log_likelihood(&self, obs: &[usize]) -> Result<f64> {
        self.check_observations(obs)?;
        let (_, scales) = self.forward_scaled(obs)?;
        Ok(scales.iter().map(|c| c.ln()).sum())
    }

    /// Scaled forward pass. Each `alpha[t]` sums to 1; `scales[t]` is `c_t`.
    fn forward_scaled(&self, obs: &[usize]) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
        let k = self.n_states();
        let mut alpha = Vec::with_capacity(obs.len());
        let mut scales = Vec::with_capacity(obs.len());

        let mut first: Vec<f64> = (0..k)
            .map(|s| self.start[s] * self.emission[s][obs[0]])
            .collect();
        scales.push(scale(&mut first, 0)?);
        alpha.push(first);

        for (t, &o) in obs.iter().enumerate().skip(1) {
            let prev = &alpha[t - 1];
            let mut next: Vec<f64> = (0..k)
                .map(|j| {
                    let inflow: f64 = (0..k).map(|i| prev[i] * self.transition[i][j]).sum();
                    inflow * self.emission[j][o]
                })
                .collect();
            scales.push(scale(&mut next, t)?);
            alpha.push(next);
        }

        Ok((alpha, scales))
    }

    /// Scaled backward pass sharing the forward scale factors.
    fn backward_scaled(&self, obs: &[usize], scales: &[f64]) -> Vec<Vec<f64>> {
        let k = self.n_states();
        let n = obs.len();
        let mut beta = vec![vec![1.0; k]; n];
        for t in (0..n.saturating_sub(1)).rev() {
            let o = obs[t + 1];
            let c = scales[t + 1];
            for i in 0..k {
                beta[t][i] = (0..k)
                    .map(|j| self.transition[i][j] * self.emission[j][o] * beta[t + 1][j])
                    .sum::<f64>()
                    / c;
            }
        }
        beta
    }
}

fn scale(row: &mut [f64], t: usize) -> Result<f64> {
    normalize_in_place(row).ok_or_else(|| {
        Error::NumericalInstability(format!(
            "observation at position {} has zero probability under every state",
            t
        ))
    })
}

/// Training sequences in the flat `(sequences, lengths)` layout.
#[derive(Debug, Clone, Copy)]
pub struct TrainingInput<'a> {
    /// All sequences concatenated.
    pub sequences: &'a [usize],
    /// Length of each sequence.
    pub lengths: &'a [usize],
    /// Optional state index per sequence, used only by label-seeded init.
    pub labels: Option<&'a [usize]>,
    pub n_states: usize,
    pub n_symbols: usize,
}

impl<'a> From<&'a IndexedCorpus> for TrainingInput<'a> {
    fn from(corpus: &'a IndexedCorpus) -> Self {
        TrainingInput {
            sequences: &corpus.sequences,
            lengths: &corpus.lengths,
            labels: Some(&corpus.sequence_labels),
            n_states: corpus.vocabulary.n_states(),
            n_symbols: corpus.vocabulary.n_observations(),
        }
    }
}

impl TrainingInput<'_> {
    fn validate(&self) -> Result<()> {
        if self.n_states == 0 || self.n_symbols == 0 {
            return Err(Error::InvalidModel(format!(
                "model needs at least one state and one symbol (K={}, V={})",
                self.n_states, self.n_symbols
            )));
        }
        if self.lengths.iter().all(|&l| l == 0) {
            return Err(Error::EmptyCorpus);
        }
        let total: usize = self.lengths.iter().sum();
        if total != self.sequences.len() {
            return Err(Error::InvalidModel(format!(
                "sequence lengths sum to {} but {} observations were given",
                total,
                self.sequences.len()
            )));
        }
        if let Some(&symbol) = self.sequences.iter().find(|&&o| o >= self.n_symbols) {
            return Err(Error::UnknownSymbol {
                symbol,
                vocab_size: self.n_symbols,
            });
        }
        if let Some(labels) = self.labels {
            if labels.len() != self.lengths.len() {
                return Err(Error::InvalidModel(format!(
                    "{} sequence labels for {} sequences",
                    labels.len(),
                    self.lengths.len()
                )));
            }
            if let Some(&label) = labels.iter().find(|&&l| l >= self.n_states) {
                return Err(Error::InvalidModel(format!(
                    "sequence label {} is outside {} states",
                    label, self.n_states
                )));
            }
        }
        Ok(())
    }

    fn segments(&self) -> impl Iterator<Item = &[usize]> + '_ {
        let mut start = 0;
        self.lengths.iter().filter(|&&l| l > 0).map(move |&len| {
            let seg = &self.sequences[start..start + len];
            start += len;
            seg
        })
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// EM iterations performed.
    pub iterations: usize,
    /// Whether the log-likelihood improvement fell below tolerance.
    pub converged: bool,
    /// Total log-likelihood at the last E-step.
    pub log_likelihood: f64,
}

/// Trained parameters plus the run summary.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub params: HmmParams,
    pub report: TrainingReport,
}

/// Fit an HMM to `input` with Baum–Welch.
///
/// Fails with `EmptyCorpus` when there is nothing to train on and with
/// `DegenerateModel` as soon as any state's expected emission mass drops to
/// `config.min_state_mass` or below.
pub fn train(input: &TrainingInput<'_>, config: &TrainingConfig) -> Result<TrainingOutcome> {
    config.validate()?;
    input.validate()?;

    let k = input.n_states;
    let v = input.n_symbols;

    info!(
        event = event_names::TRAIN_STARTED,
        n_states = k,
        n_symbols = v,
        n_sequences = input.lengths.len(),
        n_observations = input.sequences.len(),
        init = ?config.init,
        "Starting Baum-Welch training"
    );

    let mut params = initialize(input, config.init);
    let mut prev_ll = f64::NEG_INFINITY;
    let mut report = TrainingReport {
        iterations: 0,
        converged: false,
        log_likelihood: f64::NEG_INFINITY,
    };

    for iteration in 1..=config.max_iterations {
        let mut acc = Accumulators::new(k, v);
        let mut ll = 0.0;
        for segment in input.segments() {
            ll += accumulate(&params, segment, &mut acc)?;
        }

        params = maximize(&params, &acc, iteration, config.min_state_mass)?;

        let delta = ll - prev_ll;
        report.iterations = iteration;
        report.log_likelihood = ll;
        debug!(
            event = event_names::TRAIN_ITERATION,
            iteration,
            log_likelihood = ll,
            delta,
            "EM iteration"
        );

        if delta < config.tolerance {
            report.converged = true;
            break;
        }
        prev_ll = ll;
    }

    if report.converged {
        info!(
            event = event_names::TRAIN_CONVERGED,
            iterations = report.iterations,
            log_likelihood = report.log_likelihood,
            "Baum-Welch converged"
        );
    } else {
        warn!(
            event = event_names::TRAIN_MAX_ITERATIONS,
            iterations = report.iterations,
            log_likelihood = report.log_likelihood,
            "Baum-Welch stopped at the iteration limit"
        );
    }

    Ok(TrainingOutcome { params, report })
}

/// Expected sufficient statistics for one EM iteration.
struct Accumulators {
    start: Vec<f64>,
    transition: Vec<Vec<f64>>,
    emission: Vec<Vec<f64>>,
}

impl Accumulators {
    fn new(k: usize, v: usize) -> Self {
        Accumulators {
            start: vec![0.0; k],
            transition: vec![vec![0.0; k]; k],
            emission: vec![vec![0.0; v]; k],
        }
    }
}

/// E-step for one sequence. Returns its log-likelihood.
fn accumulate(params: &HmmParams, obs: &[usize], acc: &mut Accumulators) -> Result<f64> {
    let k = params.n_states();
    let (alpha, scales) = params.forward_scaled(obs)?;
    let beta = params.backward_scaled(obs, &scales);

    for t in 0..obs.len() {
        for s in 0..k {
            // γ_t(s); sums to 1 over s because both passes share the scales.
            let gamma = alpha[t][s] * beta[t][s];
            if t == 0 {
                acc.start[s] += gamma;
            }
            acc.emission[s][obs[t]] += gamma;
        }
    }

    for t in 0..obs.len().saturating_sub(1) {
        let o = obs[t + 1];
        let c = scales[t + 1];
        for i in 0..k {
            let a = alpha[t][i];
            if a == 0.0 {
                continue;
            }
            for j in 0..k {
                acc.transition[i][j] +=
                    a * params.transition[i][j] * params.emission[j][o] * beta[t + 1][j] / c;
            }
        }
    }

    Ok(scales.iter().map(|c| c.ln()).sum())
}

/// M-step: normalize expected counts into new parameters.
fn maximize(
    prev: &HmmParams,
    acc: &Accumulators,
    iteration: usize,
    min_state_mass: f64,
) -> Result<HmmParams> {
    let mut start = acc.start.clone();
    if normalize_in_place(&mut start).is_none() {
        start = prev.start.clone();
    }

    let transition = acc
        .transition
        .iter()
        .zip(&prev.transition)
        .map(|(counts, prev_row)| {
            let mut row = counts.clone();
            match normalize_in_place(&mut row) {
                Some(_) => row,
                // No outgoing mass: the source state was never left.
                None => prev_row.clone(),
            }
        })
        .collect();

    let mut emission = Vec::with_capacity(acc.emission.len());
    for (state, counts) in acc.emission.iter().enumerate() {
        let mass: f64 = counts.iter().sum();
        if mass.is_nan() || mass <= min_state_mass {
            warn!(
                event = event_names::TRAIN_DEGENERATE,
                state, iteration, mass, "State lost all emission support"
            );
            return Err(Error::DegenerateModel {
                state,
                iteration,
                mass,
            });
        }
        emission.push(counts.iter().map(|c| c / mass).collect());
    }

    Ok(HmmParams {
        start,
        transition,
        emission,
    })
}

fn random_row<R: Rng>(rng: &mut R, n: usize) -> Vec<f64> {
    let mut row: Vec<f64> = (0..n).map(|_| INIT_FLOOR + rng.random::<f64>()).collect();
    // Every entry is at least INIT_FLOOR, so the sum is positive.
    normalize_in_place(&mut row);
    row
}

fn random_params<R: Rng>(rng: &mut R, k: usize, v: usize) -> HmmParams {
    let start = random_row(rng, k);
    let transition = (0..k).map(|_| random_row(rng, k)).collect();
    let emission = (0..k).map(|_| random_row(rng, v)).collect();
    HmmParams {
        start,
        transition,
        emission,
    }
}

fn initialize(input: &TrainingInput<'_>, scheme: InitScheme) -> HmmParams {
    let k = input.n_states;
    let v = input.n_symbols;
    match (scheme, input.labels) {
        (InitScheme::Uniform, _) => HmmParams::uniform(k, v),
        (InitScheme::Random { seed }, _) | (InitScheme::LabelSeeded { seed, .. }, None) => {
            let mut rng = StdRng::seed_from_u64(seed);
            random_params(&mut rng, k, v)
        }
        (InitScheme::LabelSeeded { seed, label_weight }, Some(labels)) => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut params = random_params(&mut rng, k, v);

            let mut counts = vec![vec![0.0; v]; k];
            let mut start = 0;
            for (&len, &label) in input.lengths.iter().zip(labels) {
                for &o in &input.sequences[start..start + len] {
                    counts[label][o] += 1.0;
                }
                start += len;
            }

            for (noise, state_counts) in params.emission.iter_mut().zip(&counts) {
                let smoothed = dirichlet::DirichletParams::laplace(v)
                    .and_then(|prior| dirichlet::posterior_params(&prior, state_counts, 1.0))
                    .map(|posterior| posterior.mean())
                    .unwrap_or_else(|| uniform_row(v));
                for (b, f) in noise.iter_mut().zip(smoothed) {
                    *b = label_weight * f + (1.0 - label_weight) * *b;
                }
                normalize_in_place(noise);
            }
            params
        }
    }
}

/// Most likely state path for an observation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViterbiPath {
    /// State index at each position.
    pub states: Vec<usize>,
    /// `ln P(path, obs | λ)` of the returned path.
    pub log_probability: f64,
    /// `δ_{T-1}(k)`: best log-probability of a path ending in each state.
    pub terminal_scores: Vec<f64>,
}

impl ViterbiPath {
    /// The path's final state; this is the reported diagnosis.
    pub fn terminal_state(&self) -> usize {
        self.states.last().copied().unwrap_or(0)
    }
}

/// Log-space Viterbi decoding.
///
/// Ties between predecessors and between terminal states resolve to the
/// lowest state index.
pub fn decode(obs: &[usize], params: &HmmParams) -> Result<ViterbiPath> {
    params.check_observations(obs)?;
    let k = params.n_states();
    let n = obs.len();

    let log_a: Vec<Vec<f64>> = params
        .transition
        .iter()
        .map(|row| row.iter().map(|&p| safe_ln(p)).collect())
        .collect();
    let log_b = |s: usize, o: usize| safe_ln(params.emission[s][o]);

    let mut delta: Vec<f64> = (0..k)
        .map(|s| safe_ln(params.start[s]) + log_b(s, obs[0]))
        .collect();
    let mut backptr: Vec<Vec<usize>> = Vec::with_capacity(n.saturating_sub(1));

    for &o in &obs[1..] {
        let mut next = vec![f64::NEG_INFINITY; k];
        let mut ptr = vec![0usize; k];
        for j in 0..k {
            let mut best_i = 0;
            let mut best = delta[0] + log_a[0][j];
            for i in 1..k {
                let score = delta[i] + log_a[i][j];
                if score > best {
                    best = score;
                    best_i = i;
                }
            }
            next[j] = best + log_b(j, o);
            ptr[j] = best_i;
        }
        backptr.push(ptr);
        delta = next;
    }

    let last = argmax_first(&delta).unwrap_or(0);
    let mut states = vec![last; n];
    for t in (1..n).rev() {
        states[t - 1] = backptr[t - 1][states[t]];
    }

    let path = ViterbiPath {
        log_probability: delta[last],
        states,
        terminal_scores: delta,
    };

    debug!(
        event = event_names::DECODE_FINISHED,
        length = n,
        terminal_state = last,
        log_probability = path.log_probability,
        "Viterbi decode finished"
    );

    Ok(path)
}

/// `ln P(path, obs | λ)` for an arbitrary state path of the same length.
pub fn path_log_probability(obs: &[usize], path: &[usize], params: &HmmParams) -> Result<f64> {
    params.check_observations(obs)?;
    if path.len() != obs.len() {
        return Err(Error::InvalidModel(format!(
            "path length {} does not match observation length {}",
            path.len(),
            obs.len()
        )));
    }
    if let Some(&s) = path.iter().find(|&&s| s >= params.n_states()) {
        return Err(Error::InvalidModel(format!("path state {} out of range", s)));
    }

    let mut lp = safe_ln(params.start[path[0]]) + safe_ln(params.emission[path[0]][obs[0]]);
    for t in 1..obs.len() {
        lp += safe_ln(params.transition[path[t - 1]][path[t]])
            + safe_ln(params.emission[path[t]][obs[t]]);
    }
    Ok(lp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn casino() -> HmmParams {
        // State 0 = fair die, state 1 = loaded die (symbol 1 = "six").
        HmmParams {
            start: vec![0.5, 0.5],
            transition: vec![vec![0.95, 0.05], vec![0.1, 0.9]],
            emission: vec![vec![5.0 / 6.0, 1.0 / 6.0], vec![0.5, 0.5]],
        }
    }

    fn two_symbol_input<'a>(seqs: &'a [usize], lengths: &'a [usize]) -> TrainingInput<'a> {
        TrainingInput {
            sequences: seqs,
            lengths,
            labels: None,
            n_states: 2,
            n_symbols: 2,
        }
    }

    #[test]
    fn validate_accepts_well_formed_params() {
        casino().validate().unwrap();
        HmmParams::uniform(3, 5).validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_rows() {
        let mut p = casino();
        p.transition[1] = vec![0.5, 0.6];
        assert!(matches!(p.validate(), Err(Error::InvalidModel(_))));

        let mut p = casino();
        p.emission[0].push(0.0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn decode_rejects_empty_and_unknown() {
        let p = casino();
        assert!(matches!(decode(&[], &p), Err(Error::EmptySequence)));
        assert!(matches!(
            decode(&[0, 2], &p),
            Err(Error::UnknownSymbol {
                symbol: 2,
                vocab_size: 2
            })
        ));
    }

    #[test]
    fn decode_finds_loaded_run() {
        let p = casino();
        let obs = [0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0];
        let path = decode(&obs, &p).unwrap();
        assert_eq!(path.states.len(), obs.len());
        assert_eq!(path.states[5], 1);
        assert_eq!(path.states[0], 0);
        let direct = path_log_probability(&obs, &path.states, &p).unwrap();
        assert!((direct - path.log_probability).abs() < 1e-9);
        assert_eq!(path.terminal_scores.len(), 2);
    }

    #[test]
    fn decode_ties_go_to_lowest_index() {
        let p = HmmParams::uniform(3, 2);
        let path = decode(&[0, 1, 0], &p).unwrap();
        assert_eq!(path.states, vec![0, 0, 0]);
        assert_eq!(path.terminal_state(), 0);
    }

    #[test]
    fn decode_handles_zero_probabilities() {
        let p = HmmParams {
            start: vec![0.0, 1.0],
            transition: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            emission: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        let path = decode(&[1, 1], &p).unwrap();
        assert_eq!(path.states, vec![1, 1]);
        assert_eq!(path.log_probability, 0.0);
        assert_eq!(path.terminal_scores[0], f64::NEG_INFINITY);
    }

    #[test]
    fn log_likelihood_matches_brute_force() {
        let p = casino();
        let obs = [0usize, 1, 1];
        let mut total = 0.0;
        for s0 in 0..2 {
            for s1 in 0..2 {
                for s2 in 0..2 {
                    total += path_log_probability(&obs, &[s0, s1, s2], &p).unwrap().exp();
                }
            }
        }
        let ll = p.log_likelihood(&obs).unwrap();
        assert!((ll - total.ln()).abs() < 1e-10);
    }

    #[test]
    fn training_keeps_rows_stochastic_and_improves_fit() {
        let seqs = [0, 0, 1, 0, 1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0];
        let lengths = [8, 8];
        let input = two_symbol_input(&seqs, &lengths);
        let config = TrainingConfig::default().with_init(InitScheme::Random { seed: 3 });

        let outcome = train(&input, &config).unwrap();
        outcome.params.validate().unwrap();
        assert!(outcome.report.iterations >= 1);
        assert!(outcome.report.log_likelihood.is_finite());

        let initial = initialize(&input, config.init);
        let before: f64 = [&seqs[..8], &seqs[8..]]
            .iter()
            .map(|s| initial.log_likelihood(s).unwrap())
            .sum();
        let after: f64 = [&seqs[..8], &seqs[8..]]
            .iter()
            .map(|s| outcome.params.log_likelihood(s).unwrap())
            .sum();
        assert!(after >= before - 1e-9, "before={before}, after={after}");
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let seqs = [0, 1, 1, 0, 1, 0, 0, 1];
        let lengths = [3, 5];
        let input = two_symbol_input(&seqs, &lengths);
        let config = TrainingConfig::default().with_init(InitScheme::Random { seed: 11 });
        let a = train(&input, &config).unwrap();
        let b = train(&input, &config).unwrap();
        assert_eq!(a.params, b.params);
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn untouched_transition_row_is_kept() {
        // Single-observation sequences never transition.
        let seqs = [0, 1, 0];
        let lengths = [1, 1, 1];
        let input = two_symbol_input(&seqs, &lengths);
        let config = TrainingConfig::default()
            .with_init(InitScheme::Random { seed: 5 })
            .with_max_iterations(1);
        let initial = initialize(&input, config.init);
        let outcome = train(&input, &config).unwrap();
        assert_eq!(outcome.params.transition, initial.transition);
    }

    #[test]
    fn unused_state_is_degenerate() {
        // State 1 can never be entered or started in, so it collects no mass.
        let seqs = [0, 1, 0];
        let lengths = [3];
        let input = two_symbol_input(&seqs, &lengths);
        let mut acc = Accumulators::new(2, 2);
        let params = HmmParams {
            start: vec![1.0, 0.0],
            transition: vec![vec![1.0, 0.0], vec![0.5, 0.5]],
            emission: vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        };
        for seg in input.segments() {
            accumulate(&params, seg, &mut acc).unwrap();
        }
        let err = maximize(&params, &acc, 4, 1e-12).unwrap_err();
        assert!(matches!(
            err,
            Error::DegenerateModel {
                state: 1,
                iteration: 4,
                ..
            }
        ));
    }

    #[test]
    fn rejects_inconsistent_input() {
        let seqs = [0, 1];
        let lengths = [3];
        let input = two_symbol_input(&seqs, &lengths);
        assert!(matches!(
            train(&input, &TrainingConfig::default()),
            Err(Error::InvalidModel(_))
        ));

        let empty = two_symbol_input(&[], &[]);
        assert!(matches!(
            train(&empty, &TrainingConfig::default()),
            Err(Error::EmptyCorpus)
        ));

        let bad_symbol = [0, 5];
        let lengths = [2];
        let input = two_symbol_input(&bad_symbol, &lengths);
        assert!(matches!(
            train(&input, &TrainingConfig::default()),
            Err(Error::UnknownSymbol { symbol: 5, .. })
        ));
    }

    #[test]
    fn label_seeded_emissions_lean_toward_label_tokens() {
        let seqs = [0, 0, 1, 1];
        let lengths = [2, 2];
        let labels = [0, 1];
        let input = TrainingInput {
            sequences: &seqs,
            lengths: &lengths,
            labels: Some(&labels),
            n_states: 2,
            n_symbols: 2,
        };
        let params = initialize(&input, InitScheme::default());
        params.validate().unwrap();
        assert!(params.emission[0][0] > params.emission[0][1]);
        assert!(params.emission[1][1] > params.emission[1][0]);
    }
}
