//! Stable event names.
//!
//! Every engine and controller event carries an `event` field with one of
//! these names, so JSONL consumers can filter without parsing messages.

/// Standard event names used in logging.
pub mod event_names {
    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";

    // Corpus and vocabulary
    pub const CORPUS_LOADED: &str = "corpus.loaded";
    pub const CORPUS_INDEXED: &str = "corpus.indexed";

    // Training
    pub const TRAIN_STARTED: &str = "train.started";
    pub const TRAIN_ITERATION: &str = "train.iteration";
    pub const TRAIN_CONVERGED: &str = "train.converged";
    pub const TRAIN_MAX_ITERATIONS: &str = "train.max_iterations";
    pub const TRAIN_DEGENERATE: &str = "train.degenerate";

    // Model persistence
    pub const MODEL_SAVED: &str = "model.saved";
    pub const MODEL_LOADED: &str = "model.loaded";

    // Decoding
    pub const DECODE_FINISHED: &str = "decode.finished";

    // Dialog
    pub const DIALOG_TURN: &str = "dialog.turn";
    pub const DIALOG_UNRECOGNIZED_SYMPTOMS: &str = "dialog.unrecognized_symptoms";
    pub const DIALOG_BACKEND_FAILED: &str = "dialog.backend_failed";
    pub const DIALOG_SESSION_RESET: &str = "dialog.session_reset";
    pub const SESSION_OPENED: &str = "session.opened";
    pub const SESSION_CLOSED: &str = "session.closed";

    // Error events
    pub const INTERNAL_ERROR: &str = "internal_error";
}
