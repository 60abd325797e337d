//! Fuzz target for model files: anything that deserializes and validates
//! must be safe to decode against.

#![no_main]

use libfuzzer_sys::fuzz_target;
use st_core::model::TrainedModel;

fuzz_target!(|data: &[u8]| {
    let Ok(model) = serde_json::from_slice::<TrainedModel>(data) else {
        return;
    };
    if model.validate().is_err() {
        return;
    }
    let obs: Vec<usize> = (0..model.vocabulary.n_observations().min(4)).collect();
    let _ = st_core::inference::decode(&obs, &model.hmm);
});
