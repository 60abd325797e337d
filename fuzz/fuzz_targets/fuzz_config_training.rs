//! Fuzz target for training.json configuration parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use st_common::TrainingConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<TrainingConfig>(data) {
        let _ = config.validate();
    }
});
