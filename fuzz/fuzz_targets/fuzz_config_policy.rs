//! Fuzz target for policy.json configuration parsing.
//!
//! Parsing and validation must reject bad input with an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use st_common::DialogPolicy;

fuzz_target!(|data: &[u8]| {
    if let Ok(policy) = serde_json::from_slice::<DialogPolicy>(data) {
        if policy.validate().is_ok() {
            let _ = policy.should_diagnose("done", policy.minimum_symptom_threshold);
        }
    }
});
