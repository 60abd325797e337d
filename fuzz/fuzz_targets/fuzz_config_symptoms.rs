//! Fuzz target for symptoms.json parsing and lookup.

#![no_main]

use libfuzzer_sys::fuzz_target;
use st_common::SymptomTable;

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = serde_json::from_slice::<SymptomTable>(data) {
        let _ = table.validate();
        for disease in table.diseases.keys() {
            let _ = table.expected(&disease.to_uppercase());
        }
    }
});
