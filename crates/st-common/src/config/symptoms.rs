//! Disease → expected-symptoms table used to phrase follow-up questions.
//!
//! The table never feeds training or decoding; it only tells the dialog
//! controller what to ask about once a disease is suspected.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Schema version for the symptom table.
pub const SYMPTOMS_SCHEMA_VERSION: &str = "1.0.0";

/// Static mapping from disease label to an ordered list of symptom phrases.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SymptomTable {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Disease label → expected symptom phrases, in the order they are asked
    pub diseases: BTreeMap<String, Vec<String>>,
}

impl SymptomTable {
    /// Validate the table.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SYMPTOMS_SCHEMA_VERSION {
            return Err(Error::InvalidSymptomTable(format!(
                "schema version mismatch: expected {}, got {}",
                SYMPTOMS_SCHEMA_VERSION, self.schema_version
            )));
        }
        for (disease, phrases) in &self.diseases {
            if disease.trim().is_empty() {
                return Err(Error::InvalidSymptomTable(
                    "disease label must not be empty".to_string(),
                ));
            }
            if phrases.is_empty() {
                return Err(Error::InvalidSymptomTable(format!(
                    "'{}' has no expected symptoms",
                    disease
                )));
            }
            if phrases.iter().any(|p| p.trim().is_empty()) {
                return Err(Error::InvalidSymptomTable(format!(
                    "'{}' has an empty symptom phrase",
                    disease
                )));
            }
        }
        Ok(())
    }

    /// Expected symptoms for `disease`.
    ///
    /// Exact label match first, then a case-insensitive fallback since corpus
    /// labels are not consistently capitalized.
    pub fn expected(&self, disease: &str) -> Option<&[String]> {
        if let Some(p) = self.diseases.get(disease) {
            return Some(p);
        }
        let wanted = disease.trim().to_lowercase();
        self.diseases
            .iter()
            .find(|(k, _)| k.to_lowercase() == wanted)
            .map(|(_, v)| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }
}

impl Default for SymptomTable {
    /// Built-in table covering the Symptom2Disease labels.
    fn default() -> Self {
        let entries: &[(&str, &[&str])] = &[
            ("Acne", &["pimples", "blackheads", "oily skin", "scarring"]),
            ("Arthritis", &["joint pain", "stiffness", "swelling", "reduced mobility"]),
            ("Bronchial Asthma", &["wheezing", "shortness of breath", "chest tightness", "cough"]),
            ("Cervical spondylosis", &["neck pain", "stiffness", "headache", "numbness"]),
            ("Chicken pox", &["itchy rash", "blisters", "fever", "fatigue"]),
            ("Common Cold", &["runny nose", "sneezing", "sore throat", "cough"]),
            ("Dengue", &["high fever", "joint pain", "headache", "rash", "bleeding"]),
            ("Dimorphic Hemorrhoids", &["rectal bleeding", "anal itching", "pain", "swelling"]),
            ("Fungal infection", &["itching", "skin rash", "patches", "scaling"]),
            ("Hypertension", &["headache", "dizziness", "chest pain", "blurred vision"]),
            ("Impetigo", &["red sores", "blisters", "crust", "itching"]),
            ("Jaundice", &["yellow skin", "dark urine", "fatigue", "abdominal pain"]),
            ("Malaria", &["fever", "chills", "sweating", "headache", "nausea"]),
            ("Migraine", &["headache", "nausea", "sensitivity to light", "vision"]),
            ("Pneumonia", &["cough", "fever", "chills", "shortness of breath", "chest pain"]),
            ("Psoriasis", &["skin rash", "silver scales", "itching", "dry skin"]),
            ("Typhoid", &["high fever", "weakness", "stomach pain", "constipation", "diarrhea"]),
            ("Varicose Veins", &["swollen veins", "leg pain", "cramps", "heaviness"]),
            ("allergy", &["sneezing", "itchy eyes", "runny nose", "rash"]),
            ("diabetes", &["thirst", "frequent urination", "fatigue", "blurred vision"]),
            ("drug reaction", &["rash", "itching", "fever", "swelling"]),
            ("gastroesophageal reflux disease", &["heartburn", "acid", "chest pain", "cough"]),
            ("peptic ulcer disease", &["stomach pain", "bloating", "nausea", "heartburn"]),
            ("urinary tract infection", &["burning", "frequent urination", "cloudy urine", "pelvic pain"]),
        ];

        let diseases = entries
            .iter()
            .map(|(d, s)| (d.to_string(), s.iter().map(|p| p.to_string()).collect()))
            .collect();

        SymptomTable {
            schema_version: SYMPTOMS_SCHEMA_VERSION.to_string(),
            diseases,
        }
    }
}
