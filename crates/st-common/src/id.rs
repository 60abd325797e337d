//! Conversation session identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Session ID for tracking triage conversations.
///
/// Format: `st-YYYYMMDD-HHMMSS-XXXX`
/// Example: `st-20260115-143022-a7xq`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new session ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let suffix = generate_base32_suffix();
        SessionId(format!(
            "st-{}-{}-{}",
            now.format("%Y%m%d"),
            now.format("%H%M%S"),
            suffix
        ))
    }

    /// Parse an existing session ID string.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 23 || !s.starts_with("st-") {
            return None;
        }
        let bytes = s.as_bytes();
        if bytes[11] != b'-' || bytes[18] != b'-' {
            return None;
        }
        let date = &s[3..11];
        let time = &s[12..18];
        let suffix = &s[19..23];
        if !date.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !time.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !suffix.chars().all(|c| matches!(c, 'a'..='z' | '2'..='7')) {
            return None;
        }
        Some(SessionId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn generate_base32_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    let mut value = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32);
    value &= 0x000F_FFFF;
    let alphabet = b"abcdefghijklmnopqrstuvwxyz234567";
    let mut out = String::with_capacity(4);
    for shift in [15_u32, 10, 5, 0] {
        let idx = ((value >> shift) & 0x1F) as usize;
        out.push(alphabet[idx] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let sid = SessionId::new();
        assert!(sid.0.starts_with("st-"));
        assert_eq!(sid.0.len(), 23);
    }

    #[test]
    fn test_session_id_roundtrip_parse() {
        let sid = SessionId::new();
        assert_eq!(SessionId::parse(sid.as_str()), Some(sid));
    }

    #[test]
    fn test_session_id_parse_rejects_garbage() {
        assert!(SessionId::parse("pt-20260115-143022-a7xq").is_none());
        assert!(SessionId::parse("st-2026011x-143022-a7xq").is_none());
        assert!(SessionId::parse("st-20260115-143022-A7XQ").is_none());
        assert!(SessionId::parse("st-20260115-143022").is_none());
    }

    #[test]
    fn test_session_id_serde_transparent() {
        let sid = SessionId("st-20260115-143022-a7xq".to_string());
        let json = serde_json::to_string(&sid).unwrap();
        assert_eq!(json, "\"st-20260115-143022-a7xq\"");
    }
}
