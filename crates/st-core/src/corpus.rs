//! JSON-lines corpus loading.
//!
//! One `{"text": ..., "label": ...}` object per line. Blank lines are
//! skipped; anything else that does not parse fails the whole load with the
//! 1-based line number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};
use st_common::{Error, Result};

use crate::vocab::CorpusRecord;

/// Parse a JSONL corpus from any buffered reader.
pub fn parse_jsonl<R: BufRead>(reader: R) -> Result<Vec<CorpusRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: CorpusRecord =
            serde_json::from_str(trimmed).map_err(|e| Error::MalformedRecord {
                line: line_no,
                reason: e.to_string(),
            })?;
        if record.label.trim().is_empty() {
            return Err(Error::MalformedRecord {
                line: line_no,
                reason: "label must not be empty".to_string(),
            });
        }
        records.push(record);
    }
    Ok(records)
}

/// Load a JSONL corpus file.
pub fn load_jsonl(path: &Path) -> Result<Vec<CorpusRecord>> {
    let file = File::open(path)?;
    parse_jsonl(BufReader::new(file))
}

/// Content hash of a corpus, independent of file formatting.
pub fn corpus_sha256(records: &[CorpusRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        hasher.update(record.label.as_bytes());
        hasher.update(b"\t");
        hasher.update(record.text.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_records_and_skips_blank_lines() {
        let input = "{\"text\":\"fever and chills\",\"label\":\"Flu\"}\n\n  \n{\"label\":\"Cold\",\"text\":\"sneeze\"}\n";
        let records = parse_jsonl(Cursor::new(input)).unwrap();
        assert_eq!(
            records,
            vec![
                CorpusRecord::new("fever and chills", "Flu"),
                CorpusRecord::new("sneeze", "Cold"),
            ]
        );
    }

    #[test]
    fn reports_line_of_bad_record() {
        let input = "{\"text\":\"a\",\"label\":\"Flu\"}\n\n{\"text\":\"b\"}\n";
        match parse_jsonl(Cursor::new(input)) {
            Err(Error::MalformedRecord { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("label"), "{reason}");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_label() {
        let input = "{\"text\":\"fever\",\"label\":\"  \"}";
        assert!(matches!(
            parse_jsonl(Cursor::new(input)),
            Err(Error::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn hash_depends_on_content_and_order() {
        let a = vec![CorpusRecord::new("x", "A"), CorpusRecord::new("y", "B")];
        let b = vec![CorpusRecord::new("y", "B"), CorpusRecord::new("x", "A")];
        assert_eq!(corpus_sha256(&a), corpus_sha256(&a.clone()));
        assert_ne!(corpus_sha256(&a), corpus_sha256(&b));
        assert_eq!(corpus_sha256(&a).len(), 64);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_jsonl(Path::new("/nonexistent/corpus.jsonl")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
