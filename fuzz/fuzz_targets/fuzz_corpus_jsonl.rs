//! Fuzz target for JSON-lines corpus parsing and vocabulary indexing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use st_core::corpus::parse_jsonl;
use st_core::tokenize::WordTokenizer;
use st_core::vocab::build;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = parse_jsonl(Cursor::new(data)) {
        if let Ok(indexed) = build(&records, &WordTokenizer::new()) {
            assert_eq!(
                indexed.lengths.iter().sum::<usize>(),
                indexed.sequences.len()
            );
            assert!(indexed.lengths.iter().all(|&l| l > 0));
        }
    }
});
