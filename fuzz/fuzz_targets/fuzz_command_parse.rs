//! Fuzz target: `Vocabulary::parse`
//!
//! Feeds arbitrary control-characteristic payloads to the command parser
//! and asserts that it never panics and only ever resolves to a phrase
//! from the table.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use voicerelay::app::commands::{ParseOutcome, RejectReason, Vocabulary, MAX_COMMAND_LEN};

fuzz_target!(|data: &[u8]| {
    let vocab = Vocabulary::default();

    match vocab.parse(data) {
        ParseOutcome::Empty => assert!(data.is_empty()),
        ParseOutcome::Command(cmd) => {
            let trimmed = data.trim_ascii();
            assert!(trimmed.len() <= MAX_COMMAND_LEN);
            assert!(vocab
                .bindings()
                .iter()
                .any(|b| b.command() == cmd && b.phrase.as_bytes().eq_ignore_ascii_case(trimmed)));
        }
        ParseOutcome::Rejected(RejectReason::TooLong(n)) => assert!(n > MAX_COMMAND_LEN),
        ParseOutcome::Rejected(_) => {}
    }
});
