// src/tests/tailprocessor_tests.rs

//! tests for `tailprocessor.rs`

#![allow(non_snake_case)]

use crate::common::FPath;
use crate::data::logrecord::LogLevel;
use crate::debug::helpers::{
    append_to_file,
    create_temp_dir,
    create_temp_file,
    create_temp_file_bytes,
    fpath_in_tmpdir,
    ntf_fpath,
    rewrite_file,
};
use crate::readers::entryreader::{EntryErrorKind, ResultEntry};
use crate::readers::filetailer::TailStage;
use crate::readers::formats::leveled::LeveledReader;
use crate::readers::formats::line::LineReader;
use crate::readers::formats::utf16::{Utf16Normalizer, NORMALIZED_SUFFIX};
use crate::readers::formats::{FormatRegistry, FORMAT_LINE};
use crate::readers::tailprocessor::{PollResult, SummaryTailProcessor, TailConfig, TailProcessor};

use ::encoding_rs::WINDOWS_1252;
use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn new_processor(
    fpath: &FPath,
    hold_partial_line: bool,
) -> TailProcessor {
    let config = TailConfig {
        hold_partial_line,
        ..Default::default()
    };

    TailProcessor::new(fpath.clone(), config, FormatRegistry::default())
}

/// messages of the entries, all must be `Ok`
fn messages(entries: &[ResultEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|result| match result {
            Ok(record) => String::from(record.message()),
            Err(err) => panic!("unexpected Err {}", err),
        })
        .collect()
}

fn poll_messages(processor: &mut TailProcessor) -> Vec<String> {
    let pollresult: PollResult = processor.poll().unwrap();

    messages(&pollresult.entries)
}

#[test]
fn test_poll_crlf_then_append() {
    let ntf = create_temp_file("a\r\nb\r\nc\r\n");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    assert_eq!(processor.format(), None);
    assert_eq!(processor.stage(), TailStage::Unread);
    let pollresult = processor.poll().unwrap();
    assert!(!pollresult.recreated);
    assert_eq!(pollresult.format, Some(LineReader::NAME));
    assert_eq!(messages(&pollresult.entries), vec!["a", "b", "c"]);

    // nothing new
    assert!(poll_messages(&mut processor).is_empty());

    append_to_file(&fpath, b"d\r\n");
    assert_eq!(poll_messages(&mut processor), vec!["d"]);
    assert_eq!(processor.stage(), TailStage::Tailing);
}

#[test]
fn test_poll_leveled() {
    let data = "\
log started
INF 2024-03-01T09:15:02.4471230+01:00 Main Service started
WRN 2024-03-01T09:15:03.0012000+01:00 Worker Retrying connection
    attempt 2 of 5
";
    let ntf = create_temp_file(data);
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    let pollresult = processor.poll().unwrap();
    assert_eq!(pollresult.format, Some(LeveledReader::NAME));
    // the last record is held until the next record start
    assert_eq!(messages(&pollresult.entries), vec!["log started", "Service started"]);
    assert_eq!(processor.partial_len(), 84);

    append_to_file(&fpath, b"ERR 2024-03-01T09:15:04.1000000+01:00 Worker Connection failed\n");
    let pollresult = processor.poll().unwrap();
    assert_eq!(messages(&pollresult.entries), vec!["Retrying connection\n    attempt 2 of 5"]);
    let record = pollresult.entries[0].as_ref().unwrap();
    assert_eq!(record.level(), Some(LogLevel::Warning));
    assert_eq!(record.context(), Some("Worker"));

    let entries = processor.flush();
    assert_eq!(entries.len(), 1);
    let record = entries[0].as_ref().unwrap();
    assert_eq!(record.level(), Some(LogLevel::Error));
    assert_eq!(record.message(), "Connection failed");
    assert_eq!(processor.partial_len(), 0);
}

#[test]
fn test_poll_continuation_in_next_poll() {
    let ntf = create_temp_file("INF 2024-03-01T09:15:02Z Main Retrying\n");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    assert!(poll_messages(&mut processor).is_empty());
    assert_eq!(processor.partial_len(), 39);

    append_to_file(&fpath, b"    attempt 2 of 5\n");
    assert!(poll_messages(&mut processor).is_empty());

    append_to_file(&fpath, b"    attempt 3 of 5\nINF 2024-03-01T09:15:03Z Main next\n");
    assert_eq!(
        poll_messages(&mut processor),
        vec!["Retrying\n    attempt 2 of 5\n    attempt 3 of 5"]
    );
    assert_eq!(messages(&processor.flush()), vec!["next"]);
    assert_eq!(processor.summary().TailProcessor_records, 2);
}

#[test]
fn test_poll_continuation_with_partial_line() {
    let ntf = create_temp_file("INF 2024-03-01T09:15:02Z Main Retrying\n    attempt");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, true);
    assert!(poll_messages(&mut processor).is_empty());
    append_to_file(&fpath, b" 2 of 5\nWRN 2024-03-01T09:15:03Z Main gave up\n");
    assert_eq!(poll_messages(&mut processor), vec!["Retrying\n    attempt 2 of 5"]);
    assert_eq!(messages(&processor.flush()), vec!["gave up"]);
}

#[test]
fn test_poll_lines_before_first_record_not_held() {
    let ntf = create_temp_file("log started\nINF 2024-03-01T09:15:02Z Main a\n");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    assert_eq!(poll_messages(&mut processor), vec!["log started"]);
    append_to_file(&fpath, b"more\n");
    assert!(poll_messages(&mut processor).is_empty());
    assert_eq!(messages(&processor.flush()), vec!["a\nmore"]);
}

#[test]
fn test_poll_recreated_discards_held_record() {
    let ntf = create_temp_file("INF 2024-03-01T09:15:02Z Main held until the next record start\n");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    assert!(poll_messages(&mut processor).is_empty());
    assert_ne!(processor.partial_len(), 0);
    rewrite_file(&fpath, b"x\n");
    let pollresult = processor.poll().unwrap();
    assert!(pollresult.recreated);
    assert_eq!(pollresult.format, Some(LineReader::NAME));
    assert_eq!(messages(&pollresult.entries), vec!["x"]);
    assert_eq!(processor.partial_len(), 0);
    assert!(processor.flush().is_empty());
}

#[test]
fn test_poll_recreated_redetects_format() {
    let ntf = create_temp_file("plain text line that is rather long, longer than the next one\n");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    let pollresult = processor.poll().unwrap();
    assert_eq!(pollresult.format, Some(LineReader::NAME));

    rewrite_file(&fpath, b"INF 2024-03-01T09:15:02Z Main x\n");
    let pollresult = processor.poll().unwrap();
    assert!(pollresult.recreated);
    assert_eq!(pollresult.format, Some(LeveledReader::NAME));
    assert!(pollresult.entries.is_empty());
    assert_eq!(processor.stage(), TailStage::Recreated);
    assert_eq!(messages(&processor.flush()), vec!["x"]);
    assert_eq!(processor.summary().TailProcessor_recreations, 1);
}

#[test]
fn test_poll_truncated_to_empty() {
    let ntf = create_temp_file("abc\n");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    assert_eq!(poll_messages(&mut processor), vec!["abc"]);
    rewrite_file(&fpath, b"");
    let pollresult = processor.poll().unwrap();
    assert!(pollresult.recreated);
    assert!(pollresult.entries.is_empty());
    assert_eq!(pollresult.format, None);
    append_to_file(&fpath, b"def\n");
    assert_eq!(poll_messages(&mut processor), vec!["def"]);
}

#[test_case(true, &["alpha"], &["bravo"]; "hold")]
#[test_case(false, &["alpha", "bra"], &["vo"]; "no hold")]
fn test_poll_partial_line(hold: bool, expect1: &[&str], expect2: &[&str]) {
    let ntf = create_temp_file("alpha\nbra");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, hold);
    assert_eq!(poll_messages(&mut processor), expect1);
    assert_eq!(processor.partial_len(), if hold { 3 } else { 0 });
    append_to_file(&fpath, b"vo\n");
    assert_eq!(poll_messages(&mut processor), expect2);
    assert_eq!(processor.partial_len(), 0);
}

#[test]
fn test_poll_hold_only_partial() {
    let ntf = create_temp_file("no terminator yet");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, true);
    assert!(poll_messages(&mut processor).is_empty());
    assert_eq!(processor.partial_len(), 17);
    append_to_file(&fpath, b"\n");
    assert_eq!(poll_messages(&mut processor), vec!["no terminator yet"]);
}

#[test]
fn test_poll_recreated_discards_held_bytes() {
    let ntf = create_temp_file("alpha\nlong partial bytes");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, true);
    assert_eq!(poll_messages(&mut processor), vec!["alpha"]);
    assert_eq!(processor.partial_len(), 18);
    rewrite_file(&fpath, b"x\n");
    let pollresult = processor.poll().unwrap();
    assert!(pollresult.recreated);
    assert_eq!(messages(&pollresult.entries), vec!["x"]);
    assert_eq!(processor.partial_len(), 0);
}

#[test]
fn test_flush() {
    let ntf = create_temp_file("alpha\nbra");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, true);
    assert_eq!(poll_messages(&mut processor), vec!["alpha"]);
    assert_eq!(messages(&processor.flush()), vec!["bra"]);
    assert_eq!(processor.partial_len(), 0);
    assert!(processor.flush().is_empty());
}

#[test]
fn test_flush_nothing_read() {
    let mut processor = new_processor(&FPath::from("/nonexistent/tlp/file.log"), true);
    assert!(processor.flush().is_empty());
}

#[test]
fn test_poll_cr_then_lf() {
    let ntf = create_temp_file("a\r");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    assert_eq!(poll_messages(&mut processor), vec!["a"]);
    append_to_file(&fpath, b"\nb\n");
    assert_eq!(poll_messages(&mut processor), vec!["b"]);
}

#[test_case(b"a\n", b"\nb\n"; "lf then lf")]
#[test_case(b"a\r\n", b"\r\n\nb\n"; "crlf then crlf")]
#[test_case(b"a", b"\nb\n"; "terminator before each line")]
#[test_case(b"a\n", b"\n\n\nb"; "blank lines")]
fn test_poll_leading_terminators(bytes1: &[u8], bytes2: &[u8]) {
    let ntf = create_temp_file_bytes(bytes1);
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    assert_eq!(poll_messages(&mut processor), vec!["a"]);
    append_to_file(&fpath, bytes2);
    assert_eq!(poll_messages(&mut processor), vec!["b"]);
}

#[test]
fn test_poll_only_terminators() {
    let ntf = create_temp_file("a\n");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    assert_eq!(poll_messages(&mut processor), vec!["a"]);
    append_to_file(&fpath, b"\r\n\r\n");
    assert!(poll_messages(&mut processor).is_empty());
    append_to_file(&fpath, b"\nb\n");
    assert_eq!(poll_messages(&mut processor), vec!["b"]);
}

#[test]
fn test_poll_held_partial_line_keeps_terminator() {
    let ntf = create_temp_file("a\nbra");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, true);
    assert_eq!(poll_messages(&mut processor), vec!["a"]);
    append_to_file(&fpath, b"\nvo\n");
    assert_eq!(poll_messages(&mut processor), vec!["bra", "vo"]);
}

#[test]
fn test_poll_cr_then_lf_held() {
    let ntf = create_temp_file("a\r");
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, true);
    assert_eq!(poll_messages(&mut processor), vec!["a"]);
    assert_eq!(processor.partial_len(), 0);
    append_to_file(&fpath, b"\nb\n");
    assert_eq!(poll_messages(&mut processor), vec!["b"]);
}

#[test]
fn test_poll_utf16() {
    let tmpdir = create_temp_dir();
    let fpath = fpath_in_tmpdir(&tmpdir, "utf16.log");
    let mut bytes: Vec<u8> = vec![0xFF, 0xFE];
    for unit in "one\r\ntwo\r\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    rewrite_file(&fpath, &bytes);
    let mut processor = new_processor(&fpath, false);
    let pollresult = processor.poll().unwrap();
    assert_eq!(pollresult.format, Some(Utf16Normalizer::NAME));
    assert_eq!(messages(&pollresult.entries), vec!["one", "two"]);
    assert_eq!(processor.path(), &fpath);
    assert!(processor.path_tailed().ends_with(NORMALIZED_SUFFIX));
    assert_eq!(processor.path_tailed(), &Utf16Normalizer::normalized_path(std::path::Path::new(&fpath)));
    assert!(poll_messages(&mut processor).is_empty());
}

#[test]
fn test_poll_missing_file_then_created() {
    let tmpdir = create_temp_dir();
    let fpath = fpath_in_tmpdir(&tmpdir, "later.log");
    let mut processor = new_processor(&fpath, false);
    assert!(processor.poll().is_err());
    assert!(processor.poll().is_err());
    rewrite_file(&fpath, b"here\n");
    assert_eq!(poll_messages(&mut processor), vec!["here"]);
    assert_eq!(processor.summary().TailProcessor_polls, 3);
}

#[test]
fn test_poll_encoding_windows_1252() {
    let ntf = create_temp_file_bytes(&[b'c', b'a', b'f', 0xE9, b'\n']);
    let fpath = ntf_fpath(&ntf);
    let config = TailConfig {
        encoding: WINDOWS_1252,
        ..Default::default()
    };
    let mut processor = TailProcessor::new(fpath, config, FormatRegistry::with_only(FORMAT_LINE));
    assert_eq!(poll_messages(&mut processor), vec!["café"]);
}

#[test]
fn test_summary() {
    let data = "INF 2024-03-01T09:15:02Z\nINF 2024-03-01T09:15:03Z Main ok\n";
    let ntf = create_temp_file(data);
    let fpath = ntf_fpath(&ntf);
    let mut processor = new_processor(&fpath, false);
    let pollresult = processor.poll().unwrap();
    assert_eq!(pollresult.entries.len(), 1);
    assert_eq!(
        pollresult.entries[0].as_ref().unwrap_err().kind(),
        EntryErrorKind::Decode
    );
    processor.poll().unwrap();
    assert_eq!(messages(&processor.flush()), vec!["ok"]);
    let summary = processor.summary();
    assert_eq!(
        summary,
        SummaryTailProcessor {
            TailProcessor_path: fpath,
            TailProcessor_format: Some(LeveledReader::NAME),
            TailProcessor_polls: 2,
            TailProcessor_bytes: data.len() as u64,
            TailProcessor_records: 1,
            TailProcessor_errors: 1,
            TailProcessor_recreations: 0,
        }
    );
    assert_eq!(
        summary.to_string(),
        "format leveled, polls 2, bytes 58, records 1, errors 1, recreations 0"
    );
}
