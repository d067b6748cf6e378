// src/tests/entryreader_tests.rs

//! tests for `entryreader.rs`

#![allow(non_snake_case)]

use crate::data::logrecord::LogRecord;
use crate::readers::bytecursor::{ByteCursor, CursorError, CursorIndex};
use crate::readers::entryreader::{
    read_next_entry,
    EntryError,
    EntryErrorKind,
    EntryReader,
    FormatDescriptor,
    ResultEntry,
};
use crate::readers::formats::leveled::LeveledReader;
use crate::readers::formats::line::LineReader;

use std::path::Path;

use ::more_asserts::assert_gt;
use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A format that never consumes any bytes.
struct StuckReader {
    fail: bool,
}

impl EntryReader for StuckReader {
    fn name(&self) -> &'static str {
        "stuck"
    }

    fn read_entry(
        &mut self,
        cursor: &mut ByteCursor,
    ) -> ResultEntry {
        match self.fail {
            true => Err(EntryError::decode(String::from("stuck"), cursor.position())),
            false => Ok(LogRecord::from_message(String::from("stuck"))),
        }
    }
}

/// call `read_next_entry` until the cursor is exhausted, asserting progress
/// on every call
fn read_all(
    reader: &mut dyn EntryReader,
    data: &[u8],
) -> Vec<ResultEntry> {
    let mut cursor = ByteCursor::from_bytes(data.to_vec());
    let mut results: Vec<ResultEntry> = Vec::new();
    while !cursor.is_exhausted() {
        let position_prev: CursorIndex = cursor.position();
        results.push(read_next_entry(reader, &mut cursor));
        assert_gt!(cursor.position(), position_prev, "no progress from {}", position_prev);
        assert!(results.len() <= data.len(), "more results than bytes");
    }

    results
}

#[test]
fn test_read_next_entry_exhausted() {
    let mut reader = LineReader::new();
    let mut cursor = ByteCursor::from_bytes(b"abc".to_vec());
    cursor.skip_line();
    let err = read_next_entry(&mut reader, &mut cursor).unwrap_err();
    assert_eq!(err.kind(), EntryErrorKind::BeyondBuffer);
    assert_eq!(err.message(), "try to read beyond buffer");
    assert_eq!(err.position(), 3);
    assert!(err.record().is_empty());
}

#[test_case(true; "fails")]
#[test_case(false; "succeeds")]
fn test_read_next_entry_stuck_reader_advances(fail: bool) {
    let mut reader = StuckReader { fail };
    let results = read_all(&mut reader, b"a\nb\r\nc");
    assert_eq!(results.len(), 3);
    for result in results.iter() {
        assert_eq!(result.is_err(), fail);
    }
}

#[test]
fn test_read_next_entry_error_position_is_start() {
    let mut reader = StuckReader { fail: true };
    let mut cursor = ByteCursor::from_bytes(b"ab\ncd\n".to_vec());
    cursor.skip_line();
    let err = read_next_entry(&mut reader, &mut cursor).unwrap_err();
    assert_eq!(err.kind(), EntryErrorKind::Decode);
    assert_eq!(err.position(), 3);
    assert_eq!(cursor.position(), 6);
    assert_eq!(err.into_record(), LogRecord::empty());
}

#[test]
fn test_read_next_entry_malformed_leveled_advances() {
    // every line is a record start missing its context
    let data = b"INF 2024-03-01T09:15:02Z\nWRN 2024-03-01T09:15:03Z\r\nERR 2024-03-01T09:15:04Z";
    let mut reader = LeveledReader::default();
    let results = read_all(&mut reader, data);
    assert_eq!(results.len(), 3);
    for result in results.iter() {
        match result {
            Ok(record) => panic!("expected Err, got {:?}", record),
            Err(err) => {
                assert_eq!(err.kind(), EntryErrorKind::Decode);
                assert!(err.record().is_empty());
            }
        }
    }
}

#[test]
fn test_read_next_entry_garbage_bytes_advance() {
    let data: Vec<u8> = vec![0xFF, 0x00, b'\r', 0xFE, b' ', b' ', b'\n', 0x80];
    let mut reader = LeveledReader::default();
    let results = read_all(&mut reader, &data);
    assert_eq!(results.len(), 3);
}

#[test]
fn test_EntryError_from_CursorError() {
    let err: EntryError = EntryError::from(CursorError::Truncated { position: 4, wanted: 8, available: 2 });
    assert_eq!(err.kind(), EntryErrorKind::Decode);
    assert_eq!(err.position(), 4);
    let err: EntryError = EntryError::from(CursorError::BeyondBuffer { position: 9, len: 9 });
    assert_eq!(err.kind(), EntryErrorKind::BeyondBuffer);
    assert_eq!(err.position(), 9);
}

#[test]
fn test_EntryReader_defaults() {
    let reader = StuckReader { fail: false };
    let path = Path::new("/tmp/nonexistent.log");
    assert_eq!(reader.probe(path, b"anything").unwrap(), FormatDescriptor::matched());
    assert!(reader.normalize(path, path).is_err());
    assert!(reader.encoding().is_none());
    assert!(reader.is_record_start(&ByteCursor::default()));
    assert!(!reader.folds_continuation_lines());
}
