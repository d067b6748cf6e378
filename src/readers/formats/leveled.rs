// src/readers/formats/leveled.rs

//! Implements [`LeveledReader`] for logs of records like
//!
//! ```text
//! Starting service (log header, not a record)
//! INF 2024-03-01T09:15:02.4471230+01:00 Main Service started
//! WRN 2024-03-01T09:15:03.0012000+01:00 Worker Retrying connection
//!     attempt 2 of 5
//! ERR 2024-03-01T09:15:04.1000000+01:00 Worker Connection failed
//! ```
//!
//! That is `LEVEL DATETIME CONTEXT MESSAGE`. A line is a record start when its
//! first token is a known [`LogLevel`] and its second token is a datetime.
//! Lines that are not record starts are continuation lines and are folded into
//! the message of the preceding record. Lines before the first record are
//! returned as message-only records.
//!
//! [`LogLevel`]: crate::data::logrecord::LogLevel

use crate::common::{Count, LINE_TERMINATORS, SPu8};
use crate::data::datetime::{bytes_to_datetime, datetime_parse_token, fixedoffset_utc, FixedOffset};
use crate::data::logrecord::{LogLevel, LogRecord};
use crate::readers::bytecursor::{ByteCursor, CursorIndex};
use crate::readers::entryreader::{EntryError, EntryReader, FormatDescriptor, ResultEntry};
use crate::readers::formats::line::read_line_entry;

use std::io::Result;
use std::path::Path;

#[allow(unused_imports)]
use ::bstr::ByteSlice;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Count of lines [`LeveledReader::probe`] examines for a record start.
pub const PROBE_LINES_MAX: usize = 16;

/// Continuation lines are joined to the message with this.
pub const CONTINUATION_JOIN: char = '\n';

/// Reader for `LEVEL DATETIME CONTEXT MESSAGE` records.
#[derive(Debug)]
pub struct LeveledReader {
    /// timezone for datetimes without one
    tz_offset: FixedOffset,
    /// records with a header read since creation or `reset`
    count_records: Count,
}

impl Default for LeveledReader {
    fn default() -> Self {
        LeveledReader::new(fixedoffset_utc())
    }
}

/// Split a line into its first two space delimited tokens, the same way
/// [`ByteCursor::take_token`] would.
fn first_two_tokens(line: &[u8]) -> (Option<&[u8]>, Option<&[u8]>) {
    let mut tokens = line.split(|b| *b == SPu8);
    // a leading space means no first token
    let first = tokens
        .next()
        .filter(|token| !token.is_empty());
    let second = tokens.find(|token| !token.is_empty());

    (first, second)
}

impl LeveledReader {
    pub const NAME: &'static str = "leveled";

    pub fn new(tz_offset: FixedOffset) -> LeveledReader {
        LeveledReader {
            tz_offset,
            count_records: 0,
        }
    }

    /// Count of records with a header read since creation or last `reset`.
    pub const fn count_records(&self) -> Count {
        self.count_records
    }

    /// Does `line` (no line terminators) begin a record?
    pub fn line_is_record_start(
        &self,
        line: &[u8],
    ) -> bool {
        let (level, datetime) = match first_two_tokens(line) {
            (Some(level), Some(datetime)) => (level, datetime),
            _ => return false,
        };
        if LogLevel::from_token(level).is_none() {
            return false;
        }

        bytes_to_datetime(datetime, &self.tz_offset).is_some()
    }

    /// Read the header tokens and message of a record start line, then fold
    /// following continuation lines into the message.
    fn read_record(
        &mut self,
        cursor: &mut ByteCursor,
    ) -> ResultEntry {
        let position: CursorIndex = cursor.position();
        let line_end: CursorIndex = cursor.scan_to(&LINE_TERMINATORS);
        defn!("position {}, line_end {}", position, line_end);

        let token_level: String = match cursor.take_token(None)? {
            Some(val) => val,
            None => {
                return Err(EntryError::decode(String::from("missing level"), position));
            }
        };
        let level: LogLevel = match LogLevel::from_token(token_level.as_bytes()) {
            Some(val) => val,
            None => {
                return Err(EntryError::decode(format!("unknown level {:?}", token_level), position));
            }
        };
        let token_dt: String = match cursor.take_token(None)? {
            Some(val) => val,
            None => {
                return Err(EntryError::decode(String::from("missing datetime"), position));
            }
        };
        let timestamp = match datetime_parse_token(token_dt.as_str(), &self.tz_offset) {
            Some(val) => val,
            None => {
                return Err(EntryError::decode(format!("bad datetime {:?}", token_dt), position));
            }
        };
        if cursor.position() >= line_end {
            // the datetime token ended the line; finish the line so the next
            // call does not begin at a stray line terminator
            if cursor.position() == line_end && !cursor.is_exhausted() {
                cursor.skip_line();
            }
            defx!("missing context; position {}", cursor.position());
            return Err(EntryError::decode(
                format!("missing context after datetime {:?}", token_dt),
                position,
            ));
        }
        let context: Option<String> = cursor.take_token(None)?;
        let mut message: String = String::new();
        if cursor.position() <= line_end && !cursor.is_exhausted() {
            message = cursor.take_line()?;
        }
        while !cursor.is_exhausted() && !self.is_record_start(cursor) {
            let line = cursor.take_line()?;
            defo!("continuation {:?}", line);
            message.push(CONTINUATION_JOIN);
            message.push_str(line.as_str());
        }
        self.count_records += 1;
        defx!("return record {}; position {}", self.count_records, cursor.position());

        Ok(LogRecord::from_parts(message, Some(level), Some(timestamp), context))
    }
}

impl EntryReader for LeveledReader {
    fn name(&self) -> &'static str {
        LeveledReader::NAME
    }

    /// Match if any of the first [`PROBE_LINES_MAX`] non-empty lines is a
    /// record start.
    fn probe(
        &self,
        _path: &Path,
        bytes: &[u8],
    ) -> Result<FormatDescriptor> {
        defn!("({:?}) bytes len {}", _path, bytes.len());
        let found: bool = bytes
            .split(|b| LINE_TERMINATORS.contains(b))
            .filter(|line| !line.is_empty())
            .take(PROBE_LINES_MAX)
            .any(|line| self.line_is_record_start(line));
        defx!("found {}", found);
        if found {
            return Ok(FormatDescriptor::matched());
        }

        Ok(FormatDescriptor::not_matched())
    }

    fn is_record_start(
        &self,
        cursor: &ByteCursor,
    ) -> bool {
        self.line_is_record_start(cursor.peek_line())
    }

    fn folds_continuation_lines(&self) -> bool {
        true
    }

    fn read_entry(
        &mut self,
        cursor: &mut ByteCursor,
    ) -> ResultEntry {
        if !self.is_record_start(cursor) {
            defñ!("not a record start {:?}", cursor.peek_line().as_bstr());
            return read_line_entry(cursor);
        }

        self.read_record(cursor)
    }

    fn reset(&mut self) {
        defñ!("count_records was {}", self.count_records);
        self.count_records = 0;
    }
}
