// src/readers/formats/line.rs

//! Implements [`LineReader`], the default format; one line, one record.

use crate::data::logrecord::LogRecord;
use crate::readers::bytecursor::ByteCursor;
use crate::readers::entryreader::{EntryReader, ResultEntry};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// The fallback format. Every line is a record with only a message.
///
/// Other formats match before this one; this one always matches.
#[derive(Debug, Default)]
pub struct LineReader {}

impl LineReader {
    pub const NAME: &'static str = "line";

    pub fn new() -> LineReader {
        LineReader {}
    }
}

/// Read one line into a message-only record. Shared by formats that fall
/// back to plain lines.
pub(crate) fn read_line_entry(cursor: &mut ByteCursor) -> ResultEntry {
    let line = cursor.take_line()?;

    Ok(LogRecord::from_message(line))
}

impl EntryReader for LineReader {
    fn name(&self) -> &'static str {
        LineReader::NAME
    }

    fn read_entry(
        &mut self,
        cursor: &mut ByteCursor,
    ) -> ResultEntry {
        read_line_entry(cursor)
    }
}
