// src/readers/entryreader.rs

//! The [`EntryReader`] trait implemented by each log format, the
//! [`EntryError`] returned per record, and [`read_next_entry`], the boundary
//! between "try to read one record" and "report to the caller".
//!
//! [`EntryReader`]: self::EntryReader
//! [`EntryError`]: self::EntryError
//! [`read_next_entry`]: self::read_next_entry

use crate::common::FPath;
use crate::data::logrecord::LogRecord;
use crate::readers::bytecursor::{ByteCursor, CursorError, CursorIndex, Encoding};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn};

use std::fmt;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;

use ::more_asserts::debug_assert_gt;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FormatDescriptor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Outcome of [`EntryReader::probe`].
///
/// If `is_match` and there is a `replacement` then the bytes should be
/// normalized with [`EntryReader::normalize`] into a file at path
/// `replacement`, and that file read instead of the original.
///
/// Created once per file and not persisted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormatDescriptor {
    pub is_match: bool,
    pub replacement: Option<FPath>,
}

impl FormatDescriptor {
    /// Bytes match, no preprocessing needed.
    pub const fn matched() -> FormatDescriptor {
        FormatDescriptor {
            is_match: true,
            replacement: None,
        }
    }

    /// Bytes match and must be normalized into `replacement`.
    pub const fn matched_replace(replacement: FPath) -> FormatDescriptor {
        FormatDescriptor {
            is_match: true,
            replacement: Some(replacement),
        }
    }

    pub const fn not_matched() -> FormatDescriptor {
        FormatDescriptor {
            is_match: false,
            replacement: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EntryError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Kind of an [`EntryError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryErrorKind {
    /// Read attempted past the last byte. Means "nothing more to read right
    /// now", not corruption.
    BeyondBuffer,
    /// Bytes could not be read as a valid token, datetime, or line of the
    /// active format. Only this record is affected.
    Decode,
}

/// A failure to read one record.
///
/// Carries a best-effort empty [`LogRecord`] so the caller may decide to
/// skip, abort, or show the error in place of the record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryError {
    kind: EntryErrorKind,
    message: String,
    /// cursor position where the failed read started
    position: CursorIndex,
    record: LogRecord,
}

impl EntryError {
    pub fn new(
        kind: EntryErrorKind,
        message: String,
        position: CursorIndex,
    ) -> EntryError {
        EntryError {
            kind,
            message,
            position,
            record: LogRecord::empty(),
        }
    }

    /// Helper for a [`EntryErrorKind::Decode`] error.
    pub fn decode(
        message: String,
        position: CursorIndex,
    ) -> EntryError {
        EntryError::new(EntryErrorKind::Decode, message, position)
    }

    pub const fn kind(&self) -> EntryErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub const fn position(&self) -> CursorIndex {
        self.position
    }

    /// The best-effort record.
    pub const fn record(&self) -> &LogRecord {
        &self.record
    }

    pub fn into_record(self) -> LogRecord {
        self.record
    }
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryErrorKind::BeyondBuffer => write!(f, "{}", self.message),
            EntryErrorKind::Decode => write!(f, "decode error at position {}: {}", self.position, self.message),
        }
    }
}

impl std::error::Error for EntryError {}

impl From<CursorError> for EntryError {
    fn from(err: CursorError) -> Self {
        match err {
            CursorError::BeyondBuffer { position, .. } => {
                EntryError::new(EntryErrorKind::BeyondBuffer, err.to_string(), position)
            }
            CursorError::Truncated { position, .. } => EntryError::decode(err.to_string(), position),
        }
    }
}

/// Result of reading one record.
pub type ResultEntry = std::result::Result<LogRecord, EntryError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EntryReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A log format. Reads one [`LogRecord`] per call from a [`ByteCursor`].
///
/// Implementors only define tokenization; callers should go through
/// [`read_next_entry`] which enforces the error and progress guarantees.
pub trait EntryReader: Send {
    /// Short unique name of the format, e.g. `"line"`.
    fn name(&self) -> &'static str;

    /// Inspect the first bytes loaded from the file at `path`, before any
    /// record is read.
    ///
    /// An `Err` is treated the same as "no match".
    ///
    /// Default matches anything with no preprocessing.
    fn probe(
        &self,
        _path: &Path,
        _bytes: &[u8],
    ) -> Result<FormatDescriptor> {
        Ok(FormatDescriptor::matched())
    }

    /// Write a normalized copy of `src` to `dst`. Only called when
    /// [`probe`] returned a replacement.
    ///
    /// [`probe`]: EntryReader::probe
    fn normalize(
        &self,
        src: &Path,
        _dst: &Path,
    ) -> Result<()> {
        Err(Error::new(
            ErrorKind::Unsupported,
            format!("format {:?} does not normalize files; {:?}", self.name(), src),
        ))
    }

    /// Text encoding this format requires, overriding the configured one.
    fn encoding(&self) -> Option<&'static Encoding> {
        None
    }

    /// Does the line at the cursor position begin a new record?
    ///
    /// Default is every line is a record.
    fn is_record_start(
        &self,
        _cursor: &ByteCursor,
    ) -> bool {
        true
    }

    /// Can lines after a record start belong to that record? If so a
    /// record is not complete until the next record start is read.
    ///
    /// Default is `false`, every line is complete.
    fn folds_continuation_lines(&self) -> bool {
        false
    }

    /// Read the record at the cursor position.
    ///
    /// The cursor is never exhausted when this is called.
    fn read_entry(
        &mut self,
        cursor: &mut ByteCursor,
    ) -> ResultEntry;

    /// Discard state kept across calls, e.g. after the file was recreated.
    fn reset(&mut self) {}
}

/// Read the next record from `cursor` using `reader`.
///
/// - If `cursor` is exhausted returns [`EntryErrorKind::BeyondBuffer`].
///   Callers should check [`ByteCursor::is_exhausted`] first; an exhausted
///   cursor means "no more entries", not an error.
/// - Any error from `reader` is returned with a best-effort empty record.
/// - Every call advances the cursor. If `reader` failed without consuming
///   bytes then the rest of the current line is skipped. Callers never
///   retry the same bytes forever.
pub fn read_next_entry(
    reader: &mut dyn EntryReader,
    cursor: &mut ByteCursor,
) -> ResultEntry {
    let position: CursorIndex = cursor.position();
    defn!("({:?}) position {}, len {}", reader.name(), position, cursor.len());
    if cursor.is_exhausted() {
        let err = EntryError::new(
            EntryErrorKind::BeyondBuffer,
            String::from("try to read beyond buffer"),
            position,
        );
        defx!("return {}", err);
        return Err(err);
    }
    let result: ResultEntry = reader.read_entry(cursor);
    if cursor.position() <= position {
        de_wrn!(
            "format {:?} did not advance from position {}; skip line",
            reader.name(),
            position
        );
        cursor.skip_line();
    }
    debug_assert_gt!(cursor.position(), position, "cursor did not advance");
    match result {
        Ok(record) => {
            defx!("return Ok; position {}", cursor.position());

            Ok(record)
        }
        Err(err) => {
            defx!("return Err {}; position {}", err, cursor.position());

            Err(EntryError::new(err.kind, err.message, position))
        }
    }
}
