// src/readers/tailprocessor.rs

//! Implements a [`TailProcessor`], the driver that turns the bytes appended
//! to one log file into [`LogRecord`]s, one poll at a time.
//!
//! Each poll:
//! 1. asks the [`FileTailer`] for new bytes
//! 2. on the first bytes of a file (or after the file was recreated) selects
//!    the format with a [`FormatRegistry`], normalizing the file first if the
//!    format asks for it
//! 3. loads the bytes into a [`ByteCursor`] and reads records with
//!    [`read_next_entry`] until the cursor is exhausted
//!
//! Bytes that cannot be read yet are held and prepended to the bytes of the
//! next poll: an incomplete last line if [`TailConfig::hold_partial_line`],
//! and the last record of a format that folds continuation lines. A later
//! poll may append continuation lines to that record.
//!
//! A `TailProcessor` owns all of its state and is `Send`; the _tlp_ program
//! runs one per thread.
//!
//! [`LogRecord`]: crate::data::logrecord::LogRecord
//! [`FileTailer`]: crate::readers::filetailer::FileTailer
//! [`FormatRegistry`]: crate::readers::formats::FormatRegistry
//! [`ByteCursor`]: crate::readers::bytecursor::ByteCursor
//! [`read_next_entry`]: crate::readers::entryreader::read_next_entry

#![allow(non_snake_case)]

use crate::common::{Bytes, Count, FPath, LINE_TERMINATORS};
use crate::data::datetime::{fixedoffset_utc, FixedOffset};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_wrn};
use crate::readers::bytecursor::{ByteCursor, CursorIndex, Encoding, UTF_8};
use crate::readers::entryreader::{read_next_entry, EntryReader, ResultEntry};
use crate::readers::filetailer::{ByteSource, FileTailer, FsByteSource, TailStage};
use crate::readers::formats::FormatRegistry;
use crate::readers::helpers::complete_lines_len;

use std::fmt;
use std::io::Result;
use std::path::Path;

#[allow(unused_imports)]
use ::bstr::ByteSlice;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TailConfig
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings shared by every [`TailProcessor`].
#[derive(Clone, Copy, Debug)]
pub struct TailConfig {
    /// Text encoding of the files, unless the selected format requires
    /// another.
    pub encoding: &'static Encoding,
    /// Do not read trailing bytes after the last line terminator. Keep them
    /// and prepend them to the bytes of the next poll, so a line written in
    /// two parts is one record.
    pub hold_partial_line: bool,
    /// Timezone of datetimes that do not have one.
    pub tz_offset: FixedOffset,
}

impl Default for TailConfig {
    fn default() -> Self {
        TailConfig {
            encoding: UTF_8,
            hold_partial_line: false,
            tz_offset: fixedoffset_utc(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TailProcessor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The records of one [`TailProcessor::poll`].
#[derive(Debug, Default)]
pub struct PollResult {
    /// Records and per-record errors, in file order.
    pub entries: Vec<ResultEntry>,
    /// The file was truncated or recreated before this poll.
    pub recreated: bool,
    /// Name of the format in use, if one was selected yet.
    pub format: Option<&'static str>,
}

/// Accumulated statistics of a [`TailProcessor`].
///
/// For CLI option `--summary`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryTailProcessor {
    pub TailProcessor_path: FPath,
    pub TailProcessor_format: Option<&'static str>,
    pub TailProcessor_polls: Count,
    pub TailProcessor_bytes: Count,
    pub TailProcessor_records: Count,
    pub TailProcessor_errors: Count,
    pub TailProcessor_recreations: Count,
}

impl fmt::Display for SummaryTailProcessor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "format {}, polls {}, bytes {}, records {}, errors {}, recreations {}",
            self.TailProcessor_format.unwrap_or("(none)"),
            self.TailProcessor_polls,
            self.TailProcessor_bytes,
            self.TailProcessor_records,
            self.TailProcessor_errors,
            self.TailProcessor_recreations,
        )
    }
}

/// Polls one file and reads the records appended since the last poll.
pub struct TailProcessor<S: ByteSource = FsByteSource> {
    /// path passed to `new`; the tailer path differs after normalization
    path: FPath,
    tailer: FileTailer<S>,
    cursor: ByteCursor,
    config: TailConfig,
    registry: FormatRegistry,
    /// `None` until the first bytes are read
    reader: Option<Box<dyn EntryReader>>,
    /// held bytes of the last record and of an incomplete last line
    partial: Bytes,
    /// bytes were read before; line terminators leading the next bytes end a
    /// line already read
    read_any: bool,
    count_polls: Count,
    count_bytes: Count,
    count_records: Count,
    count_errors: Count,
    count_recreations: Count,
}

impl<S: ByteSource> fmt::Debug for TailProcessor<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TailProcessor")
            .field("path", &self.path)
            .field("tailer", &self.tailer)
            .field("cursor", &self.cursor)
            .field("format", &self.format())
            .field("partial", &self.partial.len())
            .finish()
    }
}

impl TailProcessor<FsByteSource> {
    /// Create a `TailProcessor` of a file on the local filesystem. Does not
    /// access the file.
    pub fn new(
        path: FPath,
        config: TailConfig,
        registry: FormatRegistry,
    ) -> TailProcessor<FsByteSource> {
        TailProcessor::with_source(path, FsByteSource::new(), config, registry)
    }
}

impl<S: ByteSource> TailProcessor<S> {
    pub fn with_source(
        path: FPath,
        source: S,
        config: TailConfig,
        registry: FormatRegistry,
    ) -> TailProcessor<S> {
        defñ!("({:?}, {:?})", path, config);
        TailProcessor {
            tailer: FileTailer::with_source(path.clone(), source),
            path,
            cursor: ByteCursor::new(config.encoding),
            config,
            registry,
            reader: None,
            partial: Bytes::new(),
            read_any: false,
            count_polls: 0,
            count_bytes: 0,
            count_records: 0,
            count_errors: 0,
            count_recreations: 0,
        }
    }

    /// The path passed to `new`.
    pub const fn path(&self) -> &FPath {
        &self.path
    }

    /// The path being tailed. Differs from [`path`] when the file was
    /// normalized into a replacement file.
    ///
    /// [`path`]: TailProcessor::path
    pub const fn path_tailed(&self) -> &FPath {
        self.tailer.path()
    }

    pub const fn stage(&self) -> TailStage {
        self.tailer.stage()
    }

    /// Name of the selected format.
    pub fn format(&self) -> Option<&'static str> {
        self.reader
            .as_ref()
            .map(|reader| reader.name())
    }

    /// Count of held bytes, see [`TailProcessor::flush`].
    pub fn partial_len(&self) -> usize {
        self.partial.len()
    }

    fn set_reader(
        &mut self,
        reader: Box<dyn EntryReader>,
    ) {
        let encoding: &'static Encoding = reader
            .encoding()
            .unwrap_or(self.config.encoding);
        defñ!("format {:?}, encoding {}", reader.name(), encoding.name());
        self.cursor.set_encoding(encoding);
        self.reader = Some(reader);
    }

    /// Select the format for `bytes`, the first bytes of the tailed file.
    ///
    /// If the format asks for a replacement file then normalize into it,
    /// switch the tailer to it, and return the replacement file's bytes.
    fn detect_format(
        &mut self,
        bytes: Bytes,
    ) -> Result<Bytes> {
        let path: FPath = self.tailer.path().clone();
        defn!("({:?})", path);
        let (reader, descriptor) = self
            .registry
            .select(&self.config, Path::new(&path), &bytes);
        let replacement: FPath = match descriptor.replacement {
            Some(val) => val,
            None => {
                self.set_reader(reader);
                defx!("format {:?}", self.format());
                return Ok(bytes);
            }
        };
        if let Err(err) = reader.normalize(Path::new(&path), Path::new(&replacement)) {
            e_wrn!(
                "format {:?} failed to normalize {:?} to {:?}; {}; fallback to format {:?}",
                reader.name(),
                path,
                replacement,
                err,
                self.registry.fallback().name,
            );
            let fallback: Box<dyn EntryReader> = self.registry.new_fallback(&self.config);
            self.set_reader(fallback);
            defx!("format {:?}", self.format());
            return Ok(bytes);
        }
        self.set_reader(reader);
        self.tailer.set_path(replacement);
        let tailread = self.tailer.poll()?;
        defx!("format {:?}; replacement {:?} bytes {}", self.format(), self.tailer.path(), tailread.bytes.len());

        Ok(tailread.bytes)
    }

    /// Read the records appended to the file since the previous poll.
    ///
    /// An I/O error of the file is returned as `Err`; nothing was consumed
    /// and the next poll tries again. Records that could not be read are
    /// [`EntryError`]s within `Ok`.
    ///
    /// [`EntryError`]: crate::readers::entryreader::EntryError
    pub fn poll(&mut self) -> Result<PollResult> {
        defn!("({:?}) poll {}", self.path, self.count_polls + 1);
        self.count_polls += 1;
        let tailread = self.tailer.poll()?;
        let recreated: bool = tailread.recreated;
        let mut bytes: Bytes = tailread.bytes;
        if recreated {
            de_wrn!("file {:?} was truncated or recreated", self.tailer.path());
            self.count_recreations += 1;
            self.partial.clear();
            self.read_any = false;
            if let Some(reader) = self.reader.as_mut() {
                reader.reset();
            }
            self.reader = None;
        }
        if bytes.is_empty() {
            defx!("no new bytes");
            return Ok(PollResult {
                entries: Vec::new(),
                recreated,
                format: self.format(),
            });
        }
        if self.reader.is_none() {
            bytes = self.detect_format(bytes)?;
        }
        self.count_bytes += bytes.len() as Count;
        if self.read_any && self.partial.is_empty() {
            let len_terminators: usize = bytes
                .iter()
                .take_while(|b| LINE_TERMINATORS.contains(*b))
                .count();
            if len_terminators > 0 {
                defo!("drop {} line terminators ending the line of the previous poll", len_terminators);
                bytes.drain(..len_terminators);
            }
        }
        self.read_any = true;
        let mut data: Bytes = std::mem::take(&mut self.partial);
        data.extend_from_slice(&bytes);
        if self.config.hold_partial_line {
            let len_complete: usize = complete_lines_len(&data);
            self.partial = data.split_off(len_complete);
        }
        let data: Bytes = self.hold_last_record(data);
        defo!("hold {} bytes {:?}", self.partial.len(), self.partial.as_bstr());
        let entries: Vec<ResultEntry> = self.read_entries(data);
        defx!("return {} entries", entries.len());

        Ok(PollResult {
            entries,
            recreated,
            format: self.format(),
        })
    }

    /// Read records from any held bytes, e.g. before the program exits.
    ///
    /// The held last record is complete only once the next record start is
    /// read, so a program that stops tailing should flush.
    pub fn flush(&mut self) -> Vec<ResultEntry> {
        let data: Bytes = std::mem::take(&mut self.partial);
        defñ!("({:?}) {} held bytes", self.path, data.len());

        self.read_entries(data)
    }

    /// Move the bytes of the last record in `data` to the front of the held
    /// bytes, if the format folds continuation lines. Returns the rest.
    ///
    /// If no line of `data` is a record start then nothing is held.
    fn hold_last_record(
        &mut self,
        data: Bytes,
    ) -> Bytes {
        let reader: &dyn EntryReader = match self.reader.as_deref() {
            Some(val) if val.folds_continuation_lines() => val,
            _ => return data,
        };
        self.cursor.load(data);
        let mut start: Option<CursorIndex> = None;
        while !self.cursor.is_exhausted() {
            if reader.is_record_start(&self.cursor) {
                start = Some(self.cursor.position());
            }
            self.cursor.skip_line();
        }
        let mut data: Bytes = self.cursor.unload();
        if let Some(start) = start {
            let mut held: Bytes = data.split_off(start);
            held.extend_from_slice(&self.partial);
            self.partial = held;
        }

        data
    }

    fn read_entries(
        &mut self,
        data: Bytes,
    ) -> Vec<ResultEntry> {
        let mut entries: Vec<ResultEntry> = Vec::new();
        if data.is_empty() {
            return entries;
        }
        let reader: &mut Box<dyn EntryReader> = match self.reader.as_mut() {
            Some(val) => val,
            None => {
                de_err!("no format selected for {:?}; {} bytes dropped", self.path, data.len());
                return entries;
            }
        };
        self.cursor.load(data);
        while !self.cursor.is_exhausted() {
            let result: ResultEntry = read_next_entry(reader.as_mut(), &mut self.cursor);
            match result {
                Ok(_) => self.count_records += 1,
                Err(_) => self.count_errors += 1,
            }
            entries.push(result);
        }

        entries
    }

    pub fn summary(&self) -> SummaryTailProcessor {
        SummaryTailProcessor {
            TailProcessor_path: self.path.clone(),
            TailProcessor_format: self.format(),
            TailProcessor_polls: self.count_polls,
            TailProcessor_bytes: self.count_bytes,
            TailProcessor_records: self.count_records,
            TailProcessor_errors: self.count_errors,
            TailProcessor_recreations: self.count_recreations,
        }
    }
}
