// src/readers/formats/mod.rs

//! The log formats, each an [`EntryReader`], and the [`FormatRegistry`] that
//! chooses among them.
//!
//! ## Formats
//!
//! - [`Utf16Normalizer`]: UTF-16 files, transcoded to UTF-8 then read as lines.
//! - [`LeveledReader`]: `LEVEL DATETIME CONTEXT MESSAGE` records with
//!   continuation lines.
//! - [`LineReader`]: one record per line. The fallback.
//!
//! [`EntryReader`]: crate::readers::entryreader::EntryReader
//! [`Utf16Normalizer`]: self::utf16::Utf16Normalizer
//! [`LeveledReader`]: self::leveled::LeveledReader
//! [`LineReader`]: self::line::LineReader

pub mod leveled;
pub mod line;
pub mod utf16;

use crate::readers::entryreader::{EntryReader, FormatDescriptor};
use crate::readers::tailprocessor::TailConfig;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_wrn};

use std::fmt;
use std::path::Path;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Creates a fresh [`EntryReader`] for one file.
pub type NewEntryReader = fn(&TailConfig) -> Box<dyn EntryReader>;

/// A named format in a [`FormatRegistry`].
#[derive(Clone, Copy)]
pub struct FormatEntry {
    pub name: &'static str,
    pub new: NewEntryReader,
}

impl fmt::Debug for FormatEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FormatEntry")
            .field("name", &self.name)
            .finish()
    }
}

fn new_line_reader(_config: &TailConfig) -> Box<dyn EntryReader> {
    Box::new(line::LineReader::new())
}

fn new_leveled_reader(config: &TailConfig) -> Box<dyn EntryReader> {
    Box::new(leveled::LeveledReader::new(config.tz_offset))
}

fn new_utf16_normalizer(_config: &TailConfig) -> Box<dyn EntryReader> {
    Box::new(utf16::Utf16Normalizer::new())
}

pub const FORMAT_LINE: FormatEntry = FormatEntry {
    name: line::LineReader::NAME,
    new: new_line_reader,
};

pub const FORMAT_LEVELED: FormatEntry = FormatEntry {
    name: leveled::LeveledReader::NAME,
    new: new_leveled_reader,
};

pub const FORMAT_UTF16: FormatEntry = FormatEntry {
    name: utf16::Utf16Normalizer::NAME,
    new: new_utf16_normalizer,
};

/// All formats provided by this crate.
pub const FORMATS_ALL: [FormatEntry; 3] = [
    FORMAT_UTF16,
    FORMAT_LEVELED,
    FORMAT_LINE,
];

/// Find a provided format by its name.
pub fn entry_by_name(name: &str) -> Option<FormatEntry> {
    FORMATS_ALL
        .iter()
        .find(|entry| entry.name == name)
        .copied()
}

/// An ordered list of formats tried by [`select`], and the fallback used when
/// none of them match.
///
/// Constructed by the caller and shared (cloned) into each
/// [`TailProcessor`]. There is no global registry.
///
/// [`select`]: FormatRegistry::select
/// [`TailProcessor`]: crate::readers::tailprocessor::TailProcessor
#[derive(Clone, Debug)]
pub struct FormatRegistry {
    formats: Vec<FormatEntry>,
    fallback: FormatEntry,
}

impl Default for FormatRegistry {
    /// UTF-16 first then leveled, falling back to lines.
    fn default() -> Self {
        FormatRegistry::new(vec![FORMAT_UTF16, FORMAT_LEVELED], FORMAT_LINE)
    }
}

impl FormatRegistry {
    pub fn new(
        formats: Vec<FormatEntry>,
        fallback: FormatEntry,
    ) -> FormatRegistry {
        FormatRegistry { formats, fallback }
    }

    /// A registry that always selects `entry`, without probing.
    pub fn with_only(entry: FormatEntry) -> FormatRegistry {
        FormatRegistry::new(Vec::new(), entry)
    }

    pub fn formats(&self) -> &[FormatEntry] {
        self.formats.as_slice()
    }

    pub const fn fallback(&self) -> &FormatEntry {
        &self.fallback
    }

    /// A new instance of the fallback reader.
    pub fn new_fallback(
        &self,
        config: &TailConfig,
    ) -> Box<dyn EntryReader> {
        (self.fallback.new)(config)
    }

    /// Probe `bytes`, the first bytes of file `path`, with each format in
    /// order. Returns a new reader of the first format that matches, and its
    /// [`FormatDescriptor`].
    ///
    /// A probe that returns `Err` is a non-match. If no format matches then
    /// the fallback is returned without probing.
    pub fn select(
        &self,
        config: &TailConfig,
        path: &Path,
        bytes: &[u8],
    ) -> (Box<dyn EntryReader>, FormatDescriptor) {
        defn!("({:?}) bytes len {}", path, bytes.len());
        for entry in self.formats.iter() {
            let reader: Box<dyn EntryReader> = (entry.new)(config);
            match reader.probe(path, bytes) {
                Ok(descriptor) if descriptor.is_match => {
                    defx!("selected {:?} {:?}", entry.name, descriptor);
                    return (reader, descriptor);
                }
                Ok(_descriptor) => {
                    defo!("{:?} no match", entry.name);
                }
                Err(err) => {
                    e_wrn!("format {:?} probe failed for {:?}; {}", entry.name, path, err);
                }
            }
        }
        defx!("selected fallback {:?}", self.fallback.name);

        (self.new_fallback(config), FormatDescriptor::matched())
    }
}
