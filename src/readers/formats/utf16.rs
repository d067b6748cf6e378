// src/readers/formats/utf16.rs

//! Implements [`Utf16Normalizer`], a format for UTF-16 encoded log files.
//!
//! The byte-oriented readers cannot split UTF-16 on single `'\r'` and `'\n'`
//! bytes. So a UTF-16 file is transcoded once to a UTF-8 file next to it and
//! the UTF-8 file is read instead, one line per record.
//!
//! The transcoded file is a snapshot. Bytes appended to the original file
//! afterwards are not seen.

use crate::common::{FPath, FileOpenOptions};
use crate::readers::bytecursor::{ByteCursor, Encoding};
use crate::readers::entryreader::{EntryReader, FormatDescriptor, ResultEntry};
use crate::readers::formats::line::read_line_entry;
use crate::readers::helpers::path_to_fpath;

use std::io::{Result, Write};
use std::path::Path;

use ::encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Suffix appended to the original path to name the transcoded file.
pub const NORMALIZED_SUFFIX: &str = ".utf8";

/// Transcodes UTF-16 (with byte-order mark) to UTF-8 then reads lines.
#[derive(Debug, Default)]
pub struct Utf16Normalizer {}

impl Utf16Normalizer {
    pub const NAME: &'static str = "utf16";

    pub fn new() -> Utf16Normalizer {
        Utf16Normalizer {}
    }

    /// The UTF-16 encoding announced by the byte-order mark of `bytes`, if any.
    pub fn bom_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
        match Encoding::for_bom(bytes) {
            Some((encoding, _bom_len)) if encoding == UTF_16LE || encoding == UTF_16BE => Some(encoding),
            _ => None,
        }
    }

    /// Path of the transcoded file for original `path`.
    pub fn normalized_path(path: &Path) -> FPath {
        let mut fpath: FPath = path_to_fpath(path);
        fpath.push_str(NORMALIZED_SUFFIX);

        fpath
    }
}

impl EntryReader for Utf16Normalizer {
    fn name(&self) -> &'static str {
        Utf16Normalizer::NAME
    }

    fn probe(
        &self,
        path: &Path,
        bytes: &[u8],
    ) -> Result<FormatDescriptor> {
        defn!("({:?})", path);
        match Utf16Normalizer::bom_encoding(bytes) {
            Some(_encoding) => {
                let replacement = Utf16Normalizer::normalized_path(path);
                defx!("{} BOM; replacement {:?}", _encoding.name(), replacement);

                Ok(FormatDescriptor::matched_replace(replacement))
            }
            None => {
                defx!("no UTF-16 BOM");

                Ok(FormatDescriptor::not_matched())
            }
        }
    }

    fn normalize(
        &self,
        src: &Path,
        dst: &Path,
    ) -> Result<()> {
        defn!("({:?}, {:?})", src, dst);
        let bytes = std::fs::read(src)?;
        // `decode` sniffs and removes the BOM; the fallback is never used for
        // files that passed `probe`
        let (text, _encoding, _malformed) = UTF_16LE.decode(&bytes);
        defo!("decoded {} bytes as {}, malformed {}", bytes.len(), _encoding.name(), _malformed);
        let mut file = FileOpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(dst)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        defx!("wrote {} bytes to {:?}", text.len(), dst);

        Ok(())
    }

    fn encoding(&self) -> Option<&'static Encoding> {
        Some(UTF_8)
    }

    fn read_entry(
        &mut self,
        cursor: &mut ByteCursor,
    ) -> ResultEntry {
        read_line_entry(cursor)
    }
}
