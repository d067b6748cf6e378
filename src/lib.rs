// src/lib.rs

//! _tlplib_ reads log files while they are written to.
//!
//! Bytes appended to a file are read by a [`FileTailer`], parsed into
//! [`LogRecord`]s by an [`EntryReader`] chosen per file, and handed to the
//! caller by a [`TailProcessor`].
//!
//! _tlplib_ is used by the binary program _tlp_.
//!
//! [`FileTailer`]: crate::readers::filetailer::FileTailer
//! [`LogRecord`]: crate::data::logrecord::LogRecord
//! [`EntryReader`]: crate::readers::entryreader::EntryReader
//! [`TailProcessor`]: crate::readers::tailprocessor::TailProcessor

pub mod common;
pub mod data;
pub mod debug;
pub mod printer;
pub mod readers;
#[cfg(test)]
pub mod tests;
