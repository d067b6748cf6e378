// src/readers/mod.rs

//! "Readers" for _tlplib_.
//!
//! ## Overview of readers
//!
//! * A [`TailProcessor`] drives a [`FileTailer`] and an [`EntryReader`] to
//!   derive [`LogRecord`s] from one file.
//! * A `FileTailer` reads the bytes appended to a file since the last poll.
//! * An `EntryReader` reads one `LogRecord` at a time from a [`ByteCursor`].
//!   There is one `EntryReader` per log format, see [`formats`].
//! * A `ByteCursor` only handles `u8` bytes, and decodes them to text when
//!   a token or line is taken.
//!
//! <br/>
//!
//! The _tlp_ binary program uses a [`TailProcessor`] instance, one per file
//! and thread, to poll the file.
//!
//! <br/>
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`Read`]: std::io::Read
//! [`LogRecord`s]: crate::data::logrecord::LogRecord
//! [`ByteCursor`]: crate::readers::bytecursor::ByteCursor
//! [`EntryReader`]: crate::readers::entryreader::EntryReader
//! [`FileTailer`]: crate::readers::filetailer::FileTailer
//! [`TailProcessor`]: crate::readers::tailprocessor::TailProcessor
//! [`formats`]: crate::readers::formats

pub mod bytecursor;
pub mod entryreader;
pub mod filetailer;
pub mod formats;
pub mod helpers;
pub mod tailprocessor;
