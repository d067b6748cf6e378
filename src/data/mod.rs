// src/data/mod.rs

//! The `data` module is specialized data containers for [`LogRecord`]s.
//!
//! ## Definitions of data
//!
//! ### Line
//!
//! A "line" is a sequence of bytes in a buffer that:
//!
//! * begin after a prior "line" or the beginning of a buffer.
//! * end with a carriage return `'\r'`, a newline `'\n'`, any run of those
//!   two, or the end of the buffer.
//!
//! ### Record
//!
//! A "record" is a sequence of "lines" that:
//!
//! * begins with a "line" the active log format recognizes as a record start,
//!   e.g. a line with a level and a datetime stamp.
//! * continues with zero or more "lines" that are not record starts.
//!
//! A record is represented by a [`LogRecord`] and found by an
//! [`EntryReader`].
//!
//! A `LogRecord` represents a "log message".
//!
//! Also see [_Overview of readers_].
//!
//! [_Overview of readers_]: crate::readers
//! [`EntryReader`]: crate::readers::entryreader::EntryReader
//! [`LogRecord`]: crate::data::logrecord::LogRecord

pub mod datetime;
pub mod logrecord;
