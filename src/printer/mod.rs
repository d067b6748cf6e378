// src/printer/mod.rs

//! The `printer` module is for printing user-facing [`LogRecord`s] with
//! level colors, and the `--summary` statistics.
//!
//! [`LogRecord`s]: crate::data::logrecord::LogRecord

pub mod printers;
pub mod summary;
