// src/common.rs
//
// common imports, type aliases, and other globals (avoids circular imports)

//! Common imports, type aliases, and other globals for _tlplib_.

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub use std::fs::File;

// TODO: use `std::path::PathBuf` for `FPath`
/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;
pub type FPaths = Vec<FPath>;
pub type FileOpenOptions = std::fs::OpenOptions;

/// Offset into a file in bytes
pub type FileOffset = u64;

/// File size in bytes
pub type FileSz = u64;

/// Sequence of Bytes
pub type Bytes = Vec<u8>;

/// A general-purpose counting type
pub type Count = u64;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// byte delimiters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Carriage return as u8
#[allow(non_upper_case_globals)]
pub const CRu8: u8 = b'\r';
/// Line feed (newline) as u8
#[allow(non_upper_case_globals)]
pub const NLu8: u8 = b'\n';
/// Space as u8
#[allow(non_upper_case_globals)]
pub const SPu8: u8 = b' ';

/// Line terminators; either may end a line and any run of them is one
/// delimiter.
pub const LINE_TERMINATORS: [u8; 2] = [CRu8, NLu8];
/// Delimiters that end an unsized token.
pub const TOKEN_DELIMITERS: [u8; 3] = [SPu8, CRu8, NLu8];
/// Padding between tokens.
pub const TOKEN_PADDING: [u8; 1] = [SPu8];
