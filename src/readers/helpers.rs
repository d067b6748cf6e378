// src/readers/helpers.rs

//! Miscellaneous helper functions for _Readers_.

use std;

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    FPath,
    LINE_TERMINATORS,
};

/// Return the basename of an `FPath`.
pub fn basename(path: &FPath) -> FPath {
    let mut riter = path.rsplit(std::path::MAIN_SEPARATOR);

    FPath::from(riter.next().unwrap_or(""))
}

/// Helper function for a slightly annoying set of calls.
pub fn path_to_fpath(path: &std::path::Path) -> FPath {
    // `PathBuf` to `String` https://stackoverflow.com/q/37388107/471376
    (*(path.to_string_lossy())).to_string()
}

/// Index one past the last line terminator in `bytes`, i.e. the length of
/// the complete lines. `0` if there is no line terminator.
///
/// The bytes after it are a partial line.
pub fn complete_lines_len(bytes: &[u8]) -> usize {
    match bytes.iter().rposition(|b| LINE_TERMINATORS.contains(b)) {
        Some(index) => index + 1,
        None => 0,
    }
}
