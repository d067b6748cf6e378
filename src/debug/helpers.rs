// src/debug/helpers.rs

//! Miscellaneous helper functions for testing.

use crate::common::{FPath, FileOpenOptions};

use crate::readers::helpers::path_to_fpath;

use std::io::Write;

extern crate lazy_static;
use lazy_static::lazy_static;

extern crate si_trace_print;
use si_trace_print::{dpfo, dpfñ};

extern crate tempfile;

#[doc(hidden)]
pub use tempfile::tempdir;
#[doc(hidden)]
pub use tempfile::NamedTempFile;
#[doc(hidden)]
pub use tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// NamedTempFile instances default to this file name prefix.
///
/// See <https://github.com/Stebalien/tempfile/issues/183>.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-tlp-test-";

lazy_static! {
    pub static ref STRING_TEMPFILE_PREFIX: String = String::from(STR_TEMPFILE_PREFIX);
}

/// Small helper function for copying `NamedTempFile` path to a `FPath`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    path_to_fpath(ntf.path())
}

/// Testing helper function to write a `[u8]` to a temporary file.
pub fn create_temp_file_bytes(data: &[u8]) -> NamedTempFile {
    let mut ntf = match tempfile::Builder::new()
        // use known prefix for easier cleanup
        .prefix::<str>(&STRING_TEMPFILE_PREFIX)
        .tempfile()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("NamedTempFile::new() return Err {}", err);
        }
    };
    match ntf.write_all(data) {
        Ok(_) => {}
        Err(err) => {
            panic!("NamedTempFile::write_all() return Err {}", err);
        }
    }
    dpfñ!("{:?} {} bytes", ntf.path(), data.len());

    ntf
}

/// Testing helper function to write a `str` to a temporary file.
///
/// BUG: `NamedTempFile` created within `lazy_static` will fail to remove itself
///      <https://github.com/Stebalien/tempfile/issues/183>.
pub fn create_temp_file(data: &str) -> NamedTempFile {
    create_temp_file_bytes(data.as_bytes())
}

/// Testing helper function to append `data` to the file at `path`, like a
/// process writing a log.
pub fn append_to_file(
    path: &FPath,
    data: &[u8],
) {
    dpfo!("append {} bytes to {:?}", data.len(), path);
    let mut file = match FileOpenOptions::new()
        .append(true)
        .open(path)
    {
        Ok(val) => val,
        Err(err) => panic!("open({:?}) return Err {}", path, err),
    };
    match file.write_all(data) {
        Ok(_) => {}
        Err(err) => panic!("write_all({:?}) return Err {}", path, err),
    }
}

/// Testing helper function to replace the contents of the file at `path`,
/// like a log rotation that truncates the file.
pub fn rewrite_file(
    path: &FPath,
    data: &[u8],
) {
    dpfo!("rewrite {:?} with {} bytes", path, data.len());
    match std::fs::write(path, data) {
        Ok(_) => {}
        Err(err) => panic!("write({:?}) return Err {}", path, err),
    }
}

/// Create a temporary directory
pub fn create_temp_dir() -> TempDir {
    dpfñ!();
    tempfile::tempdir().unwrap()
}

/// Path of file `name` within `tempdir`. Does not create the file.
pub fn fpath_in_tmpdir(
    tempdir: &TempDir,
    name: &str,
) -> FPath {
    path_to_fpath(tempdir.path().join(name).as_path())
}
