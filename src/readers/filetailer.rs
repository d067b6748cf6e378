// src/readers/filetailer.rs

//! Implements a [`FileTailer`], which reads only the bytes appended to a file
//! since the previous poll.
//!
//! The tailer remembers the file length observed at the last successful poll.
//! A file that becomes shorter was truncated or recreated (e.g. by log
//! rotation) and is read again from the start.
//!
//! A file replaced by a different file of exactly the same length is not
//! detected.
//!
//! [`FileTailer`]: self::FileTailer

use crate::common::{Bytes, FPath, FileOffset, FileOpenOptions, FileSz, File};

use std::fmt;
use std::io::{Read, Result, Seek, SeekFrom};
use std::path::Path;

use ::more_asserts::debug_assert_le;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ByteSource
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where a [`FileTailer`] gets its bytes.
pub trait ByteSource: Send {
    /// Current length of the file at `path`.
    fn file_length(&mut self, path: &Path) -> Result<FileSz>;

    /// Read up to `count` bytes from `path` starting at offset `start`.
    ///
    /// Returns fewer bytes if the file ends sooner.
    fn read_bytes(
        &mut self,
        path: &Path,
        start: FileOffset,
        count: FileSz,
    ) -> Result<Bytes>;
}

/// [`ByteSource`] for files on the local filesystem.
///
/// Each call opens the file anew, read-only. On Windows the file is opened
/// with shared read, write and delete access so a process writing or
/// rotating the log is not blocked.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsByteSource {}

#[cfg(windows)]
const FILE_SHARE_READ_WRITE_DELETE: u32 = 0x1 | 0x2 | 0x4;

impl FsByteSource {
    pub fn new() -> FsByteSource {
        FsByteSource {}
    }

    fn open(path: &Path) -> Result<File> {
        let mut open_options = FileOpenOptions::new();
        open_options.read(true);
        #[cfg(windows)]
        {
            use std::os::windows::fs::OpenOptionsExt;
            open_options.share_mode(FILE_SHARE_READ_WRITE_DELETE);
        }
        defñ!("open_options.read(true).open({:?})", path);

        open_options.open(path)
    }
}

impl ByteSource for FsByteSource {
    fn file_length(&mut self, path: &Path) -> Result<FileSz> {
        let file: File = FsByteSource::open(path)?;

        Ok(file.metadata()?.len() as FileSz)
    }

    fn read_bytes(
        &mut self,
        path: &Path,
        start: FileOffset,
        count: FileSz,
    ) -> Result<Bytes> {
        defn!("({:?}, {}, {})", path, start, count);
        let mut file: File = FsByteSource::open(path)?;
        file.seek(SeekFrom::Start(start))?;
        let mut buffer: Bytes = Bytes::with_capacity(count as usize);
        file.take(count).read_to_end(&mut buffer)?;
        defx!("read {} bytes", buffer.len());

        Ok(buffer)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FileTailer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stage of a [`FileTailer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TailStage {
    /// Nothing read yet.
    Unread,
    /// Reading appended bytes.
    Tailing,
    /// The last poll found the file shorter than before and read it from
    /// the start. Lasts until the next poll.
    Recreated,
}

/// The bytes found by one [`FileTailer::poll`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TailRead {
    /// Bytes appended since the previous poll. Empty if nothing changed.
    pub bytes: Bytes,
    /// The file was truncated or recreated; `bytes` are from offset `0`.
    pub recreated: bool,
    /// File offset of the first byte of `bytes`.
    pub offset: FileOffset,
}

/// Reads newly appended bytes of one file.
pub struct FileTailer<S: ByteSource = FsByteSource> {
    path: FPath,
    source: S,
    /// file length at the last successful poll
    filesz: FileSz,
    stage: TailStage,
}

impl<S: ByteSource> fmt::Debug for FileTailer<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FileTailer")
            .field("path", &self.path)
            .field("filesz", &self.filesz)
            .field("stage", &self.stage)
            .finish()
    }
}

impl FileTailer<FsByteSource> {
    /// Create a `FileTailer` of a file on the local filesystem. Does not
    /// access the file.
    pub fn new(path: FPath) -> FileTailer<FsByteSource> {
        FileTailer::with_source(path, FsByteSource::new())
    }
}

impl<S: ByteSource> FileTailer<S> {
    pub fn with_source(
        path: FPath,
        source: S,
    ) -> FileTailer<S> {
        defñ!("({:?})", path);
        FileTailer {
            path,
            source,
            filesz: 0,
            stage: TailStage::Unread,
        }
    }

    pub const fn path(&self) -> &FPath {
        &self.path
    }

    /// File length remembered from the last successful poll.
    pub const fn file_size(&self) -> FileSz {
        self.filesz
    }

    pub const fn stage(&self) -> TailStage {
        self.stage
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Forget the remembered length; the next poll reads the whole file.
    pub fn reset(&mut self) {
        defñ!("({:?})", self.path);
        self.filesz = 0;
        self.stage = TailStage::Unread;
    }

    /// Tail a different file, e.g. a normalized copy of the original, from
    /// its start.
    pub fn set_path(
        &mut self,
        path: FPath,
    ) {
        defñ!("({:?}) was {:?}", path, self.path);
        self.path = path;
        self.reset();
    }

    /// Read the bytes appended since the last successful poll.
    ///
    /// - If the length is unchanged the returned bytes are empty.
    /// - If the file is shorter it was truncated or recreated and the whole
    ///   file is returned with `recreated` set.
    /// - I/O errors are returned and the remembered length is not changed, so
    ///   the next poll retries the same range.
    pub fn poll(&mut self) -> Result<TailRead> {
        defn!("({:?}) filesz {}, stage {:?}", self.path, self.filesz, self.stage);
        let path: &Path = Path::new(&self.path);
        let filesz_now: FileSz = self.source.file_length(path)?;
        let recreated: bool = filesz_now < self.filesz;
        let start: FileOffset = match recreated {
            true => 0,
            false => self.filesz,
        };
        if recreated {
            defo!("file shrank from {} to {}; recreated", self.filesz, filesz_now);
        }
        if filesz_now == start {
            self.filesz = filesz_now;
            self.stage = match recreated {
                true => TailStage::Recreated,
                false => TailStage::Tailing,
            };
            defx!("no new bytes; stage {:?}", self.stage);
            return Ok(TailRead {
                bytes: Bytes::new(),
                recreated,
                offset: start,
            });
        }
        let count: FileSz = filesz_now - start;
        let bytes: Bytes = self.source.read_bytes(path, start, count)?;
        debug_assert_le!(bytes.len() as FileSz, count, "read more bytes than requested");
        // the file may have been truncated after `file_length`
        self.filesz = start + bytes.len() as FileSz;
        self.stage = match recreated {
            true => TailStage::Recreated,
            false => TailStage::Tailing,
        };
        defx!("read {} bytes at {}; filesz {}, stage {:?}", bytes.len(), start, self.filesz, self.stage);

        Ok(TailRead {
            bytes,
            recreated,
            offset: start,
        })
    }
}
