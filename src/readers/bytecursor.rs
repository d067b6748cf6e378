// src/readers/bytecursor.rs

//! Implements a [`ByteCursor`], the lowest-level reader: a byte buffer and a
//! read position with delimiter scanning primitives.
//!
//! Every scan is a single forward pass from the current position. There is no
//! backtracking and no lookahead beyond the byte that ends a scan.
//! Format-specific readers call these primitives in sequence and never set the
//! position directly.
//!
//! [`ByteCursor`]: self::ByteCursor

use crate::common::{Bytes, LINE_TERMINATORS, NLu8, CRu8, TOKEN_DELIMITERS, TOKEN_PADDING};
#[allow(unused_imports)]
use crate::debug::printers::buffer_to_String_noraw;

use std::fmt;

#[allow(unused_imports)]
use ::bstr::ByteSlice;
#[doc(hidden)]
pub use ::encoding_rs::{Encoding, UTF_8};
use ::memchr::{memchr, memchr2, memchr3};
use ::more_asserts::debug_assert_le;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CursorError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Index into the buffer of a [`ByteCursor`].
pub type CursorIndex = usize;

/// Failures of [`ByteCursor`] extraction functions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorError {
    /// A read was attempted starting exactly at the end of the buffer.
    BeyondBuffer {
        position: CursorIndex,
        len: usize,
    },
    /// A fixed-width read wanted more bytes than remained. The remaining
    /// bytes were consumed.
    Truncated {
        position: CursorIndex,
        wanted: usize,
        available: usize,
    },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorError::BeyondBuffer { position, len } => {
                write!(f, "try to read beyond buffer at position {} (buffer length {})", position, len)
            }
            CursorError::Truncated { position, wanted, available } => {
                write!(
                    f,
                    "truncated token at position {}; wanted {} bytes, only {} available",
                    position, wanted, available
                )
            }
        }
    }
}

impl std::error::Error for CursorError {}

pub type ResultCursor<T> = std::result::Result<T, CursorError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ByteCursor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A byte buffer and a read position.
///
/// Invariant `0 <= position <= len`. The position only moves forward, except
/// on [`load`] which replaces the buffer and resets the position to `0`.
///
/// A position equal to the buffer length means "exhausted". That is not an
/// error, but extracting text starting there is ([`CursorError::BeyondBuffer`]).
///
/// Bytes are decoded to text with the `Encoding` passed to [`new`]. Malformed
/// sequences are replaced with U+FFFD, never rejected.
///
/// [`load`]: ByteCursor::load
/// [`new`]: ByteCursor::new
pub struct ByteCursor {
    bytes: Bytes,
    position: CursorIndex,
    encoding: &'static Encoding,
}

impl fmt::Debug for ByteCursor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ByteCursor")
            .field("len", &self.bytes.len())
            .field("position", &self.position)
            .field("encoding", &self.encoding.name())
            .finish()
    }
}

impl Default for ByteCursor {
    fn default() -> Self {
        ByteCursor::new(UTF_8)
    }
}

impl ByteCursor {
    /// Create an empty `ByteCursor` that decodes text with `encoding`.
    pub fn new(encoding: &'static Encoding) -> ByteCursor {
        ByteCursor {
            bytes: Bytes::new(),
            position: 0,
            encoding,
        }
    }

    /// Create a UTF-8 `ByteCursor` already loaded with `bytes`.
    pub fn from_bytes(bytes: Bytes) -> ByteCursor {
        let mut cursor = ByteCursor::default();
        cursor.load(bytes);

        cursor
    }

    /// Replace the buffer and reset the position to `0`.
    ///
    /// Any byte sequence is accepted.
    pub fn load(&mut self, bytes: Bytes) {
        defñ!("(len {})", bytes.len());
        self.bytes = bytes;
        self.position = 0;
    }

    /// Take back the buffer, leaving the cursor empty.
    pub fn unload(&mut self) -> Bytes {
        self.position = 0;

        std::mem::take(&mut self.bytes)
    }

    #[inline(always)]
    pub const fn position(&self) -> CursorIndex {
        self.position
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Count of bytes not yet consumed.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    #[inline(always)]
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.bytes.len()
    }

    pub const fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Decode later text with `encoding`. Does not change the position.
    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// The whole loaded buffer.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// The unconsumed bytes.
    pub fn rest(&self) -> &[u8] {
        &self.bytes[self.position..]
    }

    /// Index of the first byte at or after the position that is in `any_of`.
    /// Returns the buffer length if there is none; that is not an error, it
    /// means "rest of buffer".
    pub fn scan_to(&self, any_of: &[u8]) -> CursorIndex {
        let hay: &[u8] = self.rest();
        let found: Option<usize> = match any_of.len() {
            0 => None,
            1 => memchr(any_of[0], hay),
            2 => memchr2(any_of[0], any_of[1], hay),
            3 => memchr3(any_of[0], any_of[1], any_of[2], hay),
            _ => hay.iter().position(|b| any_of.contains(b)),
        };
        match found {
            Some(index) => self.position + index,
            None => self.bytes.len(),
        }
    }

    /// Index of the first byte at or after the position that is NOT in
    /// `any_of`. Returns the buffer length if there is none.
    pub fn scan_past(&self, any_of: &[u8]) -> CursorIndex {
        match self.rest().iter().position(|b| !any_of.contains(b)) {
            Some(index) => self.position + index,
            None => self.bytes.len(),
        }
    }

    /// Decode bytes `[beg, end)` to text.
    pub fn text(&self, beg: CursorIndex, end: CursorIndex) -> String {
        debug_assert_le!(beg, end, "bad range [{}, {})", beg, end);
        debug_assert_le!(end, self.bytes.len(), "end {} past buffer length {}", end, self.bytes.len());
        let (text, _malformed) = self.encoding.decode_without_bom_handling(&self.bytes[beg..end]);
        if _malformed {
            defo!("malformed {} bytes at [{}, {}) {:?}",
                self.encoding.name(), beg, end, buffer_to_String_noraw(&self.bytes[beg..end]));
        }

        text.into_owned()
    }

    /// `true` if the unconsumed bytes begin with `expected`. Does not consume.
    pub fn starts_with(&self, expected: &[u8]) -> bool {
        self.rest().starts_with(expected)
    }

    /// The bytes of the current line without line terminators. Does not
    /// consume.
    pub fn peek_line(&self) -> &[u8] {
        let end = self.scan_to(&LINE_TERMINATORS);

        &self.bytes[self.position..end]
    }

    /// Text up to (not including) the next `'\r'` or `'\n'`. Advances past
    /// all consecutive `'\r'` and `'\n'` that follow, so the next call starts
    /// at real content.
    ///
    /// `"\r"`, `"\n"`, and `"\r\n"` line endings are all the same to this
    /// function, as is any run of them like `"\n\r\n"`.
    pub fn take_line(&mut self) -> ResultCursor<String> {
        defn!("(position {})", self.position);
        if self.is_exhausted() {
            let err = self.err_beyond_buffer();
            defx!("return {}", err);
            return Err(err);
        }
        let end = self.scan_to(&LINE_TERMINATORS);
        let line = self.text(self.position, end);
        self.position = end;
        self.position = self.scan_past(&LINE_TERMINATORS);
        defx!("return line {:?}; position {}", line.as_bytes().as_bstr(), self.position);

        Ok(line)
    }

    /// Consume the current line and its terminators without decoding.
    /// Returns the new position.
    pub fn skip_line(&mut self) -> CursorIndex {
        self.position = self.scan_to(&LINE_TERMINATORS);
        self.position = self.scan_past(&LINE_TERMINATORS);
        defñ!("position {}", self.position);

        self.position
    }

    /// Take the next token.
    ///
    /// Returns `Ok(None)` if the buffer is exhausted.
    ///
    /// If `max_len` is `Some(n)` then take exactly `n` bytes and trim
    /// surrounding whitespace from the text. Otherwise take bytes up to the
    /// next space or line terminator.
    ///
    /// Afterwards skip the delimiter that ended the token: the run of
    /// line terminators if it was a line terminator, otherwise the run of
    /// spaces. Padding between tokens is consumed once here, not at the start
    /// of the following call.
    ///
    /// A `max_len` larger than the remaining bytes is an error
    /// ([`CursorError::Truncated`]) and the remaining bytes are consumed.
    pub fn take_token(
        &mut self,
        max_len: Option<usize>,
    ) -> ResultCursor<Option<String>> {
        defn!("(max_len {:?}) position {}", max_len, self.position);
        if self.is_exhausted() {
            defx!("return None; exhausted");
            return Ok(None);
        }
        let end: CursorIndex = match max_len {
            Some(len_) => {
                if len_ > self.remaining() {
                    let err = self.err_truncated(len_);
                    self.position = self.bytes.len();
                    defx!("return {}", err);
                    return Err(err);
                }
                self.position + len_
            }
            None => self.scan_to(&TOKEN_DELIMITERS),
        };
        let mut token: String = self.text(self.position, end);
        if max_len.is_some() {
            token = token.trim().to_string();
        }
        self.position = end;
        if end < self.bytes.len() {
            self.position = match self.bytes[end] {
                CRu8 | NLu8 => self.scan_past(&LINE_TERMINATORS),
                _ => self.scan_past(&TOKEN_PADDING),
            };
        }
        defx!("return Some({:?}); position {}", token, self.position);

        Ok(Some(token))
    }

    /// Take exactly `count` bytes as text; for fixed-width fields.
    ///
    /// Wanting more bytes than remain is an error
    /// ([`CursorError::Truncated`]) and the remaining bytes are consumed.
    pub fn take_bytes(
        &mut self,
        count: usize,
    ) -> ResultCursor<String> {
        if count > 0 && self.is_exhausted() {
            return Err(self.err_beyond_buffer());
        }
        if count > self.remaining() {
            let err = self.err_truncated(count);
            self.position = self.bytes.len();
            defñ!("return {}", err);
            return Err(err);
        }
        let text = self.text(self.position, self.position + count);
        self.position += count;
        defñ!("({}) return {:?}; position {}", count, text, self.position);

        Ok(text)
    }

    fn err_beyond_buffer(&self) -> CursorError {
        CursorError::BeyondBuffer {
            position: self.position,
            len: self.bytes.len(),
        }
    }

    fn err_truncated(
        &self,
        wanted: usize,
    ) -> CursorError {
        CursorError::Truncated {
            position: self.position,
            wanted,
            available: self.remaining(),
        }
    }
}
