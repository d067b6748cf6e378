// src/data/logrecord.rs

//! Implements a [`LogRecord`] struct and the [`LogLevel`] enum.
//!
//! [`LogRecord`]: crate::data::logrecord::LogRecord
//! [`LogLevel`]: crate::data::logrecord::LogLevel

use crate::data::datetime::{DateTimeL, DateTimeLOpt};

use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogLevel
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity of a [`LogRecord`], least severe first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LogLevel {
    Verbose,
    Debug,
    Information,
    Warning,
    Error,
    Fatal,
}

/// Known spellings of each [`LogLevel`], upper-case.
const LOGLEVEL_NAMES: [(&str, LogLevel); 16] = [
    ("VRB", LogLevel::Verbose),
    ("VERBOSE", LogLevel::Verbose),
    ("TRACE", LogLevel::Verbose),
    ("DBG", LogLevel::Debug),
    ("DEBUG", LogLevel::Debug),
    ("INF", LogLevel::Information),
    ("INFO", LogLevel::Information),
    ("INFORMATION", LogLevel::Information),
    ("WRN", LogLevel::Warning),
    ("WARN", LogLevel::Warning),
    ("WARNING", LogLevel::Warning),
    ("ERR", LogLevel::Error),
    ("ERROR", LogLevel::Error),
    ("FTL", LogLevel::Fatal),
    ("FATAL", LogLevel::Fatal),
    ("CRITICAL", LogLevel::Fatal),
];

/// Longest entry in [`LOGLEVEL_NAMES`].
pub const LOGLEVEL_NAME_LEN_MAX: usize = 11;

impl LogLevel {
    /// Case-insensitive match of a level token, e.g. `"inf"` or `"Warning"`.
    pub fn from_token(token: &[u8]) -> Option<LogLevel> {
        if token.is_empty() || token.len() > LOGLEVEL_NAME_LEN_MAX {
            return None;
        }
        LOGLEVEL_NAMES
            .iter()
            .find(|(name, _)| name.as_bytes().eq_ignore_ascii_case(token))
            .map(|(_, level)| *level)
    }

    /// Fixed three letter abbreviation.
    pub const fn abbreviation(&self) -> &'static str {
        match self {
            LogLevel::Verbose => "VRB",
            LogLevel::Debug => "DBG",
            LogLevel::Information => "INF",
            LogLevel::Warning => "WRN",
            LogLevel::Error => "ERR",
            LogLevel::Fatal => "FTL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogRecord
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A `LogRecord` is one parsed "log message".
///
/// The `message` is always present. The structured fields are only set by
/// formats that recognize them; an absent field (`None`) is not the same as
/// an empty one.
///
/// A `LogRecord` cannot be changed once created. It is owned by whoever
/// received it; readers keep no reference to emitted records.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct LogRecord {
    message: String,
    level: Option<LogLevel>,
    timestamp: DateTimeLOpt,
    context: Option<String>,
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("level", &self.level)
            .field("timestamp", &self.timestamp)
            .field("context", &self.context)
            .field("message.len()", &self.message.len())
            .field("message", &self.message)
            .finish()
    }
}

impl LogRecord {
    /// Create a `LogRecord` with only a message.
    pub fn from_message(message: String) -> LogRecord {
        LogRecord {
            message,
            ..Default::default()
        }
    }

    /// Create a `LogRecord` from passed arguments.
    pub fn from_parts(
        message: String,
        level: Option<LogLevel>,
        timestamp: DateTimeLOpt,
        context: Option<String>,
    ) -> LogRecord {
        LogRecord {
            message,
            level,
            timestamp,
            context,
        }
    }

    /// The best-effort empty record returned alongside errors.
    pub fn empty() -> LogRecord {
        LogRecord::default()
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub const fn level(&self) -> Option<LogLevel> {
        self.level
    }

    pub const fn timestamp(&self) -> Option<&DateTimeL> {
        self.timestamp.as_ref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// `true` if no field is set and the message is empty.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
            && self.level.is_none()
            && self.timestamp.is_none()
            && self.context.is_none()
    }

    /// Consume and return the message.
    pub fn into_message(self) -> String {
        self.message
    }
}

impl fmt::Display for LogRecord {
    /// `LEVEL TIMESTAMP CONTEXT MESSAGE`, absent fields skipped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(level) = self.level {
            write!(f, "{} ", level)?;
        }
        if let Some(timestamp) = self.timestamp {
            write!(f, "{} ", timestamp.to_rfc3339())?;
        }
        if let Some(context) = self.context.as_ref() {
            write!(f, "{} ", context)?;
        }
        write!(f, "{}", self.message)
    }
}
