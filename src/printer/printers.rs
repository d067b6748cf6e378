// src/printer/printers.rs

//! Specialized printer struct [`PrinterLogRecord`] and helper functions
//! for printing [`LogRecord`s].
//!
//! [`PrinterLogRecord`]: self::PrinterLogRecord
//! [`LogRecord`s]: crate::data::logrecord::LogRecord

use crate::common::NLu8;
use crate::data::logrecord::{LogLevel, LogRecord};
use crate::debug::printers::de_err;

use std::io::{
    Result,
    Write, // for `std::io::Stdout.flush`
};

#[doc(hidden)]
pub use ::termcolor::{Color, ColorChoice, ColorSpec, WriteColor};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// globals and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Color`] for printing prepended data like file name.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLOR_DEFAULT: Color = Color::White;

/// [`Color`] for printing some user-facing error messages.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLOR_ERROR: Color = Color::Red;

/// [`Color`] of the level token of a printed [`LogRecord`].
/// Chosen for a dark background console.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const fn color_level(level: LogLevel) -> Color {
    match level {
        LogLevel::Fatal | LogLevel::Error => Color::Red,
        LogLevel::Warning => Color::Yellow,
        LogLevel::Information => Color::Green,
        LogLevel::Debug => Color::Cyan,
        LogLevel::Verbose => Color::White,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PrinterLogRecord
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A printer specialized for [`LogRecord`s].
///
/// Prints one record per line,
/// `[path] LEVEL DATETIME CONTEXT MESSAGE`, skipping absent fields.
///
/// [`LogRecord`s]: crate::data::logrecord::LogRecord
pub struct PrinterLogRecord {
    /// termcolor handle to stdout
    stdout_color: termcolor::StandardStream,
    /// should printing be in color?
    do_color: bool,
    /// color settings for plain text
    color_spec_default: ColorSpec,
    /// the file name or path string, already surrounded by the caller
    prepend_file: Option<String>,
    /// last value passed to `self.stdout_color.set_color()`
    ///
    /// used by macro `setcolor_or_return`
    color_spec_last: ColorSpec,
}

/// Macro to write to given stdout. If there is an error then
/// `return PrinterLogRecordResult::Err`.
macro_rules! write_or_return {
    ($stdout:expr, $slice_:expr, $printed:expr) => {
        match $stdout.write_all($slice_) {
            Ok(_) => {
                $printed += $slice_.len();
            }
            Err(err) => {
                // XXX: this will print when this program stdout is truncated, like when piping
                //      to `head`, e.g. `tlp file.log | head`
                //          Broken pipe (os error 32)
                de_err!(
                    "{}.write({}) (len {})) error {}",
                    stringify!($stdout),
                    stringify!($slice_),
                    $slice_.len(),
                    err
                );
                match $stdout.flush() {
                    Ok(_) => {}
                    Err(_) => {}
                }
                return PrinterLogRecordResult::Err(err);
            }
        }
    };
}

/// Macro that sets output color, only changed if needed.
///
/// Unnecessary changes to `set_color` may cause errant formatting bytes to
/// print to the terminal.
macro_rules! setcolor_or_return {
    ($stdout:expr, $color_spec:expr, $color_spec_last:expr) => {
        if $color_spec != $color_spec_last {
            if let Err(err) = $stdout.set_color(&$color_spec) {
                de_err!("{}.set_color({:?}) returned error {}", stringify!($stdout), $color_spec, err);
                return PrinterLogRecordResult::Err(err);
            };
            $color_spec_last = $color_spec.clone();
        }
    };
}

/// Aliased [`Result`] returned by various [`PrinterLogRecord`] functions.
/// The `usize` is count of bytes printed.
///
/// [`Result`]: std::io::Result
pub type PrinterLogRecordResult = Result<usize>;

impl PrinterLogRecord {
    /// Create a new `PrinterLogRecord`.
    pub fn new(
        color_choice: ColorChoice,
        prepend_file: Option<String>,
    ) -> PrinterLogRecord {
        let stdout_color = termcolor::StandardStream::stdout(color_choice);
        let do_color: bool = match color_choice {
            ColorChoice::Never => false,
            ColorChoice::Always | ColorChoice::AlwaysAnsi | ColorChoice::Auto => true,
        };
        let mut color_spec_default: ColorSpec = ColorSpec::new();
        color_spec_default.set_fg(Some(COLOR_DEFAULT));
        let color_spec_last = color_spec_default.clone();

        PrinterLogRecord {
            stdout_color,
            do_color,
            color_spec_default,
            prepend_file,
            color_spec_last,
        }
    }

    /// Prints the [`LogRecord`] based on `PrinterLogRecord` settings.
    ///
    /// Users should call this function.
    ///
    /// [`LogRecord`]: crate::data::logrecord::LogRecord
    pub fn print_record(
        &mut self,
        record: &LogRecord,
    ) -> PrinterLogRecordResult {
        match self.do_color {
            false => self.print_record_(record),
            true => self.print_record_color(record),
        }
    }

    /// Print a record without color.
    fn print_record_(
        &mut self,
        record: &LogRecord,
    ) -> PrinterLogRecordResult {
        let mut printed: usize = 0;
        let mut stdout_lock = self.stdout_color.lock();
        if let Some(prepend) = self.prepend_file.as_ref() {
            write_or_return!(stdout_lock, prepend.as_bytes(), printed);
        }
        let text: String = record.to_string();
        write_or_return!(stdout_lock, text.as_bytes(), printed);
        write_or_return!(stdout_lock, &[NLu8], printed);
        if let Err(err) = stdout_lock.flush() {
            return PrinterLogRecordResult::Err(err);
        }

        PrinterLogRecordResult::Ok(printed)
    }

    /// Print a record with the level token colored.
    fn print_record_color(
        &mut self,
        record: &LogRecord,
    ) -> PrinterLogRecordResult {
        let mut printed: usize = 0;
        let _stderr_lock = std::io::stderr().lock();
        if let Some(prepend) = self.prepend_file.as_ref() {
            setcolor_or_return!(self.stdout_color, self.color_spec_default, self.color_spec_last);
            write_or_return!(self.stdout_color, prepend.as_bytes(), printed);
        }
        if let Some(level) = record.level() {
            let mut color_spec_level = ColorSpec::new();
            color_spec_level.set_fg(Some(color_level(level)));
            setcolor_or_return!(self.stdout_color, color_spec_level, self.color_spec_last);
            write_or_return!(self.stdout_color, level.abbreviation().as_bytes(), printed);
            write_or_return!(self.stdout_color, b" ", printed);
        }
        setcolor_or_return!(self.stdout_color, self.color_spec_default, self.color_spec_last);
        if let Some(timestamp) = record.timestamp() {
            let dt_string: String = timestamp.to_rfc3339();
            write_or_return!(self.stdout_color, dt_string.as_bytes(), printed);
            write_or_return!(self.stdout_color, b" ", printed);
        }
        if let Some(context) = record.context() {
            write_or_return!(self.stdout_color, context.as_bytes(), printed);
            write_or_return!(self.stdout_color, b" ", printed);
        }
        write_or_return!(self.stdout_color, record.message().as_bytes(), printed);
        if let Err(err) = self.stdout_color.reset() {
            return PrinterLogRecordResult::Err(err);
        }
        self.color_spec_last = ColorSpec::new();
        write_or_return!(self.stdout_color, &[NLu8], printed);
        if let Err(err) = self.stdout_color.flush() {
            return PrinterLogRecordResult::Err(err);
        }

        PrinterLogRecordResult::Ok(printed)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// other printer functions (no use of PrinterLogRecord)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Print colored output to terminal if possible using passed stream,
/// otherwise, print plain output.
///
/// Caller should take stream locks, e.g. `std::io::stdout().lock()`.
///
/// See an example <https://docs.rs/termcolor/1.1.2/termcolor/#detecting-presence-of-a-terminal>.
pub fn print_colored(
    color: Color,
    value: &[u8],
    out: &mut termcolor::StandardStream,
) -> std::io::Result<()> {
    match out.set_color(ColorSpec::new().set_fg(Some(color))) {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: std.set_color({:?}) returned error {}", color, err);
            return Err(err);
        }
    };
    match out.write(value) {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: out.write(…) returned error {}", err);
            return Err(err);
        }
    }
    match out.reset() {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: out.reset() returned error {}", err);
            return Err(err);
        }
    }
    out.flush()?;

    Ok(())
}

/// Print colored output to terminal on stderr.
///
/// See an example <https://docs.rs/termcolor/1.1.2/termcolor/#detecting-presence-of-a-terminal>.
pub fn print_colored_stderr(
    color: Color,
    color_choice_opt: Option<ColorChoice>,
    value: &[u8],
) -> std::io::Result<()> {
    let choice: ColorChoice = match color_choice_opt {
        Some(choice_) => choice_,
        None => ColorChoice::Auto,
    };
    let mut stderr = termcolor::StandardStream::stderr(choice);
    let _stdout_lock = std::io::stdout().lock();

    print_colored(color, value, &mut stderr)
}

/// Safely write the `buffer` to stderr with help of [`StderrLock`].
///
/// [`StderrLock`]: std::io::StderrLock
pub fn write_stderr(buffer: &[u8]) {
    let mut stderr_lock = std::io::stderr().lock();
    match stderr_lock.write(buffer) {
        Ok(_) => {}
        Err(_err) => {
            de_err!("stderr_lock.write(buffer@{:p} (len {})) error {}", buffer, buffer.len(), _err);
        }
    }
    match stderr_lock.flush() {
        Ok(_) => {}
        Err(_err) => {
            de_err!("stderr flushing error {}", _err);
        }
    }
}
