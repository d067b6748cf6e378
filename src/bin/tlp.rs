// src/bin/tlp.rs

//! Driver program _tlp_ drives the [_tlplib_].
//!
//! Processes user-passed command-line arguments.
//! For each path passed, a file tailing thread is created.
//! Each file tailing thread polls its file with a [`TailProcessor`] instance
//! and sends the records read to the main thread over a shared
//! [sending channel]. The main thread prints the records as they arrive.
//!
//! Threads stop after one poll if passed CLI option `--once`, otherwise
//! when the user presses ctrl-c.
//!
//! If passed CLI option `--summary`, the main thread prints a
//! [`SummaryTailProcessor`] about each file, and a final program summary.
//!
//! `tlp.rs` should be the main thread and the only thread that prints to
//! STDOUT.
//!
//! [_tlplib_]: tlplib
//! [sending channel]: self::ChanSendDatum
//! [`TailProcessor`]: tlplib::readers::tailprocessor::TailProcessor
//! [`SummaryTailProcessor`]: tlplib::readers::tailprocessor::SummaryTailProcessor

#![allow(non_camel_case_types)]

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::RwLock;
use std::thread;
use std::time::{Duration, Instant};

use ::anyhow::Context;
use ::chrono::{DateTime, FixedOffset};
use ::clap::{Parser, ValueEnum};
use ::const_format::concatcp;
use ::lazy_static::lazy_static;

use ::tlplib::common::{Count, FPath, FPaths};
use ::tlplib::data::datetime::fixedoffset_utc;
use ::tlplib::debug::printers::{de_err, e_err, e_wrn};
use ::tlplib::printer::printers::{
    print_colored_stderr,
    write_stderr,
    ColorChoice,
    PrinterLogRecord,
    COLOR_ERROR,
};
use ::tlplib::printer::summary::{print_summary, SummaryFile, SummaryProgram};
use ::tlplib::readers::bytecursor::Encoding;
use ::tlplib::readers::entryreader::{EntryErrorKind, ResultEntry};
use ::tlplib::readers::formats::{entry_by_name, FormatRegistry};
use ::tlplib::readers::formats::leveled::LeveledReader;
use ::tlplib::readers::formats::line::LineReader;
use ::tlplib::readers::formats::utf16::Utf16Normalizer;
use ::tlplib::readers::helpers::basename;
use ::tlplib::readers::tailprocessor::{SummaryTailProcessor, TailConfig, TailProcessor};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// --------------------
// command-line parsing

const CLI_HELP_AFTER: &str = r#"Each record is printed as one line to stdout
    [PATH] LEVEL DATETIME CONTEXT MESSAGE
Fields a record does not have are not printed.
Records that could not be read are printed to stderr.

Formats:
    auto     choose per file, trying utf16 then leveled, else line
    leveled  "LEVEL DATETIME CONTEXT MESSAGE" records with continuation lines,
             e.g. "INF 2024-03-01T09:15:02.447+01:00 Main Service started"
    line     every line is a record
    utf16    UTF-16 files with a byte-order mark, transcoded to a UTF-8 copy
             next to the original file named "<PATH>.utf8"

A file that becomes shorter was truncated or rotated and is read again from
the start.
"#;

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.ColorChoice.html
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

/// CLI enum of the log formats.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    ValueEnum, // from `clap`
)]
enum CLI_Format {
    auto,
    leveled,
    line,
    utf16,
}

impl CLI_Format {
    /// Name of the format, `None` for `auto`.
    fn name(&self) -> Option<&'static str> {
        match self {
            CLI_Format::auto => None,
            CLI_Format::leveled => Some(LeveledReader::NAME),
            CLI_Format::line => Some(LineReader::NAME),
            CLI_Format::utf16 => Some(Utf16Normalizer::NAME),
        }
    }
}

// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "tlp",
    // write expanded information for the `--version` output
    version = concatcp!(
        "(Tailing Log Parser)\n",
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
        "Author: ", env!("CARGO_PKG_AUTHORS"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path(s) of log files.
    /// A path that does not exist yet is retried every poll.
    #[clap(
        required = true,
        verbatim_doc_comment,
    )]
    paths: Vec<String>,

    /// Log format of the files.
    #[clap(
        required = false,
        short = 'f',
        long = "format",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Format::auto,
    )]
    format: CLI_Format,

    /// Text encoding of the files. Any WHATWG encoding label, e.g.
    /// "utf-8", "windows-1252", "latin1", "shift_jis".
    #[clap(
        required = false,
        short = 'e',
        long,
        verbatim_doc_comment,
        value_parser = cli_process_encoding,
        default_value = "utf-8",
    )]
    encoding: &'static Encoding,

    /// Default timezone offset for datetimes without a timezone.
    /// Example values, "+12:00", "-0800", "+02:00".
    /// To pass a value with leading "-" use "=" notation, e.g. "-t=-0800".
    #[clap(
        short = 't',
        long,
        verbatim_doc_comment,
        value_parser = cli_process_tz_offset,
        default_value_t = fixedoffset_utc(),
    )]
    tz_offset: FixedOffset,

    /// Milliseconds to wait between polls of a file.
    #[clap(
        required = false,
        short = 'i',
        long,
        verbatim_doc_comment,
        default_value_t = 500,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    interval: u64,

    /// Poll each file once then exit.
    #[clap(
        long,
        verbatim_doc_comment,
    )]
    once: bool,

    /// Do not print a last line that has no line ending until the line
    /// ending is written.
    #[clap(
        long = "hold-partial-line",
        verbatim_doc_comment,
    )]
    hold_partial_line: bool,

    /// Choose to print using colors.
    #[clap(
        required = false,
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,

    /// Print a summary of files processed to stderr.
    #[clap(
        short,
        long,
        verbatim_doc_comment,
    )]
    summary: bool,
}

/// `clap` argument processor for `--encoding`.
fn cli_process_encoding(label: &str) -> std::result::Result<&'static Encoding, String> {
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => Ok(encoding),
        None => Err(format!("Unknown encoding label for --encoding {:?}", label)),
    }
}

/// `clap` argument processor for `--tz-offset`.
fn cli_process_tz_offset(tzo: &str) -> std::result::Result<FixedOffset, String> {
    // transform the timezone string to a `FixedOffset` instance
    // using a dummy datetime
    let mut data: String = String::from("2000-01-02 03:04:05 ");
    data.push_str(tzo);
    for pattern in [
        "%Y-%m-%d %H:%M:%S %:z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S %#z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(data.as_str(), pattern) {
            defñ!("parse_from_str({:?}, {:?}) returned {:?}", data, pattern, dt);
            return Ok(*dt.offset());
        }
    }

    Err(format!("Unable to parse a timezone offset for --tz-offset {:?}", tzo))
}

/// The user-passed settings, processed.
#[derive(Debug)]
struct CliSettings {
    paths: FPaths,
    registry: FormatRegistry,
    config: TailConfig,
    interval: Duration,
    once: bool,
    color_choice: ColorChoice,
    summary: bool,
}

/// Process the user-passed command-line arguments.
fn cli_process_args() -> anyhow::Result<CliSettings> {
    let args = CLI_Args::parse();
    defo!("args {:?}", args);

    let registry: FormatRegistry = match args.format.name() {
        None => FormatRegistry::default(),
        Some(name) => {
            let entry = entry_by_name(name).with_context(|| format!("unknown format {:?}", name))?;
            FormatRegistry::with_only(entry)
        }
    };
    defo!("registry {:?}", registry);

    // map `CLI_Color_Choice` to `ColorChoice`
    let color_choice: ColorChoice = match args.color_choice {
        CLI_Color_Choice::always => ColorChoice::Always,
        CLI_Color_Choice::auto => ColorChoice::Auto,
        CLI_Color_Choice::never => ColorChoice::Never,
    };
    defo!("color_choice {:?}", color_choice);

    let config = TailConfig {
        encoding: args.encoding,
        hold_partial_line: args.hold_partial_line,
        tz_offset: args.tz_offset,
    };

    Ok(CliSettings {
        paths: args.paths,
        registry,
        config,
        interval: Duration::from_millis(args.interval),
        once: args.once,
        color_choice,
        summary: args.summary,
    })
}

/// Process the user-passed command-line arguments.
/// Start function `processing_loop`.
/// Determine a process return code.
pub fn main() -> ExitCode {
    let start_time = Instant::now();
    defn!();

    let settings: CliSettings = match cli_process_args() {
        Ok(val) => val,
        Err(err) => {
            e_err!("{:#}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = set_signal_handler().context("failed to set the ctrl-c handler") {
        e_wrn!("{:#}", err);
    }

    let ret: bool = processing_loop(settings, start_time);

    let exitcode = if ret { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    defx!("exitcode {:?}", exitcode);

    exitcode
}

lazy_static! {
    /// flag to signal all threads should return ASAP.
    /// Set by the `ctrlc::set_handler` signal handler.
    static ref EXIT_EARLY: RwLock<bool> = {
        defñ!("lazy_static! exit_early");

        RwLock::new(false)
    };
}

/// Has the user asked to exit?
fn exit_early() -> bool {
    match EXIT_EARLY.read() {
        Ok(exit_early) => *exit_early,
        Err(err) => {
            e_err!("EXIT_EARLY.read() failed: {:?}", err);
            true
        }
    }
}

/// set a process signal handler
pub fn set_signal_handler() -> anyhow::Result<(), ctrlc::Error> {
    defn!();

    ctrlc::set_handler(move || {
        defn!();
        // signal the threads and `processing_loop` to return early
        match EXIT_EARLY.write() {
            Ok(mut exit_early) => {
                *exit_early = true;
            }
            Err(_err) => {
                de_err!("EXIT_EARLY.write() failed {}", _err);
            }
        }
        defx!();
    })?;

    defx!();

    Ok(())
}

// -------------------------------------------------------------------------------------------------
// processing threads
// -------------------------------------------------------------------------------------------------

/// Index into the passed paths.
type PathId = usize;

/// Data sent from a file tailing thread to the main thread.
#[derive(Debug)]
enum ChanDatum {
    /// The records of one poll.
    Entries(PathId, Vec<ResultEntry>, bool),
    /// A poll failed. The thread will poll again unless `--once`.
    PollError(PathId, String),
    /// The thread is done. Last message of the thread.
    Done(PathId, SummaryTailProcessor, bool),
}

/// Sender channel (used by each file tailing thread).
type ChanSendDatum = crossbeam_channel::Sender<ChanDatum>;

/// Receiver channel (used by main thread).
type ChanRecvDatum = crossbeam_channel::Receiver<ChanDatum>;

/// Data passed to each file tailing thread.
type ThreadInitData = (
    FPath,
    PathId,
    TailConfig,
    FormatRegistry,
    Duration,
    bool,
);

/// Sleep `interval` in short naps so a ctrl-c is noticed soon. Returns
/// `false` if the user asked to exit.
fn sleep_interval(interval: Duration) -> bool {
    const NAP: Duration = Duration::from_millis(50);
    let start = Instant::now();
    while start.elapsed() < interval {
        if exit_early() {
            return false;
        }
        thread::sleep(NAP.min(interval));
    }

    !exit_early()
}

/// Thread entry point for tailing one file.
fn exec_tailprocessor_thread(
    chan_send_dt: ChanSendDatum,
    thread_init_data: ThreadInitData,
) {
    let (path, pathid, config, registry, interval, once) = thread_init_data;
    defn!("({:?}) pathid {}", path, pathid);

    let mut tailprocessor = TailProcessor::new(path, config, registry);
    let mut polled_ok: bool = false;
    let mut error_last: Option<String> = None;
    loop {
        match tailprocessor.poll() {
            Ok(pollresult) => {
                polled_ok = true;
                error_last = None;
                if !pollresult.entries.is_empty() || pollresult.recreated {
                    let datum = ChanDatum::Entries(pathid, pollresult.entries, pollresult.recreated);
                    if chan_send_dt.send(datum).is_err() {
                        defx!("channel closed; return");
                        return;
                    }
                }
            }
            Err(err) => {
                let message: String = err.to_string();
                // report a repeating error once
                if error_last.as_ref() != Some(&message) {
                    error_last = Some(message.clone());
                    if chan_send_dt.send(ChanDatum::PollError(pathid, message)).is_err() {
                        defx!("channel closed; return");
                        return;
                    }
                }
            }
        }
        if once || !sleep_interval(interval) {
            break;
        }
    }
    let entries: Vec<ResultEntry> = tailprocessor.flush();
    if !entries.is_empty() && chan_send_dt.send(ChanDatum::Entries(pathid, entries, false)).is_err() {
        defx!("channel closed; return");
        return;
    }
    let summary: SummaryTailProcessor = tailprocessor.summary();
    defo!("summary {:?}", summary);
    if chan_send_dt.send(ChanDatum::Done(pathid, summary, polled_ok)).is_err() {
        de_err!("channel closed before Done for pathid {}", pathid);
    }

    defx!("({:?}) pathid {}", tailprocessor.path(), pathid);
}

/// Print one entry of a file; a record to stdout or an error to stderr.
fn print_entry(
    printer: &mut PrinterLogRecord,
    path: &FPath,
    entry: &ResultEntry,
    color_choice: ColorChoice,
) -> bool {
    match entry {
        Ok(record) => {
            if let Err(err) = printer.print_record(record) {
                de_err!("print_record failed {}", err);
                return false;
            }
        }
        Err(err) if err.kind() == EntryErrorKind::BeyondBuffer => {
            de_err!("{:?}: unexpected {}", path, err);
        }
        Err(err) => {
            let message: String = format!("[{}] {}\n", path, err);
            if print_colored_stderr(COLOR_ERROR, Some(color_choice), message.as_bytes()).is_err() {
                write_stderr(message.as_bytes());
            }
        }
    }

    true
}

/// Start one thread per path then print what the threads send until all are
/// done.
///
/// Returns `false` if any file could never be polled.
fn processing_loop(
    settings: CliSettings,
    start_time: Instant,
) -> bool {
    defn!("({} paths)", settings.paths.len());
    let CliSettings {
        paths,
        registry,
        config,
        interval,
        once,
        color_choice,
        summary: cli_opt_summary,
    } = settings;

    let (chan_send_dt, chan_recv_dt): (ChanSendDatum, ChanRecvDatum) = crossbeam_channel::unbounded();
    let mut map_pathid_path: BTreeMap<PathId, FPath> = BTreeMap::new();
    let mut map_pathid_printer: BTreeMap<PathId, PrinterLogRecord> = BTreeMap::new();
    let mut map_pathid_summary: BTreeMap<PathId, SummaryFile> = BTreeMap::new();
    let mut thread_count: usize = 0;
    let mut thread_err_count: usize = 0;
    let mut ret: bool = true;

    for (pathid, path) in paths.iter().enumerate() {
        let thread_data: ThreadInitData = (
            path.clone(),
            pathid,
            config,
            registry.clone(),
            interval,
            once,
        );
        let chan_send_dt_thread: ChanSendDatum = chan_send_dt.clone();
        let basename_: FPath = basename(path);
        match thread::Builder::new()
            .name(basename_.clone())
            .spawn(move || exec_tailprocessor_thread(chan_send_dt_thread, thread_data))
        {
            Ok(_joinhandle) => {
                thread_count += 1;
                map_pathid_path.insert(pathid, path.clone());
                let prepend: String = format!("[{}] ", path);
                map_pathid_printer.insert(pathid, PrinterLogRecord::new(color_choice, Some(prepend)));
            }
            Err(err) => {
                thread_err_count += 1;
                ret = false;
                e_err!("thread.name({:?}).spawn() pathid {} failed {:?}", basename_, pathid, err);
            }
        }
    }
    // only the threads hold senders; the channel disconnects when all are done
    drop(chan_send_dt);

    let mut chan_recv_ok: Count = 0;
    let mut chan_recv_err: Count = 0;
    let mut threads_done: usize = 0;
    while threads_done < thread_count {
        let datum: ChanDatum = match chan_recv_dt.recv() {
            Ok(val) => val,
            Err(_err) => {
                chan_recv_err += 1;
                de_err!("chan_recv_dt.recv() failed {}", _err);
                break;
            }
        };
        chan_recv_ok += 1;
        match datum {
            ChanDatum::Entries(pathid, entries, recreated) => {
                let path: &FPath = match map_pathid_path.get(&pathid) {
                    Some(val) => val,
                    None => continue,
                };
                if recreated {
                    e_wrn!("file {:?} was truncated or recreated; reading from the start", path);
                }
                let printer: &mut PrinterLogRecord = match map_pathid_printer.get_mut(&pathid) {
                    Some(val) => val,
                    None => continue,
                };
                for entry in entries.iter() {
                    if !print_entry(printer, path, entry, color_choice) {
                        // stdout is closed, e.g. `tlp file.log | head`
                        if let Ok(mut exit_early) = EXIT_EARLY.write() {
                            *exit_early = true;
                        }
                        break;
                    }
                }
            }
            ChanDatum::PollError(pathid, message) => {
                let path: &str = map_pathid_path
                    .get(&pathid)
                    .map(|path| path.as_str())
                    .unwrap_or("");
                e_err!("{:?}: {}", path, message);
                map_pathid_summary
                    .entry(pathid)
                    .or_default()
                    .error = Some(message);
            }
            ChanDatum::Done(pathid, summary, polled_ok) => {
                threads_done += 1;
                defo!("Done pathid {} polled_ok {}", pathid, polled_ok);
                if !polled_ok {
                    ret = false;
                }
                map_pathid_summary
                    .entry(pathid)
                    .or_default()
                    .summary = summary;
            }
        }
    }

    if cli_opt_summary {
        let summaries: Vec<SummaryFile> = map_pathid_summary.into_values().collect();
        let summaryprogram = SummaryProgram {
            chan_recv_ok,
            chan_recv_err,
            thread_count,
            thread_err_count,
            start_time,
        };
        print_summary(&summaries, &summaryprogram, color_choice);
    }
    defx!("return {}", ret);

    ret
}
