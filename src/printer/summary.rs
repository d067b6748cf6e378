// src/printer/summary.rs

//! Functions to print the summary for CLI option `--summary`.
//!
//! Printed to stderr so it does not mix with the records on stdout.

use crate::common::{Count, FPath};
use crate::printer::printers::{
    print_colored_stderr,
    Color,
    ColorChoice,
    COLOR_DEFAULT,
    COLOR_ERROR,
};
use crate::readers::tailprocessor::SummaryTailProcessor;

use std::time::Instant;

/// Indentation of the per-file summary lines.
const OPT_SUMMARY_PRINT_INDENT1: &str = "  ";

/// The summary of one file, and the last poll error if any.
#[derive(Clone, Debug, Default)]
pub struct SummaryFile {
    pub summary: SummaryTailProcessor,
    pub error: Option<String>,
}

/// Statistics about the whole program run.
#[derive(Clone, Copy, Debug)]
pub struct SummaryProgram {
    pub chan_recv_ok: Count,
    pub chan_recv_err: Count,
    pub thread_count: usize,
    pub thread_err_count: usize,
    pub start_time: Instant,
}

fn print_error_summary(
    error: &Option<String>,
    color_choice: &ColorChoice,
) {
    if let Some(err_string) = error {
        eprint!("{}Error:", OPT_SUMMARY_PRINT_INDENT1);
        if err_string.contains('\n') {
            eprintln!();
        } else {
            eprint!(" ");
        }
        #[allow(clippy::single_match)]
        match print_colored_stderr(COLOR_ERROR, Some(*color_choice), err_string.as_bytes()) {
            _ => {}
        }
        eprintln!();
    }
}

/// For one file, print the `SummaryTailProcessor` (multiple lines).
fn print_file_summary(
    path: &FPath,
    summaryfile: &SummaryFile,
    color: &Color,
    color_choice: &ColorChoice,
) {
    let summary: &SummaryTailProcessor = &summaryfile.summary;
    eprintln!();
    eprint!("File: ");
    #[allow(clippy::single_match)]
    match print_colored_stderr(*color, Some(*color_choice), path.as_bytes()) {
        _ => {}
    }
    eprintln!();
    let format: &str = summary.TailProcessor_format.unwrap_or("(none)");
    eprintln!("{}Format       : {}", OPT_SUMMARY_PRINT_INDENT1, format);
    eprintln!("{}Polls        : {}", OPT_SUMMARY_PRINT_INDENT1, summary.TailProcessor_polls);
    eprintln!("{}Bytes        : {}", OPT_SUMMARY_PRINT_INDENT1, summary.TailProcessor_bytes);
    eprintln!("{}Records      : {}", OPT_SUMMARY_PRINT_INDENT1, summary.TailProcessor_records);
    eprintln!("{}Record errors: {}", OPT_SUMMARY_PRINT_INDENT1, summary.TailProcessor_errors);
    eprintln!("{}Recreations  : {}", OPT_SUMMARY_PRINT_INDENT1, summary.TailProcessor_recreations);
    print_error_summary(&summaryfile.error, color_choice);
}

/// Printing for CLI option `--summary`. Print each files'
/// [`SummaryTailProcessor`] then statistics of the whole run.
///
/// [`SummaryTailProcessor`]: crate::readers::tailprocessor::SummaryTailProcessor
pub fn print_summary(
    summaries: &[SummaryFile],
    summaryprogram: &SummaryProgram,
    color_choice: ColorChoice,
) {
    let finish_time = Instant::now();
    for summaryfile in summaries.iter() {
        print_file_summary(
            &summaryfile.summary.TailProcessor_path,
            summaryfile,
            &COLOR_DEFAULT,
            &color_choice,
        );
    }

    eprintln!();
    eprintln!("Program Summary:\n");
    eprintln!("Files                  : {}", summaries.len());
    let records: Count = summaries
        .iter()
        .map(|summaryfile| summaryfile.summary.TailProcessor_records)
        .sum();
    eprintln!("Records                : {}", records);
    eprintln!("Channel Receive ok     : {}", summaryprogram.chan_recv_ok);
    eprintln!("Channel Receive err    : {}", summaryprogram.chan_recv_err);
    eprintln!("Threads Spawned        : {}", summaryprogram.thread_count);
    eprintln!("Thread Spawn errors    : {}", summaryprogram.thread_err_count);
    match finish_time.checked_duration_since(summaryprogram.start_time) {
        Some(rt) => {
            eprintln!("Program Run Time       : {:.3} (seconds)", rt.as_secs_f64());
        }
        None => {
            eprintln!("Program Run Time       : unknown");
        }
    }
}
