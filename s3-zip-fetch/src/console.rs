/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Terminal rendering for the CLI: one progress bar per download and the selection prompt.

use std::io::{self, BufRead, Write};
use std::path::Path;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use s3_zip_fetch::error::Error;
use s3_zip_fetch::progress::{ProgressSink, TaskProgress};

const BAR_TEMPLATE: &str =
    "{msg:.bold.blue} {wide_bar} {percent:>3}% • {decimal_total_bytes} • {eta}";

const SELECTION_PROMPT: &str =
    "\nMultiple files found. Enter comma-separated numbers to download (e.g., 1,3):";

/// Draws a bar per download, grouped so concurrent downloads do not overwrite each other.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConsoleProgress {
    bars: MultiProgress,
}

impl ConsoleProgress {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for ConsoleProgress {
    fn task_started(&self, key: &str) -> Box<dyn TaskProgress> {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = self.bars.add(ProgressBar::new(0).with_style(style));
        bar.set_message(display_name(key).to_owned());
        Box::new(ConsoleBar { bar })
    }
}

#[derive(Debug)]
struct ConsoleBar {
    bar: ProgressBar,
}

impl TaskProgress for ConsoleBar {
    fn set_total(&mut self, total_bytes: u64) {
        self.bar.set_length(total_bytes);
    }

    fn advance(&mut self, bytes: u64) {
        self.bar.inc(bytes);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }

    fn fail(&mut self, _error: &Error) {
        // the error itself is printed once the batch is done
        self.bar.abandon();
    }
}

/// The file name shown for `key`
pub(crate) fn display_name(key: &str) -> &str {
    Path::new(key)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(key)
}

/// Print the numbered listing of `files`.
pub(crate) fn print_listing<W: Write>(mut out: W, files: &[String]) -> io::Result<()> {
    writeln!(out, "\nAvailable files:")?;
    for (i, file) in files.iter().enumerate() {
        writeln!(out, "{}: {file}", i + 1)?;
    }
    Ok(())
}

/// Ask for comma-separated indices and read one line of the answer.
///
/// Returns an empty string when `input` is already at end of file.
pub(crate) fn prompt_selection<R, W>(mut input: R, mut out: W) -> io::Result<String>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "{SELECTION_PROMPT}")?;
    write!(out, "> ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}
