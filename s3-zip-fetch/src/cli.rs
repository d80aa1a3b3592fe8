/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use aws_sdk_s3::error::DisplayErrorContext;
use s3_zip_fetch::config::StoreSettings;
use s3_zip_fetch::error::Error;
use s3_zip_fetch::progress::ProgressSink;
use s3_zip_fetch::selection::{self, Resolution};
use s3_zip_fetch::store::S3Store;
use s3_zip_fetch::types::ConcurrencySetting;
use s3_zip_fetch::{Client, Config};

use crate::console::{self, ConsoleProgress};

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "s3-zip-fetch")]
#[command(about = "Lists and downloads .zip archives from an S3-compatible bucket.")]
pub(crate) struct Args {
    /// Action to perform
    #[arg(value_enum)]
    action: Action,

    /// Specific file to download
    filename: Option<String>,

    /// Maximum number of downloads in flight at once. All selected files download at once
    /// when unset.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Directory to download into, overrides DOWNLOAD_DIR
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Action {
    /// List the available .zip files
    Availability,
    /// Download one or more .zip files
    Download,
}

pub(crate) async fn run(args: Args) -> Result<ExitCode, Error> {
    let mut settings = StoreSettings::from_env()?;
    if let Some(dir) = &args.download_dir {
        settings.set_download_dir(dir);
    }

    let client = connect(&settings, args.concurrency)?;
    let files = match &client {
        Some(client) => client.list_zip_objects().await?,
        None => {
            println!("Error: AWS credentials not provided.");
            Vec::new()
        }
    };

    match args.action {
        Action::Availability => {
            show_availability(io::stdout().lock(), &files)?;
            Ok(ExitCode::SUCCESS)
        }
        Action::Download => {
            let selected = choose_files(
                &files,
                args.filename.as_deref(),
                io::stdin().lock(),
                io::stdout().lock(),
            )?;
            match client {
                Some(client) if !selected.is_empty() => {
                    let dir = settings.download_dir();
                    let status =
                        download(&client, selected, dir, ConsoleProgress::new(), io::stdout())
                            .await?;
                    Ok(ExitCode::from(status))
                }
                _ => Ok(ExitCode::SUCCESS),
            }
        }
    }
}

/// Build a client for `settings`, `None` when no credentials are configured.
fn connect(settings: &StoreSettings, concurrency: Option<usize>) -> Result<Option<Client>, Error> {
    let store = match S3Store::from_settings(settings) {
        Ok(store) => store,
        Err(err) if err.is_credentials_unavailable() => return Ok(None),
        Err(err) => return Err(err),
    };

    let concurrency = concurrency.map_or(ConcurrencySetting::Auto, ConcurrencySetting::Explicit);
    let config = Config::builder()
        .store(store)
        .concurrency(concurrency)
        .build()?;

    tracing::debug!(bucket = settings.bucket(), endpoint = settings.endpoint_url(), "connected");
    Ok(Some(Client::new(config)))
}

fn show_availability<W: Write>(mut out: W, files: &[String]) -> io::Result<()> {
    if files.is_empty() {
        writeln!(out, "No files found")
    } else {
        console::print_listing(out, files)
    }
}

/// Work out which of `files` to download, printing the listing and asking when needed.
fn choose_files<R, W>(
    files: &[String],
    filename: Option<&str>,
    input: R,
    mut out: W,
) -> io::Result<Vec<String>>
where
    R: BufRead,
    W: Write,
{
    // an explicit filename skips the listing
    if filename.is_none() {
        show_availability(&mut out, files)?;
    }
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let resolution = match selection::resolve(files, filename) {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::debug!("{}", DisplayErrorContext(&err));
            writeln!(out, "Error: File '{}' not found", filename.unwrap_or_default())?;
            return Ok(Vec::new());
        }
    };

    match resolution {
        Resolution::Selected(selected) => Ok(selected),
        Resolution::Prompt => {
            let raw = console::prompt_selection(input, &mut out)?;
            match selection::select_indices(files, &raw) {
                Ok(selection) => {
                    for rejected in selection.rejected() {
                        writeln!(out, "Invalid selection: {}. Skipping.", rejected.token())?;
                    }
                    Ok(selection.into_selected())
                }
                Err(err) => {
                    tracing::debug!("{}", DisplayErrorContext(&err));
                    writeln!(out, "Invalid input. Please enter comma-separated numbers.")?;
                    Ok(Vec::new())
                }
            }
        }
    }
}

/// Download `keys` into `dir` and print a line per failed download.
///
/// Returns the exit status: `1` when any download failed, otherwise `0`.
async fn download<P, W>(
    client: &Client,
    keys: Vec<String>,
    dir: &Path,
    progress: P,
    mut out: W,
) -> Result<u8, Error>
where
    P: ProgressSink + 'static,
    W: Write,
{
    let handle = client
        .download_batch()
        .keys(keys)
        .destination(dir)
        .progress(progress)
        .send()
        .await?;

    let output = handle.join().await?;
    for failed in output.failed_transfers() {
        writeln!(
            out,
            "Error downloading {}: {}",
            console::display_name(failed.key()),
            DisplayErrorContext(failed.error())
        )?;
    }

    tracing::info!(
        downloaded = output.objects_downloaded(),
        failed = output.failed_transfers().len(),
        bytes = output.total_bytes_transferred(),
        "download batch finished"
    );

    Ok(u8::from(output.has_failures()))
}
