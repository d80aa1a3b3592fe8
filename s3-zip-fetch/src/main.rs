/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::process::ExitCode;

use aws_sdk_s3::error::DisplayErrorContext;
use clap::Parser;

mod cli;
mod console;

#[tokio::main]
async fn main() -> ExitCode {
    // invalid arguments exit here, before any request is made
    let args = cli::Args::parse();

    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("ignoring .env file: {err}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli::run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("s3-zip-fetch failed: {}", DisplayErrorContext(&err));
            eprintln!("Error: {}", DisplayErrorContext(&err));
            ExitCode::FAILURE
        }
    }
}
