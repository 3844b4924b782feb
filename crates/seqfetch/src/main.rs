//! `seqfetch`: download a numbered fragment sequence and join it into one file.
//!
//! ```bash
//! # fragments live at https://cdn.example/live/0.ts, 1.ts, ...
//! seqfetch stream.ts https://cdn.example/live
//!
//! # zero-padded names, bounded concurrency, verbose logs
//! seqfetch -v --template 'seg_%05d.m4s' --max-in-flight 8 out.mp4 https://cdn.example/vod
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod ui;

use cli::App;

fn main() -> ExitCode {
    let app = App::parse();
    init_tracing(app.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(cli::fetch::run(app)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "seqfetch=info,seqfetch_engine=debug",
        _ => "seqfetch=trace,seqfetch_engine=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
