#![cfg(not(tarpaulin_include))]

use clap::Parser;
use env_logger::Env;

use student_records::app;
use student_records::config::Config;

/// Main entry point for the student records server
///
/// Reads settings from the command line and environment, sets up logging
/// (`RUST_LOG`, default `info`) and serves until stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    app::run(config).await
}
