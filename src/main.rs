use anyhow::Context;
use clap::Parser;
use describe_media::args::Args;
use describe_media::config::Config;
use describe_media::console::{install_interrupt_handler, ConsoleInput};
use describe_media::metadata::ExifToolBackend;
use describe_media::processor::Processor;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command line arguments
    let config = Config::from_args(Args::parse());
    init_tracing(config.debug);

    if let Err(e) = run(config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(config: Config) -> anyhow::Result<()> {
    debug!(?config, "starting");

    // Ctrl-C ends the loop at the prompt instead of killing the process
    let cancelled = Arc::new(AtomicBool::new(false));
    let interrupts = install_interrupt_handler(cancelled.clone())
        .context("Failed to install Ctrl-C handler")?;

    let tool = ExifToolBackend::new(config.opener.clone());
    let mut processor = Processor::new(config, tool).with_cancel_flag(cancelled);

    let mut input = ConsoleInput::stdin(interrupts);
    let mut out = io::stdout();
    processor.process_directory(&mut input, &mut out)?;

    Ok(())
}
