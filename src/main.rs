use clap::Parser;

mod app;
mod audio;
mod cli;
mod config;
mod error;
mod library;
mod logging;
mod mpris;
mod runtime;
mod transport;
mod ui;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    runtime::run(args)
}
