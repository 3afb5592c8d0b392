use anyhow::Result;
use clap::Parser;

use javaflow::cli::Cli;
use javaflow::commands;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    commands::run(&cli)
}
