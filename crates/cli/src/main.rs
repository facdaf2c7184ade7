use std::process;

use anyhow::Context;
use clap::Parser;

mod cli;
mod settings;

use cli::Cli;
use settings::Settings;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = try_main(cli) {
        tracing::error!(error = %format!("{e:#}"), "command failed");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(&cli.config).with_context(|| format!("loading settings {}", cli.config))?;
    stillgauge_observability::init(&settings.log_settings());

    let engine = settings.engine()?;
    let output = cli::run(cli.command, &engine)?;
    println!("{output}");
    Ok(())
}
