use anyhow::Context;
use splash_spinner::{cli::Args, render};

fn main() -> anyhow::Result<()> {
    splash_spinner::init_logger!();

    let config = Args::parse_normalized().into_config();
    render::run(&config)
        .with_context(|| format!("failed to create '{}'", config.output.display()))?;

    Ok(())
}
