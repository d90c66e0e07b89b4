// Entrypoint for the labeling tool.
// - Keeps `main` small: resolve the config and hand it to the UI.
// - Logging goes to stderr through `env_logger` (`RUST_LOG`, default `warn`).

use std::process::ExitCode;

use anyhow::Context;
use log::error;
use tweet_labeler::{
    config::Config,
    ui::{exit_code, label_dataset},
};

fn try_main() -> anyhow::Result<()> {
    // Defaults, then the optional config file, then TWEET_LABELER_* variables.
    let config = Config::from_env().context("Failed to load configuration")?;

    // Blocks until every row is labeled or the session is cut short; the
    // labels are saved either way.
    label_dataset(&config)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let outcome = try_main();
    if let Err(err) = &outcome {
        error!("{err:#}");
    }
    ExitCode::from(exit_code(&outcome))
}
