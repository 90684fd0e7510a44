use anyhow::Context;
use clap::Parser;
use protog::cli::Cli;
use protog::commands::cache_dir;
use protog::error::ProtogError;
use protog::libs::paths::{DEFAULT_CLI_INCLUDES_DIR, cache_root};
use protog::libs::utilities::path_helpers::expand_path;
use protog::schemas::config::Config;
use protog::{log_debug, log_error, logger};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // protoc reports its own failures; only the exit status is forwarded.
            let code = match err.downcast_ref::<ProtogError>() {
                Some(protog_err @ ProtogError::Subprocess { code: Some(_), .. }) => {
                    log_debug!("{:#}", err);
                    protog_err.exit_code()
                }
                Some(protog_err) => {
                    log_error!("{:#}", err);
                    protog_err.exit_code()
                }
                None => {
                    log_error!("{:#}", err);
                    1
                }
            };
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.print_cache_dir {
        cache_dir::run(None)?;
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };

    // Environment variables override the configuration file.
    let mut versions = config.versions.clone();
    versions.merge(&protog::versions_from_env());

    let includes_dir = match cli.includes_dir {
        Some(dir) => expand_path(&dir.to_string_lossy())?,
        None => config
            .includes_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLI_INCLUDES_DIR)),
    };

    let root = cache_root(config.cache_dir.as_deref())?;
    protog::execute(&cli.protoc_args, root, includes_dir, &versions)
        .context("running protoc")?;
    Ok(())
}
