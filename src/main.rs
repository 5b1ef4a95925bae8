use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};

use promptex::{App, Cli, Config, PromptStore};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

fn run(cli: Cli) -> promptex::Result<()> {
    let config_path = cli.config.clone().or_else(Config::config_file);
    let mut config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(resources_dir) = &cli.resources_dir {
        config.resources_dir = resources_dir.clone();
    }

    let (store, source) = PromptStore::open(config.clone())?;
    info!("Loaded {} prompts ({:?})", store.prompts().len(), source);

    let mut app = App::new(store, config, config_path, cli.verbose);
    app.run(cli.command)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
