use std::env;

use clap::Parser;
use tessera::TesseraResult;
use tessera::config::args::Args;
use tessera::config::env::OsEnv;
use tessera::config::file::{Config, read_config};
use tessera::logging::{ensure_tessera_core_log_level_matches, init_tracing};
use tessera::srv::new_server;
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

async fn start(args: Args) -> TesseraResult<()> {
    info!("Starting Tessera v{VERSION}");

    let env = OsEnv;
    let save_config = args.meta.save_config.clone();
    let mut config = if let Some(ref cfg_filename) = args.meta.config {
        info!("Using {}", cfg_filename.display());
        read_config(cfg_filename, &env)?
    } else {
        info!("Config file is not specified, serving the files given on the command line");
        Config::default()
    };

    args.merge_into_config(&mut config)?;
    config.finalize()?;
    let repo = config.resolve().await?;

    if let Some(file_name) = save_config {
        config.save_to_file(file_name.as_path())?;
    } else {
        info!("Use --save-config to save or print Tessera configuration.");
    }

    let ids = repo.ids().join(", ");
    let (server, listen_addresses) = new_server(config.srv, repo)?;
    info!("Tessera has been started on {listen_addresses}, serving {ids}.");
    info!("Use http://{listen_addresses}/catalog to get the list of available sources.");

    server.await
}

#[actix_web::main]
async fn main() {
    let filter = ensure_tessera_core_log_level_matches(env::var("RUST_LOG").ok(), "tessera=");
    init_tracing(&filter, env::var("TESSERA_FORMAT").ok());

    let args = Args::parse();
    if let Err(e) = start(args).await {
        // Ensure the message is printed, even if the logging is disabled
        if log::log_enabled!(log::Level::Error) {
            error!("{e}");
        } else {
            eprintln!("{e}");
        }
        std::process::exit(1);
    }
}
