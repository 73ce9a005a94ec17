use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spdlog::{info, warn};

use inkdrop::config::open_config;
use inkdrop::config_data::generate_cfg;
use inkdrop::logger::configure_logger;
use inkdrop::server::server_run;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Write a sample configuration file and exit
    #[arg(long)]
    generate_config: bool,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    if args.generate_config {
        let path = generate_cfg(&config_path)?;
        println!("Sample configuration written to {}", path.to_str().unwrap_or("?"));
        return Ok(());
    }

    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run inkdrop --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Starting InkDrop front-end =-=-=-=-=-=-=-=-=-=-=");
    info!("Serving feed on {}:{}", config.server.address, config.server.port);
    info!("Backend API at {}", config.backend.base_url);

    server_run(config).await?;

    Ok(())
}
