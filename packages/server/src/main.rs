#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Entry point for the nephro coach API server.
//!
//! Configuration comes from `BIND_ADDR`, `PORT`, `DATABASE_PATH` and
//! `UPLOAD_DIR`; command-line flags take precedence.

use std::path::PathBuf;

use clap::Parser;
use nephro_coach_server::{ServerConfig, run_server};

#[derive(Parser)]
#[command(name = "nephro_coach_server", about = "Nephro coach lab report API server")]
struct Cli {
    /// Address to bind to
    #[arg(long)]
    bind_addr: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Path to the records `SQLite` database
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory uploaded PDFs are saved to
    #[arg(long)]
    upload_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(bind_addr) = self.bind_addr {
            config.bind_addr = bind_addr;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database) = self.database {
            config.database_path = database;
        }
        if let Some(upload_dir) = self.upload_dir {
            config.upload_dir = upload_dir;
        }
        config
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = Cli::parse().into_config(ServerConfig::from_env());

    run_server(config).await
}
