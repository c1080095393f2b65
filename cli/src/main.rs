//! Kindle CLI - runs an isomorphic init pass and documents validation errors.
//!
//! ```text
//! kindle demo   -> server: prepare_components() -> render -> serialize state
//!                  client: hydrate state -> first render -> SelfInit -> navigate
//! kindle errors -> every validation error category with an example message
//! ```

mod catalog;
mod demo;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use kindle_engine::InitDefaults;

#[derive(Parser)]
#[command(name = "kindle")]
#[command(about = "Prepare components on the server and let them initialize themselves on the client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare a page on the server, transfer its state and hydrate a client
    Demo {
        /// TOML file with an [init] table of option defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Post rendered by the server
        #[arg(long, default_value_t = 1)]
        post: u64,
        /// Post the client navigates to after hydrating
        #[arg(long, default_value_t = 2)]
        next: u64,
    },
    /// List every validation error category with an example message
    Errors,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the rendered output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { config, post, next } => {
            let defaults = match config {
                Some(path) => InitDefaults::load(&path)
                    .with_context(|| format!("loading init defaults from {}", path.display()))?,
                None => InitDefaults::default(),
            };
            tracing::info!(?defaults, post, next, "Running demo");
            demo::run(defaults, post, next).await
        }
        Commands::Errors => {
            catalog::print();
            Ok(())
        }
    }
}
