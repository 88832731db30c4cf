//! jsontree CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "jsontree")]
#[command(about = "Explore JSON documents as an interactive node graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ./jsontree.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the visualization server
    Serve {
        /// JSON document to load at startup
        file: Option<PathBuf>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Rebuild the graph when the file changes
        #[arg(short, long)]
        watch: bool,
    },
    /// Build the graph for a document and print it as JSON
    Build {
        file: PathBuf,
    },
    /// Resolve a path expression against a document
    Search {
        file: PathBuf,
        query: String,
    },
    /// Print a document in canonical form
    Export {
        file: PathBuf,

        /// Print the node path list instead
        #[arg(long)]
        paths: bool,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            ["jsontree", "jsontree_core", "jsontree_server", "jsontree_watcher"]
                .map(|target| format!("{target}={log_level}"))
                .join(","),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            file,
            port,
            host,
            open,
            watch,
        } => {
            let options = commands::ServeOptions {
                file,
                host,
                port,
                open,
                watch,
            };
            commands::serve(config, options).await
        }
        Commands::Build { file } => commands::build(&config, &file),
        Commands::Search { file, query } => commands::search(&config, &file, &query),
        Commands::Export { file, paths } => commands::export(&config, &file, paths),
        Commands::Version => {
            println!("jsontree v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
