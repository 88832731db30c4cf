//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use jsontree_core::{
    GraphBuilder, JsonTreeConfig, LoadSummary, Session, export_path_list, resolve, sample_document,
};
use jsontree_server::{JsonTreeServer, ServerConfig, ServerState};
use jsontree_watcher::WatcherService;
use serde_json::json;

pub struct ServeOptions {
    pub file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub open: bool,
    pub watch: bool,
}

/// Explicit `--config` file, else `jsontree.toml` in the working directory.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<JsonTreeConfig> {
    let config = match path {
        Some(path) => JsonTreeConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => JsonTreeConfig::load(&std::env::current_dir()?)?,
    };
    Ok(config)
}

fn read_document(file: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Cannot read {}", file.display()))
}

pub async fn serve(config: JsonTreeConfig, options: ServeOptions) -> anyhow::Result<()> {
    let host = options.host.unwrap_or(config.server.host.clone());
    let port = options.port.unwrap_or(config.server.port);
    let watch = options.watch || config.server.watch;
    let open = options.open || config.server.open_browser;
    tracing::info!("Starting jsontree server on {}:{}", host, port);

    let mut session = Session::new(GraphBuilder::from_config(&config));
    let summary = load_initial(&mut session, options.file.as_deref())?;
    tracing::info!("Loaded {} nodes, {} edges", summary.node_count, summary.edge_count);

    let server = JsonTreeServer::new(session, ServerConfig { host: host.clone(), port });
    let state = server.state();

    match (&options.file, watch) {
        (Some(file), true) => {
            let file = file.clone();
            let watcher_state = Arc::clone(&state);
            tokio::spawn(async move {
                if let Err(e) = run_watcher(file, watcher_state).await {
                    tracing::error!("File watcher error: {}", e);
                }
            });
        }
        (None, true) => tracing::warn!("--watch needs a file to watch; ignoring"),
        _ => {}
    }

    if open {
        let url = format!("http://{}:{}/", host, port);
        if let Err(e) = open::that(&url) {
            tracing::warn!("Failed to open browser at {}: {}", url, e);
        }
    }

    server.start().await
}

/// Load `file`, or the sample document when serving without one.
fn load_initial(session: &mut Session, file: Option<&Path>) -> anyhow::Result<LoadSummary> {
    let Some(file) = file else {
        tracing::info!("No file given; showing the sample document");
        return Ok(session.load_value(sample_document())?);
    };
    let text = read_document(file)?;
    let summary = session
        .load_text(&text)
        .with_context(|| format!("Cannot graph {}", file.display()))?;
    tracing::info!("Loaded {}", file.display());
    Ok(summary)
}

/// Run the file watcher and broadcast rebuilds to WebSocket clients
async fn run_watcher(file: PathBuf, state: Arc<ServerState>) -> anyhow::Result<()> {
    let mut watcher =
        WatcherService::with_broadcast(&file, Arc::clone(&state.session), state.update_tx.clone())?;
    watcher.start_watching()?;
    watcher.process_events().await
}

pub fn build(config: &JsonTreeConfig, file: &Path) -> anyhow::Result<()> {
    let text = read_document(file)?;
    let (_, graph) = GraphBuilder::from_config(config)
        .build_text(&text)
        .with_context(|| format!("Cannot graph {}", file.display()))?;
    tracing::info!("Built {} nodes, {} edges", graph.node_count(), graph.edge_count());
    println!("{}", serde_json::to_string_pretty(&graph.snapshot())?);
    Ok(())
}

pub fn search(config: &JsonTreeConfig, file: &Path, query: &str) -> anyhow::Result<()> {
    let text = read_document(file)?;
    let (_, graph) = GraphBuilder::from_config(config)
        .build_text(&text)
        .with_context(|| format!("Cannot graph {}", file.display()))?;
    let result = resolve(query, &graph);
    let had_match = result.had_match();
    let output = json!({
        "query": query,
        "matched": result.matched,
        "had_match": had_match,
        "strategy": result.strategy,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn export(config: &JsonTreeConfig, file: &Path, paths: bool) -> anyhow::Result<()> {
    let text = read_document(file)?;
    let mut session = Session::new(GraphBuilder::from_config(config));
    session
        .load_text(&text)
        .with_context(|| format!("Cannot graph {}", file.display()))?;
    if paths {
        print!("{}", export_path_list(session.graph()));
    } else if let Some(text) = session.export_source() {
        println!("{}", text);
    }
    Ok(())
}
