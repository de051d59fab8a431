use std::time::Duration;

use search_intel_core::http::DEFAULT_ENDPOINT;
use search_intel_core::{
    EnvSettings, HttpConfig, HttpTransport, Location, MatchKind, Position, Provider,
    SearchClient, SearchResult,
};
use tracing::{error, info};

pub const ENDPOINT_ENV: &str = "SEARCH_INTEL_ENDPOINT";
pub const LOG_PATH_ENV: &str = "SEARCH_INTEL_LOG_PATH";

pub type HttpProvider = Provider<HttpTransport, EnvSettings>;

/// Connection options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Remote {
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Remote {
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .or_else(|| std::env::var(ENDPOINT_ENV).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }
}

pub fn build_provider(remote: &Remote) -> Result<HttpProvider, Box<dyn std::error::Error>> {
    let endpoint = remote.endpoint();
    info!("endpoint: {endpoint}");

    let transport = HttpTransport::new(HttpConfig {
        endpoint,
        timeout: Duration::from_secs(remote.timeout_secs),
    })?;
    Ok(Provider::new(SearchClient::new(transport, EnvSettings)))
}

/// Initialize tracing for CLI commands.
///
/// Logs go to stderr, and respect RUST_LOG or default to `info`.
pub fn init_tracing_cli() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing for the MCP server.
///
/// - Never logs to stdout (to keep stdio clean for JSON-RPC).
/// - If `SEARCH_INTEL_LOG_PATH` is set, append logs to that file.
/// - If not set or file cannot be opened, logging is effectively disabled.
pub fn init_tracing_server() {
    use std::fs::OpenOptions;
    use std::path::PathBuf;
    use tracing_subscriber::{EnvFilter, fmt};

    let path = match std::env::var(LOG_PATH_ENV) {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => return,
    };

    if OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .is_err()
    {
        return;
    }

    // Re-opened per write so no handle is shared across threads.
    let make_writer = move || {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .expect("failed to open SEARCH_INTEL_LOG_PATH for logging")
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(make_writer)
        .init();
}

pub fn format_result(r: &SearchResult) -> String {
    let head = format!(
        "{}@{}:{}:{}:{}-{}",
        r.repo, r.rev, r.file, r.start.line, r.start.character, r.end.character
    );
    match &r.kind {
        MatchKind::Symbol(sym) => match &sym.container_name {
            Some(container) if !container.is_empty() => {
                format!("{head} {} {container}.{}", sym.kind, sym.name)
            }
            _ => format!("{head} {} {}", sym.kind, sym.name),
        },
        MatchKind::Text(text) => format!("{head} {}", text.preview.trim()),
    }
}

pub fn format_location(loc: &Location) -> String {
    format!(
        "{}:{}:{}-{}:{}",
        loc.uri,
        loc.range.start.line,
        loc.range.start.character,
        loc.range.end.line,
        loc.range.end.character
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_search(
    remote: Remote,
    query: String,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(&remote)?;

    let results = match provider.client().search(&query).await {
        Ok(r) => r,
        Err(err) => {
            error!("Search failed: {err}");
            std::process::exit(1);
        }
    };

    if json {
        return print_json(&results);
    }
    for r in &results {
        println!("{}", format_result(r));
    }
    Ok(())
}

pub async fn run_file(remote: Remote, uri: String) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(&remote)?;

    match provider.client().file_content(&uri).await {
        Ok(Some(content)) => {
            print!("{content}");
            Ok(())
        }
        Ok(None) => {
            error!("File not found: {uri}");
            std::process::exit(1);
        }
        Err(err) => {
            error!("Fetching {uri} failed: {err}");
            std::process::exit(1);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Lookup {
    Definition,
    References,
}

pub async fn run_lookup(
    remote: Remote,
    lookup: Lookup,
    uri: String,
    pos: Position,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(&remote)?;

    let found = match lookup {
        Lookup::Definition => provider.definition(&uri, pos).await,
        Lookup::References => provider.references(&uri, pos).await,
    };
    let locations = match found {
        Ok(l) => l,
        Err(err) => {
            error!("{lookup:?} lookup failed: {err}");
            std::process::exit(1);
        }
    };

    if json {
        return print_json(&locations);
    }
    for loc in &locations {
        println!("{}", format_location(loc));
    }
    Ok(())
}
