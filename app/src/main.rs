use clap::{Args as ClapArgs, Parser, Subcommand};
use search_intel_core::Position;

mod cli;
mod mcp;

use crate::cli::{
    Lookup, Remote, init_tracing_cli, init_tracing_server, run_file, run_lookup, run_search,
};
use crate::mcp::run_server;

#[derive(ClapArgs, Debug, Clone)]
struct RemoteArgs {
    /// GraphQL endpoint of the code-search service
    /// (defaults to $SEARCH_INTEL_ENDPOINT, then http://localhost:7080/.api/graphql)
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Request timeout in seconds
    #[arg(long = "timeout-secs", global = true, default_value_t = 30)]
    timeout_secs: u64,
}

impl From<RemoteArgs> for Remote {
    fn from(args: RemoteArgs) -> Self {
        Remote {
            endpoint: args.endpoint,
            timeout_secs: args.timeout_secs,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct PositionArgs {
    /// Location token: git://<repo>?<rev>#<path>
    uri: String,
    /// Zero-based line
    #[arg(long)]
    line: u32,
    /// Zero-based character offset within the line
    #[arg(long)]
    character: u32,
    /// Print JSON instead of one location per line
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a raw search query and print every symbol and text match
    Search {
        /// Search query
        query: String,
        /// Print JSON instead of one result per line
        #[arg(long)]
        json: bool,
    },
    /// Print the content of a file addressed by a location token
    File {
        /// Location token: git://<repo>?<rev>#<path>
        uri: String,
    },
    /// Find definitions of the identifier at a position
    Definition(PositionArgs),
    /// Find references to the identifier at a position
    References(PositionArgs),
    /// Run MCP server over stdio
    Server,
}

#[derive(Parser, Debug)]
#[command(
    name = "si",
    about = "search_intel: definitions and references from a code-search API",
    version,
    long_about = None
)]
struct Args {
    #[command(flatten)]
    remote: RemoteArgs,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let remote = Remote::from(args.remote);

    match args.command {
        Command::Search { query, json } => {
            init_tracing_cli();
            run_search(remote, query, json).await?;
        }
        Command::File { uri } => {
            init_tracing_cli();
            run_file(remote, uri).await?;
        }
        Command::Definition(p) => {
            init_tracing_cli();
            let pos = Position::new(p.line, p.character);
            run_lookup(remote, Lookup::Definition, p.uri, pos, p.json).await?;
        }
        Command::References(p) => {
            init_tracing_cli();
            let pos = Position::new(p.line, p.character);
            run_lookup(remote, Lookup::References, p.uri, pos, p.json).await?;
        }
        Command::Server => {
            // For MCP server, never log to stdout; optionally log to a file
            // if SEARCH_INTEL_LOG_PATH is set.
            init_tracing_server();
            run_server(remote).await?;
        }
    }

    Ok(())
}
