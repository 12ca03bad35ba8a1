use anyhow::Context;
use clap::Parser;
use tower_lsp::{LspService, Server};

use vb_language_server::logging::init_logger;
use vb_language_server::lsp::VbBackend;

/// Language server for VB.NET-family sources.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Communicate over stdio (the only supported transport; accepted
    /// for compatibility with clients that always pass it)
    #[arg(long)]
    stdio: bool,

    /// Log level for stderr output (e.g. "debug", "vb_language_server=trace")
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr logs
    #[arg(long)]
    no_color: bool,

    /// Disable the session log file in the cache directory
    #[arg(long)]
    no_file_log: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _log_guard = init_logger(args.no_color, args.log_level.as_deref(), !args.no_file_log)
        .context("failed to initialize logging")?;

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| VbBackend::new(client, None));

    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
