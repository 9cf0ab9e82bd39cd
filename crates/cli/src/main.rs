//! Change Set CLI - submit, poll and inspect bulk change sets

mod output;

use anyhow::{Context, Result};
use changeset_core::application::workflow::records::{
    DEFAULT_LINKS_PER_NODE, DEFAULT_NODE_COUNT, DEFAULT_PSET_COUNT,
};
use changeset_core::application::workflow::{demo_nodes, demo_psets};
use changeset_core::application::{cancel_channel, ChangeSetWorkflow, PollConfig, ResultFetcher};
use changeset_core::domain::{ChangeRecord, ChangeSetRequest};
use changeset_core::port::{
    ChangeSetService, MonotonicTimeProvider, ServiceError, ServiceErrorKind, UniformJitter,
};
use changeset_core::{AppError, VERSION};
use changeset_infra_http::{
    NdjsonTransferClient, OrganizerClient, PSetClient, Session, DEFAULT_ORGANIZER_URL,
    DEFAULT_PSET_URL,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "changeset")]
#[command(
    about = "Bulk change sets for the organizer and property set services",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Bearer token for the organizer and property set services
    #[arg(long, env = "CHANGESET_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    /// Organizer service base URL
    #[arg(long, env = "CHANGESET_ORG_URL", default_value = DEFAULT_ORGANIZER_URL, global = true)]
    org_url: String,

    /// Property set service base URL
    #[arg(long, env = "CHANGESET_PSET_URL", default_value = DEFAULT_PSET_URL, global = true)]
    pset_url: String,

    /// JSON file overriding the status polling schedule
    #[arg(long, global = true)]
    poll_config: Option<PathBuf>,

    /// Log output format (pretty or json)
    #[arg(long, env = "CHANGESET_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Upsert demo nodes into an organizer tree
    Organizer {
        /// Forest ID
        #[arg(long)]
        forest: String,

        /// Tree ID
        #[arg(long)]
        tree: String,

        /// Number of nodes
        #[arg(long, default_value_t = DEFAULT_NODE_COUNT)]
        count: usize,

        /// Links per node
        #[arg(long, default_value_t = DEFAULT_LINKS_PER_NODE)]
        links: usize,
    },

    /// Upsert demo property sets under one library definition
    Pset {
        /// Library ID
        #[arg(long)]
        library: String,

        /// Definition ID
        #[arg(long)]
        definition: String,

        /// Number of property sets
        #[arg(long, default_value_t = DEFAULT_PSET_COUNT)]
        count: usize,
    },

    /// Show the current status of a change set
    Status {
        /// Service that owns the change set
        #[arg(long, value_enum)]
        service: ServiceKind,

        /// Change set ID
        change_set_id: String,
    },

    /// Print a results or errors document
    Fetch {
        /// Document kind
        #[arg(long, value_enum)]
        kind: DocumentKind,

        /// Pre-signed document URL
        url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ServiceKind {
    Organizer,
    Pset,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentKind {
    Results,
    Errors,
}

fn init_logging(log_format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("changeset=info"))
        .context("Failed to create env filter")?;

    match log_format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

fn session(cli: &Cli) -> Result<Session> {
    let token = cli
        .access_token
        .as_deref()
        .context("An access token is required (--access-token or CHANGESET_ACCESS_TOKEN)")?;
    Ok(Session::new(token, &cli.org_url, &cli.pset_url)?)
}

fn load_poll_config(path: Option<&Path>) -> Result<PollConfig> {
    let Some(path) = path else {
        return Ok(PollConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read poll config {}", path.display()))?;
    PollConfig::from_json_str(&text)
        .with_context(|| format!("Invalid poll config {}", path.display()))
}

fn service_client(kind: ServiceKind, session: &Session) -> Arc<dyn ChangeSetService> {
    match kind {
        ServiceKind::Organizer => Arc::new(OrganizerClient::new(session.clone())),
        ServiceKind::Pset => Arc::new(PSetClient::new(session.clone())),
    }
}

async fn run_workflow(
    cli: &Cli,
    kind: ServiceKind,
    request: ChangeSetRequest,
    records: Vec<ChangeRecord>,
) -> Result<()> {
    let session = session(cli)?;
    let config = load_poll_config(cli.poll_config.as_deref())?;

    let workflow = ChangeSetWorkflow::new(
        service_client(kind, &session),
        Arc::new(NdjsonTransferClient::from_session(&session)),
        Arc::new(MonotonicTimeProvider::new()),
        Arc::new(UniformJitter),
        config,
    )?;

    // Ctrl+C stops polling; the change set keeps running server-side
    let (cancel_tx, cancel) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling status polling");
            cancel_tx.cancel();
        }
    });

    println!(
        "{}",
        format!(
            "Submitting {} change set with {} records...",
            request.service_name(),
            records.len()
        )
        .cyan()
        .bold()
    );

    let summary = match workflow.run(&request, &records, Some(cancel)).await {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(ServiceError {
                kind: ServiceErrorKind::Unauthorized,
                ..
            }) = e.service_error()
            {
                eprintln!("{}", "✗ Access token rejected, check CHANGESET_ACCESS_TOKEN".red());
            }
            return Err(anyhow::Error::new(e).context("Change set workflow failed"));
        }
    };

    output::print_summary(&summary);

    if !summary.report.is_done() {
        anyhow::bail!(
            "Change set {} finished as {} ({:?})",
            summary.report.handle.id,
            summary.report.handle.status,
            summary.report.exit
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_format)?;
    info!(version = VERSION, "changeset CLI starting");

    match &cli.command {
        Commands::Organizer {
            forest,
            tree,
            count,
            links,
        } => {
            let records = demo_nodes(*count, *links)?;
            let request = ChangeSetRequest::organizer(forest.as_str(), tree.as_str());
            run_workflow(&cli, ServiceKind::Organizer, request, records).await?;
        }

        Commands::Pset {
            library,
            definition,
            count,
        } => {
            let records = demo_psets(library, definition, *count)?;
            run_workflow(&cli, ServiceKind::Pset, ChangeSetRequest::PropertySet, records).await?;
        }

        Commands::Status {
            service,
            change_set_id,
        } => {
            let session = session(&cli)?;
            let handle = service_client(*service, &session)
                .get_change_set_status(change_set_id)
                .await
                .map_err(AppError::StatusCheck)
                .context("Failed to get change set status")?;

            output::print_handle(&handle);
        }

        Commands::Fetch { kind, url } => {
            let transfer = Arc::new(NdjsonTransferClient::new(Arc::new(reqwest::Client::new())));
            let fetcher = ResultFetcher::new(transfer);

            match kind {
                DocumentKind::Results => {
                    let mut stream = fetcher.stream_results(url).await?;
                    let mut count = 0usize;
                    while let Some(record) = stream.next().await {
                        let record = record.context("Failed to read results document")?;
                        println!("{}", serde_json::to_string(record.as_value())?);
                        count += 1;
                    }
                    println!("{}", format!("✓ {} results", count).green().bold());
                }
                DocumentKind::Errors => {
                    let errors = fetcher
                        .collect_errors(url)
                        .await
                        .context("Failed to read errors document")?;
                    output::print_errors(&errors);
                }
            }
        }
    }

    Ok(())
}
