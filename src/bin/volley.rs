//! Terminal front-end for the probe harness.
//!
//! Each subcommand renders into a board and prints slots as they are created
//! and again as they finalize. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

use volley::{
    AnySlot, BatchDispatcher, BoardEvent, HarnessConfig, Presentation, RequestDescriptor,
    ReqwestHttpClient, SingleShot, SlotBoard, render,
};

#[derive(Parser)]
#[command(name = "volley", version, about = "Fire HTTP requests and watch each result land")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL for relative URIs (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request transport timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Print the final slots as JSON lines instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// GET a single URI
    Get { uri: String },

    /// POST form fields to the submit endpoint
    Submit {
        /// Form fields as KEY=VALUE
        #[arg(value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Launch the six-request concurrency demo
    Demo {
        /// Reset the batch after this many milliseconds
        #[arg(long)]
        reset_after_ms: Option<u64>,
    },

    /// Launch a custom batch
    Batch {
        /// Requests as URI or URI,LABEL
        #[arg(required = true)]
        requests: Vec<RequestDescriptor>,

        /// Reset the batch after this many milliseconds
        #[arg(long)]
        reset_after_ms: Option<u64>,
    },
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

fn load_config(cli: &Cli) -> anyhow::Result<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if cli.timeout_ms.is_some() {
        config.timeout_ms = cli.timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("volley=info")),
        )
        .with_writer(std::io::stderr)
        .init();
    volley::metrics::describe_metrics();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(base_url = %config.base_url, timeout_ms = ?config.timeout_ms, "Configuration loaded");

    let client = Arc::new(ReqwestHttpClient::from_config(&config)?);
    let board = Arc::new(SlotBoard::with_capacity(config.event_capacity));

    match cli.command {
        Command::Get { ref uri } => {
            let single = SingleShot::new(client, board.clone(), config.submit_path.clone());
            let slot = single.get(uri).await;
            print_final(&[slot], cli.json)?;
        }
        Command::Submit { ref fields } => {
            let single = SingleShot::new(client, board.clone(), config.submit_path.clone());
            let slot = single.submit(fields).await?;
            print_final(&[slot], cli.json)?;
        }
        Command::Demo { reset_after_ms } => {
            let descriptors = config.demo_batch.clone();
            run_batch(client, board, descriptors, reset_after_ms, cli.json).await?;
        }
        Command::Batch {
            ref requests,
            reset_after_ms,
        } => {
            run_batch(client, board, requests.clone(), reset_after_ms, cli.json).await?;
        }
    }

    Ok(())
}

async fn run_batch(
    client: Arc<ReqwestHttpClient>,
    board: Arc<SlotBoard>,
    descriptors: Vec<RequestDescriptor>,
    reset_after_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let dispatcher = Arc::new(BatchDispatcher::new(client, board.clone()));
    let mut events = board.subscribe();

    dispatcher.launch_batch(descriptors);

    if let Some(delay_ms) = reset_after_ms {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            dispatcher.reset_batch();
        });
    }

    let printer = async {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event, json),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind, some updates were not shown");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    tokio::select! {
        _ = dispatcher.wait_idle() => {}
        _ = printer => {}
    }

    // Events sent while the last executor was finishing
    drain(&mut events, json);

    let stats = dispatcher.stats();
    eprintln!(
        "launched={} succeeded={} http_errors={} network_errors={} discarded={}",
        stats.requests_launched,
        stats.requests_succeeded,
        stats.requests_http_errors,
        stats.requests_network_errors,
        stats.updates_discarded
    );

    if json {
        print_final(&board.snapshot(), true)?;
    }
    Ok(())
}

fn drain(events: &mut broadcast::Receiver<BoardEvent>, json: bool) {
    loop {
        match events.try_recv() {
            Ok(event) => print_event(&event, json),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

fn print_event(event: &BoardEvent, json: bool) {
    // JSON mode only prints the final snapshot
    if json {
        return;
    }

    match event {
        BoardEvent::Created { position, slot, .. } | BoardEvent::Updated { position, slot, .. } => {
            println!("#{} {}\n", position + 1, render::render_slot(slot));
        }
        BoardEvent::Cleared { generation } => {
            println!("-- board cleared (generation {generation}) --\n");
        }
    }
}

fn print_final(slots: &[AnySlot], json: bool) -> anyhow::Result<()> {
    for slot in slots {
        if json {
            println!("{}", serde_json::to_string(slot)?);
        } else {
            println!("{}", render::render_slot(slot));
        }
    }
    Ok(())
}
