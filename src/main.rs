use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use neurocanvas::canvas::{CanvasError, CanvasStore, Position};
use neurocanvas::registry::{DATASET_KIND_ID, Registry};
use neurocanvas::sync::{
    BackendTimeouts, DynamicalSystem, GraphSync, HttpBackend, SyncConfig, SyncError, build_payload, new_problem_id,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "neurocanvas", about = "Block-graph editor backend client")]
struct Cli {
    #[arg(long, env = "NEUROCANVAS_BACKEND_URL")]
    backend_url: Option<String>,

    #[arg(long, env = "NEUROCANVAS_REQUEST_TIMEOUT_SECS", help = "Whole-request timeout; unset waits indefinitely")]
    request_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the block catalogue.
    Kinds,
    /// Build a sample graph and print its construct payload.
    Payload,
    /// Generate a dataset, build a model around it, construct and train.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(long, default_value = "VanDerPol")]
    system: DynamicalSystem,

    #[arg(long, default_value_t = 1)]
    num_simulations: u32,

    #[arg(long, default_value_t = false, help = "Stop after construct")]
    skip_train: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = SyncConfig::from_env();
    if let Some(url) = &cli.backend_url {
        config = config.with_backend_url(url);
    }
    if cli.request_timeout_secs.is_some() {
        config.timeouts = BackendTimeouts { request_secs: cli.request_timeout_secs, ..config.timeouts };
    }

    match cli.command {
        Command::Kinds => print_json(&Registry::builtin().list_kinds()),
        Command::Payload => run_payload(),
        Command::Run(args) => run_pipeline(config, args).await,
    }
}

/// Wire a dataset through a neural ODE into a tracking loss.
fn build_sample_model(store: &CanvasStore, dataset_id: &str) -> Result<(), CanvasError> {
    let mlp = store.place_block("mlp", Position::new(200.0, 0.0), None)?;
    let integrator = store.place_block("rk4", Position::new(400.0, 0.0), None)?;
    let loss = store.place_block("reference_tracking", Position::new(600.0, 0.0), None)?;
    store.connect(dataset_id, &mlp)?;
    store.connect(&mlp, &integrator)?;
    store.connect(&integrator, &loss)?;
    Ok(())
}

fn run_payload() -> Result<(), CliError> {
    let store = CanvasStore::default();
    let dataset_id = "dataset_sample";
    store.place_block_with_id(dataset_id, DATASET_KIND_ID, Position::new(0.0, 0.0), Some("VanDerPol"))?;
    build_sample_model(&store, dataset_id)?;

    let payload = build_payload(&store.snapshot(), &new_problem_id(), store.registry())?;
    print_json(&serde_json::json!({ "data": payload }))
}

async fn run_pipeline(config: SyncConfig, args: RunArgs) -> Result<(), CliError> {
    tracing::info!(backend_url = %config.backend_url, system = %args.system, "starting pipeline");
    let sync = GraphSync::new(Arc::new(HttpBackend::new(config)?));
    let store = CanvasStore::default();

    let dataset = sync
        .generate_dataset(&store, args.system, args.num_simulations, Position::new(0.0, 0.0))
        .await?;
    build_sample_model(&store, &dataset.instance_id)?;

    let payload = sync.prepare(&store)?;
    let ack = sync
        .submit_construct_until(&payload, interrupted())
        .await?;
    print_json(&serde_json::json!({ "phase": "construct", "problemId": payload.problem_id, "status": ack.status, "body": ack.body }))?;

    if args.skip_train {
        return Ok(());
    }

    let ack = sync
        .submit_train_until(&payload.problem_id, interrupted())
        .await?;
    print_json(&serde_json::json!({ "phase": "train", "problemId": payload.problem_id, "status": ack.status, "body": ack.body }))
}

async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
