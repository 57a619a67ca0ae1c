use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use immo_price::batch::predict_csv;
use immo_price::{FileArtifactStore, PredictionService, ServiceConfig, SpreadPolicy, ZipCodeTable};

use crate::api::context::ApiContext;
use crate::cli::{Cli, Commands, PredictArgs, ServeArgs};

mod api;
mod cli;
mod telemetry;

fn load_service(
    artifact: &Path,
    zip_codes: Option<&Path>,
    spread: SpreadPolicy,
) -> anyhow::Result<PredictionService> {
    let store = FileArtifactStore::new(artifact);
    let mut service = PredictionService::from_store(&store, ServiceConfig { spread })
        .with_context(|| format!("unable to load artifact {}", artifact.display()))?;

    if let Some(path) = zip_codes {
        let table = ZipCodeTable::from_path(path)
            .with_context(|| format!("unable to load zip codes {}", path.display()))?;
        service = service.with_lookup(Arc::new(table));
    }
    Ok(service)
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let service = load_service(&args.artifact, args.zip_codes.as_deref(), args.spread)?;
    let addr = SocketAddr::new(args.host, args.port);
    api::setup_and_serve(ApiContext::new(service), addr).await
}

fn predict(args: PredictArgs) -> anyhow::Result<()> {
    let service = load_service(&args.artifact, args.zip_codes.as_deref(), args.spread)?;
    let input = File::open(&args.input)
        .with_context(|| format!("unable to open {}", args.input.display()))?;
    let input = BufReader::new(input);

    let summary = match &args.output {
        Some(path) => {
            let output = File::create(path)
                .with_context(|| format!("unable to create {}", path.display()))?;
            predict_csv(&service, input, BufWriter::new(output))
        }
        None => predict_csv(&service, input, io::stdout().lock()),
    }
    .context("batch prediction failed")?;

    eprintln!(
        "{} rows: {} succeeded, {} failed",
        summary.rows, summary.succeeded, summary.failed
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Predict(args) => predict(args),
    }
}
