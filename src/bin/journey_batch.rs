//! Journey Batch Runner
//!
//! Runs the journey kernel over one exported site graph:
//! load → validate → analyze per persona → materialize → export.
//!
//! ## Usage
//!
//! ```bash
//! journey_batch <graph.json> <personas.json> <out-dir>
//! ```
//!
//! Environment variables:
//! - `RUST_LOG`: log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development
//!   (default: pretty)
//!
//! Population errors degrade to warnings: the run completes on a
//! best-effort graph and reports them. Only I/O and parse failures exit
//! non-zero.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use journey_kernel::{
    execute_run, GraphDocument, JourneyPolicy, PersonaCatalog, PropertyGraph,
};

/// Initialize the tracing subscriber with JSON or pretty format.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "journey_batch=info,journey_kernel=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let [_, graph_path, personas_path, out_dir] = args.as_slice() else {
        eprintln!("usage: journey_batch <graph.json> <personas.json> <out-dir>");
        return ExitCode::FAILURE;
    };

    match run(Path::new(graph_path), Path::new(personas_path), Path::new(out_dir)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "batch run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(graph_path: &Path, personas_path: &Path, out_dir: &Path) -> Result<(), BatchError> {
    let graph_json = std::fs::read_to_string(graph_path)
        .map_err(|e| BatchError::Io(graph_path.to_path_buf(), e))?;
    let document = GraphDocument::from_json(&graph_json)?;

    let personas_json = std::fs::read_to_string(personas_path)
        .map_err(|e| BatchError::Io(personas_path.to_path_buf(), e))?;
    let catalog = PersonaCatalog::from_json(&personas_json)?;

    let imported = PropertyGraph::from_document(&document)?;
    for warning in &imported.warnings {
        warn!(%warning, "population warning");
    }
    let mut graph = imported.graph;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        personas = catalog.len(),
        "graph loaded"
    );

    let policy = JourneyPolicy::default();
    let mut run_outcome = execute_run(&mut graph, &catalog, &policy);

    std::fs::create_dir_all(out_dir).map_err(|e| BatchError::Io(out_dir.to_path_buf(), e))?;

    let enriched = graph.to_document();
    run_outcome.report.export_checksum = Some(enriched.checksum());
    write_file(
        &out_dir.join("graph_enriched.json"),
        &enriched.to_json_pretty().map_err(BatchError::Serialize)?,
    )?;
    write_file(&out_dir.join("graph.mmd"), &graph.to_mermaid())?;
    write_file(
        &out_dir.join("run_report.json"),
        &serde_json::to_string_pretty(&run_outcome.report).map_err(BatchError::Serialize)?,
    )?;

    info!(
        run_id = %run_outcome.report.run_id,
        inserted = run_outcome.report.materialize.inserted,
        rejected = run_outcome.report.materialize.rejected.len(),
        out_dir = %out_dir.display(),
        "artifacts written"
    );
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), BatchError> {
    std::fs::write(path, contents).map_err(|e| BatchError::Io(path.to_path_buf(), e))
}

/// Batch runner failure.
#[derive(Debug, thiserror::Error)]
enum BatchError {
    #[error("{}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error(transparent)]
    Import(#[from] journey_kernel::ImportError),
    #[error(transparent)]
    Catalog(#[from] journey_kernel::CatalogError),
    #[error("serialization failed: {0}")]
    Serialize(serde_json::Error),
}
