//! CommentScope Server
//!
//! Serves the comment analysis pipeline over HTTP, or runs it once over a
//! JSON file of comments.

use anyhow::{Context, Result};
use clap::Parser;
use commentscope_classifiers::build_pipeline_from_config;
use commentscope_server::cli::{AnalyzeArgs, Cli, Command};
use commentscope_server::report::{AnalysisReport, AnalyzeInput, AnalyzeRequest, ApiResponse};
use commentscope_server::{create_router, AppState, ServerConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    match &cli.command {
        Command::Serve(args) => {
            let config = ServerConfig::load(&cli.config, &cli, Some(args))?;
            serve(config).await
        }
        Command::Analyze(args) => {
            let config = ServerConfig::load(&cli.config, &cli, None)?;
            analyze_file(config, args).await
        }
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    info!("Starting CommentScope server");

    let metrics_handle = init_metrics()?;

    info!("Initializing analysis pipeline...");
    let state = AppState::from_config(&config, metrics_handle).await?;
    info!(
        backend = state.pipeline.backend_name(),
        model = state.pipeline.is_model_backed(),
        "Analysis pipeline initialized"
    );

    let addr = config.socket_addr()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Analyze a JSON file and print the result envelope to stdout
///
/// Ctrl+C stops the batch early; the partial result is still printed.
async fn analyze_file(config: ServerConfig, args: &AnalyzeArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let input: AnalyzeInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse comments from {}", args.input.display()))?;
    let mut request = AnalyzeRequest::from(input);
    if args.post_url.is_some() {
        request.post_url = args.post_url.clone();
    }

    let pipeline = build_pipeline_from_config(&config.analyzer).await?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Interrupted, finishing in-flight comments...");
        trigger.cancel();
    });

    let total = request.comments.len();
    let outcome = pipeline
        .analyze_batch_with_cancellation(request.comments, cancel)
        .await;

    let result = pipeline.summarize(&outcome.comments);
    let report = AnalysisReport::new(request.post_url, result, &outcome.comments);
    let envelope = ApiResponse::ok(report);
    let output = if args.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{}", output);

    if outcome.cancelled {
        error!(
            analyzed = outcome.comments.len(),
            total, "Analysis cancelled before the batch completed"
        );
        return Err(commentscope_core::Error::Cancelled.into());
    }
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
///
/// Logs go to stderr so `analyze` output on stdout stays valid JSON.
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("commentscope=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("commentscope=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "commentscope_requests_total",
        "Total number of analysis requests by endpoint"
    );
    metrics::describe_counter!(
        "commentscope_comments_total",
        "Total number of classified comments by sentiment"
    );
    metrics::describe_counter!(
        "commentscope_comment_failures_total",
        "Comments whose classification failed and were reported neutral"
    );
    metrics::describe_counter!(
        "commentscope_model_fallbacks_total",
        "Model failures answered by the polarity fallback"
    );
    metrics::describe_counter!(
        "commentscope_topics_total",
        "Total number of negative comments by assigned topic"
    );
    metrics::describe_histogram!(
        "commentscope_batch_latency_us",
        metrics::Unit::Microseconds,
        "Batch analysis latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
