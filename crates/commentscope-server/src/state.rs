//! Shared application state

use commentscope_classifiers::{build_pipeline_from_config, AnalysisPipeline};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::ServerConfig;

/// State shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Analysis pipeline, built once at startup
    pub pipeline: Arc<AnalysisPipeline>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,

    /// Maximum request body size in bytes
    pub max_body_bytes: usize,

    /// Allow cross-origin requests from any origin
    pub cors_permissive: bool,
}

impl AppState {
    pub fn new(
        pipeline: AnalysisPipeline,
        metrics_handle: PrometheusHandle,
        config: &ServerConfig,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            metrics_handle,
            max_body_bytes: config.max_body_bytes,
            cors_permissive: config.cors_permissive,
        }
    }

    /// Build the pipeline described by the config and wrap it in state
    pub async fn from_config(
        config: &ServerConfig,
        metrics_handle: PrometheusHandle,
    ) -> anyhow::Result<Self> {
        let pipeline = build_pipeline_from_config(&config.analyzer).await?;
        Ok(Self::new(pipeline, metrics_handle, config))
    }
}
