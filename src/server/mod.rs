// Solace - HTTP Server Module
// Thin JSON adapter over the chat and analysis services

mod handlers;

pub use handlers::{create_router, health_check, metrics_endpoint, AppError};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::engine::Engine;
use crate::metrics::ServiceMetrics;
use crate::service::{AnalysisService, ChatService};
use crate::store::{open_store, ConversationStore};

/// Main server structure, shared by every request handler
pub struct ChatServer {
    engine: Engine,
    chat: Arc<ChatService>,
    analysis: Arc<AnalysisService>,
    metrics: ServiceMetrics,
    config: ServerConfig,
    started_at: Instant,
}

impl ChatServer {
    /// Create a server over an already opened store
    pub fn new(config: &Config, engine: Engine, store: Arc<dyn ConversationStore>) -> Result<Self> {
        let metrics = ServiceMetrics::new()?;

        let chat = ChatService::new(
            engine.clone(),
            Arc::clone(&store),
            config.chat.clone(),
            metrics.clone(),
        );
        let analysis = AnalysisService::new(engine.clone(), store, metrics.clone());

        Ok(Self {
            engine,
            chat: Arc::new(chat),
            analysis: Arc::new(analysis),
            metrics,
            config: config.server.clone(),
            started_at: Instant::now(),
        })
    }

    /// Load data files and open the configured store
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = Engine::from_config(&config.data)?;
        let store = open_store(&config.storage).context("Failed to open conversation store")?;
        Self::new(config, engine, store)
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.config.bind_address))?;

        let app = create_router(Arc::new(self)).layer(TraceLayer::new_for_http());

        tracing::info!("Starting Solace server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn chat(&self) -> &Arc<ChatService> {
        &self.chat
    }

    pub fn analysis(&self) -> &Arc<AnalysisService> {
        &self.analysis
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
