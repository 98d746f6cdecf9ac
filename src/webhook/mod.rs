//! Validating Admission Webhook for hierarchy edges
//!
//! This module serves the HTTPS endpoint the API server calls before it
//! persists a HierarchicalNamespace create or delete. The handler is a thin
//! adapter over [`HierarchyValidator`](crate::validator::HierarchyValidator);
//! the forest it consults is kept current by the sync controllers.

pub mod hierarchy;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tracing::{info, warn};

use crate::validator::HierarchyValidator;
use crate::Error;

/// Path the ValidatingWebhookConfiguration points at
pub const VALIDATE_HNS_PATH: &str = "/validate-hnc-x-k8s-io-v1alpha1-hns";

/// Shared state for webhook handlers
#[derive(Clone, Debug)]
pub struct WebhookState {
    /// Decision logic over the shared forest
    pub validator: HierarchyValidator,
}

impl WebhookState {
    /// Create a new webhook state around a validator
    pub fn new(validator: HierarchyValidator) -> Self {
        Self { validator }
    }
}

/// PEM files for the webhook's serving certificate
#[derive(Clone, Debug)]
pub struct TlsFiles {
    /// Certificate chain
    pub cert: PathBuf,
    /// Private key
    pub key: PathBuf,
}

/// Configuration for the webhook server
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// Serving certificate; plain HTTP when absent
    pub tls: Option<TlsFiles>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], crate::DEFAULT_WEBHOOK_PORT)),
            tls: None,
        }
    }
}

/// Create the webhook router with all validation endpoints
///
/// Currently supports:
/// - POST /validate-hnc-x-k8s-io-v1alpha1-hns - Validate hierarchy edges
/// - GET /healthz - Liveness probe
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(VALIDATE_HNS_PATH, post(hierarchy::validate_handler))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Serve the webhook router until the server fails
pub async fn serve(config: &WebhookConfig, state: Arc<WebhookState>) -> crate::Result<()> {
    let app = webhook_router(state).into_make_service();

    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .map_err(|e| {
                    Error::server(format!(
                        "failed to load TLS material {:?}/{:?}: {e}",
                        tls.cert, tls.key
                    ))
                })?;

            info!(addr = %config.addr, "Starting webhook HTTPS server");
            axum_server::bind_rustls(config.addr, tls_config)
                .serve(app)
                .await
                .map_err(|e| Error::server(e.to_string()))
        }
        None => {
            warn!(addr = %config.addr, "Starting webhook without TLS; the API server will not call it");
            axum_server::bind(config.addr)
                .serve(app)
                .await
                .map_err(|e| Error::server(e.to_string()))
        }
    }
}
