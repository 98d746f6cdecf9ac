//! HNC - hierarchical namespace admission controller

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use hnc::config::ExcludedNamespaces;
use hnc::controller::run_forest_sync;
use hnc::crd;
use hnc::forest::Forest;
use hnc::telemetry::{init_telemetry, TelemetryConfig};
use hnc::validator::HierarchyValidator;
use hnc::webhook::{self, TlsFiles, WebhookConfig, WebhookState};

/// HNC - hierarchical namespace admission controller for Kubernetes
#[derive(Parser, Debug)]
#[command(name = "hnc", version, about, long_about = None)]
struct Cli {
    /// Generate CRD manifests and exit
    #[arg(long)]
    crd: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "HNC_LOG_JSON")]
    log_json: bool,

    /// Address the admission webhook listens on
    #[arg(long, global = true, env = "HNC_WEBHOOK_ADDR", default_value = "0.0.0.0:9443")]
    webhook_addr: SocketAddr,

    /// PEM certificate chain for the webhook
    #[arg(long, global = true, env = "HNC_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// PEM private key for the webhook
    #[arg(long, global = true, env = "HNC_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Namespaces excluded from the hierarchy in addition to the defaults
    #[arg(long, global = true, env = "HNC_EXCLUDED_NAMESPACES", value_delimiter = ',')]
    excluded_namespaces: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook together with forest sync (default mode)
    Run,

    /// Run only the webhook over an empty forest
    ///
    /// Nothing populates the forest in this mode; useful for exercising the
    /// admission endpoint locally.
    Webhook,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install crypto provider - aws-lc-rs
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: Failed to install crypto provider: {:?}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();

    if cli.crd {
        print!("{}", crd::manifests()?);
        return Ok(());
    }

    init_telemetry(TelemetryConfig { json: cli.log_json })?;

    let excluded = Arc::new(ExcludedNamespaces::with_extra(
        cli.excluded_namespaces.iter().map(String::as_str),
    )?);
    let forest = Arc::new(Forest::new(excluded.clone()));
    let validator = HierarchyValidator::new(forest.clone());
    let state = Arc::new(WebhookState::new(validator));

    let config = WebhookConfig {
        addr: cli.webhook_addr,
        tls: cli
            .tls_cert
            .zip(cli.tls_key)
            .map(|(cert, key)| TlsFiles { cert, key }),
    };

    info!(
        excluded = ?excluded.iter().collect::<Vec<_>>(),
        addr = %config.addr,
        "Starting hnc"
    );

    match cli.command {
        Some(Commands::Webhook) => webhook::serve(&config, state).await?,
        Some(Commands::Run) | None => {
            let sync = tokio::spawn(run_forest_sync(forest));

            tokio::select! {
                result = webhook::serve(&config, state) => result?,
                result = sync => {
                    result??;
                    anyhow::bail!("forest sync stopped unexpectedly");
                }
            }
        }
    }

    Ok(())
}
