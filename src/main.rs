use anyhow::{Context, Result};
use clap::Parser;
use interview_session::persistence::HttpPerformanceStore;
use interview_session::scoring::HttpScorer;
use interview_session::{
    create_router, AppState, CollaboratorFactory, Config, EvaluationDispatcher, NatsClient,
    NatsFaceDetector, NatsFrameCapture, NatsVoiceSession, SessionCollaborators,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "interview-session", about = "Voice interview session service")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/interview-session")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,
}

/// Wires each new session to NATS and the HTTP evaluation services
struct NatsCollaboratorFactory {
    nats: Arc<NatsClient>,
    detector: Arc<NatsFaceDetector>,
    dispatcher: EvaluationDispatcher,
    event_capacity: usize,
}

impl CollaboratorFactory for NatsCollaboratorFactory {
    fn collaborators(&self, session_id: &str) -> SessionCollaborators {
        SessionCollaborators {
            voice: Arc::new(NatsVoiceSession::new(
                Arc::clone(&self.nats),
                session_id,
                self.event_capacity,
            )),
            capture: Arc::new(NatsFrameCapture::new(Arc::clone(&self.nats), session_id)),
            detector: self.detector.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Interview Session v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let session_config = cfg.session_config();

    let nats = Arc::new(NatsClient::connect(&cfg.nats.url, cfg.nats.subject_prefix.clone()).await?);

    let scorer = HttpScorer::new(
        cfg.scoring.endpoint.clone(),
        cfg.scoring.model.clone(),
        cfg.scoring_api_key(),
        Duration::from_secs(cfg.scoring.timeout_secs),
    )?;
    let store = HttpPerformanceStore::new(
        cfg.persistence.base_url.clone(),
        Duration::from_secs(cfg.persistence.timeout_secs),
    )?;
    let dispatcher = EvaluationDispatcher::new(
        Arc::new(scorer),
        Arc::new(store),
        session_config.evaluation_timeout,
    );

    let factory = NatsCollaboratorFactory {
        detector: Arc::new(NatsFaceDetector::new(Arc::clone(&nats))),
        nats,
        dispatcher,
        event_capacity: session_config.event_capacity,
    };

    let state = AppState::new(Arc::new(factory), session_config);
    let app = create_router(state);

    let bind = cli.bind.unwrap_or(cfg.service.http.bind);
    let port = cli.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
