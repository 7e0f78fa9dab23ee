//! Evaldesk console diagnostic runtime.
//!
//! Connects to the evaluation backend, resolves the signed-in session and
//! prints the effective capability table; with an entity kind argument it
//! also opens that kind's audit trail through the same policy path the
//! console pages use.

#![forbid(unsafe_code)]

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use evaldesk_application::{AuditTrailViewer, HistoryView, SessionService, SessionTokenStore};
use evaldesk_core::{AppError, AppResult, SessionToken};
use evaldesk_domain::{ActivityVisibilityPolicy, Capability, EntityKind};
use evaldesk_infrastructure::{HttpBackendGateway, InMemorySessionTokenStore, TracingNotifier};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct ConsoleConfig {
    api_base_url: String,
    api_token: Option<String>,
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let token_store = Arc::new(InMemorySessionTokenStore::new());
    if let Some(token) = config.api_token.as_deref() {
        token_store.store(SessionToken::new(token));
    }

    let backend = Arc::new(HttpBackendGateway::new(
        http_client,
        config.api_base_url.as_str(),
        token_store.clone(),
    )?);
    let session = SessionService::new(token_store, backend.clone(), Arc::new(TracingNotifier));

    let profile = session.profile().await?;
    let role = session.role().await?;
    info!(
        user_name = profile.user_name(),
        raw_role = profile.raw_role(),
        role = role.map(|role| role.as_str()).unwrap_or("unknown"),
        "session resolved"
    );

    let capabilities = session.capabilities().await?;
    for capability in Capability::all() {
        info!(
            capability = capability.as_str(),
            granted = capabilities.get(*capability),
            "capability"
        );
    }

    if let Some(kind_argument) = env::args().nth(1) {
        let kind = EntityKind::from_str(kind_argument.as_str())?;
        let viewer = AuditTrailViewer::new(
            session,
            backend,
            ActivityVisibilityPolicy::hierarchical(),
        );

        info!(
            kind = kind.as_str(),
            control_visible = viewer.history_control_visible().await,
            "opening audit trail"
        );

        viewer.open(kind).await;
        match viewer.view().await {
            HistoryView::Loaded(records) => {
                for record in records {
                    info!(
                        occurred_at = record.occurred_at(),
                        status = record.status().as_str(),
                        actor = record.actor_name(),
                        entity_id = record.subject().id(),
                        description = record.description(),
                        "activity"
                    );
                }
            }
            HistoryView::Empty => {
                info!(kind = kind.as_str(), "no visible activity");
            }
            HistoryView::Closed | HistoryView::Loading => {}
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

impl ConsoleConfig {
    fn load() -> AppResult<Self> {
        let api_base_url = env::var("EVALDESK_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3001/api".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let api_token = env::var("EVALDESK_API_TOKEN")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let request_timeout_secs = parse_env_u64("EVALDESK_HTTP_TIMEOUT_SECS", 15)?;

        if request_timeout_secs == 0 {
            return Err(AppError::Validation(
                "EVALDESK_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            api_token,
            request_timeout_secs,
        })
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
