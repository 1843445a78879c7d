use chrono::Utc;
use energy_dashboard::{
    api::{self, AppState},
    auth::AuthClient,
    config::Config,
    dashboard::{spawn_current_poller, DashboardService},
    models::PowerPair,
    repositories::SupabaseSource,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Starting energy-dashboard");

    let cfg_path = std::env::var("APP_CONFIG").unwrap_or_else(|_| "config/config.yaml".into());
    let cfg = Config::load(&cfg_path)?;
    info!(path = %cfg_path, "Configuration loaded");

    let source = SupabaseSource::from_config(&cfg.supabase)?;

    // Single-user sign-in; reads fall back to the anon key without it
    let session = match (&cfg.supabase.email, &cfg.supabase.password) {
        (Some(email), Some(password)) => {
            let auth = AuthClient::new(&cfg.supabase.url, &cfg.supabase.anon_key)?;
            let session = auth.sign_in(email, password).await?;
            source
                .set_access_token(Some(session.access_token.clone()))
                .await;
            Some((auth, session))
        }
        _ => None,
    };

    let service = Arc::new(DashboardService::from_config(Arc::new(source), &cfg));

    let selection = service.catalog().full_selection();
    let range = cfg.dashboard.default_range;
    match service.refresh(&selection, range.token(), Utc::now()).await {
        Ok(snapshot) => info!(
            range = %snapshot.range,
            kinds = snapshot.samples.len(),
            "Initial dashboard load complete"
        ),
        Err(e) => warn!(error = %e, "Initial dashboard load failed, serving without data"),
    }

    let poller = spawn_current_poller(
        service.clone(),
        PowerPair::from(service.roles()),
        Duration::from_millis(cfg.dashboard.refresh_interval_ms),
    );

    let router = api::create_router(AppState::new(service, cfg.clone()));
    let addr = format!("{}:{}", cfg.api.host, cfg.api.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    info!("API server listening on {}", addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "API server error");
    }

    poller.stop();

    if let Some((auth, session)) = session {
        if let Err(e) = auth.sign_out(&session.access_token).await {
            warn!(error = %e, "Sign-out failed");
        }
    }

    info!("Application shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
