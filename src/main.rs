use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use taskmaster_rest::config::AppConfig;
use taskmaster_rest::domain::user::driving_ports::{SignUpError, UserPort};
use taskmaster_rest::domain::user::{NewUser, UserService};
use taskmaster_rest::{SharedData, app_env, logging, routes};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    let config = AppConfig::from_env().context("reading configuration")?;

    let env_filter = logging::init_env_filter()?;
    let otel_exporters = match config.otel {
        Some(ref endpoints) => Some(logging::init_exporters(endpoints)?),
        None => None,
    };
    logging::setup_logging_and_tracing(env_filter, otel_exporters);

    if config.uses_development_secret() {
        warn!(
            "{} is not set, signing session tokens with the built-in development secret",
            app_env::JWT_SECRET
        );
    }

    let shared_data = Arc::new(SharedData::new(&config.jwt_secret));
    if config.seed_demo_user {
        seed_demo_user(&shared_data).await?;
    }

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    info!(address = %config.listen_addr, "Starting server");

    axum::serve(listener, routes::build_router(shared_data))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Server stopped");
    Ok(())
}

/// Registers the demo account so the API can be tried without signing up first
async fn seed_demo_user(shared_data: &SharedData) -> Result<(), anyhow::Error> {
    let demo_user = NewUser {
        username: "johndoe".to_owned(),
        email: "john@example.com".to_owned(),
        password: "password123".to_owned(),
        name: "John Doe".to_owned(),
    };

    let user_service = UserService {};
    match user_service
        .sign_up(&demo_user, &shared_data.store, &shared_data.store)
        .await
    {
        Ok(user) => {
            info!(user_id = user.id, "Seeded demo user");
            Ok(())
        }
        Err(SignUpError::PortError(err)) => Err(err.context("seeding demo user")),
        Err(SignUpError::EmailTaken | SignUpError::UsernameTaken) => Ok(()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Could not listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Could not listen for SIGTERM: {err}");
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

    info!("Shutdown signal received");
}
