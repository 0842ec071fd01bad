use folio_config::Config;
use folio_persistence_contracts::Database;
use tokio::signal;
use tracing::{error, info};

use crate::{database, environment};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to database");
    let database = database::connect(&config.database).await?;
    database.ping().await?;

    info!("Applying pending migrations");
    let mut applied = false;
    for name in database.run_migrations(None).await? {
        info!("Applied {name}");
        applied = true;
    }
    if !applied {
        info!("No migrations pending");
    }

    if !config.admin.secret.as_deref().is_some_and(|s| !s.is_empty()) {
        info!("No admin secret configured, admin routes will reject every request");
    }

    let server = environment::rest_server(&config, database)?;
    info!(
        "Starting http server on {}:{} ({})",
        config.http.host, config.http.port, config.environment
    );
    server.serve(shutdown_signal()).await?;

    // the last database handle was owned by the server
    info!("Http server stopped, database connections closed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received ctrl-c, shutting down"),
            Err(err) => {
                error!("Failed to listen for ctrl-c: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("Failed to install terminate signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
