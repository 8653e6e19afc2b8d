#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use school_schedule::{ServiceConfig, config, http_api};

    let service_config = ServiceConfig::from_env()?;
    config::init_tracing(&service_config);
    let addr = service_config.socket_addr()?;

    let state = match &service_config.database_path {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            tracing::info!("using sqlite record store at {}", path.display());
            let store = school_schedule::SqliteStore::new(path)
                .with_context(|| format!("opening database {}", path.display()))?;
            http_api::AppState::new(store)
        }
        #[cfg(not(feature = "sqlite"))]
        Some(path) => {
            anyhow::bail!(
                "database_path {} requires the `sqlite` feature",
                path.display()
            );
        }
        None => {
            tracing::info!("using in-memory record store");
            http_api::AppState::in_memory()
        }
    };

    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
