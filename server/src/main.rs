use anyhow::{Context, Result};
use tokio::net::TcpListener;
use topgoal::{AppState, DEFAULT_LOG_FILTER, Settings, router};
use topgoal_library::{CoverResolver, Library, LibraryScanner};
use topgoal_storage::StatsStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_target(true)
        .init();

    let settings = Settings::load().context("Failed to load settings")?;
    info!("Iniciando TopGoal...");
    info!("Directorio de datos: {}", settings.data_dir.display());

    let store = StatsStore::open_in(&settings.data_dir)
        .with_context(|| format!("Failed to open database {}", settings.db_path().display()))?;

    let covers = match &settings.placeholder_path {
        Some(path) => CoverResolver::with_placeholder_file(path)
            .with_context(|| format!("Failed to read placeholder image {}", path.display()))?,
        None => CoverResolver::new(),
    };

    let library = Library::new(settings.music_dir.clone(), LibraryScanner::new(settings.scanner_config()));
    info!("Directorio de música: {}", library.root().display());
    let state = AppState::new(library, store, covers);

    if settings.scan_on_startup {
        match state.library.rescan().await {
            Ok(index) => info!("Escaneo inicial: {} pistas indexadas", index.len()),
            Err(e) => warn!("Falló el escaneo inicial, se sirve una biblioteca vacía: {e}"),
        }
    }

    let listener = TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind))?;
    info!("Escuchando en http://{}", settings.bind);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Apagando TopGoal...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("No se pudo escuchar la señal de apagado: {e}");
        std::future::pending::<()>().await;
    }
}
