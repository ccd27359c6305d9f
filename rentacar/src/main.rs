use rentacar::{AppConfig, AppServices, build_router, migration::Migrator, search::InMemorySearchStore};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rentacar=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting with {config:?}");

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let search: Arc<dyn rentacar::search::SearchStore> = Arc::new(InMemorySearchStore::new());
    let services = AppServices::new(&db, &search, config.search_write_timeout);
    let indexed = services.reindex_all().await?;
    tracing::info!("search index rebuilt with {indexed} documents");

    let app = build_router(&services, config.paging)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    tracing::info!("listening on http://{}", config.bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}
