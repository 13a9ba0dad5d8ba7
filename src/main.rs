use std::sync::Arc;

use vetcert::certnum::RedisCounter;
use vetcert::storage::SupabaseStorage;
use vetcert::{app, config, db, state};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vetcert=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    let counter = RedisCounter::connect(&config.redis_url).await?;
    let storage = SupabaseStorage::new(
        &config.supabase_url,
        &config.storage_bucket,
        &config.supabase_service_key,
    );

    let state = Arc::new(state::AppState {
        pool,
        counter: Arc::new(counter),
        storage: Arc::new(storage),
        config: config.clone(),
    });

    let app = app(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Vetcert listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
