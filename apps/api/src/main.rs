use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use league_signup_api::api::router;
use league_signup_api::config::{AppConfig, StorageBackend};
use league_signup_api::infrastructure::payments::StripeClient;
use league_signup_api::init_tracing;
use league_signup_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    init_tracing();

    let config = AppConfig::from_env()?;
    let payments = Arc::new(StripeClient::new(&config.stripe_api_base, &config.stripe_secret_key)?);

    let state = match config.storage_backend {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(&config.database_url)
                .await?;
            tracing::info!("Database connected successfully");

            if config.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Migrations applied");
            }

            AppState::postgres(config, pool, payments)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            AppState::in_memory(config, payments)
        }
    };

    let addr = state.config.bind_addr;
    let app = router(state);

    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
