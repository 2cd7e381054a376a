use std::sync::Arc;

use sqlx::mysql::MySqlPoolOptions;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tour_booking_service::adapter::driven::{
    InMemoryTourBookingStore, MySqlBookingRepository, MySqlTourRepository, TracingLogger,
};
use tour_booking_service::adapter::driver::rest_api::{create_router, AppState};
use tour_booking_service::adapter::{AppConfig, DatabaseMigration, StorageBackend};
use tour_booking_service::domain::port::Logger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tour_booking_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(storage = ?config.storage, "設定を読み込みました");

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());

    let (app_state, pool) = match config.storage {
        StorageBackend::MySql => {
            tracing::info!(
                host = %config.database.host,
                port = config.database.port,
                database = %config.database.database,
                "データベースに接続します"
            );

            let pool = MySqlPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.connection_string())
                .await?;

            DatabaseMigration::new(pool.clone()).run().await?;

            let tour_repository = Arc::new(MySqlTourRepository::new(pool.clone()));
            let booking_repository = Arc::new(MySqlBookingRepository::new(pool.clone()));
            let state = AppState::new(
                tour_repository,
                booking_repository.clone(),
                booking_repository,
                logger,
            );
            (state, Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("インメモリストアで起動します。データは再起動で失われます");

            let store = Arc::new(InMemoryTourBookingStore::new());
            let state = AppState::new(store.clone(), store.clone(), store, logger);
            (state, None)
        }
    };

    let app = create_router().with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST APIサーバーが起動しました: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    tracing::info!("サーバーを停止しました");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "シグナルの待ち受けに失敗しました");
        std::future::pending::<()>().await;
    }
}
