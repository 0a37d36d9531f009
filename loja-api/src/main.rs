use std::net::SocketAddr;
use std::sync::Arc;

use loja_api::{app, AppState};
use loja_core::repository::{OrderRepository, ProductRepository, UserRepository};
use loja_order::OrderComposer;
use loja_report::ReportEngine;
use loja_store::{
    DbClient, PgOrderRepository, PgProductRepository, PgReportRepository, PgUserRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loja_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = loja_store::app_config::Config::load()?;
    tracing::info!("starting loja API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;

    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.pool.clone()));
    let products: Arc<dyn ProductRepository> = Arc::new(PgProductRepository::new(db.pool.clone()));
    let orders: Arc<dyn OrderRepository> = Arc::new(PgOrderRepository::new(db.pool.clone()));

    let composer = Arc::new(OrderComposer::new(
        users.clone(),
        products.clone(),
        orders.clone(),
    ));
    let reports = Arc::new(ReportEngine::new(Arc::new(PgReportRepository::new(
        db.pool.clone(),
    ))));

    let state = AppState {
        users,
        products,
        orders,
        composer,
        reports,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    db.close().await;
    Ok(())
}
