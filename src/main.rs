use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;

use ticketgate::auth::StaticTokenAuthenticator;
use ticketgate::config::Config;
use ticketgate::db::Db;
use ticketgate::render::SvgCodeRenderer;
use ticketgate::routes::create_routes;
use ticketgate::services::SystemCodeGenerator;
use ticketgate::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let db = Db::connect(&config.database)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    let state = AppState::new(
        db,
        config.default_organizer_id,
        Arc::new(SystemCodeGenerator),
        Arc::new(StaticTokenAuthenticator::from_env()),
        Arc::new(SvgCodeRenderer),
    );

    let app: Router = create_routes(state, config.hsts_enabled);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
