use docdigest::{api, config, logging, pipeline::AnalysisService};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init_tracing();
    config::init_config();
    let config = config::get_config();

    let service = AnalysisService::from_config(config).expect("Failed to initialize chat client");
    let app = api::create_router(Arc::new(service), config.max_upload_bytes)
        .layer(api::cors_layer(config.cors_allowed_origin.as_deref()));

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);
    axum::serve(listener, app).await.expect("Server error");
}
