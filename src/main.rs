use motorshop_api::{audit, config, routes};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Motorshop API in {:?} mode", config.environment);

    // Audit events flow through an explicit queue into a background writer;
    // a write failure is logged there and never fails a request.
    let (audit_log, audit_rx) = audit::AuditLog::channel();
    tokio::spawn(audit::run_writer(audit_rx));

    let app = routes::app(audit_log);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Motorshop API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
