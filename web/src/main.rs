#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use std::sync::Arc;

    use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
    use tracing::Level;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    use web::app::{create_router, AppState};
    use web::config::AppConfig;
    use web::db::PgBackend;

    // Try the workspace root first (running from web/), then the current directory
    dotenvy::from_filename("../.env")
        .or_else(|_| dotenvy::dotenv())
        .ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");
    tracing::info!(
        opening = config.hours.opening_hour,
        weekday_close = config.hours.weekday_closing_hour,
        saturday_close = config.hours.saturday_closing_hour,
        "business hours loaded"
    );

    let pool = web::db::pool::init_pool(&config)
        .await
        .expect("Failed to initialize database pool");
    tracing::info!("Database pool initialized successfully");

    let state = AppState::new(Arc::new(PgBackend::new(pool.clone())), config.hours);
    let app = create_router(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    tracing::info!("listening on http://{}", config.site_addr);
    let listener = tokio::net::TcpListener::bind(config.site_addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}

#[cfg(not(feature = "ssr"))]
fn main() {
    // The booking core builds without the server stack; there is nothing to run.
}
