//! Shelfmark Server - Community Library

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfmark_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("shelfmark_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Shelfmark Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.server.clone(),
        config.auth.clone(),
        config.lending.clone(),
        config.email.clone(),
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Background workers: lifecycle sweeps and mail dispatch
    spawn_lifecycle_sweeper(state.clone());
    spawn_mail_dispatcher(state.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically expires stale PENDING requests and flips overdue loans.
/// Both sweeps are idempotent, so a crashed tick is simply retried later.
fn spawn_lifecycle_sweeper(state: AppState) {
    let interval = Duration::from_secs(state.config.lending.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let now = Utc::now();
            if let Err(e) = state.services.borrowing.expire_pending(now).await {
                tracing::error!(error = %e, "expiration sweep failed");
            }
            if let Err(e) = state.services.borrowing.mark_overdue(now).await {
                tracing::error!(error = %e, "overdue sweep failed");
            }
        }
    });
}

/// Periodically drains the mail queue.
fn spawn_mail_dispatcher(state: AppState) {
    let interval = Duration::from_secs(state.config.lending.mail_interval_secs);
    let batch_size = state.config.lending.mail_batch_size;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = state.services.mailer.dispatch_queued(batch_size).await {
                tracing::error!(error = %e, "mail dispatch failed");
            }
        }
    });
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication and accounts
        .route("/auth/signup", post(api::auth::signup))
        .route("/auth/activate/:token", get(api::auth::activate))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        .route("/users/:id/role", put(api::auth::set_role))
        .route("/users/:id/status", put(api::auth::set_status))
        // Catalog
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/authors", get(api::books::list_authors))
        .route("/authors", post(api::books::create_author))
        .route("/authors/:id", put(api::books::update_author))
        .route("/authors/:id", delete(api::books::delete_author))
        .route("/publishers", get(api::books::list_publishers))
        .route("/publishers", post(api::books::create_publisher))
        .route("/publishers/:id", put(api::books::update_publisher))
        .route("/publishers/:id", delete(api::books::delete_publisher))
        .route("/categories", get(api::books::list_categories))
        .route("/categories", post(api::books::create_category))
        .route("/categories/:id", put(api::books::update_category))
        .route("/categories/:id", delete(api::books::delete_category))
        // Physical copies
        .route("/books/:id/items", get(api::items::list_items))
        .route("/books/:id/items", post(api::items::create_item))
        .route("/items/:id", put(api::items::update_item))
        .route("/items/:id", delete(api::items::delete_item))
        // Borrow requests
        .route("/requests", post(api::requests::submit_request))
        .route("/requests", get(api::requests::list_requests))
        .route("/requests/:id", get(api::requests::get_request))
        .route("/requests/:id/approve", post(api::requests::approve_request))
        .route("/requests/:id/reject", post(api::requests::reject_request))
        .route("/requests/:id/cancel", post(api::requests::cancel_request))
        .route("/requests/:id/loans", get(api::loans::request_loans))
        .route("/requests/:id/mails", get(api::requests::request_mails))
        // Loans
        .route("/loans/:id/return", post(api::loans::return_loan))
        .route("/users/:id/loans", get(api::loans::user_loans))
        // Social
        .route("/books/:id/favorite", post(api::social::add_favorite))
        .route("/books/:id/favorite", delete(api::social::remove_favorite))
        .route("/users/me/favorites", get(api::social::list_favorites))
        .route("/authors/:id/follow", post(api::social::follow_author))
        .route("/authors/:id/follow", delete(api::social::unfollow_author))
        .route("/publishers/:id/follow", post(api::social::follow_publisher))
        .route(
            "/publishers/:id/follow",
            delete(api::social::unfollow_publisher),
        )
        .route("/books/:id/comments", post(api::social::add_comment))
        .route("/books/:id/comments", get(api::social::list_comments))
        .route("/comments/:id", delete(api::social::delete_comment))
        .route("/books/:id/rating", put(api::social::rate_book))
        .route("/books/:id/ratings", get(api::social::book_ratings))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
