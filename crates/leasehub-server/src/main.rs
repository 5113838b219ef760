use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use leasehub_api::auth::{self, AppState, AppStateInner};
use leasehub_api::middleware::require_auth;
use leasehub_api::{inbox, interest, leases, reviews, users};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leasehub=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("LEASEHUB_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("LEASEHUB_DB_PATH").unwrap_or_else(|_| "leasehub.db".into());
    let host = std::env::var("LEASEHUB_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("LEASEHUB_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;

    // Init database
    let db = leasehub_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner { db, jwt_secret });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/leases", get(leases::search_leases))
        .route("/leases/{lease_id}", get(leases::get_lease))
        .route("/reviews", get(reviews::list_reviews))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/leases", post(leases::create_lease))
        .route("/leases/{lease_id}", put(leases::update_lease))
        .route("/leases/{lease_id}", delete(leases::delete_lease))
        .route("/leases/{lease_id}/interest", post(interest::express_interest))
        .route("/leases/{lease_id}/interest", delete(interest::withdraw_interest))
        .route("/me", get(users::get_me))
        .route("/inbox", get(inbox::get_inbox))
        .route("/inbox/{thread_id}/replies", post(inbox::reply))
        .route("/reviews", post(reviews::post_review))
        .layer(middleware::from_fn(require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Leasehub server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
