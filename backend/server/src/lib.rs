//! Documentation of the sightings backend.
//!
//! Visitors report wildlife sightings and important locations on the site map,
//! verify their email with a one-time code, and send contact inquiries.
//!
//!
//!
//! # General Infrastructure
//! - Frontend (Vite dev server or static build) proxies `/api/*` to this server
//! - Redis holds both the OTP codes (with expiry) and the map records
//! - Without `REDIS_URL` everything runs in-process, handy for local work
//! - Without `SMTP_HOST` emails are written to the log instead of sent
//!
//!
//!
//! # Endpoints
//!
//! | Method | Path | Body | Success |
//! |---|---|---|---|
//! | POST | `/api/send-otp` | `{email}` | 200 `{message}` |
//! | POST | `/api/verify-otp` | `{email, otp}` | 200 `{message}` |
//! | POST | `/api/send-confirmation` | `{email, fullName, inquiryType, message}` | 200 `{message}` |
//! | GET | `/api/sightings/` | | 200 FeatureCollection |
//! | POST | `/api/sightings/` | `{lon, lat, species?}` | 201 Feature |
//! | GET | `/api/important-locations/` | | 200 FeatureCollection |
//! | POST | `/api/important-locations/` | `{lon, lat, name?}` | 201 Feature |
//!
//! OTP and contact errors come back as `{error}`, map errors as `{detail}`.
//!
//!
//!
//! # Preventing Abuse
//!
//! `send-otp` costs us an email per call, so it sits behind a token bucket per
//! client (first `X-Forwarded-For` hop, else the peer address). Defaults allow a
//! burst of 5 and then roughly one request every 12 seconds.
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Run locally with in-memory backends.
//! ```sh
//! RUST_LOG=info cargo run -p backend
//! ```
//!
//! Run against Redis and a local mail catcher.
//! ```sh
//! REDIS_URL=redis://127.0.0.1:6379 SMTP_HOST=127.0.0.1 SMTP_PORT=1025 SMTP_STARTTLS=false \
//!     cargo run -p backend
//! ```
//!
//! Smoke test a running server.
//! ```sh
//! cargo run -p tester -- http://127.0.0.1:8000
//! ```
use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod cache;
pub mod config;
pub mod contact;
pub mod database;
pub mod error;
pub mod geo;
#[cfg(test)]
mod log_capture;
pub mod mail;
pub mod otp;
pub mod payloads;
pub mod rate_limiter;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use config::Config;
use rate_limiter::throttle_otp;
use routes::{
    create_important_location_handler, create_sighting_handler, list_important_locations_handler,
    list_sightings_handler, ping_handler, root_handler, send_confirmation_handler,
    send_otp_handler, verify_otp_handler,
};
use state::State;

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config).await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn app(state: Arc<State>) -> Router {
    let api = Router::new()
        .route(
            "/send-otp",
            post(send_otp_handler).route_layer(middleware::from_fn_with_state(
                state.clone(),
                throttle_otp,
            )),
        )
        .route("/verify-otp", post(verify_otp_handler))
        .route("/send-confirmation", post(send_confirmation_handler))
        .route(
            "/sightings/",
            get(list_sightings_handler).post(create_sighting_handler),
        )
        .route(
            "/important-locations/",
            get(list_important_locations_handler).post(create_important_location_handler),
        )
        .route("/ping", get(ping_handler));

    Router::new()
        .route("/", get(root_handler))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| warn!("Ignoring CORS origin {origin}: {e}"))
                .ok()
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
