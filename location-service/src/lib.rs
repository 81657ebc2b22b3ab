pub mod api_client;
pub mod cache;
pub mod config;
pub mod handlers;
pub mod history;
pub mod openapi;
pub mod rate_limit;
pub mod store;
pub mod weather;

use axum::{Router, middleware as axum_middleware, routing::get};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use config::{Config, WeatherLookup};
use rate_limit::RateLimiter;

/// Builds the service router. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so rate limiting is per client.
pub fn create_router(state: handlers::AppState, config: &Config) -> Router {
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max_requests,
        config.rate_limit_window(),
    ));

    // Only coordinate lookups record history
    let weather_routes = match config.weather_lookup {
        WeatherLookup::Coordinates => Router::new()
            .route("/weather/{id}", get(handlers::get_weather_by_id))
            .route("/history/{id}", get(handlers::get_history)),
        WeatherLookup::Name => {
            Router::new().route("/weather/{name}", get(handlers::get_weather_by_name))
        }
    };

    // Rate limited routes
    let api_routes = Router::new()
        .route(
            "/locations",
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route(
            "/locations/{id}",
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
        .merge(weather_routes)
        .layer(axum_middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit_middleware,
        ));

    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .merge(openapi::swagger_ui(config.weather_lookup))
        .with_state(state);

    match config.weather_lookup {
        WeatherLookup::Coordinates => app.layer(request_logging()),
        WeatherLookup::Name => app.layer(
            ServiceBuilder::new()
                .layer(request_logging())
                .layer(CorsLayer::permissive()),
        ),
    }
}

/// Logs every request and its response at INFO, the default filter level.
fn request_logging() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
