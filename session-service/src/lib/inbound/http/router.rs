use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::challenge::issue_challenge;
use super::handlers::hello::hello;
use super::handlers::login::login;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::session::ports::SessionServicePort;

pub struct AppState<S: SessionServicePort> {
    pub session_service: Arc<S>,
}

impl<S: SessionServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            session_service: Arc::clone(&self.session_service),
        }
    }
}

pub fn create_router<S: SessionServicePort>(session_service: Arc<S>) -> Router {
    let state = AppState { session_service };

    let public_routes = Router::new()
        .route("/api/auth/challenge", get(issue_challenge::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/refresh", post(refresh::<S>))
        .route("/api/auth/register", post(register::<S>));

    let protected_routes = Router::new()
        .route("/api/hello", get(hello))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    // Headers are left out of the span: they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
