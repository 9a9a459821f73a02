//! Router construction and shared API state.

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::auth::{
    login_handler, logout_handler, me_handler, register_handler, resend_verification_handler,
    verify_email_handler,
};
use crate::auth::middleware::authenticate;
use crate::auth::{LoginService, RegistrationService, SessionService};
use crate::config::ServerConfig;
use crate::storage::repositories::UserRepository;

/// Shared state handed to every handler. Built once by the composition root
/// and cloned per request; there are no process-global singletons.
#[derive(Clone)]
pub struct ApiState {
    pub registration: RegistrationService,
    pub login: LoginService,
    pub session: Arc<SessionService>,
    pub users: Arc<dyn UserRepository>,
}

/// Build the application router: public auth endpoints plus the protected
/// subtree behind the authorization gate.
pub fn build_router(state: ApiState, server_config: &ServerConfig) -> Router {
    let protected = Router::new()
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(state.session.clone(), authenticate));

    let router = Router::new()
        .route("/register", post(register_handler))
        .route("/verify-email", post(verify_email_handler))
        .route("/resend-verification", post(resend_verification_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match cors_layer(server_config) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Credentialed CORS for the configured frontend origins. Wildcards are not
/// allowed together with credentials, so an empty origin list disables CORS.
fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> =
        config.cors_origins.iter().filter_map(|origin| origin.parse().ok()).collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::PUT, Method::DELETE])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
    )
}
