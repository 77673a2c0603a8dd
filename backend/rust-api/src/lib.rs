use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
pub use services::AppState;

/// CSP middleware adds Content-Security-Policy header to all responses
async fn csp_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data:; \
             connect-src 'self'",
        ),
    );
    response
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(handlers::metrics_handler).layer(middleware::from_fn_with_state(
                app_state.clone(),
                handlers::metrics_auth_middleware,
            )),
        )
        .nest("/api/v1", api_routes(app_state.clone()))
        .with_state(app_state)
        .layer(middleware::from_fn(csp_middleware))
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn api_routes(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Browsing and playing need no account
    let public_routes = Router::new()
        .route("/auth/csrf-token", get(handlers::auth::get_csrf_token))
        .route("/quizzes", get(handlers::quizzes::list_quizzes))
        .route("/users/{user_id}/quizzes", get(handlers::quizzes::list_user_quizzes))
        .route("/quizzes/randomplay", get(handlers::play::random_play))
        .route(
            "/quizzes/randomcheck/{quiz_id}",
            get(handlers::play::random_check),
        )
        .route("/quizzes/{quiz_id}", get(handlers::quizzes::show_quiz))
        .route("/quizzes/{quiz_id}/play", get(handlers::quizzes::play_quiz))
        .route("/quizzes/{quiz_id}/check", get(handlers::quizzes::check_quiz));

    // Authoring requires JWT auth + CSRF protection
    let protected_routes = Router::new()
        .route("/quizzes", post(handlers::quizzes::create_quiz))
        .route("/quizzes/new", get(handlers::quizzes::new_quiz))
        .route(
            "/quizzes/{quiz_id}",
            put(handlers::quizzes::update_quiz).delete(handlers::quizzes::delete_quiz),
        )
        .route("/quizzes/{quiz_id}/edit", get(handlers::quizzes::edit_quiz))
        .route("/quizzes/{quiz_id}/tips", post(handlers::tips::create_tip))
        .route(
            "/quizzes/{quiz_id}/tips/{tip_id}",
            put(handlers::tips::update_tip).delete(handlers::tips::delete_tip),
        )
        .route(
            "/quizzes/{quiz_id}/tips/{tip_id}/edit",
            get(handlers::tips::edit_tip),
        )
        .route(
            "/quizzes/{quiz_id}/tips/{tip_id}/accept",
            post(handlers::tips::accept_tip),
        )
        .route_layer(middleware::from_fn(middlewares::csrf::csrf_middleware))
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::auth_middleware,
        ));

    public_routes.merge(protected_routes)
}
