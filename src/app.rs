use crate::auth;
use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/blocks", get(handlers::list_records).post(handlers::create_record))
        .route(
            "/api/blocks/:id",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .route("/api/blocks/:id/resolve", patch(handlers::resolve_record))
        .route("/api/tags", get(handlers::list_tags))
        .route("/api/analytics/dashboard", get(handlers::dashboard))
        .route("/api/analytics/monthly", get(handlers::monthly))
        .route("/api/analytics/calendar", get(handlers::calendar))
        .route("/api/analytics/export", get(handlers::export))
        .route("/api/analytics/import", post(handlers::import))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_token));

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/profile", get(auth::profile))
        .merge(protected)
        .with_state(state)
}
