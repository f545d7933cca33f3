//! Route table.

use crate::handlers::{availability, health, pages, reservation};
use crate::session::SessionLayer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Page routes run behind `sessions`; `/health` and `/ready` do not, so
/// probes never create sessions.
///
/// # Example
///
/// ```ignore
/// let app = build_router(state, SessionLayer::new(store, CookieConfig::default()));
/// axum::serve(listener, app).await?;
/// ```
pub fn build_router(state: AppState, sessions: SessionLayer) -> Router {
    let pages = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/generals-quarters", get(pages::generals_quarters))
        .route("/majors-suite", get(pages::majors_suite))
        .route(
            "/search-availability",
            get(pages::search_availability).post(availability::post_search_availability),
        )
        .route(
            "/search-availability-json",
            post(availability::search_availability_json),
        )
        .route(
            "/make-reservation",
            get(reservation::make_reservation).post(reservation::post_make_reservation),
        )
        .route(reservation::SUMMARY_PATH, get(reservation::reservation_summary))
        .layer(sessions);

    Router::new()
        .merge(pages)
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
