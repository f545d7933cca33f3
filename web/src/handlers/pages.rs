//! Static pages.

use super::render;
use crate::error::AppError;
use crate::render::{Page, TemplateData};
use crate::state::AppState;
use axum::{Extension, extract::State, response::Html};
use bookings_core::Session;

async fn show(state: &AppState, session: &Session, page: Page) -> Result<Html<String>, AppError> {
    let data = TemplateData::for_session(session).await?;
    render(state, page, &data)
}

/// `GET /`
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    show(&state, &session, Page::Home).await
}

/// `GET /about`
pub async fn about(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    show(&state, &session, Page::About).await
}

/// `GET /contact`
pub async fn contact(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    show(&state, &session, Page::Contact).await
}

/// `GET /generals-quarters`
pub async fn generals_quarters(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    show(&state, &session, Page::GeneralsQuarters).await
}

/// `GET /majors-suite`
pub async fn majors_suite(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    show(&state, &session, Page::MajorsSuite).await
}

/// `GET /search-availability`
pub async fn search_availability(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    show(&state, &session, Page::SearchAvailability).await
}
