//! HTTP handlers.
//!
//! Every page handler follows the same shape: take the visitor's session,
//! build [`TemplateData`] from it, add page data, render.

pub mod availability;
pub mod health;
pub mod pages;
pub mod reservation;

use crate::error::AppError;
use crate::render::{Page, TemplateData};
use crate::state::AppState;
use axum::response::Html;

/// Render `page` with `data`.
pub(crate) fn render(
    state: &AppState,
    page: Page,
    data: &TemplateData,
) -> Result<Html<String>, AppError> {
    Ok(Html(state.renderer.render(page, data)?))
}
