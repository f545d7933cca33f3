//! Availability search endpoints.
//!
//! Both are stubs: room inventory is not tracked, so nothing is looked up.

use axum::{Form, Json};
use serde::{Deserialize, Serialize};

/// Dates submitted by the search form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AvailabilityQuery {
    /// Arrival date as typed.
    pub start: String,
    /// Departure date as typed.
    pub end: String,
}

/// Body of `POST /search-availability-json`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityResponse {
    /// Whether a room is free.
    pub ok: bool,
    /// Human-readable result.
    pub message: String,
}

/// `POST /search-availability`: echo the requested range.
#[allow(clippy::unused_async)]
pub async fn post_search_availability(Form(query): Form<AvailabilityQuery>) -> String {
    format!(
        "Start date is {} and the end date is {}",
        query.start, query.end
    )
}

/// `POST /search-availability-json`
#[allow(clippy::unused_async)]
pub async fn search_availability_json() -> Json<AvailabilityResponse> {
    Json(AvailabilityResponse {
        ok: false,
        message: "Available!".to_string(),
    })
}
