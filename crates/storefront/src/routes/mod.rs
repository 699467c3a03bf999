//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database)
//!
//! # Reference data
//! GET  /api/catalog                     - Bundles in display order
//! GET  /api/countries                   - Supported countries
//! GET  /api/countries/{code}            - Regions, cities and phone hint
//!
//! # Wizard (session-backed)
//! GET  /api/wizard                      - Current wizard
//! POST /api/wizard/advance              - Next step, if the current one is valid
//! POST /api/wizard/retreat              - Previous step
//! POST /api/wizard/jump                 - Go to a step directly
//! POST /api/wizard/language             - Choose interface language
//! POST /api/wizard/profile              - Update profile fields
//! POST /api/wizard/product              - Select a bundle
//! POST /api/wizard/shipping             - Update shipping fields
//! POST /api/wizard/shipping/phone/blur  - Validate the phone only
//! POST /api/wizard/submit               - Place the order
//! POST /api/wizard/reset                - Start over
//! ```

pub mod catalog;
pub mod countries;
pub mod wizard;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the wizard routes router.
pub fn wizard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wizard::show))
        .route("/advance", post(wizard::advance))
        .route("/retreat", post(wizard::retreat))
        .route("/jump", post(wizard::jump))
        .route("/language", post(wizard::language))
        .route("/profile", post(wizard::profile))
        .route("/product", post(wizard::product))
        .route("/shipping", post(wizard::shipping))
        .route("/shipping/phone/blur", post(wizard::blur_phone))
        .route("/submit", post(wizard::submit))
        .route("/reset", post(wizard::reset))
}

/// Create the reference data routes router.
///
/// These need no session and are served from static tables.
pub fn reference_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(catalog::index))
        .route("/countries", get(countries::index))
        .route("/countries/{code}", get(countries::show))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new().nest(
        "/api",
        reference_routes().nest("/wizard", wizard_routes()),
    )
}
