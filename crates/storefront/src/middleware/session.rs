//! Session middleware configuration and the wizard session extractor.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The wizard
//! state lives in the session under [`WIZARD_KEY`]; a missing or unreadable
//! entry starts a fresh wizard at the first step.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use glyca_core::WizardState;
use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;
use crate::error::AppError;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "glyca_session";

/// Session key holding the serialized [`WizardState`].
pub const WIZARD_KEY: &str = "wizard";

/// Session expiry time in seconds (2 days).
const SESSION_EXPIRY_SECONDS: i64 = 2 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The `tower_sessions.session` table is created by the storefront
/// migrations.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());

    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The visitor's wizard, loaded from the session.
///
/// Handlers mutate [`WizardSession::state`] and call
/// [`WizardSession::save`]; nothing is written back otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn retreat(mut wizard: WizardSession) -> Result<Json<WizardView>> {
///     wizard.state.retreat();
///     wizard.save().await?;
///     Ok(Json(WizardView::from(&wizard.state)))
/// }
/// ```
pub struct WizardSession {
    session: Session,
    pub state: WizardState,
}

impl WizardSession {
    /// Write the state back to the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    pub async fn save(&self) -> Result<(), AppError> {
        self.session.insert(WIZARD_KEY, &self.state).await?;
        Ok(())
    }

    /// Drop the stored wizard and start over.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    pub async fn reset(&mut self) -> Result<(), AppError> {
        self.session.remove::<WizardState>(WIZARD_KEY).await?;
        self.state = WizardState::new();
        Ok(())
    }
}

impl<S> FromRequestParts<S> for WizardSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let state = match session.get::<WizardState>(WIZARD_KEY).await {
            Ok(state) => state.unwrap_or_default(),
            Err(err) => {
                // Entries written by an older format restart the wizard.
                tracing::warn!(error = %err, "Discarding unreadable wizard session");
                WizardState::new()
            }
        };

        Ok(Self { session, state })
    }
}
