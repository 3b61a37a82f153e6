//! Sign-in, sign-up, session restore and sign-out.
//!
//! `AuthFlow` is the only writer of the `SessionContext`. Every successful
//! sign-in or restore invokes the `on_authenticated` callback with the
//! normalized user; sign-up never does.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::backend::{AuthClient, ServiceError};
use crate::models::AccessLevel;
use crate::session::{AuthUser, Session, SessionContext, SessionStore};
use crate::validation::{AuthForm, AuthMode, ValidationError, validate};

/// Prefix on every auth failure shown to the user.
pub const FAULT_MARKER: &str = "[FAULT] ";

/// How long the sign-up notice stays up before the form returns to login.
pub const SIGNUP_RETURN_DELAY: Duration = Duration::from_secs(3);

pub const SIGNUP_NOTICE: &str =
    "Verification transmission sent. Confirm your identity via email, then sign in.";

/// Callback invoked with the user after sign-in or session restore.
pub type AuthCallback = Arc<dyn Fn(&AuthUser) + Send + Sync>;

/// Auth failure as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Form rejected locally; nothing was sent.
    Validation(ValidationError),
    /// The auth service (or the transport) failed; holds the external message.
    Service(String),
}

impl AuthError {
    fn from_service(err: &anyhow::Error) -> Self {
        let message = match err.downcast_ref::<ServiceError>() {
            Some(service) => service.message.clone(),
            None => format!("{err:#}"),
        };
        AuthError::Service(message)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(err) => write!(f, "{err}"),
            AuthError::Service(message) => write!(f, "{FAULT_MARKER}{message}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::Validation(err)
    }
}

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub notice: String,
    pub return_to_login_after: Duration,
}

/// Result of a successful form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn(AuthUser),
    SignedUp(SignUpOutcome),
}

#[derive(Clone)]
pub struct AuthFlow {
    client: AuthClient,
    session: SessionContext,
    store: SessionStore,
    on_authenticated: Option<AuthCallback>,
}

impl fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthFlow")
            .field("endpoint", &self.client.endpoint().url)
            .field("store", &self.store.path())
            .field("has_callback", &self.on_authenticated.is_some())
            .finish_non_exhaustive()
    }
}

impl AuthFlow {
    pub fn new(client: AuthClient, session: SessionContext, store: SessionStore) -> Self {
        Self {
            client,
            session,
            store,
            on_authenticated: None,
        }
    }

    /// Registers the callback run after every sign-in or restore.
    #[must_use]
    pub fn on_authenticated(mut self, callback: impl Fn(&AuthUser) + Send + Sync + 'static) -> Self {
        self.on_authenticated = Some(Arc::new(callback));
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Validates the form, then signs in or signs up.
    ///
    /// # Errors
    /// Returns `AuthError::Validation` without any request when the form is
    /// rejected, otherwise the service failure.
    pub async fn submit(&self, mode: AuthMode, form: &AuthForm) -> Result<AuthOutcome, AuthError> {
        validate(mode, form)?;
        let email = form.email.trim();
        match mode {
            AuthMode::Login => self
                .sign_in(email, &form.password)
                .await
                .map(AuthOutcome::SignedIn),
            AuthMode::Signup => self
                .sign_up(email, &form.password, form.username.trim())
                .await
                .map(AuthOutcome::SignedUp),
        }
    }

    /// Password sign-in. Stores the session and runs the callback.
    ///
    /// # Errors
    /// Returns the external message as `AuthError::Service`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let auth = self
            .client
            .sign_in_with_password(email, password)
            .await
            .map_err(|err| AuthError::from_service(&err))?;

        let session = Session::from_auth(&auth);
        info!(user = %session.user.username, "signed in");
        Ok(self.establish(session))
    }

    /// Registers an identity. Never authenticates.
    ///
    /// # Errors
    /// Returns the external message as `AuthError::Service`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let metadata = json!({
            "username": username,
            "access_level": AccessLevel::Guest.as_str(),
        });
        let user = self
            .client
            .sign_up(email, password, metadata)
            .await
            .map_err(|err| AuthError::from_service(&err))?;

        info!(user_id = %user.id, "sign-up accepted, awaiting verification");
        Ok(SignUpOutcome {
            notice: SIGNUP_NOTICE.to_string(),
            return_to_login_after: SIGNUP_RETURN_DELAY,
        })
    }

    /// Restores a persisted session at startup.
    ///
    /// An expired access token goes straight to a refresh. The stored copy
    /// is removed only when the service rejects it; an outage or transport
    /// failure returns `Ok(None)` and leaves the file for the next start.
    ///
    /// # Errors
    /// Returns an error only if a stale session file cannot be removed.
    pub async fn current_session(&self) -> Result<Option<AuthUser>> {
        let stored = match self.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!("Discarding unreadable session: {err:#}");
                self.store.clear()?;
                return Ok(None);
            }
        };

        if stored.is_expired() {
            debug!("Stored access token expired");
        } else {
            match self.client.get_user(&stored.access_token).await {
                Ok(remote) => {
                    let session = Session {
                        user: AuthUser::from_remote(&remote),
                        ..stored
                    };
                    debug!(user = %session.user.username, "session restored");
                    return Ok(Some(self.establish(session)));
                }
                Err(err) if rejected(&err, ServiceError::is_unauthorized) => {
                    debug!("Stored access token rejected: {err:#}");
                }
                Err(err) => {
                    warn!("Session check failed; keeping stored session: {err:#}");
                    return Ok(None);
                }
            }
        }

        if let Some(refresh_token) = stored.refresh_token.as_deref() {
            match self.client.refresh_session(refresh_token).await {
                Ok(auth) => {
                    let session = Session::from_auth(&auth);
                    debug!(user = %session.user.username, "session refreshed");
                    return Ok(Some(self.establish(session)));
                }
                Err(err) if rejected(&err, ServiceError::is_client_error) => {
                    warn!("Session refresh rejected: {err:#}");
                }
                Err(err) => {
                    warn!("Session refresh failed; keeping stored session: {err:#}");
                    return Ok(None);
                }
            }
        }

        warn!("Stored session could not be recovered; signing out locally");
        self.session.clear();
        self.store.clear()?;
        Ok(None)
    }

    /// Revokes the session remotely, then tears it down locally.
    ///
    /// # Errors
    /// Returns the external message when the logout request fails; the local
    /// session is kept in that case.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(token) = self.session.access_token() {
            self.client
                .sign_out(&token)
                .await
                .map_err(|err| AuthError::from_service(&err))?;
        }

        self.session.clear();
        if let Err(err) = self.store.clear() {
            warn!("Failed to remove stored session: {err:#}");
        }
        info!("signed out");
        Ok(())
    }

    fn establish(&self, session: Session) -> AuthUser {
        if let Err(err) = self.store.save(&session) {
            warn!("Failed to persist session: {err:#}");
        }
        let user = session.user.clone();
        self.session.set(session);
        if let Some(callback) = &self.on_authenticated {
            callback(&user);
        }
        user
    }
}

/// True when the service answered and `verdict` holds for its error.
/// Transport failures never count as a rejection.
fn rejected(err: &anyhow::Error, verdict: fn(&ServiceError) -> bool) -> bool {
    err.downcast_ref::<ServiceError>().is_some_and(verdict)
}
