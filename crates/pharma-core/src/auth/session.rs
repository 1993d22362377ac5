//! Session manager: the single source of truth for who is logged in.
//!
//! State is one shared record that is only ever replaced or cleared as a
//! whole. No lock is held across an await point. Storage is written while
//! the state lock is held, so memory and storage never disagree once an
//! operation returns, even with concurrent login and logout.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use super::claims::decode_claims;
use super::identity::{RoleSet, UserIdentity, has_any_role};
use super::provider::IdentityProvider;
use super::store::{PersistedSession, SessionStore};
use crate::error::{ApiError, ApiResult};
use crate::logging::mask_token;

const EVENT_CAPACITY: usize = 16;

/// Where the UI should go after a session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Login,
}

/// Broadcast on every session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(UserIdentity),
    LoggedOut,
    /// The backend rejected the token and the session was cleared.
    Expired,
}

impl SessionEvent {
    pub fn route(&self) -> Route {
        match self {
            SessionEvent::LoggedIn(_) => Route::Dashboard,
            SessionEvent::LoggedOut | SessionEvent::Expired => Route::Login,
        }
    }
}

/// Credentials and identity of an authenticated session. Present as a unit
/// or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub identity: UserIdentity,
}

impl From<PersistedSession> for Authenticated {
    fn from(p: PersistedSession) -> Self {
        Self {
            access_token: p.access_token,
            refresh_token: p.refresh_token,
            identity: p.user,
        }
    }
}

impl From<&Authenticated> for PersistedSession {
    fn from(a: &Authenticated) -> Self {
        Self {
            access_token: a.access_token.clone(),
            refresh_token: a.refresh_token.clone(),
            user: a.identity.clone(),
        }
    }
}

/// Process-wide session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub auth: Option<Authenticated>,
    /// True until the first `restore` finishes.
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            auth: None,
            loading: true,
        }
    }
}

/// Outcome of a role check for a guarded view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Restore has not finished yet.
    Loading,
    /// No session; send the user to the login view.
    Unauthenticated,
    /// Logged in, but none of the allowed roles match.
    Denied { roles: RoleSet },
    Granted,
}

struct Shared {
    state: RwLock<Session>,
    store: Box<dyn SessionStore>,
    provider: Option<IdentityProvider>,
    events: broadcast::Sender<SessionEvent>,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Owner of the session. The only type that can change it.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Shared>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.reader().is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates an empty, still-loading session backed by `store`.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self::build(Box::new(store), None)
    }

    /// Creates a session manager able to log in through `provider`.
    pub fn with_provider(store: impl SessionStore + 'static, provider: IdentityProvider) -> Self {
        Self::build(Box::new(store), Some(provider))
    }

    fn build(store: Box<dyn SessionStore>, provider: Option<IdentityProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(Session::default()),
                store,
                provider,
                events,
            }),
        }
    }

    /// Read-only view of the session.
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Receives every subsequent session transition.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Loads the persisted session, if any. Never fails; unreadable or
    /// malformed data means "no session". Always clears the loading flag.
    pub fn restore(&self) {
        let mut state = self.inner.write();
        let restored = match self.inner.store.load() {
            Ok(found) => found.map(Authenticated::from),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "Failed to read persisted session");
                None
            }
        };

        if let Some(auth) = &restored {
            tracing::debug!(
                username = %auth.identity.username,
                token = %mask_token(&auth.access_token),
                "Restored session"
            );
        }

        state.auth = restored;
        state.loading = false;
    }

    /// Exchanges credentials for tokens and establishes a new session.
    ///
    /// On failure the current session is left untouched.
    ///
    /// # Errors
    /// `AuthenticationFailed` for provider errors (and, with strict claims,
    /// undecodable tokens); `Storage` if the session cannot be persisted.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<UserIdentity> {
        let provider = self.inner.provider.as_ref().ok_or_else(|| {
            ApiError::AuthenticationFailed("No identity provider configured".to_string())
        })?;

        let tokens = provider.password_grant(username, password).await?;

        let claims = match decode_claims(&tokens.access_token) {
            Some(claims) => claims,
            None if provider.settings().strict_claims => {
                return Err(ApiError::AuthenticationFailed(
                    "Malformed access token".to_string(),
                ));
            }
            None => {
                tracing::warn!(
                    token = %mask_token(&tokens.access_token),
                    "Access token payload could not be decoded; continuing with empty identity"
                );
                Default::default()
            }
        };

        let auth = Authenticated {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            identity: UserIdentity::from_claims(&claims),
        };

        let identity = auth.identity.clone();
        {
            let mut state = self.inner.write();
            self.inner
                .store
                .save(&PersistedSession::from(&auth))
                .map_err(|e| ApiError::Storage(format!("{e:#}")))?;
            state.auth = Some(auth);
            state.loading = false;
        }

        tracing::info!(username = %identity.username, roles = ?identity.roles(), "Logged in");
        self.inner.emit(SessionEvent::LoggedIn(identity.clone()));
        Ok(identity)
    }

    /// Clears the session and its persisted copy. Idempotent.
    pub fn logout(&self) -> Route {
        self.clear();
        tracing::info!("Logged out");
        self.inner.emit(SessionEvent::LoggedOut);
        Route::Login
    }

    /// Clears the session after the backend rejected its token.
    pub fn expire(&self) -> Route {
        let had_session = self.clear();
        if had_session {
            tracing::warn!("Session expired; cleared credentials");
        }
        self.inner.emit(SessionEvent::Expired);
        Route::Login
    }

    /// Normalized roles of the current identity; empty without a session.
    pub fn current_roles(&self) -> RoleSet {
        self.reader().roles()
    }

    fn clear(&self) -> bool {
        let mut state = self.inner.write();
        let had_session = state.auth.take().is_some();
        if let Err(e) = self.inner.store.clear() {
            tracing::warn!(error = %format!("{e:#}"), "Failed to clear persisted session");
        }
        had_session
    }
}

/// Read-only capability over the session.
#[derive(Clone)]
pub struct SessionReader {
    inner: Arc<Shared>,
}

impl std::fmt::Debug for SessionReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionReader")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionReader {
    pub fn snapshot(&self) -> Session {
        self.inner.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .auth
            .as_ref()
            .map(|a| a.access_token.clone())
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.inner.read().auth.as_ref().map(|a| a.identity.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().auth.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }

    /// Normalized roles of the current identity; empty without a session.
    pub fn roles(&self) -> RoleSet {
        self.inner
            .read()
            .auth
            .as_ref()
            .map(|a| a.identity.roles())
            .unwrap_or_default()
    }

    /// Decides whether the current session may open a view guarded by `allowed`.
    pub fn check_access<S: AsRef<str>>(&self, allowed: &[S]) -> AccessDecision {
        let state = self.inner.read();
        if state.loading {
            return AccessDecision::Loading;
        }
        let Some(auth) = &state.auth else {
            return AccessDecision::Unauthenticated;
        };
        let roles = auth.identity.roles();
        if has_any_role(&roles, allowed) {
            AccessDecision::Granted
        } else {
            AccessDecision::Denied { roles }
        }
    }
}
