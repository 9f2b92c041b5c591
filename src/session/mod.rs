//! Session/Auth state
//!
//! ## Responsibilities
//!
//! - Current user, access/refresh tokens, authentication flag
//! - Cold-start revalidation: a persisted token is never trusted before the
//!   backend has accepted it once (fails closed on any network error)
//! - Persistence of the restricted subset {user, tokens}; the
//!   authentication flag itself is never written to disk
//!
//! Tokens are owned here, in the shared [`TokenCell`]; the API client reads
//! them for its Authorization header and domain stores never see them.

mod types;

pub use types::*;

use crate::api_client::{surface_message, ApiError, AuthApi};
use crate::error::Result;
use crate::local_store::LocalStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

const MSG_LOGIN_FAILED: &str = "Échec de la connexion";

/// Shared holder for the current token pair
///
/// Last write wins; the single-threaded UI event loop serializes writers
/// in practice.
#[derive(Default)]
pub struct TokenCell {
    inner: RwLock<Option<AuthTokens>>,
}

impl TokenCell {
    pub fn set(&self, tokens: Option<AuthTokens>) {
        *self.inner.write().expect("token cell poisoned") = tokens;
    }

    pub fn get(&self) -> Option<AuthTokens> {
        self.inner.read().expect("token cell poisoned").clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .expect("token cell poisoned")
            .as_ref()
            .map(|t| t.token.clone())
    }
}

#[derive(Default)]
struct SessionInner {
    user: Option<User>,
    is_authenticated: bool,
    error: Option<String>,
}

/// Session state instance
pub struct SessionState {
    api: Arc<dyn AuthApi>,
    local: Arc<LocalStore>,
    tokens: Arc<TokenCell>,
    inner: RwLock<SessionInner>,
    initialized: AtomicBool,
    init_lock: tokio::sync::Mutex<()>,
}

impl SessionState {
    pub fn new(api: Arc<dyn AuthApi>, local: Arc<LocalStore>, tokens: Arc<TokenCell>) -> Self {
        Self {
            api,
            local,
            tokens,
            inner: RwLock::new(SessionInner::default()),
            initialized: AtomicBool::new(false),
            init_lock: tokio::sync::Mutex::new(()),
        }
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn current_user(&self) -> Option<User> {
        self.inner.read().expect("session lock poisoned").user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .expect("session lock poisoned")
            .is_authenticated
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn error(&self) -> Option<String> {
        self.inner.read().expect("session lock poisoned").error.clone()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().expect("session lock poisoned").error = Some(message.into());
    }

    // ========================================
    // Synchronous mutators
    // ========================================

    /// Replace the current user, mark authenticated, clear any error
    pub fn set_user(&self, user: User) {
        let mut inner = self.inner.write().expect("session lock poisoned");
        inner.user = Some(user);
        inner.is_authenticated = true;
        inner.error = None;
    }

    /// Replace both tokens; the authentication flag is untouched
    pub fn set_tokens(&self, token: &str, refresh_token: &str) {
        self.tokens.set(Some(AuthTokens {
            token: token.to_string(),
            refresh_token: refresh_token.to_string(),
        }));
    }

    /// Clear user, tokens, authentication flag, and error
    ///
    /// Always succeeds locally; any remote logout is the caller's
    /// responsibility and its failure must not block this.
    pub fn logout(&self) {
        let mut inner = self.inner.write().expect("session lock poisoned");
        inner.user = None;
        inner.is_authenticated = false;
        inner.error = None;
        drop(inner);
        self.tokens.set(None);
    }

    // ========================================
    // Persistence
    // ========================================

    /// Persisted subset of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().expect("session lock poisoned");
        let tokens = self.tokens.get();
        SessionSnapshot {
            user: inner.user.clone(),
            token: tokens.as_ref().map(|t| t.token.clone()),
            refresh_token: tokens.map(|t| t.refresh_token),
        }
    }

    /// Write the snapshot: tokens to the secure partition, user to the
    /// general partition under the `session` store key
    pub async fn persist_session(&self) {
        let snapshot = self.snapshot();

        match &snapshot.token {
            Some(token) => self.local.secure_set(keys::TOKEN, token).await,
            None => self.local.secure_delete(keys::TOKEN).await,
        }
        match &snapshot.refresh_token {
            Some(refresh) => self.local.secure_set(keys::REFRESH_TOKEN, refresh).await,
            None => self.local.secure_delete(keys::REFRESH_TOKEN).await,
        }

        if snapshot.user.is_some() {
            let user_only = SessionSnapshot {
                user: snapshot.user,
                token: None,
                refresh_token: None,
            };
            match serde_json::to_value(&user_only) {
                Ok(payload) => self.local.snapshot_set(STORE_KEY, &payload).await,
                Err(e) => warn!(error = %e, "Session snapshot serialization failed"),
            }
        } else {
            self.local.snapshot_delete(STORE_KEY).await;
        }
    }

    /// Remove everything this state ever persisted
    pub async fn clear_persisted(&self) {
        self.local.secure_delete(keys::TOKEN).await;
        self.local.secure_delete(keys::REFRESH_TOKEN).await;
        self.local.snapshot_delete(STORE_KEY).await;
    }

    // ========================================
    // Startup / remote flows
    // ========================================

    /// Restore and revalidate a persisted session at process start
    ///
    /// Ends with the state marked initialized exactly once, whatever the
    /// outcome; a network failure resolves to logged-out, never to a
    /// permanently-loading state. Calls after initialization are no-ops.
    pub async fn initialize(&self) {
        if self.is_initialized() {
            return;
        }
        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return;
        }

        let token = self.local.secure_get(keys::TOKEN).await;
        let refresh = self.local.secure_get(keys::REFRESH_TOKEN).await;
        let persisted_user = match self.local.snapshot_get(STORE_KEY).await {
            Some(value) => serde_json::from_value::<SessionSnapshot>(value)
                .map(|s| s.user)
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Persisted session undecodable");
                    None
                }),
            None => None,
        };

        match (token, persisted_user) {
            (Some(token), Some(user)) => {
                self.tokens.set(Some(AuthTokens {
                    token,
                    refresh_token: refresh.unwrap_or_default(),
                }));

                if self.check_token_validity().await {
                    debug!(matricule = %user.matricule, "Persisted session revalidated");
                    self.set_user(user);
                } else {
                    warn!("Persisted token rejected, clearing session");
                    self.logout();
                    self.clear_persisted().await;
                }
            }
            _ => {
                // nothing trustworthy on disk; no validation call is made
                self.logout();
            }
        }

        self.initialized.store(true, Ordering::SeqCst);
    }

    /// Probe the "current user" endpoint with the held token
    ///
    /// True only on an explicit success envelope; any network error counts
    /// as invalid.
    pub async fn check_token_validity(&self) -> bool {
        match self.api.current_user().await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Token validation failed");
                false
            }
        }
    }

    /// Authenticate against the backend and persist the session
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<User> {
        match self.api.login(credentials).await {
            Ok(login) => {
                self.set_tokens(&login.token, login.refresh_token.as_deref().unwrap_or(""));
                self.set_user(login.user.clone());
                self.persist_session().await;
                info!(matricule = %login.user.matricule, "Signed in");
                Ok(login.user)
            }
            Err(e) => {
                self.set_error(surface_message(&e, MSG_LOGIN_FAILED));
                Err(e.into())
            }
        }
    }

    /// Remote logout (best effort), then local clear and wipe
    pub async fn sign_out(&self) {
        if self.tokens.get().is_some() {
            if let Err(e) = self.api.logout().await {
                debug!(error = %e, "Remote logout failed, clearing locally anyway");
            }
        }
        self.logout();
        self.clear_persisted().await;
    }

    /// Expose the raw API error helper for callers needing custom wording
    pub fn describe_api_error(error: &ApiError, fallback: &str) -> String {
        surface_message(error, fallback)
    }
}
