//! Client-side session state: who is logged in, and has that question been
//! answered yet.
//!
//! The [`SessionStore`] is the single source of truth for authentication
//! state across the whole application. It owns a [`Session`] value behind a
//! watch channel: consumers read point-in-time copies with
//! [`SessionStore::snapshot`] or subscribe with [`SessionStore::subscribe`]
//! to re-evaluate whenever a new snapshot is published (the route guard
//! does exactly that). Nothing outside this module mutates session state;
//! the three operations [`check`](SessionStore::check),
//! [`login`](SessionStore::login), and [`logout`](SessionStore::logout) are
//! the only writers.
//!
//! # Lifecycle
//!
//! A store starts in [`Phase::Initializing`], meaning the startup identity
//! check has not resolved and `authenticated`/`user` are not yet meaningful.
//! The first completed [`check`](SessionStore::check) moves it to
//! [`Phase::Ready`] and it never goes back; re-running the check simply
//! re-evaluates the answer. Consumers that care about the distinction (the
//! route guard) defer their decision while the phase is Initializing.
//!
//! # Failure policy
//!
//! The store absorbs every backend failure into state or a boolean. A
//! failed identity check is an unauthenticated session, not an error; a
//! rejected login is `false`, not an error; a failed logout call still
//! clears the local session. Callers never see a raw error from this
//! module, which is why none of the operations return `Result`.

use crate::api::users::{CurrentUser, LoginRequest};
use crate::http::ApiClient;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The startup identity check is still in flight; `authenticated` and
    /// `user` carry placeholder values that must not be branched on.
    Initializing,
    /// The identity check has resolved at least once; the rest of the
    /// session is meaningful (the answer may well be "not logged in").
    Ready,
}

/// A point-in-time copy of the client's belief about the current user.
///
/// Snapshots are cheap to clone and free of interior mutability; holding
/// one never observes later changes. Subscribe to the store to see updates.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub phase: Phase,
    pub authenticated: bool,
    /// The user record from the most recent successful check or login.
    /// Canonical: pages edit transient clones, never this copy.
    pub user: Option<CurrentUser>,
}

impl Session {
    fn initializing() -> Self {
        Self {
            phase: Phase::Initializing,
            authenticated: false,
            user: None,
        }
    }

    /// Whether the startup identity check has resolved.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }
}

/// Login form input: the password plus a single identifying field.
///
/// The backend wants either a username or an email, and the original
/// client decides which purely by input shape: anything containing an `@`
/// is treated as an email. That classification lives here so every login
/// path shares it.
#[derive(Debug, Clone)]
pub struct Credentials {
    identity: String,
    password: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            password: password.into(),
        }
    }

    /// Builds the wire-level login body, placing the identity in the
    /// `email` field when it looks like one and `username` otherwise.
    fn to_request(&self) -> LoginRequest {
        if self.identity.contains('@') {
            LoginRequest {
                username: None,
                email: Some(self.identity.clone()),
                password: self.password.clone(),
            }
        } else {
            LoginRequest {
                username: Some(self.identity.clone()),
                email: None,
                password: self.password.clone(),
            }
        }
    }
}

/// Process-wide authentication state with an explicit lifecycle.
///
/// Cloning shares the underlying state: all clones publish to and read
/// from the same session. The confirmation callback is injected at
/// construction so the shipped binary can wire it to an interactive stdin
/// prompt while tests script the answer.
#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
    publish: watch::Sender<Session>,
    /// Blocking yes/no prompt consulted before logout. Deliberately
    /// synchronous: the decision gates both the network call and the state
    /// change.
    confirm: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

// Manual Debug since the confirmation callback has no useful rendering.
impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.publish.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a store in the Initializing phase.
    ///
    /// Callers are expected to run [`Self::check`] once at startup; until
    /// that resolves, subscribers see the Initializing placeholder.
    pub fn new<F>(api: ApiClient, confirm: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let (publish, _) = watch::channel(Session::initializing());
        Self {
            api,
            publish,
            confirm: Arc::new(confirm),
        }
    }

    /// Returns the transport this store talks through, for callers that
    /// need to issue their own requests on the same cookie session.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Returns the current session by value.
    pub fn snapshot(&self) -> Session {
        self.publish.borrow().clone()
    }

    /// Returns a receiver that observes every published session snapshot.
    ///
    /// The receiver starts at the current value; `changed().await` wakes on
    /// each subsequent publication. This is how the route guard and pages
    /// re-evaluate reactively instead of polling.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.publish.subscribe()
    }

    /// Asks the backend who the ambient session cookie belongs to, then
    /// publishes the answer.
    ///
    /// On an affirmative identity response the session becomes Ready,
    /// authenticated, with the returned user stored. On any failure at all
    /// (no response, an unauthorized rejection, an unparseable payload) the
    /// session becomes Ready and unauthenticated. This operation never
    /// fails from the caller's point of view.
    ///
    /// The first resolution is the store's single transition out of
    /// Initializing. Running the check again later re-evaluates the answer
    /// without re-entering Initializing. Two checks racing each other are
    /// not serialized; whichever resolves last wins.
    #[instrument(skip(self))]
    pub async fn check(&self) {
        match self.api.current_user().await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "identity check succeeded");
                self.publish.send_replace(Session {
                    phase: Phase::Ready,
                    authenticated: true,
                    user: Some(user),
                });
            }
            Err(e) => {
                tracing::debug!("identity check failed, session is unauthenticated: {}", e);
                self.publish.send_replace(Session {
                    phase: Phase::Ready,
                    authenticated: false,
                    user: None,
                });
            }
        }
    }

    /// Submits credentials and reports whether the backend accepted them.
    ///
    /// On success the session becomes authenticated with the returned user
    /// stored, and the backend's session cookie is captured by the shared
    /// cookie store. On failure (bad credentials, transport error) the
    /// session is left exactly as it was and `false` comes back; the error
    /// is logged, never raised.
    ///
    /// Login does not touch the lifecycle phase: only [`Self::check`]
    /// resolves Initializing.
    #[instrument(skip(self, credentials), ret)]
    pub async fn login(&self, credentials: &Credentials) -> bool {
        match self.api.login(&credentials.to_request()).await {
            Ok(data) => {
                tracing::info!(username = %data.user.username, "logged in");
                let phase = self.publish.borrow().phase;
                self.publish.send_replace(Session {
                    phase,
                    authenticated: true,
                    user: Some(data.user),
                });
                true
            }
            Err(e) => {
                tracing::warn!("login rejected: {}", e);
                false
            }
        }
    }

    /// Ends the session, after an interactive confirmation.
    ///
    /// The confirmation prompt gates everything: declined means no state
    /// change, no network call, and `false` back. Once confirmed, the
    /// backend logout is attempted and the local session is cleared whether
    /// or not that call succeeded. Logout is optimistic by contract and
    /// never surfaces a failure; a dead backend must not trap the user in a
    /// logged-in UI.
    ///
    /// Returns whether a logout actually happened.
    #[instrument(skip(self), ret)]
    pub async fn logout(&self) -> bool {
        if !(self.confirm)("Are you sure you want to logout?") {
            tracing::debug!("logout declined at confirmation prompt");
            return false;
        }

        if let Err(e) = self.api.logout().await {
            tracing::warn!("backend logout failed, clearing local session anyway: {}", e);
        }

        let phase = self.publish.borrow().phase;
        self.publish.send_replace(Session {
            phase,
            authenticated: false,
            user: None,
        });
        true
    }
}
