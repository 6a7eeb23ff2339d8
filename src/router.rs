//! Routes, the navigation guard, and its reactive re-evaluation.
//!
//! [`Route`] names every destination in the application and knows which of
//! them require an authenticated session. The guard itself is the pure
//! function [`evaluate`]: given a route and a session snapshot it produces
//! a [`RouteDecision`] and nothing else, which keeps every interesting case
//! a plain synchronous test.
//!
//! [`Router`] wraps the guard with state: the current route plus a
//! subscription to the session store. Navigation evaluates the guard
//! against the latest snapshot, and [`Router::session_changed`] re-runs it
//! whenever a new snapshot is published, so a logout while sitting on a
//! protected route turns into a redirect without any page's involvement.

use crate::session::{Phase, Session, SessionStore};
use eyre::Context;
use std::fmt;
use tokio::sync::watch;

/// A navigable destination.
///
/// Mirrors the original application's route table: three public routes
/// (the feed, login, signup) and the protected rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The video feed, optionally filtered by a search query.
    Home { query: Option<String> },
    Login,
    Signup,
    /// The current user's channel dashboard.
    Channel,
    /// The current user's watch history.
    History,
    Upload,
    /// The current user's playlist overview.
    Playlists,
    PlaylistDetail { playlist_id: String },
    /// The player for one video.
    Watch { video_id: String },
    Profile,
}

impl Route {
    /// The plain feed with no search query.
    pub fn home() -> Self {
        Route::Home { query: None }
    }

    /// Whether this destination requires an authenticated session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Home { .. } | Route::Login | Route::Signup)
    }

    /// Parses a path (with optional query string) into a route.
    ///
    /// Returns `None` for paths outside the route table, which callers
    /// treat the way a browser treats an unmatched URL.
    pub fn parse(input: &str) -> Option<Route> {
        let (path, query) = match input.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (input, None),
        };
        let path = path.trim_end_matches('/');

        let route = match path {
            "" => {
                let search = query.and_then(|q| {
                    form_urlencoded::parse(q.as_bytes())
                        .find(|(k, _)| k == "query")
                        .map(|(_, v)| v.into_owned())
                });
                Route::Home { query: search }
            }
            "/login" => Route::Login,
            "/signup" => Route::Signup,
            "/channel" => Route::Channel,
            "/users/watchHistory" => Route::History,
            "/upload" => Route::Upload,
            "/playlists" => Route::Playlists,
            "/profile" => Route::Profile,
            _ => {
                if let Some(playlist_id) = path.strip_prefix("/playlist/") {
                    if playlist_id.is_empty() || playlist_id.contains('/') {
                        return None;
                    }
                    Route::PlaylistDetail {
                        playlist_id: playlist_id.to_string(),
                    }
                } else if let Some(video_id) = path.strip_prefix("/watch/") {
                    if video_id.is_empty() || video_id.contains('/') {
                        return None;
                    }
                    Route::Watch {
                        video_id: video_id.to_string(),
                    }
                } else {
                    return None;
                }
            }
        };
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home { query: None } => write!(f, "/"),
            Route::Home { query: Some(q) } => {
                let encoded: String = form_urlencoded::Serializer::new(String::new())
                    .append_pair("query", q)
                    .finish();
                write!(f, "/?{encoded}")
            }
            Route::Login => write!(f, "/login"),
            Route::Signup => write!(f, "/signup"),
            Route::Channel => write!(f, "/channel"),
            Route::History => write!(f, "/users/watchHistory"),
            Route::Upload => write!(f, "/upload"),
            Route::Playlists => write!(f, "/playlists"),
            Route::PlaylistDetail { playlist_id } => write!(f, "/playlist/{playlist_id}"),
            Route::Watch { video_id } => write!(f, "/watch/{video_id}"),
            Route::Profile => write!(f, "/profile"),
        }
    }
}

/// The guard's verdict for one route against one session snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session phase is still Initializing: render a neutral loading
    /// placeholder and make no redirect decision yet.
    Defer,
    /// Render the destination.
    Allow,
    /// Navigate to the carried route instead; the attempted destination is
    /// discarded, not remembered.
    Redirect(Route),
}

/// Decides whether navigation to `route` proceeds under `session`.
///
/// Public routes always render. For protected routes: Initializing defers,
/// an authenticated session allows, anything else redirects to the login
/// destination with no return-to memory.
pub fn evaluate(route: &Route, session: &Session) -> RouteDecision {
    if !route.is_protected() {
        return RouteDecision::Allow;
    }
    match session.phase {
        Phase::Initializing => RouteDecision::Defer,
        Phase::Ready if session.authenticated => RouteDecision::Allow,
        Phase::Ready => RouteDecision::Redirect(Route::Login),
    }
}

/// Navigation state bound to a session subscription.
#[derive(Debug)]
pub struct Router {
    current: Route,
    session: watch::Receiver<Session>,
}

impl Router {
    /// Creates a router sitting on the feed, subscribed to the store.
    pub fn new(store: &SessionStore) -> Self {
        Self {
            current: Route::home(),
            session: store.subscribe(),
        }
    }

    /// The route currently navigated to (after any redirect).
    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Attempts to navigate to `route` and returns the guard's verdict.
    ///
    /// Allowed and deferred navigation both land on the requested route
    /// (deferred content resolves in place once the session does); a
    /// redirect lands on its target and the requested destination is
    /// forgotten.
    pub fn navigate(&mut self, route: Route) -> RouteDecision {
        let decision = evaluate(&route, &self.session.borrow_and_update());
        match &decision {
            RouteDecision::Allow | RouteDecision::Defer => self.current = route,
            RouteDecision::Redirect(target) => {
                tracing::debug!(attempted = %route, target = %target, "navigation redirected");
                self.current = target.clone();
            }
        }
        decision
    }

    /// Re-evaluates the current route against the latest session snapshot
    /// without waiting, applying any redirect.
    pub fn reevaluate(&mut self) -> RouteDecision {
        let current = self.current.clone();
        self.navigate(current)
    }

    /// Waits for the next session publication, then re-evaluates the
    /// current route against it.
    ///
    /// This is the reactive half of the guard contract: a store that
    /// publishes an unauthenticated snapshot while the router sits on a
    /// protected route yields `Redirect` here on the very next evaluation.
    ///
    /// Fails only when the session store has gone away entirely.
    pub async fn session_changed(&mut self) -> eyre::Result<RouteDecision> {
        self.session
            .changed()
            .await
            .context("session store closed")?;
        Ok(self.reevaluate())
    }
}
