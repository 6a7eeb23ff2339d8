//! Client-side core of the Streamly video platform: the session state
//! machine and route guard the UI hangs off, typed bindings for the
//! backend's REST surface, and per-screen page state.
//!
//! The terminal front end in `src/bin/streamly-cli.rs` drives all of it
//! interactively; the test suites drive it against the in-process mock
//! backend in [`mock`].

pub mod api;
pub mod http;
pub mod mock;
pub mod pages;
pub mod router;
pub mod session;

pub use crate::http::ApiClient;
pub use router::{Route, RouteDecision, Router};
pub use session::{Credentials, Phase, Session, SessionStore};
