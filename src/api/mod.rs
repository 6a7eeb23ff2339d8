//! Typed bindings for the Streamly REST API.
//!
//! Each submodule covers one backend resource and holds both the resource's
//! types and the [`ApiClient`](crate::http::ApiClient) methods that call its
//! routes. The split mirrors the backend's route mounting: `/users`,
//! `/videos`, `/comments`, `/likes`, `/subscriptions`, `/playlist`, and
//! `/dashboard`.
//!
//! # Response envelope
//!
//! Every endpoint wraps its payload in the same JSON envelope:
//!
//! ```json
//! { "statusCode": 200, "data": { ... }, "message": "ok", "success": true }
//! ```
//!
//! The bindings deserialize the full [`Envelope`] and hand callers the
//! `data` payload; the `message` field only surfaces in errors (see
//! [`crate::http`]).
//!
//! # Pagination
//!
//! List endpoints that paginate do so by page number, reporting
//! `currentPage` and `totalPages` alongside the items. [`PagedStream`]
//! walks those pages lazily and yields items one at a time.

pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod types;
pub mod users;
pub mod videos;

pub use types::{FilePart, PagedStream};

pub use comments::{Comment, CommentAuthor, CommentPage};
pub use dashboard::ChannelStats;
pub use likes::Like;
pub use playlists::{Playlist, PlaylistUpsertRequest};
pub use subscriptions::SubscriptionStatus;
pub use users::{ChangePasswordRequest, CurrentUser, LoginData, RegisterForm, UpdateAccountRequest};
pub use videos::{Video, VideoOwner, VideoUpload};

use serde::{Deserialize, Serialize};

/// The backend's uniform response wrapper.
///
/// `data` carries the endpoint-specific payload; `message` is a
/// human-readable outcome description the backend also populates on
/// success.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}
