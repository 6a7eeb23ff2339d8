//! Page state for every screen of the client.
//!
//! Each page is a plain value mirroring one screen of the browser client:
//! a `loading` flag, an optional display `error`, and the screen's data,
//! plus async methods for the user actions available there. Pages fetch
//! through [`ApiClient`](crate::http::ApiClient) and never share data with
//! each other; navigating back to a screen refetches it.
//!
//! Fetches outlive navigation. A response that arrives after the user has
//! already moved on must not overwrite the state of whatever page replaced
//! the one that issued it, so every fetching method takes a [`MountToken`]
//! and discards its result when the token is no longer current.

use jiff::Timestamp;
use tokio::sync::watch;

pub mod channel;
pub mod history;
pub mod home;
pub mod player;
pub mod playlists;
pub mod profile;
pub mod signup;
pub mod upload;

pub use channel::ChannelPage;
pub use history::HistoryPage;
pub use home::HomePage;
pub use player::PlayerPage;
pub use playlists::{PlaylistDetailPage, PlaylistsPage};
pub use profile::ProfilePage;
pub use signup::SignupPage;
pub use upload::UploadPage;

/// How many videos a feed page requests at a time, matching the grid the
/// browser client renders.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Tracks which page is currently on screen.
///
/// Every navigation calls [`Mount::remount`] to obtain a token for the
/// incoming page. A fetch started on behalf of an earlier page can then
/// notice that its token has been superseded and drop the late response
/// instead of clobbering the current page's state.
#[derive(Debug, Clone)]
pub struct Mount {
    epochs: watch::Sender<u64>,
}

impl Mount {
    pub fn new() -> Self {
        let (epochs, _) = watch::channel(0);
        Self { epochs }
    }

    /// Declares a new page current, invalidating every previously issued
    /// token.
    pub fn remount(&self) -> MountToken {
        let mut epoch = 0;
        self.epochs.send_modify(|current| {
            *current += 1;
            epoch = *current;
        });
        MountToken {
            epochs: self.epochs.subscribe(),
            epoch,
        }
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies the page a fetch was started for; issued by [`Mount`].
#[derive(Debug, Clone)]
pub struct MountToken {
    epochs: watch::Receiver<u64>,
    epoch: u64,
}

impl MountToken {
    /// Whether the page this token was issued for is still on screen.
    pub fn is_current(&self) -> bool {
        *self.epochs.borrow() == self.epoch
    }
}

/// Compacts a view count the way the video cards display it: `1.4K`,
/// `2.0M`, or the plain number below a thousand.
pub fn format_views(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K", views as f64 / 1_000.0)
    } else {
        views.to_string()
    }
}

/// Renders a duration in seconds as `mm:ss`, or `hh:mm:ss` once the video
/// is an hour or longer. Unknown durations render as the empty string.
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds else {
        return String::new();
    };
    if !seconds.is_finite() {
        return String::new();
    }
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Describes how long ago `created` was, in the coarse "3 days ago" style
/// of the video listings. `now` is passed in so listings render stably.
pub fn time_ago(created: Timestamp, now: Timestamp) -> String {
    let seconds = (now.as_second() - created.as_second()).max(0) as f64;
    for (unit_seconds, label) in [
        (31_536_000.0, "years"),
        (2_592_000.0, "months"),
        (86_400.0, "days"),
        (3_600.0, "hours"),
        (60.0, "minutes"),
    ] {
        let interval = seconds / unit_seconds;
        if interval > 1.0 {
            return format!("{} {label} ago", interval.floor() as u64);
        }
    }
    format!("{seconds} seconds ago", seconds = seconds as u64)
}
