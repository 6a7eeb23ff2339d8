//! The home feed: a grid of recent videos, optionally narrowed by the
//! navbar search query.

use crate::api::Video;
use crate::http::ApiClient;
use crate::pages::{DEFAULT_PAGE_SIZE, MountToken};

/// State behind the landing page.
#[derive(Debug, Clone)]
pub struct HomePage {
    query: Option<String>,
    pub videos: Vec<Video>,
    pub loading: bool,
    pub error: Option<String>,
}

impl HomePage {
    /// An unloaded feed, optionally filtered by a search query.
    pub fn new(query: Option<String>) -> Self {
        Self {
            query,
            videos: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// The active search query, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Fetches the first page of the feed.
    ///
    /// The feed endpoint rejects anonymous viewers, so a failure here most
    /// often means the viewer needs to sign in; the display message says
    /// so rather than echoing the raw error.
    pub async fn load(&mut self, api: &ApiClient, view: &MountToken) {
        self.loading = true;
        self.error = None;

        let fetched = api
            .list_videos(self.query.as_deref(), 1, DEFAULT_PAGE_SIZE)
            .await;
        if !view.is_current() {
            tracing::debug!("home feed superseded during fetch, dropping response");
            return;
        }
        match fetched {
            Ok(videos) => self.videos = videos,
            Err(e) => {
                tracing::warn!("failed to fetch the video feed: {}", e);
                self.error = Some("Login to view videos".to_owned());
            }
        }
        self.loading = false;
    }

    /// Replaces the active search query and refetches the feed.
    pub async fn search(&mut self, api: &ApiClient, view: &MountToken, query: Option<String>) {
        self.query = query.filter(|q| !q.trim().is_empty());
        self.load(api, view).await;
    }
}
