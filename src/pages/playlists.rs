//! Playlist management: the overview of the user's playlists and the
//! detail view of a single playlist's videos.

use crate::api::{Playlist, PlaylistUpsertRequest};
use crate::http::ApiClient;
use crate::pages::MountToken;

/// State behind the playlists overview.
#[derive(Debug, Clone)]
pub struct PlaylistsPage {
    pub playlists: Vec<Playlist>,
    pub loading: bool,
    pub error: Option<String>,
}

impl PlaylistsPage {
    pub fn new() -> Self {
        Self {
            playlists: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub async fn load(&mut self, api: &ApiClient, view: &MountToken) {
        self.loading = true;
        self.error = None;

        let fetched = api.my_playlists().await;
        if !view.is_current() {
            return;
        }
        match fetched {
            Ok(playlists) => self.playlists = playlists,
            Err(e) => {
                tracing::warn!("failed to fetch playlists: {}", e);
                self.error = Some("Failed to fetch playlists.".to_owned());
            }
        }
        self.loading = false;
    }

    /// Creates a playlist and refetches the overview.
    ///
    /// Name and description are both required; blank input is rejected
    /// before any request goes out.
    pub async fn create(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        name: &str,
        description: &str,
    ) {
        let name = name.trim();
        let description = description.trim();
        if name.is_empty() || description.is_empty() {
            self.error = Some("Playlist name and description cannot be empty.".to_owned());
            return;
        }

        let request = PlaylistUpsertRequest {
            name: name.to_owned(),
            description: description.to_owned(),
        };
        let created = api.create_playlist(&request).await;
        if !view.is_current() {
            return;
        }
        match created {
            Ok(_) => self.load(api, view).await,
            Err(e) => {
                tracing::warn!("failed to create playlist: {}", e);
                self.error = Some("Failed to create playlist.".to_owned());
            }
        }
    }

    /// Deletes a playlist after an interactive confirmation.
    ///
    /// Declining leaves the list untouched and issues no request.
    pub async fn delete(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        playlist_id: &str,
        confirm: impl Fn(&str) -> bool,
    ) {
        if !confirm("Are you sure you want to delete this playlist? This action cannot be undone.")
        {
            tracing::debug!(playlist = %playlist_id, "playlist deletion declined");
            return;
        }

        let deleted = api.delete_playlist(playlist_id).await;
        if !view.is_current() {
            return;
        }
        match deleted {
            Ok(()) => self.load(api, view).await,
            Err(e) => {
                tracing::warn!(playlist = %playlist_id, "failed to delete playlist: {}", e);
                self.error = Some("Failed to delete playlist.".to_owned());
            }
        }
    }
}

impl Default for PlaylistsPage {
    fn default() -> Self {
        Self::new()
    }
}

/// State behind a single playlist's detail view.
#[derive(Debug, Clone)]
pub struct PlaylistDetailPage {
    playlist_id: String,
    pub playlist: Option<Playlist>,
    pub loading: bool,
    pub error: Option<String>,
}

impl PlaylistDetailPage {
    pub fn new(playlist_id: impl Into<String>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            playlist: None,
            loading: true,
            error: None,
        }
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    pub async fn load(&mut self, api: &ApiClient, view: &MountToken) {
        self.loading = true;
        self.error = None;

        let fetched = api.get_playlist(&self.playlist_id).await;
        if !view.is_current() {
            return;
        }
        match fetched {
            Ok(playlist) => self.playlist = Some(playlist),
            Err(e) => {
                tracing::warn!(playlist = %self.playlist_id, "failed to fetch playlist: {}", e);
                self.error = Some("Failed to load playlist.".to_owned());
            }
        }
        self.loading = false;
    }

    /// Renames the playlist and refetches it.
    pub async fn update(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        name: &str,
        description: &str,
    ) {
        let request = PlaylistUpsertRequest {
            name: name.to_owned(),
            description: description.to_owned(),
        };
        let updated = api.update_playlist(&self.playlist_id, &request).await;
        if !view.is_current() {
            return;
        }
        match updated {
            Ok(_) => self.load(api, view).await,
            Err(e) => tracing::warn!(playlist = %self.playlist_id, "failed to update playlist: {}", e),
        }
    }

    /// Adds a video by id, then refetches. Blank ids are ignored.
    pub async fn add_video(&mut self, api: &ApiClient, view: &MountToken, video_id: &str) {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return;
        }
        let added = api.add_video_to_playlist(video_id, &self.playlist_id).await;
        if !view.is_current() {
            return;
        }
        match added {
            Ok(_) => self.load(api, view).await,
            Err(e) => tracing::warn!(playlist = %self.playlist_id, "failed to add video: {}", e),
        }
    }

    /// Removes a video, then refetches.
    pub async fn remove_video(&mut self, api: &ApiClient, view: &MountToken, video_id: &str) {
        let removed = api
            .remove_video_from_playlist(video_id, &self.playlist_id)
            .await;
        if !view.is_current() {
            return;
        }
        match removed {
            Ok(_) => self.load(api, view).await,
            Err(e) => tracing::warn!(playlist = %self.playlist_id, "failed to remove video: {}", e),
        }
    }
}
