//! Playlist routes: the user's playlists, detail, and video membership.

use crate::api::Envelope;
use crate::api::videos::Video;
use crate::http::ApiClient;
use eyre::Context;
use http::Method;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A `playlist` resource.
///
/// The detail endpoint populates `videos` with full video records; the
/// user-overview endpoint may return them abbreviated or not at all, so
/// the field defaults to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<Timestamp>,
}

/// Body shared by playlist create and update, both of which take a name
/// and a description.
#[derive(Debug, Serialize)]
pub struct PlaylistUpsertRequest {
    pub name: String,
    pub description: String,
}

impl ApiClient {
    /// Fetches the current user's playlists. `GET /playlist/user`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn my_playlists(&self) -> eyre::Result<Vec<Playlist>> {
        let response = self
            .request(Method::GET, "/playlist/user", None, None::<&()>)
            .await?;

        let envelope: Envelope<Vec<Playlist>> = response
            .json()
            .await
            .context("parse playlists response as JSON")?;

        tracing::debug!(playlists = envelope.data.len(), "fetched playlists");

        Ok(envelope.data)
    }

    /// Creates a playlist. `POST /playlist`. Returns the created resource.
    #[instrument(skip(self, request), level = tracing::Level::DEBUG)]
    pub async fn create_playlist(
        &self,
        request: &PlaylistUpsertRequest,
    ) -> eyre::Result<Playlist> {
        let response = self
            .request(Method::POST, "/playlist", None, Some(request))
            .await?;

        let envelope: Envelope<Playlist> = response
            .json()
            .await
            .context("parse playlist create response as JSON")?;

        tracing::debug!(playlist_id = %envelope.data.id, "created playlist");

        Ok(envelope.data)
    }

    /// Fetches one playlist with its videos populated.
    /// `GET /playlist/{id}`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn get_playlist(&self, playlist_id: &str) -> eyre::Result<Playlist> {
        let path = format!("/playlist/{playlist_id}");
        let response = self
            .request(Method::GET, &path, None, None::<&()>)
            .await?;

        let envelope: Envelope<Playlist> = response
            .json()
            .await
            .context("parse playlist detail response as JSON")?;

        Ok(envelope.data)
    }

    /// Renames or re-describes a playlist. `PATCH /playlist/{id}`.
    #[instrument(skip(self, request), level = tracing::Level::DEBUG)]
    pub async fn update_playlist(
        &self,
        playlist_id: &str,
        request: &PlaylistUpsertRequest,
    ) -> eyre::Result<Playlist> {
        let path = format!("/playlist/{playlist_id}");
        let response = self
            .request(Method::PATCH, &path, None, Some(request))
            .await?;

        let envelope: Envelope<Playlist> = response
            .json()
            .await
            .context("parse playlist update response as JSON")?;

        Ok(envelope.data)
    }

    /// Adds a video to a playlist.
    /// `PATCH /playlist/add/{videoId}/{playlistId}`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn add_video_to_playlist(
        &self,
        video_id: &str,
        playlist_id: &str,
    ) -> eyre::Result<Playlist> {
        let path = format!("/playlist/add/{video_id}/{playlist_id}");
        let response = self
            .request(Method::PATCH, &path, None, None::<&()>)
            .await?;

        let envelope: Envelope<Playlist> = response
            .json()
            .await
            .context("parse playlist add response as JSON")?;

        Ok(envelope.data)
    }

    /// Removes a video from a playlist.
    /// `PATCH /playlist/remove/{videoId}/{playlistId}`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn remove_video_from_playlist(
        &self,
        video_id: &str,
        playlist_id: &str,
    ) -> eyre::Result<Playlist> {
        let path = format!("/playlist/remove/{video_id}/{playlist_id}");
        let response = self
            .request(Method::PATCH, &path, None, None::<&()>)
            .await?;

        let envelope: Envelope<Playlist> = response
            .json()
            .await
            .context("parse playlist remove response as JSON")?;

        Ok(envelope.data)
    }

    /// Deletes a playlist. `DELETE /playlist/{id}`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn delete_playlist(&self, playlist_id: &str) -> eyre::Result<()> {
        let path = format!("/playlist/{playlist_id}");
        let _response = self
            .request(Method::DELETE, &path, None, None::<&()>)
            .await?;

        tracing::debug!(playlist_id, "deleted playlist");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use serde_json::json;

    #[test]
    fn overview_playlist_tolerates_missing_videos() {
        let raw = json!({
            "_id": "p1",
            "name": "Baking",
            "description": "Long ferments",
            "createdAt": "2024-02-20T08:00:00.000Z",
        });
        let playlist: Playlist = serde_json::from_value(raw).unwrap();
        assert!(playlist.videos.is_empty());
    }

    #[tokio::test]
    async fn create_sends_name_and_description() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::POST,
                "/playlist",
                201,
                json!({
                    "statusCode": 201,
                    "data": {"_id": "p2", "name": "Weeknight", "description": "Quick bakes", "videos": []},
                    "message": "playlist created",
                    "success": true,
                }),
            )
            .await;

        let client = ApiClient::new(backend.base_url()).unwrap();
        let playlist = client
            .create_playlist(&PlaylistUpsertRequest {
                name: "Weeknight".into(),
                description: "Quick bakes".into(),
            })
            .await
            .unwrap();
        assert_eq!(playlist.id, "p2");

        let requests = backend.requests_to("/playlist").await;
        assert_eq!(requests[0].json_field("name"), Some(&json!("Weeknight")));
        assert_eq!(
            requests[0].json_field("description"),
            Some(&json!("Quick bakes"))
        );
    }

    #[tokio::test]
    async fn membership_routes_put_both_ids_in_the_path() {
        let backend = MockBackend::start().await.unwrap();
        let updated = json!({
            "statusCode": 200,
            "data": {"_id": "p1", "name": "Baking", "description": "Long ferments", "videos": []},
            "message": "playlist updated",
            "success": true,
        });
        backend
            .on(Method::PATCH, "/playlist/add/v7/p1", 200, updated.clone())
            .await;
        backend
            .on(Method::PATCH, "/playlist/remove/v7/p1", 200, updated)
            .await;

        let client = ApiClient::new(backend.base_url()).unwrap();
        client.add_video_to_playlist("v7", "p1").await.unwrap();
        client.remove_video_from_playlist("v7", "p1").await.unwrap();

        assert_eq!(backend.requests_to("/playlist/add/v7/p1").await.len(), 1);
        assert_eq!(backend.requests_to("/playlist/remove/v7/p1").await.len(), 1);
    }
}
