//! Video routes: the browse/search feed, single-video detail, and
//! publishing.

use crate::api::Envelope;
use crate::api::types::FilePart;
use crate::http::ApiClient;
use eyre::Context;
use http::Method;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A `video` resource as the backend returns it.
///
/// The feed and detail endpoints populate `owner` with the uploading
/// channel's public fields; contexts that do not populate it leave it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    /// URL of the playable media file.
    #[serde(rename = "videoFile")]
    pub video_file: String,
    /// URL of the thumbnail image.
    pub thumbnail: String,
    #[serde(default)]
    pub views: u64,
    /// Duration in seconds, when the backend has extracted it.
    pub duration: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
    /// The uploading channel, when populated by the endpoint.
    pub owner: Option<VideoOwner>,
}

/// Public fields of the channel that owns a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoOwner {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: Option<String>,
    /// Display name of the channel, populated on the detail endpoint.
    #[serde(rename = "channelName")]
    pub channel_name: Option<String>,
    pub avatar: Option<String>,
}

impl VideoOwner {
    /// The name to show for this channel: the display name when the
    /// endpoint populated one, the username otherwise.
    pub fn display_name(&self) -> &str {
        self.channel_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("Unknown Channel")
    }
}

/// Payload shape of `GET /videos`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListData {
    pub videos: Vec<Video>,
}

/// Files and fields for `POST /videos`, sent as multipart form data.
#[derive(Debug)]
pub struct VideoUpload {
    pub title: String,
    pub description: String,
    pub video_file: FilePart,
    pub thumbnail: FilePart,
    /// Id of the uploading user; the original client sends it even though
    /// the backend could derive it from the session.
    pub owner: String,
}

impl ApiClient {
    /// Fetches one page of the video feed, optionally filtered by a search
    /// query.
    ///
    /// `GET /videos?query=&page=&limit=`. The backend matches the query
    /// against titles and descriptions; an empty query returns the plain
    /// feed.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn list_videos(
        &self,
        query: Option<&str>,
        page: u32,
        limit: u32,
    ) -> eyre::Result<Vec<Video>> {
        let page_string = page.to_string();
        let limit_string = limit.to_string();
        let mut query_params = vec![
            ("page", page_string.as_str()),
            ("limit", limit_string.as_str()),
        ];

        // Only send the search term when one was given
        if let Some(query) = query {
            query_params.push(("query", query));
        }

        let response = self
            .request(Method::GET, "/videos", Some(&query_params), None::<&()>)
            .await?;

        let envelope: Envelope<VideoListData> = response
            .json()
            .await
            .context("parse video feed response as JSON")?;

        tracing::debug!(
            returned_items = envelope.data.videos.len(),
            "fetched video feed page"
        );

        Ok(envelope.data.videos)
    }

    /// Fetches a single video with its owning channel populated.
    ///
    /// `GET /videos/{id}`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn get_video(&self, video_id: &str) -> eyre::Result<Video> {
        let path = format!("/videos/{video_id}");
        let response = self
            .request(Method::GET, &path, None, None::<&()>)
            .await?;

        let envelope: Envelope<Video> = response
            .json()
            .await
            .context("parse video detail response as JSON")?;

        Ok(envelope.data)
    }

    /// Publishes a new video.
    ///
    /// `POST /videos` as multipart form data carrying the title,
    /// description, media file, and thumbnail. Returns the created video,
    /// whose id callers use to navigate to the player.
    #[instrument(skip(self, upload), level = tracing::Level::DEBUG)]
    pub async fn publish_video(&self, upload: VideoUpload) -> eyre::Result<Video> {
        let multipart = reqwest::multipart::Form::new()
            .text("title", upload.title)
            .text("description", upload.description)
            .text("owner", upload.owner)
            .part("videoFile", upload.video_file.into_part()?)
            .part("thumbnail", upload.thumbnail.into_part()?);

        let response = self
            .request_multipart(Method::POST, "/videos", multipart)
            .await?;

        let envelope: Envelope<Video> = response
            .json()
            .await
            .context("parse publish response as JSON")?;

        tracing::debug!(video_id = %envelope.data.id, "published video");

        Ok(envelope.data)
    }
}
