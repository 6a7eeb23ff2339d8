//! Like routes.

use crate::api::Envelope;
use crate::http::ApiClient;
use eyre::Context;
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One like on a video. `liked_by` is the liking user's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "likedBy")]
    pub liked_by: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LikesData {
    likes: Vec<Like>,
}

impl ApiClient {
    /// Fetches every like on a video. `GET /likes/video/{videoId}`.
    ///
    /// The count is the list's length; whether a given user liked the video
    /// is a scan over `liked_by`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn video_likes(&self, video_id: &str) -> eyre::Result<Vec<Like>> {
        let path = format!("/likes/video/{video_id}");
        let response = self
            .request(Method::GET, &path, None, None::<&()>)
            .await?;

        let envelope: Envelope<LikesData> = response
            .json()
            .await
            .context("parse likes response as JSON")?;

        Ok(envelope.data.likes)
    }

    /// Toggles the current user's like on a video.
    /// `POST /likes/toggle/v/{videoId}`. Callers re-fetch the like list to
    /// observe the new state.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn toggle_video_like(&self, video_id: &str) -> eyre::Result<()> {
        let path = format!("/likes/toggle/v/{video_id}");
        let _response = self
            .request(Method::POST, &path, None, None::<&()>)
            .await?;

        Ok(())
    }
}
