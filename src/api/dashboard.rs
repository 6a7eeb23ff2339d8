//! Channel dashboard routes: aggregate stats and the channel's uploads.

use crate::api::Envelope;
use crate::api::videos::{Video, VideoListData};
use crate::http::ApiClient;
use eyre::Context;
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Aggregate statistics for the current user's channel.
///
/// Counts the backend could not compute come back absent and default to
/// zero, matching how the original client renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub username: String,
    pub avatar: Option<String>,
    #[serde(rename = "subscriberCount", default)]
    pub subscriber_count: u64,
    #[serde(rename = "videoCount", default)]
    pub video_count: u64,
    #[serde(rename = "viewCount", default)]
    pub view_count: u64,
    #[serde(rename = "likeCount", default)]
    pub like_count: u64,
}

impl ApiClient {
    /// Fetches the current user's channel statistics.
    /// `GET /dashboard/stats`.
    #[instrument(skip(self), ret, level = tracing::Level::DEBUG)]
    pub async fn channel_stats(&self) -> eyre::Result<ChannelStats> {
        let response = self
            .request(Method::GET, "/dashboard/stats", None, None::<&()>)
            .await?;

        let envelope: Envelope<ChannelStats> = response
            .json()
            .await
            .context("parse channel stats response as JSON")?;

        Ok(envelope.data)
    }

    /// Fetches the current user's uploaded videos.
    /// `GET /dashboard/videos`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn channel_videos(&self) -> eyre::Result<Vec<Video>> {
        let response = self
            .request(Method::GET, "/dashboard/videos", None, None::<&()>)
            .await?;

        let envelope: Envelope<VideoListData> = response
            .json()
            .await
            .context("parse channel videos response as JSON")?;

        tracing::debug!(
            returned_items = envelope.data.videos.len(),
            "fetched channel videos"
        );

        Ok(envelope.data.videos)
    }
}
