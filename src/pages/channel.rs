//! The signed-in user's channel dashboard: headline stats plus the list
//! of their uploads.

use crate::api::{ChannelStats, Video};
use crate::http::ApiClient;
use crate::pages::MountToken;

#[derive(Debug, Clone)]
pub struct ChannelPage {
    pub stats: Option<ChannelStats>,
    pub videos: Vec<Video>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ChannelPage {
    pub fn new() -> Self {
        Self {
            stats: None,
            videos: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// Fetches the stats block and the upload list. The two fail
    /// independently; whichever failed last owns the display message.
    pub async fn load(&mut self, api: &ApiClient, view: &MountToken) {
        self.loading = true;
        self.error = None;

        let stats = api.channel_stats().await;
        if !view.is_current() {
            return;
        }
        match stats {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => {
                tracing::warn!("failed to fetch channel stats: {}", e);
                self.error = Some("Failed to load channel stats.".to_owned());
            }
        }

        let videos = api.channel_videos().await;
        if !view.is_current() {
            return;
        }
        match videos {
            Ok(videos) => self.videos = videos,
            Err(e) => {
                tracing::warn!("failed to fetch channel videos: {}", e);
                self.error = Some("Failed to load channel videos.".to_owned());
            }
        }

        self.loading = false;
    }
}

impl Default for ChannelPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::pages::Mount;
    use http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn load_fills_stats_and_uploads() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::GET,
                "/dashboard/stats",
                200,
                json!({
                    "statusCode": 200,
                    "data": {
                        "username": "breadlab",
                        "avatar": "https://cdn.example.com/breadlab.png",
                        "subscriberCount": 817,
                        "videoCount": 2,
                        "viewCount": 90312,
                        "likeCount": 1204,
                    },
                    "message": "ok",
                    "success": true,
                }),
            )
            .await;
        backend
            .on(
                Method::GET,
                "/dashboard/videos",
                200,
                json!({
                    "statusCode": 200,
                    "data": {
                        "videos": [{
                            "_id": "v1",
                            "title": "Scoring patterns",
                            "description": "",
                            "videoFile": "https://cdn.example.com/v1.mp4",
                            "thumbnail": "https://cdn.example.com/v1.jpg",
                            "views": 1204,
                            "createdAt": "2026-02-03T18:30:00Z",
                        }],
                    },
                    "message": "ok",
                    "success": true,
                }),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let mut page = ChannelPage::new();
        page.load(&api, &mount.remount()).await;

        assert!(!page.loading);
        assert_eq!(page.error, None);
        assert_eq!(page.stats.as_ref().unwrap().subscriber_count, 817);
        assert_eq!(page.videos.len(), 1);
    }

    #[tokio::test]
    async fn stats_failure_still_loads_uploads() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::GET,
                "/dashboard/videos",
                200,
                json!({
                    "statusCode": 200,
                    "data": {"videos": []},
                    "message": "ok",
                    "success": true,
                }),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let mut page = ChannelPage::new();
        page.load(&api, &mount.remount()).await;

        assert_eq!(page.error.as_deref(), Some("Failed to load channel stats."));
        assert!(page.stats.is_none());
        assert!(!page.loading);
    }
}
