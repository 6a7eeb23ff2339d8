//! The watch history: videos the signed-in user has previously opened,
//! most recent first as the backend returns them.

use crate::api::Video;
use crate::http::ApiClient;
use crate::pages::MountToken;

#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub videos: Vec<Video>,
    pub loading: bool,
    pub error: Option<String>,
}

impl HistoryPage {
    pub fn new() -> Self {
        Self {
            videos: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub async fn load(&mut self, api: &ApiClient, view: &MountToken) {
        self.loading = true;
        self.error = None;

        let fetched = api.watch_history().await;
        if !view.is_current() {
            return;
        }
        match fetched {
            Ok(videos) => self.videos = videos,
            Err(e) => {
                tracing::warn!("failed to fetch watch history: {}", e);
                self.error = Some("Failed to load watch history.".to_owned());
            }
        }
        self.loading = false;
    }
}

impl Default for HistoryPage {
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
    async fn load_lists_previously_watched_videos() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::GET,
                "/users/history",
                200,
                json!({
                    "statusCode": 200,
                    "data": [{
                        "_id": "v3",
                        "title": "Autolyse experiments",
                        "description": "",
                        "videoFile": "https://cdn.example.com/v3.mp4",
                        "thumbnail": "https://cdn.example.com/v3.jpg",
                        "views": 51,
                        "createdAt": "2026-01-20T12:00:00Z",
                    }],
                    "message": "ok",
                    "success": true,
                }),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let mut page = HistoryPage::new();
        page.load(&api, &mount.remount()).await;

        assert!(!page.loading);
        assert_eq!(page.videos.len(), 1);
        assert_eq!(page.videos[0].id, "v3");
    }

    #[tokio::test]
    async fn failure_becomes_a_display_message() {
        let backend = MockBackend::start().await.unwrap();
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = HistoryPage::new();
        page.load(&api, &mount.remount()).await;

        assert_eq!(
            page.error.as_deref(),
            Some("Failed to load watch history.")
        );
        assert!(page.videos.is_empty());
    }
}
