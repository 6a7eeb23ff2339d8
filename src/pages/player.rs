//! The watch page: one video with its comments, like state, the owning
//! channel's subscription state, and a sidebar of related videos.
//!
//! Every piece of the page is fetched independently, the way the browser
//! client issues one request per widget, and each piece fails on its own:
//! a comment outage does not blank the video. Only the video fetch itself
//! surfaces a display error since nothing else renders without it.

use crate::api::{Comment, CurrentUser, Video};
use crate::http::ApiClient;
use crate::pages::{DEFAULT_PAGE_SIZE, MountToken};

/// State behind the watch page for a single video.
#[derive(Debug, Clone)]
pub struct PlayerPage {
    video_id: String,
    pub video: Option<Video>,
    pub related: Vec<Video>,
    pub comments: Vec<Comment>,
    pub comment_page: u32,
    pub has_more_comments: bool,
    pub likes_count: usize,
    pub liked: bool,
    pub subscribed: bool,
    pub subscriber_count: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl PlayerPage {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            video: None,
            related: Vec::new(),
            comments: Vec::new(),
            comment_page: 1,
            has_more_comments: false,
            likes_count: 0,
            liked: false,
            subscribed: false,
            subscriber_count: 0,
            loading: true,
            error: None,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Points the page at a different video, resetting all loaded state.
    /// Call [`PlayerPage::load`] with a fresh token afterwards.
    pub fn switch_to(&mut self, video_id: impl Into<String>) {
        *self = Self::new(video_id);
    }

    /// Fetches everything the page shows: the video itself, the owning
    /// channel's subscription state, the first page of comments, related
    /// videos, and the like tally.
    ///
    /// `viewer` is the signed-in user, used to decide whether the like
    /// button renders as already pressed.
    pub async fn load(&mut self, api: &ApiClient, view: &MountToken, viewer: Option<&CurrentUser>) {
        self.loading = true;
        self.error = None;
        self.video = None;

        let fetched = api.get_video(&self.video_id).await;
        if !view.is_current() {
            tracing::debug!("watch page superseded during fetch, dropping video");
            return;
        }
        match fetched {
            Ok(video) => {
                if let Some(channel_id) = video.owner.as_ref().map(|owner| owner.id.clone()) {
                    self.fetch_subscription(api, view, &channel_id).await;
                }
                self.video = Some(video);
            }
            Err(e) => {
                tracing::warn!(video = %self.video_id, "failed to fetch video: {}", e);
                self.error = Some("Failed to load video.".to_owned());
            }
        }

        self.fetch_comments(api, view, 1).await;
        self.fetch_related(api, view).await;
        self.refresh_likes(api, view, viewer).await;

        if view.is_current() {
            self.loading = false;
        }
    }

    /// Appends the next page of comments.
    pub async fn load_more_comments(&mut self, api: &ApiClient, view: &MountToken) {
        let next = self.comment_page + 1;
        self.fetch_comments(api, view, next).await;
    }

    /// Posts a comment and refetches the first page so it shows up.
    ///
    /// Blank comments are dropped before any request goes out.
    pub async fn post_comment(&mut self, api: &ApiClient, view: &MountToken, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let posted = api.post_comment(&self.video_id, text).await;
        if !view.is_current() {
            return;
        }
        match posted {
            Ok(()) => self.fetch_comments(api, view, 1).await,
            Err(e) => tracing::warn!(video = %self.video_id, "failed to post comment: {}", e),
        }
    }

    /// Toggles the viewer's like on the video, then refetches the tally.
    ///
    /// Requires a signed-in viewer; anonymous attempts get a display
    /// message and no request.
    pub async fn toggle_like(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        viewer: Option<&CurrentUser>,
    ) {
        if viewer.is_none() {
            self.error = Some("Sign in to like videos.".to_owned());
            return;
        }
        let toggled = api.toggle_video_like(&self.video_id).await;
        if !view.is_current() {
            return;
        }
        match toggled {
            Ok(()) => self.refresh_likes(api, view, viewer).await,
            Err(e) => tracing::warn!(video = %self.video_id, "failed to toggle like: {}", e),
        }
    }

    /// Toggles the viewer's subscription to the video's channel, adjusting
    /// the displayed subscriber count from the reported new state.
    pub async fn toggle_subscription(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        viewer: Option<&CurrentUser>,
    ) {
        if viewer.is_none() {
            self.error = Some("Sign in to subscribe.".to_owned());
            return;
        }
        let Some(channel_id) = self
            .video
            .as_ref()
            .and_then(|video| video.owner.as_ref())
            .map(|owner| owner.id.clone())
        else {
            return;
        };

        let toggled = api.toggle_subscription(&channel_id).await;
        if !view.is_current() {
            return;
        }
        match toggled {
            Ok(subscribed) => {
                self.subscribed = subscribed;
                if subscribed {
                    self.subscriber_count += 1;
                } else {
                    self.subscriber_count = self.subscriber_count.saturating_sub(1);
                }
            }
            Err(e) => tracing::warn!(channel = %channel_id, "failed to toggle subscription: {}", e),
        }
    }

    async fn fetch_comments(&mut self, api: &ApiClient, view: &MountToken, page: u32) {
        let fetched = api.video_comments_page(&self.video_id, page).await;
        if !view.is_current() {
            tracing::debug!("watch page superseded during fetch, dropping comments");
            return;
        }
        match fetched {
            Ok(batch) => {
                self.has_more_comments = batch.has_more();
                self.comment_page = batch.current_page;
                if page == 1 {
                    self.comments = batch.comments.into();
                } else {
                    self.comments.extend(batch.comments);
                }
            }
            Err(e) => tracing::warn!(video = %self.video_id, "failed to fetch comments: {}", e),
        }
    }

    async fn fetch_related(&mut self, api: &ApiClient, view: &MountToken) {
        let fetched = api.list_videos(None, 1, DEFAULT_PAGE_SIZE).await;
        if !view.is_current() {
            return;
        }
        match fetched {
            Ok(videos) => {
                // The feed may include the video being watched.
                self.related = videos
                    .into_iter()
                    .filter(|video| video.id != self.video_id)
                    .collect();
            }
            Err(e) => tracing::warn!("failed to fetch related videos: {}", e),
        }
    }

    async fn refresh_likes(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        viewer: Option<&CurrentUser>,
    ) {
        let fetched = api.video_likes(&self.video_id).await;
        if !view.is_current() {
            return;
        }
        match fetched {
            Ok(likes) => {
                self.likes_count = likes.len();
                self.liked = viewer
                    .is_some_and(|user| likes.iter().any(|like| like.liked_by == user.id));
            }
            Err(e) => tracing::warn!(video = %self.video_id, "failed to fetch likes: {}", e),
        }
    }

    async fn fetch_subscription(&mut self, api: &ApiClient, view: &MountToken, channel_id: &str) {
        let status = api.subscription_status(channel_id).await;
        if !view.is_current() {
            return;
        }
        let subscribed = match status {
            Ok(subscribed) => subscribed,
            Err(e) => {
                // Without the status the count would render misleadingly,
                // so skip both.
                tracing::warn!(channel = %channel_id, "failed to fetch subscription status: {}", e);
                return;
            }
        };
        self.subscribed = subscribed;

        let count = api.subscriber_count(channel_id).await;
        if !view.is_current() {
            return;
        }
        match count {
            Ok(count) => self.subscriber_count = count,
            Err(e) => tracing::warn!(channel = %channel_id, "failed to fetch subscriber count: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::pages::Mount;
    use http::Method;
    use serde_json::json;

    fn viewer() -> CurrentUser {
        serde_json::from_value(json!({
            "_id": "u1",
            "username": "bob",
            "email": "bob@example.com",
            "fullName": "Bob Ferguson",
        }))
        .unwrap()
    }

    fn video_body(id: &str, owner: &str) -> serde_json::Value {
        json!({
            "statusCode": 200,
            "data": {
                "_id": id,
                "title": "Scoring patterns",
                "description": "Wheat stalk and chevron",
                "videoFile": format!("https://cdn.example.com/{id}.mp4"),
                "thumbnail": format!("https://cdn.example.com/{id}.jpg"),
                "views": 1204,
                "duration": 512.0,
                "createdAt": "2026-02-03T18:30:00Z",
                "owner": {
                    "_id": owner,
                    "username": "breadlab",
                    "channelName": "The Bread Lab",
                    "avatar": "https://cdn.example.com/breadlab.png",
                },
            },
            "message": "ok",
            "success": true,
        })
    }

    fn comment_body(page: u32, total: u32, id: &str) -> serde_json::Value {
        json!({
            "statusCode": 200,
            "data": {
                "comments": [
                    {
                        "_id": id,
                        "content": format!("comment {id}"),
                        "createdAt": "2026-02-04T10:00:00Z",
                        "owner": {"username": "carol", "avatar": null},
                    },
                ],
                "currentPage": page,
                "totalPages": total,
            },
            "message": "ok",
            "success": true,
        })
    }

    fn related_body() -> serde_json::Value {
        json!({
            "statusCode": 200,
            "data": {
                "videos": [
                    {
                        "_id": "v1",
                        "title": "Scoring patterns",
                        "description": "",
                        "videoFile": "https://cdn.example.com/v1.mp4",
                        "thumbnail": "https://cdn.example.com/v1.jpg",
                        "views": 1204,
                        "createdAt": "2026-02-03T18:30:00Z",
                    },
                    {
                        "_id": "v2",
                        "title": "Cold retard timing",
                        "description": "",
                        "videoFile": "https://cdn.example.com/v2.mp4",
                        "thumbnail": "https://cdn.example.com/v2.jpg",
                        "views": 98,
                        "createdAt": "2026-02-01T08:00:00Z",
                    },
                ],
            },
            "message": "ok",
            "success": true,
        })
    }

    async fn full_backend() -> MockBackend {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(Method::GET, "/videos/v1", 200, video_body("v1", "ch1"))
            .await;
        backend
            .on(Method::GET, "/comments/v1", 200, comment_body(1, 2, "c1"))
            .await;
        backend
            .on(Method::GET, "/videos", 200, related_body())
            .await;
        backend
            .on(
                Method::GET,
                "/likes/video/v1",
                200,
                json!({
                    "statusCode": 200,
                    "data": {"likes": [{"likedBy": "u1"}, {"likedBy": "u9"}]},
                    "message": "ok",
                    "success": true,
                }),
            )
            .await;
        backend
            .on(
                Method::GET,
                "/subscriptions/status",
                200,
                json!({"statusCode": 200, "data": {"subscribed": false}, "message": "ok", "success": true}),
            )
            .await;
        backend
            .on(
                Method::GET,
                "/subscriptions/count",
                200,
                json!({"statusCode": 200, "data": {"count": 5}, "message": "ok", "success": true}),
            )
            .await;
        backend
    }

    #[tokio::test]
    async fn load_assembles_the_whole_page() {
        let backend = full_backend().await;
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let user = viewer();

        let mut page = PlayerPage::new("v1");
        page.load(&api, &mount.remount(), Some(&user)).await;

        assert!(!page.loading);
        assert_eq!(page.error, None);
        assert_eq!(page.video.as_ref().unwrap().title, "Scoring patterns");
        // The watched video itself is filtered out of the sidebar.
        assert_eq!(page.related.len(), 1);
        assert_eq!(page.related[0].id, "v2");
        assert_eq!(page.comments.len(), 1);
        assert!(page.has_more_comments);
        assert_eq!(page.likes_count, 2);
        assert!(page.liked);
        assert!(!page.subscribed);
        assert_eq!(page.subscriber_count, 5);
    }

    #[tokio::test]
    async fn video_fetch_failure_sets_the_display_error() {
        let backend = MockBackend::start().await.unwrap();
        // Every route 404s, including the video itself.
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = PlayerPage::new("gone");
        page.load(&api, &mount.remount(), None).await;

        assert!(page.video.is_none());
        assert_eq!(page.error.as_deref(), Some("Failed to load video."));
        // The rest of the page degraded quietly.
        assert!(page.comments.is_empty());
        assert!(!page.loading);
    }

    #[tokio::test]
    async fn load_more_appends_the_next_comment_page() {
        let backend = full_backend().await;
        // Second response for the same route: page 2 of 2.
        backend
            .on(Method::GET, "/comments/v1", 200, comment_body(2, 2, "c2"))
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let token = mount.remount();

        let mut page = PlayerPage::new("v1");
        page.load(&api, &token, None).await;
        assert!(page.has_more_comments);

        page.load_more_comments(&api, &token).await;
        let ids: Vec<_> = page.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2"]);
        assert!(!page.has_more_comments);
        assert_eq!(page.comment_page, 2);
    }

    #[tokio::test]
    async fn blank_comments_never_reach_the_backend() {
        let backend = MockBackend::start().await.unwrap();
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = PlayerPage::new("v1");
        page.post_comment(&api, &mount.remount(), "   ").await;

        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn anonymous_like_is_rejected_without_a_request() {
        let backend = MockBackend::start().await.unwrap();
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = PlayerPage::new("v1");
        page.toggle_like(&api, &mount.remount(), None).await;

        assert_eq!(page.error.as_deref(), Some("Sign in to like videos."));
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn subscription_toggle_adjusts_the_count_locally() {
        let backend = full_backend().await;
        backend
            .on(
                Method::POST,
                "/subscriptions/c/ch1",
                200,
                json!({"statusCode": 200, "data": {"subscribed": true}, "message": "subscribed", "success": true}),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let token = mount.remount();
        let user = viewer();

        let mut page = PlayerPage::new("v1");
        page.load(&api, &token, Some(&user)).await;
        assert_eq!(page.subscriber_count, 5);

        page.toggle_subscription(&api, &token, Some(&user)).await;
        assert!(page.subscribed);
        assert_eq!(page.subscriber_count, 6);
    }
}
