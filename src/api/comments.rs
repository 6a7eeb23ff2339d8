//! Comment routes: paginated reads per video, and posting.

use crate::api::Envelope;
use crate::api::types::PagedStream;
use crate::http::ApiClient;
use eyre::Context;
use http::Method;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio_stream::Stream;
use tracing::instrument;

/// A comment on a video, with its author populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
    pub owner: CommentAuthor,
}

/// Public fields of a comment's author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub username: String,
    pub avatar: Option<String>,
}

/// One page of a video's comments.
///
/// The backend paginates by page number and reports how far along the walk
/// is; [`CommentPage::has_more`] is the continuation test.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentPage {
    pub comments: VecDeque<Comment>,
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl CommentPage {
    /// Whether another page follows this one.
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Serialize)]
struct PostCommentRequest<'a> {
    #[serde(rename = "commentContent")]
    comment_content: &'a str,
}

impl ApiClient {
    /// Fetches one page of a video's comments.
    ///
    /// `GET /comments/{videoId}?page=N`. Pages start at 1.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn video_comments_page(
        &self,
        video_id: &str,
        page: u32,
    ) -> eyre::Result<CommentPage> {
        let path = format!("/comments/{video_id}");
        let page_string = page.to_string();
        let query_params = [("page", page_string.as_str())];

        let response = self
            .request(Method::GET, &path, Some(&query_params), None::<&()>)
            .await?;

        let envelope: Envelope<CommentPage> = response
            .json()
            .await
            .context("parse comments response as JSON")?;

        tracing::debug!(
            video_id,
            current_page = envelope.data.current_page,
            total_pages = envelope.data.total_pages,
            returned_items = envelope.data.comments.len(),
            "fetched comment page"
        );

        Ok(envelope.data)
    }

    /// Returns a stream over all of a video's comments, fetching pages
    /// lazily as the stream is consumed.
    ///
    /// # Returns
    ///
    /// A [`PagedStream`] that yields every [`Comment`] on the video in
    /// backend order (newest first).
    #[instrument(skip(self))]
    pub fn video_comments(
        &self,
        video_id: &str,
    ) -> impl Stream<Item = eyre::Result<Comment>> + use<'_> {
        let video_id = video_id.to_string();
        PagedStream::new(move |page| {
            let video_id = video_id.clone();
            async move {
                let comment_page = self.video_comments_page(&video_id, page).await?;
                let next_page = comment_page
                    .has_more()
                    .then_some(comment_page.current_page + 1);
                Ok((comment_page.comments, next_page))
            }
        })
    }

    /// Posts a comment on a video.
    ///
    /// `POST /comments/{videoId}`. The response body is not consumed;
    /// callers re-fetch page 1 to see the new comment in backend order,
    /// which is what the original client does too.
    #[instrument(skip(self, content), level = tracing::Level::DEBUG)]
    pub async fn post_comment(&self, video_id: &str, content: &str) -> eyre::Result<()> {
        let path = format!("/comments/{video_id}");
        let request = PostCommentRequest {
            comment_content: content,
        };

        let _response = self
            .request(Method::POST, &path, None, Some(&request))
            .await?;

        tracing::debug!(video_id, "posted comment");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use serde_json::json;
    use tokio_stream::StreamExt;

    fn comment_json(id: &str, content: &str) -> serde_json::Value {
        json!({
            "_id": id,
            "content": content,
            "createdAt": "2024-04-02T16:45:00.000Z",
            "owner": {"username": "alice", "avatar": null},
        })
    }

    fn page_json(ids: &[&str], current: u32, total: u32) -> serde_json::Value {
        json!({
            "statusCode": 200,
            "data": {
                "comments": ids.iter().map(|id| comment_json(id, "nice loaf")).collect::<Vec<_>>(),
                "currentPage": current,
                "totalPages": total,
            },
            "message": "comments fetched",
            "success": true,
        })
    }

    #[test]
    fn page_parses_and_reports_continuation() {
        let envelope: Envelope<CommentPage> =
            serde_json::from_value(page_json(&["c1", "c2"], 1, 3)).unwrap();
        let page = envelope.data;
        assert_eq!(page.comments.len(), 2);
        assert!(page.has_more());

        let envelope: Envelope<CommentPage> =
            serde_json::from_value(page_json(&["c5"], 3, 3)).unwrap();
        assert!(!envelope.data.has_more());
    }

    #[tokio::test]
    async fn comment_stream_walks_every_page() {
        let backend = MockBackend::start().await.unwrap();
        // Responses queue up per route: the first request takes page 1,
        // the second takes page 2.
        backend
            .on(Method::GET, "/comments/v1", 200, page_json(&["c1", "c2"], 1, 2))
            .await;
        backend
            .on(Method::GET, "/comments/v1", 200, page_json(&["c3"], 2, 2))
            .await;

        let client = ApiClient::new(backend.base_url()).unwrap();
        let ids: Vec<String> = client
            .video_comments("v1")
            .map(|c| c.map(|c| c.id))
            .collect::<eyre::Result<_>>()
            .await
            .unwrap();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);

        let requests = backend.requests_to("/comments/v1").await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].query.as_deref(), Some("page=1"));
        assert_eq!(requests[1].query.as_deref(), Some("page=2"));
    }

    #[tokio::test]
    async fn posting_sends_comment_content_field() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::POST,
                "/comments/v1",
                201,
                json!({"statusCode": 201, "data": {}, "message": "comment added", "success": true}),
            )
            .await;

        let client = ApiClient::new(backend.base_url()).unwrap();
        client.post_comment("v1", "great crumb").await.unwrap();

        let requests = backend.requests_to("/comments/v1").await;
        assert_eq!(
            requests[0].json_field("commentContent"),
            Some(&json!("great crumb"))
        );
    }
}
