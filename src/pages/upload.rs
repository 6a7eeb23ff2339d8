//! The upload form: title, description, video file, thumbnail. All
//! validation happens client-side before the single multipart publish
//! request, so a bad selection never costs a 100 MB upload.

use crate::api::{CurrentUser, FilePart, VideoUpload};
use crate::http::ApiClient;
use crate::pages::MountToken;

/// Largest video file the form accepts.
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadPage {
    pub title: String,
    pub description: String,
    pub video_file: Option<FilePart>,
    pub thumbnail: Option<FilePart>,
    pub uploading: bool,
    pub error: Option<String>,
}

impl UploadPage {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            video_file: None,
            thumbnail: None,
            uploading: false,
            error: None,
        }
    }

    /// Accepts the selected video file, rejecting anything that is not a
    /// video MIME type or that exceeds [`MAX_VIDEO_BYTES`]. A rejected
    /// selection also clears any previously accepted file.
    pub fn set_video_file(&mut self, file: FilePart) {
        if !file.mime_type.starts_with("video/") {
            self.error = Some("Please select a valid video file.".to_owned());
            self.video_file = None;
            return;
        }
        if file.len() > MAX_VIDEO_BYTES {
            self.error = Some("Video file must be less than 100MB.".to_owned());
            self.video_file = None;
            return;
        }
        self.error = None;
        self.video_file = Some(file);
    }

    /// Accepts the selected thumbnail, which must be an image.
    pub fn set_thumbnail(&mut self, file: FilePart) {
        if !file.mime_type.starts_with("image/") {
            self.error = Some("Please select an image file for thumbnail.".to_owned());
            return;
        }
        self.error = None;
        self.thumbnail = Some(file);
    }

    /// Publishes the video. Returns the new video's id on success so the
    /// caller can navigate straight to the watch page.
    ///
    /// Missing fields are reported without any request going out.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        owner: &CurrentUser,
    ) -> Option<String> {
        let Some(video_file) = self.video_file.clone() else {
            self.error = Some("Please upload a valid video file under 100MB.".to_owned());
            return None;
        };
        let thumbnail = match self.thumbnail.clone() {
            Some(thumbnail) if !self.title.is_empty() && !self.description.is_empty() => thumbnail,
            _ => {
                self.error = Some("All fields are required.".to_owned());
                return None;
            }
        };

        self.uploading = true;
        self.error = None;

        let upload = VideoUpload {
            title: self.title.clone(),
            description: self.description.clone(),
            video_file,
            thumbnail,
            owner: owner.id.clone(),
        };
        let published = api.publish_video(upload).await;
        if !view.is_current() {
            return None;
        }
        self.uploading = false;
        match published {
            Ok(video) => Some(video.id),
            Err(e) => {
                tracing::warn!("failed to publish video: {}", e);
                self.error = Some("Failed to upload. Please try again.".to_owned());
                None
            }
        }
    }
}

impl Default for UploadPage {
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

    fn owner() -> CurrentUser {
        serde_json::from_value(json!({
            "_id": "u1",
            "username": "bob",
            "email": "bob@example.com",
            "fullName": "Bob Ferguson",
        }))
        .unwrap()
    }

    fn video_part() -> FilePart {
        FilePart::new("bake.mp4", "video/mp4", &b"fake mp4 bytes"[..])
    }

    fn thumbnail_part() -> FilePart {
        FilePart::new("bake.jpg", "image/jpeg", &b"fake jpeg"[..])
    }

    #[tokio::test]
    async fn submit_without_a_video_file_is_rejected_offline() {
        let backend = MockBackend::start().await.unwrap();
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = UploadPage::new();
        page.title = "Bake day".to_owned();
        page.description = "Full proof-to-oven run".to_owned();
        page.set_thumbnail(thumbnail_part());

        assert_eq!(page.submit(&api, &mount.remount(), &owner()).await, None);
        assert_eq!(
            page.error.as_deref(),
            Some("Please upload a valid video file under 100MB.")
        );
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn submit_with_missing_fields_is_rejected_offline() {
        let backend = MockBackend::start().await.unwrap();
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = UploadPage::new();
        page.set_video_file(video_part());
        // Title, description, and thumbnail all absent.

        assert_eq!(page.submit(&api, &mount.remount(), &owner()).await, None);
        assert_eq!(page.error.as_deref(), Some("All fields are required."));
        assert!(backend.requests().await.is_empty());
    }

    #[test]
    fn non_video_selection_is_rejected_and_clears_the_slot() {
        let mut page = UploadPage::new();
        page.set_video_file(video_part());
        assert!(page.video_file.is_some());

        page.set_video_file(FilePart::new("notes.txt", "text/plain", &b"nope"[..]));
        assert_eq!(page.error.as_deref(), Some("Please select a valid video file."));
        assert!(page.video_file.is_none());
    }

    #[test]
    fn oversized_video_is_rejected() {
        let mut page = UploadPage::new();
        let oversized = FilePart::new(
            "long.mp4",
            "video/mp4",
            vec![0u8; MAX_VIDEO_BYTES + 1],
        );
        page.set_video_file(oversized);

        assert_eq!(
            page.error.as_deref(),
            Some("Video file must be less than 100MB.")
        );
        assert!(page.video_file.is_none());
    }

    #[test]
    fn non_image_thumbnail_is_rejected() {
        let mut page = UploadPage::new();
        page.set_thumbnail(FilePart::new("clip.mp4", "video/mp4", &b"nope"[..]));
        assert_eq!(
            page.error.as_deref(),
            Some("Please select an image file for thumbnail.")
        );
        assert!(page.thumbnail.is_none());
    }

    #[tokio::test]
    async fn successful_publish_returns_the_new_video_id() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::POST,
                "/videos",
                201,
                json!({
                    "statusCode": 201,
                    "data": {
                        "_id": "v42",
                        "title": "Bake day",
                        "description": "Full proof-to-oven run",
                        "videoFile": "https://cdn.example.com/v42.mp4",
                        "thumbnail": "https://cdn.example.com/v42.jpg",
                        "views": 0,
                        "createdAt": "2026-03-01T08:00:00Z",
                    },
                    "message": "published",
                    "success": true,
                }),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = UploadPage::new();
        page.title = "Bake day".to_owned();
        page.description = "Full proof-to-oven run".to_owned();
        page.set_video_file(video_part());
        page.set_thumbnail(thumbnail_part());

        let id = page.submit(&api, &mount.remount(), &owner()).await;
        assert_eq!(id.as_deref(), Some("v42"));
        assert!(!page.uploading);
        assert_eq!(page.error, None);

        let posts = backend.requests_to("/videos").await;
        let body = String::from_utf8_lossy(&posts[0].body).into_owned();
        assert!(body.contains("Bake day"));
        assert!(body.contains("bake.mp4"));
        assert!(body.contains(r#"name="owner""#));
    }
}
