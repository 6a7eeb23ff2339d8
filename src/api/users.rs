//! User and identity routes: login, logout, registration, account
//! management, and watch history.

use crate::api::Envelope;
use crate::api::videos::Video;
use crate::http::ApiClient;
use eyre::Context;
use http::Method;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The authenticated user as the backend reports it.
///
/// This is the record returned by `GET /users/current-user` and inside the
/// login payload. The session store owns the canonical copy; pages that edit
/// profile fields work on transient clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The backend's unique identifier for the user.
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    /// URL of the user's avatar image.
    pub avatar: Option<String>,
    /// URL of the user's profile banner image.
    #[serde(rename = "coverImage")]
    pub cover_image: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<Timestamp>,
}

/// Body of `POST /users/login`.
///
/// The backend accepts either a username or an email as the identifying
/// field; exactly one of the two should be set. Callers classify the
/// identity by input shape (an `@` means email) before constructing this,
/// see [`crate::session::Credentials`].
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

/// Payload of a successful `POST /users/login`.
///
/// The backend issues the session cookie in a `Set-Cookie` header alongside
/// this payload; only the user snapshot is consumed here, the cookie jar
/// carries the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub user: CurrentUser,
}

/// Fields for `POST /users/register`, sent as multipart form data because
/// of the bundled avatar and optional cover image.
#[derive(Debug)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar: super::types::FilePart,
    pub cover_image: Option<super::types::FilePart>,
}

/// Body of `PATCH /users/update-account`.
#[derive(Debug, Serialize)]
pub struct UpdateAccountRequest {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
}

/// Body of `POST /users/change-password`.
#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

impl ApiClient {
    /// Asks the backend who the session cookie belongs to.
    ///
    /// `GET /users/current-user`. Succeeds only for an authenticated
    /// session; an expired or absent cookie yields an unauthorized error.
    #[instrument(skip(self), ret, level = tracing::Level::DEBUG)]
    pub async fn current_user(&self) -> eyre::Result<CurrentUser> {
        let response = self
            .request(Method::GET, "/users/current-user", None, None::<&()>)
            .await?;

        let envelope: Envelope<CurrentUser> = response
            .json()
            .await
            .context("parse current-user response as JSON")?;

        Ok(envelope.data)
    }

    /// Exchanges credentials for a session.
    ///
    /// `POST /users/login`. On success the backend sets the session cookies
    /// (picked up by the cookie store automatically) and returns the user
    /// record.
    #[instrument(skip(self, request), level = tracing::Level::DEBUG)]
    pub async fn login(&self, request: &LoginRequest) -> eyre::Result<LoginData> {
        let response = self
            .request(Method::POST, "/users/login", None, Some(request))
            .await?;

        let envelope: Envelope<LoginData> = response
            .json()
            .await
            .context("parse login response as JSON")?;

        tracing::debug!(username = %envelope.data.user.username, "login accepted");

        Ok(envelope.data)
    }

    /// Ends the current session on the backend.
    ///
    /// `POST /users/logout`. The backend clears its session cookies; local
    /// state is the session store's concern, not this binding's.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn logout(&self) -> eyre::Result<()> {
        let _response = self
            .request(Method::POST, "/users/logout", None, None::<&()>)
            .await?;

        Ok(())
    }

    /// Creates a new account.
    ///
    /// `POST /users/register` as multipart form data: the text fields plus
    /// an avatar file and an optional cover image. Registration does not
    /// log the new user in; callers follow up with a login.
    #[instrument(skip(self, form), level = tracing::Level::DEBUG)]
    pub async fn register(&self, form: RegisterForm) -> eyre::Result<CurrentUser> {
        let mut multipart = reqwest::multipart::Form::new()
            .text("fullName", form.full_name)
            .text("email", form.email)
            .text("username", form.username)
            .text("password", form.password)
            .part("avatar", form.avatar.into_part()?);
        if let Some(cover) = form.cover_image {
            multipart = multipart.part("coverImage", cover.into_part()?);
        }

        let response = self
            .request_multipart(Method::POST, "/users/register", multipart)
            .await?;

        let envelope: Envelope<CurrentUser> = response
            .json()
            .await
            .context("parse register response as JSON")?;

        tracing::debug!(username = %envelope.data.username, "account registered");

        Ok(envelope.data)
    }

    /// Updates the account's full name and email.
    ///
    /// `PATCH /users/update-account`. Returns the updated user record.
    #[instrument(skip(self), ret, level = tracing::Level::DEBUG)]
    pub async fn update_account(&self, request: &UpdateAccountRequest) -> eyre::Result<CurrentUser> {
        let response = self
            .request(Method::PATCH, "/users/update-account", None, Some(request))
            .await?;

        let envelope: Envelope<CurrentUser> = response
            .json()
            .await
            .context("parse update-account response as JSON")?;

        Ok(envelope.data)
    }

    /// Changes the account password.
    ///
    /// `POST /users/change-password`. The backend verifies the old password
    /// and rejects with a failure status when it does not match.
    #[instrument(skip(self, request), level = tracing::Level::DEBUG)]
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> eyre::Result<()> {
        let _response = self
            .request(Method::POST, "/users/change-password", None, Some(request))
            .await?;

        Ok(())
    }

    /// Replaces the user's avatar image.
    ///
    /// `PATCH /users/avatar`, multipart with a single `avatar` file part.
    /// Returns the updated user record.
    #[instrument(skip(self, avatar), level = tracing::Level::DEBUG)]
    pub async fn update_avatar(&self, avatar: super::types::FilePart) -> eyre::Result<CurrentUser> {
        let multipart = reqwest::multipart::Form::new().part("avatar", avatar.into_part()?);

        let response = self
            .request_multipart(Method::PATCH, "/users/avatar", multipart)
            .await?;

        let envelope: Envelope<CurrentUser> = response
            .json()
            .await
            .context("parse avatar update response as JSON")?;

        Ok(envelope.data)
    }

    /// Replaces the user's cover image.
    ///
    /// `PATCH /users/cover-image`, multipart with a single `coverImage`
    /// file part. Returns the updated user record.
    #[instrument(skip(self, cover_image), level = tracing::Level::DEBUG)]
    pub async fn update_cover_image(
        &self,
        cover_image: super::types::FilePart,
    ) -> eyre::Result<CurrentUser> {
        let multipart =
            reqwest::multipart::Form::new().part("coverImage", cover_image.into_part()?);

        let response = self
            .request_multipart(Method::PATCH, "/users/cover-image", multipart)
            .await?;

        let envelope: Envelope<CurrentUser> = response
            .json()
            .await
            .context("parse cover-image update response as JSON")?;

        Ok(envelope.data)
    }

    /// Fetches the user's watch history, most recent first.
    ///
    /// `GET /users/history`.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn watch_history(&self) -> eyre::Result<Vec<Video>> {
        let response = self
            .request(Method::GET, "/users/history", None, None::<&()>)
            .await?;

        let envelope: Envelope<Vec<Video>> = response
            .json()
            .await
            .context("parse watch-history response as JSON")?;

        tracing::debug!(videos = envelope.data.len(), "fetched watch history");

        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use serde_json::json;

    #[test]
    fn current_user_parses_backend_shape() {
        let raw = json!({
            "_id": "665f1c2ab8d1e23a9c0f1234",
            "username": "alice",
            "email": "alice@example.com",
            "fullName": "Alice Example",
            "avatar": "https://cdn.example.com/avatars/alice.png",
            "coverImage": "https://cdn.example.com/covers/alice.png",
            "watchHistory": [],
            "createdAt": "2024-01-15T10:30:00.000Z",
            "updatedAt": "2024-06-01T08:00:00.000Z",
        });
        let user: CurrentUser = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id, "665f1c2ab8d1e23a9c0f1234");
        assert_eq!(user.username, "alice");
        assert_eq!(user.full_name, "Alice Example");
        assert!(user.avatar.is_some());
        assert!(user.created_at.is_some());
    }

    #[test]
    fn current_user_tolerates_missing_optionals() {
        let raw = json!({
            "_id": "u1",
            "username": "bob",
            "email": "bob@example.com",
            "fullName": "Bob",
        });
        let user: CurrentUser = serde_json::from_value(raw).unwrap();
        assert_eq!(user.avatar, None);
        assert_eq!(user.cover_image, None);
        assert_eq!(user.created_at, None);
    }

    #[test]
    fn login_request_serializes_exactly_one_identity() {
        let by_name = LoginRequest {
            username: Some("alice".into()),
            email: None,
            password: "hunter2".into(),
        };
        let wire = serde_json::to_value(&by_name).unwrap();
        assert_eq!(wire, json!({"username": "alice", "password": "hunter2"}));

        let by_email = LoginRequest {
            username: None,
            email: Some("alice@example.com".into()),
            password: "hunter2".into(),
        };
        let wire = serde_json::to_value(&by_email).unwrap();
        assert_eq!(
            wire,
            json!({"email": "alice@example.com", "password": "hunter2"})
        );
    }

    #[tokio::test]
    async fn watch_history_unwraps_video_list() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::GET,
                "/users/history",
                200,
                json!({
                    "statusCode": 200,
                    "data": [
                        {
                            "_id": "v1",
                            "title": "Sourdough basics",
                            "description": "Starter care and first loaf",
                            "videoFile": "https://cdn.example.com/v1.mp4",
                            "thumbnail": "https://cdn.example.com/v1.jpg",
                            "views": 1523,
                            "createdAt": "2024-05-01T12:00:00.000Z",
                        },
                    ],
                    "message": "watch history fetched",
                    "success": true,
                }),
            )
            .await;

        let client = ApiClient::new(backend.base_url()).unwrap();
        let history = client.watch_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "Sourdough basics");
    }

    #[tokio::test]
    async fn register_sends_multipart_fields() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::POST,
                "/users/register",
                201,
                json!({
                    "statusCode": 201,
                    "data": {
                        "_id": "u9",
                        "username": "carol",
                        "email": "carol@example.com",
                        "fullName": "Carol",
                    },
                    "message": "user registered",
                    "success": true,
                }),
            )
            .await;

        let client = ApiClient::new(backend.base_url()).unwrap();
        let form = RegisterForm {
            full_name: "Carol".into(),
            email: "carol@example.com".into(),
            username: "carol".into(),
            password: "secret123".into(),
            avatar: crate::api::types::FilePart::new(
                "avatar.png",
                "image/png",
                vec![0x89, 0x50, 0x4e, 0x47],
            ),
            cover_image: None,
        };
        let user = client.register(form).await.unwrap();
        assert_eq!(user.username, "carol");

        let requests = backend.requests_to("/users/register").await;
        assert_eq!(requests.len(), 1);
        let content_type = requests[0].content_type.as_deref().unwrap_or_default();
        assert!(
            content_type.starts_with("multipart/form-data"),
            "unexpected content type: {content_type}"
        );
        let body = String::from_utf8_lossy(&requests[0].body);
        for field in ["fullName", "email", "username", "password", "avatar"] {
            assert!(body.contains(field), "multipart body missing {field}");
        }
    }
}
