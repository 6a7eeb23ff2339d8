//! The account profile: view the signed-in user's details, edit the
//! account fields, change the password, and swap the avatar and cover
//! images.
//!
//! Successful edits set `notice` rather than clearing silently, matching
//! the confirmation dialogs of the browser client. Each action clears
//! both `notice` and `error` before it runs so stale messages never
//! linger.

use crate::api::{ChangePasswordRequest, CurrentUser, FilePart, UpdateAccountRequest};
use crate::http::ApiClient;
use crate::pages::MountToken;

#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub user: Option<CurrentUser>,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl ProfilePage {
    pub fn new() -> Self {
        Self {
            user: None,
            loading: true,
            error: None,
            notice: None,
        }
    }

    pub async fn load(&mut self, api: &ApiClient, view: &MountToken) {
        self.loading = true;
        self.error = None;

        let fetched = api.current_user().await;
        if !view.is_current() {
            return;
        }
        match fetched {
            Ok(user) => self.user = Some(user),
            Err(e) => {
                tracing::warn!("failed to fetch current user: {}", e);
                self.error = Some("Failed to load profile.".to_owned());
            }
        }
        self.loading = false;
    }

    /// Updates the account's full name and email. Both fields are
    /// required; blank input is rejected before any request goes out.
    pub async fn update_account(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        full_name: &str,
        email: &str,
    ) {
        self.error = None;
        self.notice = None;
        if full_name.trim().is_empty() || email.trim().is_empty() {
            self.error = Some("Full name and email cannot be empty.".to_owned());
            return;
        }

        let request = UpdateAccountRequest {
            full_name: full_name.to_owned(),
            email: email.to_owned(),
        };
        let updated = api.update_account(&request).await;
        if !view.is_current() {
            return;
        }
        match updated {
            Ok(user) => {
                self.user = Some(user);
                self.notice = Some("Account updated successfully!".to_owned());
            }
            Err(e) => {
                tracing::warn!("failed to update account: {}", e);
                self.error = Some("Failed to update account. Please try again.".to_owned());
            }
        }
    }

    /// Changes the password. The new password must be at least six
    /// characters; shorter input is rejected before any request.
    pub async fn change_password(
        &mut self,
        api: &ApiClient,
        view: &MountToken,
        old_password: &str,
        new_password: &str,
    ) {
        self.error = None;
        self.notice = None;
        if new_password.chars().count() < 6 {
            self.error = Some("New password must be at least 6 characters long.".to_owned());
            return;
        }

        let request = ChangePasswordRequest {
            old_password: old_password.to_owned(),
            new_password: new_password.to_owned(),
        };
        let changed = api.change_password(&request).await;
        if !view.is_current() {
            return;
        }
        match changed {
            Ok(()) => self.notice = Some("Password changed successfully!".to_owned()),
            Err(e) => {
                tracing::warn!("failed to change password: {}", e);
                self.error = Some(
                    "Failed to change password. Please check your old password and try again."
                        .to_owned(),
                );
            }
        }
    }

    /// Replaces the avatar image.
    pub async fn update_avatar(&mut self, api: &ApiClient, view: &MountToken, file: FilePart) {
        self.error = None;
        self.notice = None;

        let updated = api.update_avatar(file).await;
        if !view.is_current() {
            return;
        }
        match updated {
            Ok(user) => {
                self.user = Some(user);
                self.notice = Some("Avatar updated successfully!".to_owned());
            }
            Err(e) => {
                tracing::warn!("failed to upload avatar: {}", e);
                self.error = Some("Failed to upload avatar. Please try again.".to_owned());
            }
        }
    }

    /// Replaces the cover image.
    pub async fn update_cover_image(&mut self, api: &ApiClient, view: &MountToken, file: FilePart) {
        self.error = None;
        self.notice = None;

        let updated = api.update_cover_image(file).await;
        if !view.is_current() {
            return;
        }
        match updated {
            Ok(user) => {
                self.user = Some(user);
                self.notice = Some("Cover image updated successfully!".to_owned());
            }
            Err(e) => {
                tracing::warn!("failed to upload cover image: {}", e);
                self.error = Some("Failed to upload cover. Please try again.".to_owned());
            }
        }
    }
}

impl Default for ProfilePage {
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

    fn user_body(full_name: &str) -> serde_json::Value {
        json!({
            "statusCode": 200,
            "data": {
                "_id": "u1",
                "username": "bob",
                "email": "bob@example.com",
                "fullName": full_name,
            },
            "message": "ok",
            "success": true,
        })
    }

    #[tokio::test]
    async fn update_account_stores_the_returned_user() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::PATCH,
                "/users/update-account",
                200,
                user_body("Robert Ferguson"),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let mut page = ProfilePage::new();
        page.update_account(&api, &mount.remount(), "Robert Ferguson", "bob@example.com")
            .await;

        assert_eq!(page.user.unwrap().full_name, "Robert Ferguson");
        assert_eq!(page.notice.as_deref(), Some("Account updated successfully!"));
        assert_eq!(page.error, None);
    }

    #[tokio::test]
    async fn blank_account_fields_are_rejected_before_the_network() {
        let backend = MockBackend::start().await.unwrap();
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = ProfilePage::new();
        page.update_account(&api, &mount.remount(), "  ", "bob@example.com")
            .await;

        assert_eq!(
            page.error.as_deref(),
            Some("Full name and email cannot be empty.")
        );
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn short_new_password_is_rejected_before_the_network() {
        let backend = MockBackend::start().await.unwrap();
        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();

        let mut page = ProfilePage::new();
        page.change_password(&api, &mount.remount(), "old-secret", "12345")
            .await;

        assert_eq!(
            page.error.as_deref(),
            Some("New password must be at least 6 characters long.")
        );
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn rejected_password_change_keeps_the_old_password_message() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::POST,
                "/users/change-password",
                400,
                json!({"statusCode": 400, "data": null, "message": "Invalid old password", "success": false}),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let mut page = ProfilePage::new();
        page.change_password(&api, &mount.remount(), "wrong", "long-enough")
            .await;

        assert_eq!(
            page.error.as_deref(),
            Some("Failed to change password. Please check your old password and try again.")
        );
        assert_eq!(page.notice, None);
    }

    #[tokio::test]
    async fn avatar_upload_refreshes_the_user() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(Method::PATCH, "/users/avatar", 200, user_body("Bob Ferguson"))
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let mount = Mount::new();
        let mut page = ProfilePage::new();
        let avatar = FilePart::new("me.png", "image/png", &b"\x89PNG fake"[..]);
        page.update_avatar(&api, &mount.remount(), avatar).await;

        assert!(page.user.is_some());
        assert_eq!(page.notice.as_deref(), Some("Avatar updated successfully!"));

        let uploads = backend.requests_to("/users/avatar").await;
        assert!(
            uploads[0]
                .content_type
                .as_deref()
                .unwrap_or_default()
                .starts_with("multipart/form-data")
        );
    }
}
