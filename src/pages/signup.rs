//! Account creation. Registration posts a multipart form; on success the
//! page immediately signs the new account in through the session store so
//! the user lands in the app without a second form.

use crate::api::RegisterForm;
use crate::pages::MountToken;
use crate::session::{Credentials, SessionStore};

#[derive(Debug, Clone)]
pub struct SignupPage {
    pub loading: bool,
    pub error: Option<String>,
}

impl SignupPage {
    pub fn new() -> Self {
        Self {
            loading: false,
            error: None,
        }
    }

    /// Registers the account and signs it in.
    ///
    /// Returns true when the new account ended up signed in, which is the
    /// cue to navigate to the feed. Registration succeeding but the
    /// follow-up login failing leaves a message telling the user to sign
    /// in manually.
    pub async fn submit(
        &mut self,
        store: &SessionStore,
        view: &MountToken,
        form: RegisterForm,
    ) -> bool {
        self.loading = true;
        self.error = None;

        let credentials = Credentials::new(form.username.clone(), form.password.clone());
        let registered = store.api().register(form).await;
        if !view.is_current() {
            return false;
        }
        if let Err(e) = registered {
            tracing::warn!("registration failed: {}", e);
            self.error = Some("Registration failed. Please try again.".to_owned());
            self.loading = false;
            return false;
        }

        let signed_in = store.login(&credentials).await;
        if !view.is_current() {
            return false;
        }
        self.loading = false;
        if !signed_in {
            self.error =
                Some("Account created, but automatic sign-in failed. Please log in.".to_owned());
        }
        signed_in
    }
}

impl Default for SignupPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FilePart;
    use crate::http::ApiClient;
    use crate::mock::MockBackend;
    use crate::pages::Mount;
    use http::Method;
    use serde_json::json;

    fn form() -> RegisterForm {
        RegisterForm {
            full_name: "Dana Miles".to_owned(),
            email: "dana@example.com".to_owned(),
            username: "dana".to_owned(),
            password: "hunter22".to_owned(),
            avatar: FilePart::new("me.png", "image/png", &b"fake png"[..]),
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn successful_signup_signs_the_account_in() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::POST,
                "/users/register",
                201,
                json!({
                    "statusCode": 201,
                    "data": {"_id": "u7", "username": "dana", "email": "dana@example.com", "fullName": "Dana Miles"},
                    "message": "registered",
                    "success": true,
                }),
            )
            .await;
        backend
            .on(
                Method::POST,
                "/users/login",
                200,
                json!({
                    "statusCode": 200,
                    "data": {"user": {"_id": "u7", "username": "dana", "email": "dana@example.com", "fullName": "Dana Miles"}},
                    "message": "ok",
                    "success": true,
                }),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let store = SessionStore::new(api, |_| true);
        let mount = Mount::new();

        let mut page = SignupPage::new();
        assert!(page.submit(&store, &mount.remount(), form()).await);
        assert_eq!(page.error, None);
        assert!(store.snapshot().authenticated);

        // The auto-login reused the registration credentials.
        let logins = backend.requests_to("/users/login").await;
        assert_eq!(logins[0].json_field("username").unwrap(), "dana");
        assert_eq!(logins[0].json_field("password").unwrap(), "hunter22");
    }

    #[tokio::test]
    async fn failed_registration_never_attempts_a_login() {
        let backend = MockBackend::start().await.unwrap();
        backend
            .on(
                Method::POST,
                "/users/register",
                409,
                json!({"statusCode": 409, "data": null, "message": "username taken", "success": false}),
            )
            .await;

        let api = ApiClient::new(backend.base_url()).unwrap();
        let store = SessionStore::new(api, |_| true);
        let mount = Mount::new();

        let mut page = SignupPage::new();
        assert!(!page.submit(&store, &mount.remount(), form()).await);
        assert_eq!(
            page.error.as_deref(),
            Some("Registration failed. Please try again.")
        );
        assert!(backend.requests_to("/users/login").await.is_empty());
        assert!(!store.snapshot().authenticated);
    }
}
