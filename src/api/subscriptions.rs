//! Subscription routes: status and count per channel, and toggling.

use crate::api::Envelope;
use crate::http::ApiClient;
use eyre::Context;
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Whether the current user is subscribed to a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub subscribed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubscriberCountData {
    count: u64,
}

impl ApiClient {
    /// Whether the current user is subscribed to the given channel.
    /// `GET /subscriptions/status?channelId=`.
    #[instrument(skip(self), ret, level = tracing::Level::DEBUG)]
    pub async fn subscription_status(&self, channel_id: &str) -> eyre::Result<bool> {
        let query_params = [("channelId", channel_id)];
        let response = self
            .request(
                Method::GET,
                "/subscriptions/status",
                Some(&query_params),
                None::<&()>,
            )
            .await?;

        let envelope: Envelope<SubscriptionStatus> = response
            .json()
            .await
            .context("parse subscription status response as JSON")?;

        Ok(envelope.data.subscribed)
    }

    /// Number of subscribers the given channel has.
    /// `GET /subscriptions/count?channelId=`.
    #[instrument(skip(self), ret, level = tracing::Level::DEBUG)]
    pub async fn subscriber_count(&self, channel_id: &str) -> eyre::Result<u64> {
        let query_params = [("channelId", channel_id)];
        let response = self
            .request(
                Method::GET,
                "/subscriptions/count",
                Some(&query_params),
                None::<&()>,
            )
            .await?;

        let envelope: Envelope<SubscriberCountData> = response
            .json()
            .await
            .context("parse subscriber count response as JSON")?;

        Ok(envelope.data.count)
    }

    /// Toggles the current user's subscription to the given channel.
    ///
    /// `POST /subscriptions/c/{channelId}`. Returns the state after the
    /// toggle, which the backend reports back.
    #[instrument(skip(self), ret, level = tracing::Level::DEBUG)]
    pub async fn toggle_subscription(&self, channel_id: &str) -> eyre::Result<bool> {
        let path = format!("/subscriptions/c/{channel_id}");
        let response = self
            .request(Method::POST, &path, None, None::<&()>)
            .await?;

        let envelope: Envelope<SubscriptionStatus> = response
            .json()
            .await
            .context("parse subscription toggle response as JSON")?;

        Ok(envelope.data.subscribed)
    }
}
