//! Stripe REST client
//!
//! A thin `reqwest` wrapper: bearer auth with the secret key, form-encoded
//! bodies, and Stripe's `{"error": {...}}` envelope turned into
//! [`StripeError::Api`]. Connection pooling comes from the shared
//! `reqwest::Client`; the client holds no other state and is cheap to clone.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::stripe::error::{StripeError, StripeResult};
use crate::stripe::params::{
    CheckoutSessionParams, CreatedCheckoutSession, CreatedPortalSession, PortalSessionParams,
};
use crate::stripe::provider::BillingProvider;

/// Production API host
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com/";

const STRIPE_VERSION_HEADER: &str = "Stripe-Version";

/// Stripe API client implementing [`BillingProvider`].
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    base_url: Url,
    secret_key: String,
    api_version: Option<String>,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url.as_str())
            .field("secret_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl StripeClient {
    /// Create a client against the production API.
    pub fn new(secret_key: impl Into<String>) -> StripeResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(DEFAULT_API_BASE)
            .map_err(|e| StripeError::Transport(format!("invalid API base: {e}")))?;

        Ok(Self {
            http,
            base_url,
            secret_key: secret_key.into(),
            api_version: None,
        })
    }

    /// Point the client at another API host (stripe-mock, a test server).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Pin the `Stripe-Version` header.
    pub fn with_api_version(mut self, api_version: Option<String>) -> Self {
        self.api_version = api_version;
        self
    }

    /// API host in use
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/v1/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> StripeResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StripeError::Transport(format!("unusable API base {}", self.base_url)))?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .bearer_auth(&self.secret_key);

        match &self.api_version {
            Some(version) => builder.header(STRIPE_VERSION_HEADER, version),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> StripeResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = StripeError::from_response_body(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "Stripe request failed");
            return Err(err);
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Stripe request succeeded");
        serde_json::from_str(&body).map_err(|e| StripeError::Decode(e.to_string()))
    }

    async fn get(&self, segments: &[&str]) -> StripeResult<Value> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn delete(&self, segments: &[&str]) -> StripeResult<Value> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::DELETE, url)).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: &[(&'static str, String)],
    ) -> StripeResult<T> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::POST, url).form(form)).await
    }
}

/// Reject blank references, which would change which endpoint gets hit.
/// Anything else is opaque and passed through as is.
fn reference<'a>(kind: &'static str, value: &'a str) -> StripeResult<&'a str> {
    if value.trim().is_empty() {
        return Err(StripeError::InvalidReference {
            kind,
            reference: value.to_string(),
        });
    }
    Ok(value)
}

#[async_trait::async_trait]
impl BillingProvider for StripeClient {
    #[instrument(skip(self))]
    async fn retrieve_checkout_session(&self, session_id: &str) -> StripeResult<Value> {
        let id = reference("checkout session", session_id)?;
        self.get(&["checkout", "sessions", id]).await
    }

    #[instrument(skip(self, params), fields(price_id = %params.price_id))]
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> StripeResult<CreatedCheckoutSession> {
        self.post_form(&["checkout", "sessions"], &params.to_form())
            .await
    }

    #[instrument(skip(self))]
    async fn cancel_subscription(&self, subscription_id: &str) -> StripeResult<Value> {
        let id = reference("subscription", subscription_id)?;
        self.delete(&["subscriptions", id]).await
    }

    #[instrument(skip(self))]
    async fn retrieve_subscription(&self, subscription_id: &str) -> StripeResult<Value> {
        let id = reference("subscription", subscription_id)?;
        self.get(&["subscriptions", id]).await
    }

    #[instrument(skip(self))]
    async fn retrieve_customer(&self, customer_id: &str) -> StripeResult<Value> {
        let id = reference("customer", customer_id)?;
        self.get(&["customers", id]).await
    }

    #[instrument(skip(self, params), fields(customer_id = %params.customer_id))]
    async fn create_portal_session(
        &self,
        params: &PortalSessionParams,
    ) -> StripeResult<CreatedPortalSession> {
        reference("customer", &params.customer_id)?;
        self.post_form(&["billing_portal", "sessions"], &params.to_form())
            .await
    }
}
