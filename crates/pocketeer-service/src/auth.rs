use std::sync::Arc;

use pocketeer_core::config::PocketConfig;
use pocketeer_core::error::{PocketeerError, Result};
use pocketeer_core::types::{AccessToken, RequestToken};
use pocketeer_integrations::pocket::{Authorization, PocketApi};
use pocketeer_store::{keys, KvStore};
use tokio::sync::Mutex;
use url::Url;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Browser-facing approval page, e.g. `https://getpocket.com/auth/authorize`.
    pub authorize_endpoint: String,
    /// Fixed post-approval redirect. `None` uses the caller's own URL.
    pub redirect_url: Option<String>,
    /// `redirect_uri` sent with the request-token call.
    pub request_redirect_uri: String,
}

impl AuthSettings {
    pub fn from_config(config: &PocketConfig) -> Self {
        Self {
            authorize_endpoint: format!("{}/auth/authorize", config.base_url.trim_end_matches('/')),
            redirect_url: (!config.redirect_url.is_empty()).then(|| config.redirect_url.clone()),
            request_redirect_uri: config.request_redirect_uri.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized(AccessToken),
    /// The user must open `authorize_url`, approve, then retry.
    Pending {
        request_token: RequestToken,
        authorize_url: String,
    },
}

/// Owns the request-token → access-token lifecycle. All token state lives in
/// the store.
pub struct AuthManager {
    api: Arc<dyn PocketApi>,
    store: Arc<dyn KvStore>,
    settings: AuthSettings,
    /// Held across read → mint → persist of the request token.
    issuance: Mutex<()>,
}

impl AuthManager {
    pub fn new(api: Arc<dyn PocketApi>, store: Arc<dyn KvStore>, settings: AuthSettings) -> Self {
        Self {
            api,
            store,
            settings,
            issuance: Mutex::new(()),
        }
    }

    /// Return the stored access token, or exchange the pending request token
    /// for one. `fallback_redirect` is used in the approval URL when no
    /// redirect is configured.
    pub async fn ensure_access_token(&self, fallback_redirect: &str) -> Result<AuthOutcome> {
        if let Some(token) = self.store.get(keys::ACCESS_TOKEN).await? {
            if !token.is_empty() {
                tracing::debug!("access_token_cached");
                return Ok(AuthOutcome::Authorized(AccessToken::new(token)));
            }
        }

        let request_token = self.ensure_request_token().await?;

        match self.api.authorize(&request_token).await? {
            Authorization::Granted(access_token) => {
                self.store
                    .set(keys::ACCESS_TOKEN, access_token.as_str(), None)
                    .await?;
                tracing::info!("access_token_granted");
                Ok(AuthOutcome::Authorized(access_token))
            }
            Authorization::Pending => {
                let authorize_url = self.authorize_url(&request_token, fallback_redirect)?;
                tracing::info!("authorization_pending");
                Ok(AuthOutcome::Pending {
                    request_token,
                    authorize_url,
                })
            }
        }
    }

    /// Return the persisted request token, minting one if none exists. At most
    /// one mint is in flight; callers queued behind it see its token.
    pub async fn ensure_request_token(&self) -> Result<RequestToken> {
        if let Some(code) = self.stored_request_token().await? {
            return Ok(code);
        }

        let _guard = self.issuance.lock().await;

        // Another caller may have minted while we waited.
        if let Some(code) = self.stored_request_token().await? {
            return Ok(code);
        }

        let code = self
            .api
            .request_token(&self.settings.request_redirect_uri)
            .await?;
        self.store
            .set(keys::REQUEST_TOKEN, code.as_str(), None)
            .await?;
        tracing::info!("request_token_minted");
        Ok(code)
    }

    /// `{endpoint}?request_token=..&redirect_uri=..`
    pub fn authorize_url(&self, request_token: &RequestToken, fallback_redirect: &str) -> Result<String> {
        let redirect = self
            .settings
            .redirect_url
            .as_deref()
            .unwrap_or(fallback_redirect);

        Url::parse_with_params(
            &self.settings.authorize_endpoint,
            &[
                ("request_token", request_token.as_str()),
                ("redirect_uri", redirect),
            ],
        )
        .map(String::from)
        .map_err(|e| PocketeerError::Config(format!("invalid authorize endpoint: {e}")))
    }

    async fn stored_request_token(&self) -> Result<Option<RequestToken>> {
        Ok(self
            .store
            .get(keys::REQUEST_TOKEN)
            .await?
            .filter(|code| !code.is_empty())
            .map(RequestToken::new))
    }
}
