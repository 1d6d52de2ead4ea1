mod client;
mod types;

pub use client::PocketClient;
pub use types::{Authorization, ItemList, ListQuery};

use async_trait::async_trait;
use pocketeer_core::error::Result;
use pocketeer_core::types::{AccessToken, RequestToken};

/// The three provider calls the proxy depends on.
#[async_trait]
pub trait PocketApi: Send + Sync {
    /// `POST /v3/oauth/request`
    async fn request_token(&self, redirect_uri: &str) -> Result<RequestToken>;

    /// `POST /v3/oauth/authorize`. A 403 is reported as
    /// [`Authorization::Pending`], not as an error.
    async fn authorize(&self, code: &RequestToken) -> Result<Authorization>;

    /// `POST /v3/get`
    async fn list_items(&self, access_token: &AccessToken, query: &ListQuery) -> Result<ItemList>;
}
