use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pocketeer_core::error::{PocketeerError, Result};
use pocketeer_core::types::{AccessToken, RequestToken};
use pocketeer_integrations::pocket::{Authorization, ItemList, ListQuery, PocketApi};

/// Scripted provider that counts every call.
pub struct FakePocket {
    pub request_calls: AtomicUsize,
    pub authorize_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    /// Delay inside `request_token`, to widen race windows.
    pub mint_delay: Duration,
    /// `None` means 403 (pending); `Some(Err)` stands for any other status.
    pub authorize_result: Mutex<Option<std::result::Result<String, u16>>>,
    pub list: Mutex<serde_json::Value>,
    pub last_query: Mutex<Option<ListQuery>>,
    pub last_access_token: Mutex<Option<String>>,
}

impl FakePocket {
    pub fn new() -> Self {
        Self {
            request_calls: AtomicUsize::new(0),
            authorize_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            mint_delay: Duration::ZERO,
            authorize_result: Mutex::new(None),
            list: Mutex::new(serde_json::json!({})),
            last_query: Mutex::new(None),
            last_access_token: Mutex::new(None),
        }
    }

    pub fn grant(&self, access_token: &str) {
        *self.authorize_result.lock().unwrap() = Some(Ok(access_token.to_string()));
    }

    pub fn fail_authorize(&self, status: u16) {
        *self.authorize_result.lock().unwrap() = Some(Err(status));
    }

    pub fn set_list(&self, list: serde_json::Value) {
        *self.list.lock().unwrap() = list;
    }

    pub fn requests(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PocketApi for FakePocket {
    async fn request_token(&self, _redirect_uri: &str) -> Result<RequestToken> {
        let n = self.request_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.mint_delay.is_zero() {
            tokio::time::sleep(self.mint_delay).await;
        }
        Ok(RequestToken::new(format!("req-{n}")))
    }

    async fn authorize(&self, _code: &RequestToken) -> Result<Authorization> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.authorize_result.lock().unwrap().clone();
        match scripted {
            None => Ok(Authorization::Pending),
            Some(Ok(token)) => Ok(Authorization::Granted(AccessToken::new(token))),
            Some(Err(status)) => Err(PocketeerError::Upstream {
                status,
                body: "rejected".to_string(),
            }),
        }
    }

    async fn list_items(&self, access_token: &AccessToken, query: &ListQuery) -> Result<ItemList> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        *self.last_access_token.lock().unwrap() = Some(access_token.as_str().to_string());
        let list = self.list.lock().unwrap().clone();
        serde_json::from_value(list).map_err(|e| PocketeerError::MalformedPayload(e.to_string()))
    }
}

/// One provider entry with all five fields.
pub fn item(id: &str, url: &str) -> serde_json::Value {
    serde_json::json!({
        "item_id": id,
        "resolved_id": id,
        "given_url": url,
        "given_title": format!("title {id}"),
        "time_added": "1700000000",
        "favorite": "1",
    })
}
