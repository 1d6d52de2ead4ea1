use std::time::Duration;

use async_trait::async_trait;
use pocketeer_core::config::PocketConfig;
use pocketeer_core::error::{PocketeerError, Result};
use pocketeer_core::types::{AccessToken, RequestToken};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    AuthorizeBody, AuthorizeResponse, ListBody, ListResponse, RequestTokenBody,
    RequestTokenResponse,
};
use super::{Authorization, ItemList, ListQuery, PocketApi};

const REQUEST_PATH: &str = "/v3/oauth/request";
const AUTHORIZE_PATH: &str = "/v3/oauth/authorize";
const GET_PATH: &str = "/v3/get";

/// Pocket v3 client. Every call is a JSON POST carrying the consumer key.
pub struct PocketClient {
    consumer_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl PocketClient {
    pub fn new(config: &PocketConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PocketeerError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            consumer_key: config.consumer_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// POST `body` to `path`, returning the status and raw body text.
    async fn post<B: Serialize + ?Sized>(&self, op: &str, path: &str, body: &B) -> Result<(u16, String)> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("Content-Type", "application/json; charset=UTF-8")
            .header("X-Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| PocketeerError::UpstreamUnavailable(format!("pocket {op} failed: {e}")))?;

        let status = resp.status().as_u16();
        // Pocket reports failures in X-Error and often leaves the body empty.
        let x_error = resp
            .headers()
            .get("X-Error")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp.text().await.map_err(|e| {
            PocketeerError::UpstreamUnavailable(format!("pocket {op} read failed: {e}"))
        })?;

        tracing::debug!(op, status, "pocket_response");

        let text = match x_error {
            Some(err) if text.trim().is_empty() && status != 200 => err,
            _ => text,
        };
        Ok((status, text))
    }
}

fn parse<T: DeserializeOwned>(op: &str, text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| PocketeerError::MalformedPayload(format!("pocket {op} response: {e}")))
}

#[async_trait]
impl PocketApi for PocketClient {
    async fn request_token(&self, redirect_uri: &str) -> Result<RequestToken> {
        let body = RequestTokenBody {
            consumer_key: &self.consumer_key,
            redirect_uri,
        };
        let (status, text) = self.post("request", REQUEST_PATH, &body).await?;
        if status != 200 {
            return Err(PocketeerError::Upstream { status, body: text });
        }

        let resp: RequestTokenResponse = parse("request", &text)?;
        Ok(RequestToken::new(resp.code))
    }

    async fn authorize(&self, code: &RequestToken) -> Result<Authorization> {
        let body = AuthorizeBody {
            consumer_key: &self.consumer_key,
            code: code.as_str(),
        };
        let (status, text) = self.post("authorize", AUTHORIZE_PATH, &body).await?;
        match status {
            200 => {
                let resp: AuthorizeResponse = parse("authorize", &text)?;
                Ok(Authorization::Granted(AccessToken::new(resp.access_token)))
            }
            403 => Ok(Authorization::Pending),
            _ => Err(PocketeerError::Upstream { status, body: text }),
        }
    }

    async fn list_items(&self, access_token: &AccessToken, query: &ListQuery) -> Result<ItemList> {
        let body = ListBody {
            consumer_key: &self.consumer_key,
            access_token: access_token.as_str(),
            state: &query.state,
            sort: &query.sort,
            detail_type: &query.detail_type,
            favorite: &query.favorite,
        };
        let (status, text) = self.post("get", GET_PATH, &body).await?;
        if status != 200 {
            return Err(PocketeerError::Upstream { status, body: text });
        }

        let resp: ListResponse = parse("get", &text)?;
        resp.list
            .ok_or_else(|| PocketeerError::MalformedPayload("pocket get response missing 'list'".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> PocketClient {
        let config = PocketConfig {
            consumer_key: "ck-test".to_string(),
            base_url: format!("{}/", server.uri()),
            timeout_secs: 5,
            ..Default::default()
        };
        PocketClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_request_token_sends_consumer_key_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/oauth/request"))
            .and(header("X-Accept", "application/json"))
            .and(body_json(json!({
                "consumer_key": "ck-test",
                "redirect_uri": "https://www.google.com"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"code": "req-1", "state": null})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = client(&server)
            .request_token("https://www.google.com")
            .await
            .unwrap();
        assert_eq!(token.as_str(), "req-1");
    }

    #[tokio::test]
    async fn test_request_token_missing_code_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/oauth/request"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "x"})))
            .mount(&server)
            .await;

        let err = client(&server).request_token("https://x").await.unwrap_err();
        assert!(matches!(err, PocketeerError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_authorize_granted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/oauth/authorize"))
            .and(body_json(json!({"consumer_key": "ck-test", "code": "req-1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "acc-9", "username": "pocketuser"})),
            )
            .mount(&server)
            .await;

        let outcome = client(&server)
            .authorize(&RequestToken::new("req-1"))
            .await
            .unwrap();
        assert_eq!(outcome, Authorization::Granted(AccessToken::new("acc-9")));
    }

    #[tokio::test]
    async fn test_authorize_forbidden_is_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/oauth/authorize"))
            .respond_with(ResponseTemplate::new(403).insert_header("X-Error", "User rejected code."))
            .mount(&server)
            .await;

        let outcome = client(&server)
            .authorize(&RequestToken::new("req-1"))
            .await
            .unwrap();
        assert_eq!(outcome, Authorization::Pending);
    }

    #[tokio::test]
    async fn test_authorize_other_status_is_upstream_error_with_x_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/oauth/authorize"))
            .respond_with(ResponseTemplate::new(400).insert_header("X-Error", "Invalid consumer key."))
            .mount(&server)
            .await;

        let err = client(&server)
            .authorize(&RequestToken::new("req-1"))
            .await
            .unwrap_err();
        match err {
            PocketeerError::Upstream { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Invalid consumer key.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_items_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/get"))
            .and(body_json(json!({
                "consumer_key": "ck-test",
                "access_token": "acc-9",
                "state": "all",
                "sort": "newest",
                "detailType": "simple",
                "favorite": "0"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 1,
                "list": {
                    "200": {"item_id": "200"},
                    "100": {"item_id": "100"}
                }
            })))
            .mount(&server)
            .await;

        let list = client(&server)
            .list_items(&AccessToken::new("acc-9"), &ListQuery::newest("0"))
            .await
            .unwrap();
        let keys: Vec<_> = list.entries().into_iter().filter_map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["200", "100"]);
    }

    #[tokio::test]
    async fn test_list_items_without_list_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 1})))
            .mount(&server)
            .await;

        let err = client(&server)
            .list_items(&AccessToken::new("acc-9"), &ListQuery::newest("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, PocketeerError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        let config = PocketConfig {
            consumer_key: "ck-test".to_string(),
            // Port 9 (discard) on localhost refuses connections.
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        let err = PocketClient::new(&config)
            .unwrap()
            .request_token("https://x")
            .await
            .unwrap_err();
        assert!(matches!(err, PocketeerError::UpstreamUnavailable(_)));
    }
}
