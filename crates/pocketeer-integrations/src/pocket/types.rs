use pocketeer_core::types::AccessToken;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of exchanging a request token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Granted(AccessToken),
    /// The user has not approved the request token in a browser yet.
    Pending,
}

/// Filters for `/v3/get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub state: String,
    pub sort: String,
    pub detail_type: String,
    pub favorite: String,
}

impl ListQuery {
    /// All items, newest first, simple detail, filtered by `favorite`.
    pub fn newest(favorite: impl Into<String>) -> Self {
        Self {
            state: "all".to_string(),
            sort: "newest".to_string(),
            detail_type: "simple".to_string(),
            favorite: favorite.into(),
        }
    }
}

/// The provider's `list` field: a mapping keyed by item id, in the order the
/// provider sent it. An empty result arrives as `[]` rather than `{}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ItemList {
    Keyed(Map<String, Value>),
    Array(Vec<Value>),
}

impl ItemList {
    pub fn len(&self) -> usize {
        match self {
            Self::Keyed(map) => map.len(),
            Self::Array(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in provider order, paired with their key when there is one.
    pub fn entries(&self) -> Vec<(Option<&str>, &Value)> {
        match self {
            Self::Keyed(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
            Self::Array(items) => items.iter().map(|v| (None, v)).collect(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct RequestTokenBody<'a> {
    pub consumer_key: &'a str,
    pub redirect_uri: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct RequestTokenResponse {
    pub code: String,
}

#[derive(Serialize)]
pub(crate) struct AuthorizeBody<'a> {
    pub consumer_key: &'a str,
    pub code: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct AuthorizeResponse {
    pub access_token: String,
}

#[derive(Serialize)]
pub(crate) struct ListBody<'a> {
    pub consumer_key: &'a str,
    pub access_token: &'a str,
    pub state: &'a str,
    pub sort: &'a str,
    #[serde(rename = "detailType")]
    pub detail_type: &'a str,
    pub favorite: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct ListResponse {
    pub list: Option<ItemList>,
}
