use thiserror::Error;

#[derive(Debug, Error)]
pub enum PocketeerError {
    /// A bookmark fetch was attempted before any access token was stored.
    #[error("access token not found, authenticate via /authen first")]
    Unauthorized,

    #[error("upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("malformed upstream payload: {0}")]
    MalformedPayload(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),
}

impl PocketeerError {
    /// Stable label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Upstream { .. } => "upstream",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::Store(_) => "store",
            Self::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, PocketeerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message_tells_caller_to_authenticate() {
        let msg = PocketeerError::Unauthorized.to_string();
        assert!(msg.contains("access token not found"));
        assert!(msg.contains("/authen"));
    }

    #[test]
    fn test_upstream_message_carries_status_and_body() {
        let err = PocketeerError::Upstream {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "upstream error (500): boom");
        assert_eq!(err.label(), "upstream");
    }
}
