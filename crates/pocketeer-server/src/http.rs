use std::sync::Arc;

use axum::extract::{OriginalUri, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pocketeer_core::error::{PocketeerError, Result};
use pocketeer_core::types::{AccessToken, BookmarkCollection};
use pocketeer_service::{AuthManager, AuthOutcome, BookmarkCache};
use pocketeer_store::{keys, KvStore};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthManager>,
    pub bookmarks: Arc<BookmarkCache>,
    pub store: Arc<dyn KvStore>,
}

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

#[derive(Serialize)]
struct TokenBody {
    access_token: AccessToken,
}

#[derive(Serialize)]
struct DebugState {
    code: Option<String>,
    access_token: Option<String>,
    bookmarks: Option<BookmarkCollection>,
}

#[derive(Deserialize)]
struct BookmarksQuery {
    favorite: Option<String>,
    reset: Option<String>,
}

/// Every failure leaves as `400 {message}`.
struct ApiError(PocketeerError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(kind = self.0.label(), error = %self.0, "request_failed");
        message(StatusCode::BAD_REQUEST, self.0.to_string())
    }
}

impl From<PocketeerError> for ApiError {
    fn from(e: PocketeerError) -> Self {
        Self(e)
    }
}

fn message(status: StatusCode, message: String) -> Response {
    (status, Json(MessageBody { message })).into_response()
}

async fn index() -> &'static str {
    "Hello World"
}

async fn authen(State(state): State<AppState>, OriginalUri(uri): OriginalUri, headers: HeaderMap) -> Response {
    let caller = caller_url(&headers, &uri);

    match state.auth.ensure_access_token(&caller).await {
        Ok(AuthOutcome::Authorized(access_token)) => {
            (StatusCode::OK, Json(TokenBody { access_token })).into_response()
        }
        Ok(AuthOutcome::Pending { authorize_url, .. }) => message(StatusCode::FORBIDDEN, authorize_url),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn bookmarks(
    State(state): State<AppState>,
    Query(params): Query<BookmarksQuery>,
) -> std::result::Result<Json<BookmarkCollection>, ApiError> {
    let favorite = params.favorite.unwrap_or_else(|| "1".to_string());
    let reset = params.reset.as_deref().map_or(false, is_truthy);

    let collection = state.bookmarks.get_bookmarks(&favorite, reset).await?;
    Ok(Json(collection))
}

async fn debug_state(State(state): State<AppState>) -> std::result::Result<Json<DebugState>, ApiError> {
    Ok(Json(DebugState {
        code: state.store.get(keys::REQUEST_TOKEN).await?,
        access_token: state.store.get(keys::ACCESS_TOKEN).await?,
        bookmarks: state.bookmarks.cached().await?,
    }))
}

fn is_truthy(flag: &str) -> bool {
    matches!(flag.trim(), "1" | "true")
}

/// Absolute URL the caller used to reach us, for the post-approval redirect.
fn caller_url(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = header_str(headers, "x-forwarded-proto").unwrap_or("http");
    let host = header_str(headers, "host").unwrap_or("localhost");
    format!("{scheme}://{host}{}", uri.path())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn router(state: AppState, diagnostics: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/authen", get(authen))
        .route("/bookmarks", get(bookmarks));

    if diagnostics {
        app = app.route("/debug/state", get(debug_state));
    }

    app.with_state(state)
}

/// Bind `0.0.0.0:{port}` and serve until the process exits.
pub async fn start_server(port: u16, state: AppState, diagnostics: bool) -> Result<()> {
    let app = router(state, diagnostics);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| PocketeerError::Config(format!("failed to bind port {port}: {e}")))?;

    tracing::info!(port, diagnostics, "server_listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| PocketeerError::Config(format!("server error: {e}")))?;

    Ok(())
}
