use axum::{
    body::{Body, Bytes},
    extract::{Extension, State},
    http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::ai::{shelf_life, AiConfig, ChatClient};
use crate::error::ApiError;
use crate::normalize::{
    normalize_freshness, normalize_quick, normalize_receipt, normalize_shelf_life,
};
use crate::system_info::BuildInfo;

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Shared by every handler. Holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    ai: Option<ChatClient>,
    today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(ai: Option<&AiConfig>) -> Self {
        Self {
            ai: ai.map(ChatClient::new),
            today: local_today,
        }
    }

    /// Override the clock used for purchase dates.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn client(&self) -> Result<&ChatClient, ApiError> {
        self.ai
            .as_ref()
            .ok_or_else(|| ApiError::upstream("AI service is not configured", None))
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Clone, Debug)]
struct RequestContext {
    request_id: String,
}

pub fn router(state: AppState) -> Router {
    let request_id_layer = middleware::from_fn(assign_request_id);
    Router::new()
        .route("/api/quick-shelf-life", post(quick_shelf_life))
        .route("/api/get-shelf-life", post(get_shelf_life))
        .route("/api/get-freshness-info", post(get_freshness_info))
        .route("/api/parse-receipt", post(parse_receipt))
        .route("/api/info", get(info))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(request_id_layer)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &Response<_>, _latency: std::time::Duration, _span: &tracing::Span| {
                        let status = res.status();
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn quick_shelf_life(
    State(state): State<AppState>,
    Extension(request): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = async {
        let name = normalize_quick(&headers, &body)?;
        let client = state.client()?;
        tracing::debug!(request_id = %request.request_id, item = %name, "Quick shelf life lookup");
        shelf_life::quick_shelf_life(client, &name, (state.today)()).await
    }
    .await;
    respond(&request, "quick shelf life", result)
}

async fn get_shelf_life(
    State(state): State<AppState>,
    Extension(request): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = async {
        let input = normalize_shelf_life(&headers, &body)?;
        let client = state.client()?;
        tracing::debug!(request_id = %request.request_id, ?input, "Shelf life lookup");
        shelf_life::get_shelf_life(client, &input, (state.today)()).await
    }
    .await;
    respond(&request, "shelf life", result)
}

async fn get_freshness_info(
    State(state): State<AppState>,
    Extension(request): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = async {
        let records = normalize_freshness(&headers, &body)?;
        let client = state.client()?;
        tracing::debug!(
            request_id = %request.request_id,
            item_count = records.len(),
            "Freshness lookup"
        );
        shelf_life::freshness_info(client, &records).await
    }
    .await;
    respond(&request, "freshness info", result)
}

async fn parse_receipt(
    State(state): State<AppState>,
    Extension(request): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = async {
        let text = normalize_receipt(&headers, &body)?;
        let client = state.client()?;
        tracing::debug!(
            request_id = %request.request_id,
            text_len = text.len(),
            "Receipt extraction"
        );
        shelf_life::parse_receipt(client, &text, (state.today)()).await
    }
    .await;
    respond(&request, "receipt", result)
}

async fn info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

fn respond<T: Serialize>(
    request: &RequestContext,
    what: &'static str,
    result: Result<T, ApiError>,
) -> Response {
    match result {
        Ok(payload) => {
            tracing::debug!(request_id = %request.request_id, what, "AI request succeeded");
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            match &err {
                ApiError::Validation(_) | ApiError::UnsupportedMediaType => tracing::debug!(
                    request_id = %request.request_id,
                    what,
                    error = %err,
                    "Rejected AI request"
                ),
                ApiError::Upstream { detail, .. } => tracing::error!(
                    request_id = %request.request_id,
                    what,
                    error = %err,
                    detail = detail.as_deref().unwrap_or(""),
                    "AI service call failed"
                ),
                ApiError::MalformedAiResponse { raw, .. } => {
                    let snippet: String = raw.chars().take(200).collect();
                    tracing::error!(
                        request_id = %request.request_id,
                        what,
                        snippet = %snippet,
                        "AI response had no usable JSON"
                    )
                }
            }
            err.into_response()
        }
    }
}

/// Serve the request inside a span carrying a fresh id. The same id is
/// returned in `x-request-id`.
async fn assign_request_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::debug_span!("request", request_id = %request_id);
    let header = HeaderValue::from_str(&request_id).ok();
    req.extensions_mut().insert(RequestContext { request_id });

    let mut response = next.run(req).instrument(span).await;
    if let Some(value) = header {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
