use crate::error::ApiError;
use crate::{ServerConfig, UI_MAX_DIFFERENT_PIXELS, page, preview};
use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State, WebSocketUpgrade, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use row_compactor::{
    CompactionConfig, CompactionPipeline, DEFAULT_MAX_DIFFERENT_PIXELS, PipelineOutcome, PngCodec,
};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
struct AppState {
    debounce: Duration,
    max_upload_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct CompactParams {
    max_different_pixels: Option<usize>,
    filename: Option<String>,
}

/// Build the application router.
pub fn app(cfg: &ServerConfig) -> Router {
    let state = AppState {
        debounce: cfg.debounce,
        max_upload_bytes: cfg.max_upload_bytes,
    };
    Router::new()
        .route("/", get(|| async { Html(page::INDEX_HTML) }))
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/compact", post(compact))
        .route("/ws/preview", get(preview_socket))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .with_state(state)
}

async fn compact(
    params: Result<Query<CompactParams>, QueryRejection>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let max_different_pixels = params
        .max_different_pixels
        .unwrap_or(DEFAULT_MAX_DIFFERENT_PIXELS);
    if max_different_pixels > UI_MAX_DIFFERENT_PIXELS {
        return Err(ApiError::bad_request(format!(
            "max_different_pixels must be between 0 and {UI_MAX_DIFFERENT_PIXELS}"
        )));
    }
    let filename = params.filename.unwrap_or_default();

    let config = CompactionConfig::default().with_max_different_pixels(max_different_pixels);
    let outcome = tokio::task::spawn_blocking(move || {
        CompactionPipeline::new(PngCodec, config).process(&body, &filename)
    })
    .await
    .map_err(|err| ApiError::internal(err.to_string()))??;

    match outcome {
        PipelineOutcome::Compacted(processed) => Ok((
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(processed.mime_type)),
                (header::CONTENT_DISPOSITION, content_disposition(&processed.filename)),
                (
                    header::HeaderName::from_static("x-original-height"),
                    HeaderValue::from(processed.original_height),
                ),
            ],
            processed.bytes,
        )
            .into_response()),
        PipelineOutcome::NoContentRows { .. } => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn preview_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.max_message_size(state.max_upload_bytes)
        .on_upgrade(move |socket| preview::run_session(socket, state.debounce))
}

/// `attachment; filename="..."` with anything outside printable ASCII replaced.
fn content_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use row_compactor::ImageCodec;
    use tower::ServiceExt;

    fn source_png(busy_rows: &[bool]) -> Vec<u8> {
        let width = 16u32;
        let pixels: Vec<u8> = busy_rows
            .iter()
            .flat_map(|&busy| {
                (0..width).flat_map(move |x| {
                    let shade = if busy { (x * 16) as u8 } else { 255 };
                    [shade, shade, shade, 255]
                })
            })
            .collect();
        PngCodec.encode(&pixels, width, busy_rows.len() as u32).unwrap()
    }

    fn compact_request(query: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/compact?{query}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let app = app(&ServerConfig::default());
        let resp = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn index_serves_the_form() {
        let app = app(&ServerConfig::default());
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"type="range""#));
        assert!(html.contains(r#"max="100""#));
    }

    #[tokio::test]
    async fn compact_returns_png_download() {
        let app = app(&ServerConfig::default());
        let source = source_png(&[false, true, false, true, false]);
        let resp = app
            .oneshot(compact_request("max_different_pixels=5&filename=long.png", source))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"processed-long.png\""
        );
        assert_eq!(resp.headers()["x-original-height"], "5");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let decoded = PngCodec.decode(&body).unwrap();
        assert_eq!((decoded.width, decoded.height), (16, 2));
    }

    #[tokio::test]
    async fn compact_all_blank_is_no_content() {
        let app = app(&ServerConfig::default());
        let resp = app
            .oneshot(compact_request("max_different_pixels=5", source_png(&[false, false])))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn compact_rejects_garbage_and_out_of_range_threshold() {
        let app = app(&ServerConfig::default());
        let resp = app
            .clone()
            .oneshot(compact_request("max_different_pixels=5", b"garbage".to_vec()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "bad_request");

        let resp = app
            .oneshot(compact_request("max_different_pixels=101", source_png(&[true])))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn compact_reports_bad_query_as_json() {
        let app = app(&ServerConfig::default());
        let resp = app
            .oneshot(compact_request("max_different_pixels=lots", source_png(&[true])))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "bad_request");
    }

    #[test]
    fn disposition_sanitizes_filename() {
        assert_eq!(
            content_disposition("processed-we\"ird ü.png"),
            "attachment; filename=\"processed-we_ird _.png\""
        );
    }
}
