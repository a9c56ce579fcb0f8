use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ipid_core::anchors::AnchorTable;
use ipid_core::error::IpidError;
use ipid_core::extraction::pdftotext::PdftotextExtractor;
use ipid_core::extraction::PdfExtractor;
use ipid_core::ParseOptions;
use serde::Serialize;
use std::sync::Arc;

use crate::commands::{load_table, parse_options};
use crate::PipelineArgs;

/// Upload limit, with some headroom for multipart overhead.
const MAX_UPLOAD_BYTES: usize = 55 * 1024 * 1024;

pub struct AppState {
    pub table: AnchorTable,
    pub extractor: Arc<dyn PdfExtractor>,
    pub options: ParseOptions,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

pub fn run(host: &str, port: u16, pipeline: &PipelineArgs) -> Result<(), IpidError> {
    let table = load_table(pipeline)?;
    let options = parse_options(pipeline);
    let extractor = PdftotextExtractor::new().with_geometry(options.use_geometry);
    if !PdftotextExtractor::is_available() {
        tracing::warn!("pdftotext not found in PATH; every upload will fail");
    }

    let state = Arc::new(AppState {
        table,
        extractor: Arc::new(extractor),
        options,
    });
    let addr = format!("{host}:{port}");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, "IPID server listening");
        axum::serve(listener, router(state)).await?;
        Ok::<(), IpidError>(())
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/file", post(upload_file))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn upload_file(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("malformed multipart body: {e}");
                return error_response(StatusCode::BAD_REQUEST, "Malformed multipart body.");
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((filename, bytes.to_vec())),
            Err(e) => {
                tracing::warn!("failed to read upload bytes: {e}");
                return error_response(StatusCode::BAD_REQUEST, "Failed to read file data.");
            }
        }
    }

    let Some((filename, bytes)) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "No file provided.");
    };
    tracing::info!(file = %filename, bytes = bytes.len(), "parsing upload");

    let worker_state = Arc::clone(&state);
    let parsed = tokio::task::spawn_blocking(move || {
        ipid_core::parse_pdf(
            &bytes,
            worker_state.extractor.as_ref(),
            &worker_state.table,
            &worker_state.options,
        )
    })
    .await;

    match parsed {
        Ok(Ok(doc)) => Json(doc).into_response(),
        Ok(Err(e)) if e.is_provider_error() => {
            tracing::warn!(file = %filename, "extraction failed: {e}");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Ok(Err(e)) => {
            tracing::error!(file = %filename, "parse failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            tracing::error!(file = %filename, "parse task panicked: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Parse task failed.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use ipid_core::anchors::builtin::load_builtin;
    use ipid_core::extraction::PageContent;
    use tower::ServiceExt;

    const BOUNDARY: &str = "ipid-test-boundary";

    /// Accepts anything starting with `%PDF-` and returns a fixed page.
    struct StubExtractor;

    impl PdfExtractor for StubExtractor {
        fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, IpidError> {
            if !pdf_bytes.starts_with(b"%PDF-") {
                return Err(IpidError::NotAPdf);
            }
            Ok(vec![PageContent::from_text(
                1,
                "Où suis-je couvert ?\nEn France\nQuelles sont mes obligations ?\nPayer\n",
            )])
        }

        fn backend_name(&self) -> &str {
            "stub"
        }
    }

    fn app() -> Router {
        router(Arc::new(AppState {
            table: load_builtin().unwrap(),
            extractor: Arc::new(StubExtractor),
            options: ParseOptions::default(),
        }))
    }

    fn upload(field: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"ipid.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/file")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_returns_document() {
        let response = app().oneshot(upload("file", b"%PDF-1.7 stub")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["applicability"]["localization"], "En France");
        assert_eq!(json["applicability"]["obligations"], "Payer");
        assert_eq!(json["insurer"]["siren"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected() {
        let response = app().oneshot(upload("file", b"hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let response = app().oneshot(upload("other", b"%PDF-1.7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
