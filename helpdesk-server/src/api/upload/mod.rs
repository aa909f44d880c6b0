//! Attachment file serving
//!
//! `GET /uploads/{filename}` is public, like the image links embedded in
//! ticket views.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use http::header;

use crate::core::ServerState;

enum UploadFileResponse {
    Ok { content: Bytes, mime: String },
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for UploadFileResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            UploadFileResponse::Ok { content, mime } => (
                http::StatusCode::OK,
                [(header::CONTENT_TYPE, mime)],
                content,
            )
                .into_response(),
            UploadFileResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "File not found").into_response()
            }
            UploadFileResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

async fn serve_uploaded_file(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> UploadFileResponse {
    let Ok(file_path) = state.attachments().resolve(&filename) else {
        return UploadFileResponse::BadRequest("Invalid filename");
    };

    match tokio::fs::read(&file_path).await {
        Ok(content) => UploadFileResponse::Ok {
            mime: mime_guess::from_path(&file_path)
                .first_or_octet_stream()
                .to_string(),
            content: content.into(),
        },
        Err(e) => {
            tracing::debug!(filename = %filename, error = %e, "Upload not found");
            UploadFileResponse::NotFound
        }
    }
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/uploads/{filename}", get(serve_uploaded_file))
}
