use std::path::Path;

use axum::{
    extract::{Path as AxumPath, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use mime::Mime;
use tracing::error;

use crate::web::AppState;

/// `GET /uploads/:filename`
pub async fn uploaded_file(
    State(state): State<AppState>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Response, StatusCode> {
    if !is_flat_file_name(&filename) {
        return Err(StatusCode::NOT_FOUND);
    }

    stream_file(&state.upload_dir().join(&filename), &filename).await
}

/// Uploads live in one flat directory, so anything that could step outside it is refused.
fn is_flat_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && sanitize_filename::is_sanitized(name)
}

async fn stream_file(path: &Path, filename: &str) -> Result<Response, StatusCode> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(StatusCode::NOT_FOUND);
        }
        Err(err) => {
            error!(?err, file = %path.display(), "failed to read uploaded file");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut headers = HeaderMap::new();
    let content_type = content_type_for(filename);
    let header_value = HeaderValue::from_str(content_type.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, header_value);

    Ok((headers, bytes).into_response())
}

pub fn content_type_for(filename: &str) -> Mime {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "svg" => mime::IMAGE_SVG,
        "bmp" => mime::IMAGE_BMP,
        "pdf" => mime::APPLICATION_PDF,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "webp" => parse_or_octet_stream("image/webp"),
        "doc" => parse_or_octet_stream("application/msword"),
        "docx" => parse_or_octet_stream(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

fn parse_or_octet_stream(raw: &str) -> Mime {
    raw.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("img_A_cover.PNG"), mime::IMAGE_PNG);
        assert_eq!(content_type_for("doc_A_guide.pdf"), mime::APPLICATION_PDF);
        assert_eq!(content_type_for("doc_A_notes"), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(content_type_for("img_A_x.webp").as_ref(), "image/webp");
    }

    #[test]
    fn rejects_names_outside_the_upload_directory() {
        assert!(is_flat_file_name("img_Chevening_cover.png"));
        assert!(!is_flat_file_name(".."));
        assert!(!is_flat_file_name("../secret"));
        assert!(!is_flat_file_name("a\\b"));
        assert!(!is_flat_file_name(""));
    }
}
