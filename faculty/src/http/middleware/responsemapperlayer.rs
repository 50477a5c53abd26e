use axum::http::{HeaderValue, StatusCode, header};

/// Statuses axum's extractors answer with when a path segment, query
/// string or body cannot be decoded.
fn is_extractor_rejection(status: StatusCode) -> bool {
    status == StatusCode::BAD_REQUEST
        || status == StatusCode::UNPROCESSABLE_ENTITY
        || status == StatusCode::UNSUPPORTED_MEDIA_TYPE
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Rewrites plain-text extractor rejections into the service's error
/// shape: `404` with a JSON `{"message": ...}` body.
pub async fn response_mapper_layer(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let response = next.run(request).await;
    if !is_extractor_rejection(response.status()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    if is_json(&parts) {
        return axum::response::Response::from_parts(parts, body);
    }

    let message = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => e.to_string(),
    };
    tracing::warn!(status = %parts.status, %message, "request rejected");

    let new_body = serde_json::json!({ "message": message }).to_string();
    parts.status = StatusCode::NOT_FOUND;
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(new_body.len()));

    axum::response::Response::from_parts(parts, axum::body::Body::from(new_body))
}
