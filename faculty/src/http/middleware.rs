mod responsemapperlayer;

pub use responsemapperlayer::response_mapper_layer;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACE_ID_HEADER: &str = "X-Trace-ID";

struct HeaderExtractor<'a>(&'a HeaderMap);

impl opentelemetry::propagation::Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Opens the `http.request` span, parented on an incoming `traceparent`
/// when there is one.
fn request_span(request: &Request) -> tracing::Span {
    let parent = opentelemetry::global::get_text_map_propagator(|p| {
        p.extract(&HeaderExtractor(request.headers()))
    });
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned());

    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        uri = %request.uri(),
        route = route.as_deref().unwrap_or("unmatched"),
        status = tracing::field::Empty,
        trace_id = tracing::field::Empty,
    );
    span.set_parent(parent);
    span
}

/// Runs the request inside its span, records the outcome on it and echoes
/// the trace id back in [`TRACE_ID_HEADER`].
pub async fn trace_layer(request: Request, next: Next) -> Response {
    let span = request_span(&request);
    let trace_id = span.context().span().span_context().trace_id().to_string();
    span.record("trace_id", trace_id.as_str());

    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    span.record("status", status.as_u16());
    span.in_scope(|| {
        if status.is_server_error() {
            tracing::error!(%status, "request finished");
        } else {
            tracing::info!(%status, "request finished");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}
