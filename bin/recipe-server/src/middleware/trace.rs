use axum::{
    body::{Body, HttpBody},
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, Limited};
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::ServerError;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Only JSON bodies of a known size below this are buffered and logged.
const MAX_LOGGED_BODY: usize = 1024;

/// Wraps each request in an `http_request` span keyed by a trace id.
///
/// The id comes from an incoming `x-trace-id` header when it parses as a
/// UUID and is generated otherwise; it is echoed on the response.
pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let (parts, body) = req.into_parts();
        let body = match log_body("request", &parts.headers, body).await {
            Ok(body) => body,
            Err(detail) => {
                return with_trace_id(ServerError::Validation(detail).into_response(), trace_header);
            }
        };
        let mut req = Request::from_parts(parts, body);
        if let Some(value) = &trace_header {
            req.headers_mut().insert(X_TRACE_ID, value.clone());
        }

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let response = match log_body("response", &parts.headers, body).await {
            Ok(body) => Response::from_parts(parts, body),
            Err(detail) => ServerError::Internal(format!("response body: {detail}")).into_response(),
        };
        let response = with_trace_id(response, trace_header);

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

fn with_trace_id(mut response: Response, trace_header: Option<HeaderValue>) -> Response {
    if let Some(value) = trace_header {
        response.headers_mut().insert(X_TRACE_ID, value);
    }
    response
}

/// Size of `body` when it is JSON and small enough to log.
///
/// Relies on the body's exact size hint (set from `Content-Length` for
/// incoming requests); streamed or unsized bodies are never buffered.
fn loggable_len(headers: &HeaderMap, body: &Body) -> Option<usize> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let len = usize::try_from(body.size_hint().exact()?).ok()?;
    (is_json && len < MAX_LOGGED_BODY).then_some(len)
}

/// Logs small JSON bodies and hands back an equivalent body. Anything else
/// passes through untouched.
async fn log_body(direction: &str, headers: &HeaderMap, body: Body) -> Result<Body, String> {
    let Some(len) = loggable_len(headers, &body) else {
        if let Some(len) = body.size_hint().exact().filter(|len| *len > 0) {
            debug!("{direction} body: [not logged: size={len}]");
        }
        return Ok(body);
    };

    let bytes = match Limited::new(body, MAX_LOGGED_BODY).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(direction, expected = len, error = %e, "failed to buffer body");
            return Err(format!("failed to read {direction} body: {e}"));
        }
    };

    match std::str::from_utf8(&bytes) {
        Ok(text) => debug!("{direction} body: {text}"),
        Err(_) => debug!("{direction} body: [not utf-8: size={}]", bytes.len()),
    }
    Ok(Body::from(bytes))
}

#[cfg(test)]
mod test {
    use super::*;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn only_small_sized_json_is_buffered() {
        let small = Body::from(r#"{"title":"T"}"#);
        assert_eq!(loggable_len(&json_headers(), &small), Some(13));

        let large = Body::from(vec![b' '; 3_000_000]);
        assert_eq!(loggable_len(&json_headers(), &large), None);

        let plain = Body::from("hello");
        assert_eq!(loggable_len(&HeaderMap::new(), &plain), None);
    }

    #[tokio::test]
    async fn large_body_passes_through_unbuffered() {
        let payload = vec![b'x'; 3_000_000];
        let body = log_body("request", &json_headers(), Body::from(payload.clone()))
            .await
            .unwrap();
        // Buffering goes through a 1 KiB cap and would have failed here, so
        // an Ok result means the body was handed on untouched.
        assert_eq!(body.size_hint().exact(), Some(3_000_000));
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(bytes.len(), payload.len());
    }

    #[tokio::test]
    async fn small_json_body_is_preserved() {
        let body = log_body("request", &json_headers(), Body::from(r#"{"cost":5}"#))
            .await
            .unwrap();
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"cost":5}"#);
    }
}
