//! Response coercion: the deterministic mapping from what a handler
//! returned (or threw) to a concrete HTTP response.
//!
//! Handler outcomes are a closed tagged variant, [`Payload`], not
//! open-ended runtime inspection; the coercion table below is exhaustive
//! and each arm is individually testable.
//!
//! | payload | body | content-type |
//! |---|---|---|
//! | `None` (absent) | empty, status/headers preserved | untouched |
//! | `NoContent` (explicit nothing) | empty, `content-length` stripped | untouched |
//! | `Text` | UTF-8 text | untouched (caller's business) |
//! | `Html` | UTF-8 text | `text/html` if absent |
//! | `Json` | serialized JSON | `application/json` if absent |
//! | `Bytes` | raw bytes | `application/octet-stream` if absent |
//! | `Stream` | pull-based chunks | untouched |
//! | `Err(HttpError)` | JSON or text error body | negotiated via `accept` |

use std::sync::Arc;

use http::Method;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::context::{Context, HeaderVec, ResponseParts};
use crate::error::HttpError;
use crate::stream::{BodyStream, ChunkSource};

/// What a middleware or handler hands back to the pipeline.
#[derive(Debug)]
pub enum Payload {
    /// Nothing returned; whatever status/headers the handler set stand.
    None,
    /// Explicit "no body": callers use this to signal an intentionally
    /// empty response while still allowing a status override.
    NoContent,
    /// Plain text. No content type is assumed.
    Text(String),
    /// HTML text; `content-type: text/html` is set if absent.
    Html(String),
    /// JSON document; `content-type: application/json` is set if absent.
    Json(serde_json::Value),
    /// Raw bytes; `content-type: application/octet-stream` if absent.
    Bytes(Vec<u8>),
    /// Lazy chunk sequence, drained pull-by-pull by the transport.
    Stream(BodyStream),
}

impl Payload {
    /// Serialize any `Serialize` value into a JSON payload.
    pub fn json<T: Serialize>(value: &T) -> Result<Payload, HttpError> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self {
        Payload::Json(v)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(b)
    }
}

/// The result of running a middleware chain or handler.
pub type Outcome = Result<Payload, HttpError>;

/// The finalized response handed to the transport adapter.
#[derive(Debug)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: ResponseBody,
}

#[derive(Debug)]
pub enum ResponseBody {
    Empty,
    Bytes(Vec<u8>),
    Stream(BodyStream),
}

/// Finalize a pipeline outcome into the one response this request gets.
pub(crate) fn finalize(ctx: &mut Context, outcome: Outcome) -> ResponseDescriptor {
    match outcome {
        Ok(payload) => finalize_payload(ctx, payload),
        Err(err) => finalize_error(ctx, err),
    }
}

fn finalize_payload(ctx: &mut Context, payload: Payload) -> ResponseDescriptor {
    // Serialize before taking the response parts so a failure can still
    // fall through to the error renderer.
    let (body, default_ct): (ResponseBody, Option<&'static str>) = match payload {
        Payload::None => (ResponseBody::Empty, None),
        Payload::NoContent => {
            ctx.remove_header("content-length");
            (ResponseBody::Empty, None)
        }
        Payload::Text(s) => (ResponseBody::Bytes(s.into_bytes()), None),
        Payload::Html(s) => (ResponseBody::Bytes(s.into_bytes()), Some("text/html")),
        Payload::Json(value) => match serde_json::to_vec(&value) {
            Ok(bytes) => (ResponseBody::Bytes(bytes), Some("application/json")),
            Err(err) => return finalize_error(ctx, err.into()),
        },
        Payload::Bytes(bytes) => (ResponseBody::Bytes(bytes), Some("application/octet-stream")),
        Payload::Stream(stream) => (ResponseBody::Stream(stream), None),
    };

    let ResponseParts {
        status,
        mut headers,
    } = ctx.take_response();
    if let Some(ct) = default_ct {
        set_if_absent(&mut headers, "content-type", ct);
    }

    debug!(
        request_id = %ctx.request_id(),
        status = status,
        "Response finalized"
    );

    ResponseDescriptor {
        status,
        headers,
        body,
    }
}

fn finalize_error(ctx: &mut Context, err: HttpError) -> ResponseDescriptor {
    let status = err.status();
    if status >= 500 {
        error!(
            request_id = %ctx.request_id(),
            status = status,
            message = %err.message(),
            cause = ?err.cause(),
            "Request failed"
        );
    } else {
        warn!(
            request_id = %ctx.request_id(),
            status = status,
            message = %err.message(),
            "Request rejected"
        );
    }

    let ResponseParts { mut headers, .. } = ctx.take_response();

    if !err.allow().is_empty() {
        let allow = err
            .allow()
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case("allow"));
        headers.push((Arc::from("allow"), allow));
    }

    // Internal detail (cause chains) is only rendered in debug mode.
    let accept = ctx.header("accept").unwrap_or("");
    let wants_text = (accept.contains("text/html") || accept.contains("text/plain"))
        && !accept.contains("application/json");

    let body = if wants_text {
        let mut text = err.message().to_string();
        if ctx.debug() {
            for cause in cause_chain(&err) {
                text.push_str("\ncaused by: ");
                text.push_str(&cause);
            }
        }
        set_header(&mut headers, "content-type", "text/plain");
        text.into_bytes()
    } else {
        let mut doc = json!({ "status": status, "message": err.message() });
        if ctx.debug() {
            let chain = cause_chain(&err);
            if !chain.is_empty() {
                doc["cause"] = json!(chain);
            }
        }
        set_header(&mut headers, "content-type", "application/json");
        doc.to_string().into_bytes()
    };

    ResponseDescriptor {
        status,
        headers,
        body: ResponseBody::Bytes(body),
    }
}

fn cause_chain(err: &HttpError) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = err.cause().map(|c| c as &dyn std::error::Error);
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}

fn set_if_absent(headers: &mut HeaderVec, name: &str, value: &str) {
    if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)) {
        headers.push((Arc::from(name), value.to_string()));
    }
}

fn set_header(headers: &mut HeaderVec, name: &str, value: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((Arc::from(name), value.to_string()));
}

// ---------------------------------------------------------------------------
// Handler-facing helpers
// ---------------------------------------------------------------------------

/// Respond with nothing. With no code and a still-default 200 status the
/// response becomes 204; a status the handler already overrode is kept. An
/// explicit code outside the valid HTTP range falls back to 204. Any
/// `content-length` header is stripped, since a no-content response must
/// not carry one.
pub fn no_content(ctx: &mut Context, code: Option<u16>) -> Payload {
    let status = match code {
        Some(c) if (100..=599).contains(&c) => c,
        Some(_) => 204,
        None if ctx.status() == 200 => 204,
        None => ctx.status(),
    };
    ctx.set_status(status);
    ctx.remove_header("content-length");
    Payload::NoContent
}

/// Build a 3xx redirect: `location` header verbatim, plus a minimal HTML
/// meta-refresh body for clients that ignore headers. The embedded URL is
/// escaped for a double-quoted attribute (quotes become `%22`); the header
/// value is not altered.
pub fn redirect(ctx: &mut Context, location: &str, status: u16) -> Payload {
    let status = if (300..=399).contains(&status) {
        status
    } else {
        302
    };
    ctx.set_status(status);
    ctx.set_header("location", location);
    let escaped = location.replace('"', "%22");
    Payload::Html(format!(
        "<!DOCTYPE html><html><head><meta http-equiv=\"refresh\" content=\"0; url={escaped}\"></head></html>"
    ))
}

/// An HTML response; `content-type: text/html` unless the handler set one.
pub fn html(body: impl Into<String>) -> Payload {
    Payload::Html(body.into())
}

/// Stream byte-like items with the identity serializer.
pub fn stream<I>(iter: I) -> Payload
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Into<Vec<u8>> + Send + 'static,
{
    Payload::Stream(BodyStream::from_iter(iter))
}

/// Stream a pull source through a pluggable chunk serializer.
pub fn stream_with<S, F>(source: S, serialize: F) -> Payload
where
    S: ChunkSource + 'static,
    F: FnMut(S::Item) -> Option<Vec<u8>> + Send + 'static,
{
    Payload::Stream(BodyStream::new(source, serialize))
}

/// Signal 103 Early Hints. This transport cannot emit informational
/// responses, so the signal is a logged no-op; adapters that can, may.
pub fn early_hints(ctx: &Context, links: &[&str]) {
    debug!(
        request_id = %ctx.request_id(),
        links = ?links,
        "Early hints unsupported by transport; skipping"
    );
}
