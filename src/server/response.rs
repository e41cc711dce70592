//! Writing finalized response descriptors back to the transport.

use may_minihttp::Response;
use serde_json::json;

use crate::response::{ResponseBody, ResponseDescriptor};

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        415 => "Unsupported Media Type",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write a finalized descriptor to the wire.
///
/// A streaming body is drained pull-by-pull here: this transport buffers
/// the whole response, so "ready for the next chunk" is immediate, but the
/// source still produces strictly on demand.
pub fn write_response(res: &mut Response, response: ResponseDescriptor) {
    res.status_code(response.status as usize, status_reason(response.status));
    for (name, value) in &response.headers {
        // The transport wants complete `name: value` lines with 'static
        // lifetime; dynamic header lines are leaked per response.
        let line = format!("{name}: {value}").into_boxed_str();
        res.header(Box::leak(line));
    }
    match response.body {
        ResponseBody::Empty => {}
        ResponseBody::Bytes(bytes) => res.body_vec(bytes),
        ResponseBody::Stream(mut stream) => {
            let mut out = Vec::new();
            while let Some(chunk) = stream.next_chunk() {
                out.extend_from_slice(&chunk);
            }
            res.body_vec(out);
        }
    }
}

/// Minimal JSON error for failures before a request ever reaches the
/// dispatcher (unparseable method, body read failure).
pub fn write_error(res: &mut Response, status: u16, message: &str) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(
        json!({ "status": status, "message": message })
            .to_string()
            .into_bytes(),
    );
}
