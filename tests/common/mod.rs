//! Shared helpers for integration tests.
#![allow(dead_code)]

use http::Method;
use trellis::{RequestDescriptor, ResponseBody, ResponseDescriptor};

pub fn request(method: Method, path: &str) -> RequestDescriptor {
    RequestDescriptor::new(method, path)
}

pub fn request_with_header(
    method: Method,
    path: &str,
    name: &str,
    value: &str,
) -> RequestDescriptor {
    let mut req = RequestDescriptor::new(method, path);
    req.headers
        .push((std::sync::Arc::from(name), value.to_string()));
    req
}

/// Drain any body shape to a string. Streams are pulled to completion.
pub fn body_string(response: ResponseDescriptor) -> String {
    match response.body {
        ResponseBody::Empty => String::new(),
        ResponseBody::Bytes(bytes) => String::from_utf8(bytes).unwrap(),
        ResponseBody::Stream(mut stream) => {
            let mut out = Vec::new();
            while let Some(chunk) = stream.next_chunk() {
                out.extend_from_slice(&chunk);
            }
            String::from_utf8(out).unwrap()
        }
    }
}

pub fn header<'a>(response: &'a ResponseDescriptor, name: &str) -> Option<&'a str> {
    response
        .headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
