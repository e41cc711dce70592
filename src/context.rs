//! Per-request context: the request descriptor plus the response under
//! construction, threaded through every middleware and handler.
//!
//! A [`Context`] is exclusively owned by its request's coroutine. Nothing in
//! it is shared across requests; the only shared state in the framework is
//! the frozen route tree, which is read-only while serving.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;

use crate::error::HttpError;
use crate::ids::RequestId;
use crate::router::ParamVec;

/// Maximum inline headers before heap allocation. Most requests carry ≤16.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage: lower-cased name plus value.
///
/// Insertion order is preserved; name identity is case-insensitive through
/// the accessors. Names are `Arc<str>` because the common ones repeat
/// across requests and clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Lazy request body: nothing, buffered bytes, or an unread transport
/// stream. Reading happens at most once; the result replaces the source.
pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl Body {
    /// Drain the body into memory. Idempotent: a second call returns the
    /// buffered bytes. Transport read failures surface as status-500
    /// [`HttpError`]s.
    pub fn read_to_vec(&mut self) -> Result<&[u8], HttpError> {
        if let Body::Reader(reader) = self {
            let mut buf = Vec::new();
            match reader.read_to_end(&mut buf) {
                Ok(_) => *self = Body::Bytes(buf),
                Err(err) => {
                    *self = Body::Empty;
                    return Err(HttpError::transport(err));
                }
            }
        }
        match self {
            Body::Empty => Ok(&[]),
            Body::Bytes(bytes) => Ok(bytes),
            Body::Reader(_) => unreachable!("reader drained above"),
        }
    }

    /// Drain and parse as JSON.
    pub fn read_json(&mut self) -> Result<serde_json::Value, HttpError> {
        let bytes = self.read_to_vec()?;
        serde_json::from_slice(bytes)
            .map_err(|err| HttpError::new(400, "malformed JSON body").with_cause(err))
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Empty
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(b) => write!(f, "Body::Bytes({} bytes)", b.len()),
            Body::Reader(_) => f.write_str("Body::Reader(..)"),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Body::Empty
        } else {
            Body::Bytes(bytes)
        }
    }
}

impl From<Box<dyn Read + Send>> for Body {
    fn from(reader: Box<dyn Read + Send>) -> Self {
        Body::Reader(reader)
    }
}

/// Read-only request input, produced by a transport adapter.
///
/// `path` is the raw, still percent-encoded path with the query string
/// split off; decoding happens per captured token at parameter-bind time.
#[derive(Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    /// Lower-cased header names.
    pub headers: HeaderVec,
    /// Query parameters in wire order, already form-decoded.
    pub query: ParamVec,
    pub body: Body,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderVec::new(),
            query: ParamVec::new(),
            body: Body::Empty,
        }
    }
}

/// The response under construction, mutated in place by middleware and
/// handlers and finalized exactly once.
#[derive(Debug)]
pub struct ResponseParts {
    pub status: u16,
    pub headers: HeaderVec,
}

impl Default for ResponseParts {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
        }
    }
}

/// Per-request state threaded through the pipeline.
#[derive(Debug)]
pub struct Context {
    request_id: RequestId,
    method: Method,
    path: String,
    original_path: String,
    headers: HeaderVec,
    query: ParamVec,
    params: ParamVec,
    body: Body,
    response: ResponseParts,
    debug: bool,
}

impl Context {
    pub fn new(request: RequestDescriptor, debug: bool) -> Self {
        let request_id = RequestId::from_header_or_new(
            request
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("x-request-id"))
                .map(|(_, v)| v.as_str()),
        );
        Self {
            request_id,
            method: request.method,
            original_path: request.path.clone(),
            path: request.path,
            headers: request.headers,
            query: request.query,
            params: ParamVec::new(),
            body: request.body,
            response: ResponseParts::default(),
            debug,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path as the current dispatch tree sees it. Inside a mounted
    /// child this is the prefix-stripped path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path as the transport received it, regardless of mounting.
    pub fn original_path(&self) -> &str {
        &self.original_path
    }

    /// Swap in a rewritten path, returning the previous one so the caller
    /// can restore it after delegation.
    pub(crate) fn rewrite_path(&mut self, path: String) -> String {
        std::mem::replace(&mut self.path, path)
    }

    /// Get a request header by name (case-insensitive per RFC 7230).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a path parameter. Last write wins for duplicate names at
    /// different depths.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter. Last write wins (`?limit=10&limit=20` → `20`).
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    pub(crate) fn bind_params(&mut self, params: ParamVec) {
        self.params = params;
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Status of the response under construction (default 200).
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.response.status = status;
    }

    /// Add or replace a response header (case-insensitive identity,
    /// insertion order preserved for distinct names).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.response
            .headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.response.headers.push((Arc::from(name), value.into()));
    }

    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn remove_header(&mut self, name: &str) {
        self.response
            .headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub(crate) fn take_response(&mut self) -> ResponseParts {
        std::mem::take(&mut self.response)
    }

    /// Whether error bodies may include cause chains.
    pub fn debug(&self) -> bool {
        self.debug
    }
}
