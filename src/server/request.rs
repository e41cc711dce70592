//! Translation from `may_minihttp` requests into the core's request
//! descriptor.

use std::io::{self, Read};
use std::sync::Arc;

use http::Method;
use may_minihttp::Request;
use tracing::debug;

use crate::context::{Body, HeaderVec, RequestDescriptor};
use crate::router::ParamVec;

/// Parse an incoming transport request into a [`RequestDescriptor`].
///
/// The path is kept raw (percent-encoded) with the query string split off;
/// header names are lower-cased; the body is buffered here because this
/// transport hands it over as a stream tied to the connection buffer.
pub fn parse_request(req: Request) -> io::Result<RequestDescriptor> {
    let method = Method::from_bytes(req.method().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "unrecognized HTTP method"))?;

    let raw_path = req.path().to_string();
    let (path, query_str) = match raw_path.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q)),
        None => (raw_path.clone(), None),
    };

    let mut headers = HeaderVec::new();
    for h in req.headers().iter() {
        headers.push((
            Arc::from(h.name.to_ascii_lowercase().as_str()),
            String::from_utf8_lossy(h.value).to_string(),
        ));
    }

    let query = query_str.map(parse_query).unwrap_or_default();

    let mut body_buf = Vec::new();
    req.body().read_to_end(&mut body_buf)?;

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query_count = query.len(),
        body_bytes = body_buf.len(),
        "HTTP request parsed"
    );

    Ok(RequestDescriptor {
        method,
        path,
        headers,
        query,
        body: Body::from(body_buf),
    })
}

/// Decode a query string into parameters, preserving wire order so
/// last-write-wins lookups behave predictably for duplicate names.
pub fn parse_query(query: &str) -> ParamVec {
    let mut params = ParamVec::new();
    for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
        params.push((Arc::from(k.as_ref()), v.to_string()));
    }
    params
}
