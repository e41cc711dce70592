//! Transport adapter for `may_minihttp`.
//!
//! Everything here sits outside the core contract: it translates the
//! transport's native request into a [`RequestDescriptor`]
//! (`request`), hands it to the frozen [`App`](crate::App), and writes the
//! resulting descriptor back to the wire (`response`), draining streaming
//! bodies pull-by-pull. Alternative transports implement the same two
//! translations against the core and never touch the dispatch internals.
//!
//! [`RequestDescriptor`]: crate::RequestDescriptor

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query, parse_request};
pub use response::{write_error, write_response};
pub use service::{health_endpoint, AppService};
