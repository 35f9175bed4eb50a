//! Status endpoint: JSON snapshot and HTML dashboard over HTTP/1.1 (hyper).
//!
//! - [`StatusServer`] non-blocking accept, one request per connection
//! - [`Route`] what a request asked for
//! - [`Exchange`] outcome of one serviced connection

mod http;

pub use http::{Exchange, Route, StatusServer};
