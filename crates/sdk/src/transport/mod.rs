//! Transport layer for the Redash SDK.

pub mod http;

pub use http::HttpTransport;
