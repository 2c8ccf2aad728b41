//! Upstream message source adapters.

mod http_source;

pub use http_source::HttpMessageSource;
