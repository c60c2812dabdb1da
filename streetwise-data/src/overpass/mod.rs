//! Overpass API adapter: wire decoding, retry and the HTTP source.

pub mod response;
pub mod retry;
pub mod source;

pub use response::{OverpassResponse, WireElement, WireMember, WirePoint, decode_elements};
pub use retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, RetryPolicy};
pub use source::{DEFAULT_OVERPASS_URL, DEFAULT_USER_AGENT, HttpOverpassSource, OverpassSourceConfig};
