use crate::error::Result;
use std::io::Read;

/// Streaming body of a successful GET
pub type HttpBody = Box<dyn Read>;

/// Outbound HTTP used by the download stage.
///
/// Implementations return `Err` for transport failures and for any
/// non-success status, so callers only ever see a readable body on success.
pub trait HttpClientPort {
    fn get(&self, url: &str) -> Result<HttpBody>;
}
