use crate::app::ports::{HttpBody, HttpClientPort};
use crate::error::{ImportError, Result};
use reqwest::blocking::Client;

/// Blocking reqwest client with default headers and timeouts
pub struct ReqwestHttp {
    client: Client,
}

impl Default for ReqwestHttp {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestHttp {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl HttpClientPort for ReqwestHttp {
    fn get(&self, url: &str) -> Result<HttpBody> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ImportError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(Box::new(resp))
    }
}
