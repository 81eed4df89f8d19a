// src/core/net.rs
// Transport collaborator: one blocking request/response exchange at a time.

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, SET_COOKIE};

use crate::config::options::SiteConfig;
use crate::error::TransportError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// What the engine needs back from one exchange.
#[derive(Clone, Debug, Default)]
pub struct RawResponse {
    pub status: u16,
    /// Declared `Content-Type`, parameters included.
    pub content_type: String,
    /// Every `Set-Cookie` header, verbatim.
    pub set_cookies: Vec<String>,
    pub body: String,
}

pub trait Transport {
    fn send(
        &mut self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<RawResponse, TransportError>;
}

/// `reqwest` blocking client. Cookies are handled by the session, not here.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(site: &SiteConfig) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(site.timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(
        &mut self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<RawResponse, TransportError> {
        let mut req = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url).form(form),
        };
        for (k, v) in headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let res = req.send()?;
        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status { status: status.as_u16(), url: s!(url) });
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let set_cookies = res
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        // text() decodes with the declared charset (the panel serves ISO-8859-1)
        let body = res.text()?;

        Ok(RawResponse { status: status.as_u16(), content_type, set_cookies, body })
    }
}

/// `name=value` part of each `Set-Cookie` header, attributes dropped.
pub fn cookie_pairs(set_cookies: &[String]) -> Vec<String> {
    set_cookies
        .iter()
        .filter_map(|c| c.split(';').next())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
