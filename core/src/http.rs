//! HTTP request/response descriptors and the transport seam.
//!
//! # Design
//! `ConsentClient` builds `HttpRequest` values as plain data and hands them
//! to a `Transport`, which performs the I/O and returns an `HttpResponse`.
//! Transports report status codes as data; the client decides what a 404 or
//! a 500 means, so every transport behaves the same from the caller's side.
//!
//! `UreqTransport` is the default blocking transport. Tests inject closures
//! through the blanket `Transport` impl.

use std::time::Duration;

use crate::error::{ConsentError, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL, query string included.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes requests on behalf of `ConsentClient`.
///
/// Implementations must return non-2xx responses as `Ok`; only failures
/// that prevent a response (DNS, connection, TLS, timeout) are `Err`.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync,
{
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent pools connections, so one transport should be shared across
/// calls rather than rebuilt per request.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = match request.method {
                    HttpMethod::Put => self.agent.put(url),
                    _ => self.agent.post(url),
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ConsentError::Transport(Box::new(e)))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ConsentError::Transport(Box::new(e)))?;

        Ok(HttpResponse { status, headers, body })
    }
}
