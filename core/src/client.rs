//! Authenticated client for the consent service's REST API.
//!
//! # Design
//! `ConsentClient` holds the API key, the base URL and a shared `Transport`.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` without I/O, and a high-level method that sends it through
//! `request` and maps the JSON answer onto the domain types.
//!
//! Writes share one result contract: a literal `false` body becomes
//! `ConsentError::Rejected`, anything other than an object becomes
//! `ConsentError::UnexpectedResponse`. The client itself holds no mutable
//! state; per-call mutation is confined to the caller's domain objects.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ConsentError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::record::{string_field, take_present, Fields, Record};
use crate::timestamp;
use crate::types::{Consent, Subject};

pub const ENDPOINT_URL: &str = "https://consent.iubenda.com";

const API_KEY_HEADER: &str = "ApiKey";

#[derive(Clone)]
pub struct ConsentClient {
    api_key: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl ConsentClient {
    /// Client using the default `ureq` transport.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_transport(api_key, Arc::new(UreqTransport::default()))
    }

    /// Fails with `InvalidApiKey` when the key is empty.
    pub fn with_transport(api_key: impl Into<String>, transport: Arc<dyn Transport>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ConsentError::InvalidApiKey);
        }
        Ok(Self {
            api_key,
            base_url: ENDPOINT_URL.to_string(),
            transport,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout());
        let client = Self::with_transport(config.api_key.clone(), Arc::new(transport))?;
        Ok(client.with_base_url(&config.base_url))
    }

    /// Point the client at another host, e.g. a local mock of the service.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_get_consent(&self, id: &str) -> Result<HttpRequest> {
        Ok(self.get(self.resource_url("consent", id)?))
    }

    pub fn build_create_consent(&self, consent: &Consent) -> Result<HttpRequest> {
        self.write(HttpMethod::Post, format!("{}/consent/", self.base_url), consent)
    }

    pub fn build_list_consents(&self, params: &[(&str, &str)]) -> Result<HttpRequest> {
        let mut url = Url::parse(&format!("{}/consent/", self.base_url))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(self.get(url.into()))
    }

    pub fn build_get_subject(&self, id: &str) -> Result<HttpRequest> {
        Ok(self.get(self.resource_url("subjects", id)?))
    }

    pub fn build_create_subject(&self, subject: &Subject) -> Result<HttpRequest> {
        self.write(HttpMethod::Post, format!("{}/subjects/", self.base_url), subject)
    }

    /// Fails with `MissingField("id")` when the subject has no id.
    pub fn build_update_subject(&self, subject: &Subject) -> Result<HttpRequest> {
        let id = subject
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ConsentError::MissingField("id"))?;
        self.write(HttpMethod::Put, self.resource_url("subjects", id)?, subject)
    }

    /// `{base_url}/{collection}/{id}` with `id` percent-encoded as one segment.
    fn resource_url(&self, collection: &str, id: &str) -> Result<String> {
        let mut url = Url::parse(&format!("{}/{collection}/", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| ConsentError::Config(format!("base url cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(id);
        Ok(url.into())
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    fn write<R: Record>(&self, method: HttpMethod, url: String, record: &R) -> Result<HttpRequest> {
        let body = serde_json::to_string(&record.to_fields()).map_err(ConsentError::Serialization)?;
        Ok(HttpRequest {
            method,
            url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Authenticate, send and decode. An empty body decodes to `null`.
    pub fn request(&self, mut request: HttpRequest) -> Result<Value> {
        request
            .headers
            .push((API_KEY_HEADER.to_string(), self.api_key.clone()));

        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.send(&request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");

        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(ConsentError::Deserialization)
    }

    /// `GET /consent/{id}`
    pub fn get_consent(&self, id: &str) -> Result<Consent> {
        let response = self.request(self.build_get_consent(id)?)?;
        Consent::from_value("consent", response)
    }

    /// `POST /consent/`
    ///
    /// Fills in the id, timestamp and subject id assigned by the service on
    /// the consent passed in, and hands the same consent back.
    pub fn create_consent<'a>(&self, consent: &'a mut Consent) -> Result<&'a mut Consent> {
        let response = self.request(self.build_create_consent(consent)?)?;
        let mut fields = accepted("create_consent", response)?;

        // The consent is only touched once the whole answer has been read.
        let id = fields.remove("id").ok_or(ConsentError::MissingField("id"))?;
        let id = string_field("id", id)?;
        let subject_id = fields
            .remove("subject_id")
            .map(|value| string_field("subject_id", value))
            .transpose()?;
        let ts = take_present(&mut fields, "timestamp")
            .map(|value| timestamp::from_value("timestamp", value))
            .transpose()?;

        if let Some(subject_id) = subject_id {
            consent.subject.get_or_insert_with(Subject::default).id = subject_id;
        }
        if ts.is_some() {
            consent.timestamp = ts;
        }
        consent.id = id;

        debug!(id = consent.id.as_deref().unwrap_or_default(), "consent created");
        Ok(consent)
    }

    /// `GET /consent/?{params}`, in the order the service returns them.
    pub fn list_consents(&self, params: &[(&str, &str)]) -> Result<Vec<Consent>> {
        let response = self.request(self.build_list_consents(params)?)?;
        let Value::Array(items) = response else {
            return Err(ConsentError::UnexpectedResponse {
                operation: "list_consents",
                expected: "an array",
            });
        };
        items
            .into_iter()
            .map(|item| Consent::from_value("consent", item))
            .collect()
    }

    /// `GET /subjects/{id}`
    pub fn get_subject(&self, id: &str) -> Result<Subject> {
        let response = self.request(self.build_get_subject(id)?)?;
        Subject::from_value("subject", response)
    }

    /// `POST /subjects/`, merging the stored subject back into `subject`.
    pub fn create_subject<'a>(&self, subject: &'a mut Subject) -> Result<&'a mut Subject> {
        let response = self.request(self.build_create_subject(subject)?)?;
        subject.configure(accepted("create_subject", response)?)?;
        Ok(subject)
    }

    /// `PUT /subjects/{id}`, merging the stored subject back into `subject`.
    pub fn update_subject<'a>(&self, subject: &'a mut Subject) -> Result<&'a mut Subject> {
        let response = self.request(self.build_update_subject(subject)?)?;
        subject.configure(accepted("update_subject", response)?)?;
        Ok(subject)
    }
}

impl fmt::Debug for ConsentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsentClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Map non-success status codes to the appropriate `ConsentError` variant.
fn check_status(response: &HttpResponse) -> Result<()> {
    match response.status {
        200..=299 => Ok(()),
        401 | 403 => {
            warn!(status = response.status, "api key rejected");
            Err(ConsentError::Unauthorized)
        }
        404 => Err(ConsentError::NotFound),
        status => {
            warn!(status, "unexpected status from consent service");
            Err(ConsentError::HttpError {
                status,
                body: response.body.clone(),
            })
        }
    }
}

/// The object a write answered with, or the matching error.
fn accepted(operation: &'static str, response: Value) -> Result<Fields> {
    match response {
        Value::Object(fields) => Ok(fields),
        Value::Bool(false) => {
            warn!(operation, "write rejected by the service");
            Err(ConsentError::Rejected { operation })
        }
        _ => Err(ConsentError::UnexpectedResponse {
            operation,
            expected: "an object",
        }),
    }
}
