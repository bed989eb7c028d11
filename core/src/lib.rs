//! Client library for the iubenda Consent Solution REST API.
//!
//! # Overview
//! Builds authenticated requests for creating and retrieving consent and
//! subject records, and maps the service's JSON onto typed domain objects
//! (`Consent`, `Subject`, `Proof`, `LegalNotice`).
//!
//! # Design
//! - Domain objects implement `Record`: lenient ingestion from a JSON object
//!   (unknown keys dropped) and serialization of only the fields that carry
//!   a value, in a fixed order.
//! - `ConsentClient` splits each operation into a `build_*` step (plain
//!   `HttpRequest`, no I/O) and a high-level call that runs the request
//!   through an injectable `Transport`.
//! - Diagnostics go through `tracing`; without a subscriber they are dropped.
//! - One call, one synchronous round-trip. Retries, pooling policy and
//!   timeouts belong to the transport.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod record;
pub mod timestamp;
pub mod types;

pub use client::{ConsentClient, ENDPOINT_URL};
pub use config::ClientConfig;
pub use error::{ConsentError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use record::{Fields, Input, Record};
pub use timestamp::{Timestamp, TimestampInput};
pub use types::{Consent, LegalNotice, Proof, Subject};
