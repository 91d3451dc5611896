//! Synchronous client core for OpenCage-compatible geocoding APIs.
//!
//! # Overview
//! Builds `HttpRequest` values and normalizes `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP GET, either by hand between `build_*` and `parse_response`, or
//! by handing a `Transport` to `GeocodeClient::forward` / `reverse`.
//!
//! # Design
//! - `GeocodeClient` is stateless: it holds only its config and a read-only
//!   credential resolver.
//! - Query strings come from a typed `ParameterSet`, so booleans, numbers and
//!   lists serialize the same way regardless of locale.
//! - Responses are probed field by field and normalized into a
//!   `ResultEnvelope` whose `results` is always a `Vec`.
//! - Status 402/403 surface as `GeocodeError::QuotaOrAccess`, distinct from
//!   other API failures, so callers can stop issuing calls.

pub mod client;
pub mod credentials;
pub mod encoding;
pub mod error;
pub mod http;
pub mod response;
pub mod types;

pub use client::{ClientConfig, GeocodeClient};
pub use credentials::{CredentialResolver, Environment, Scope, SystemEnvironment};
pub use encoding::{encode, ParamValue, ParameterSet};
pub use error::{GeocodeError, Result};
pub use http::{HttpRequest, HttpResponse, Transport};
pub use response::ResultsShape;
pub use types::{
    Coordinates, ForwardRequest, GeocodeOption, RateLimit, ResultEnvelope, ReverseRequest, Status,
};
