//! Stateless request builder and response parser for the geocoding API.
//!
//! # Design
//! `GeocodeClient` holds only its configuration and a credential resolver and
//! carries no mutable state between calls. Each direction is split into a
//! `build_*` method that produces an `HttpRequest` and `parse_response`, which
//! consumes the `HttpResponse`. `forward` and `reverse` chain the two through a
//! caller-supplied `Transport` for callers that do not want to drive the
//! round-trip themselves.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::credentials::{CredentialResolver, Environment, SystemEnvironment, DEFAULT_API_KEY_ENV};
use crate::encoding::{format_float, ParameterSet};
use crate::error::{GeocodeError, Result};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::response::normalize;
use crate::types::{Coordinates, ForwardRequest, GeocodeOption, ResultEnvelope, ReverseRequest};

/// Parameter names the builder always sets itself.
pub const RESERVED_KEYS: [&str; 2] = ["q", "key"];

const MIN_QUERY_CHARS: usize = 2;
const MAX_LIMIT: u32 = 100;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Geocoding endpoint (default: <https://api.opencagedata.com/geocode/v1/json>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as the `User-Agent` header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Environment variable consulted when no explicit key is passed
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    "https://api.opencagedata.com/geocode/v1/json".to_string()
}

fn default_user_agent() -> String {
    format!("geocode-core/{}", env!("CARGO_PKG_VERSION"))
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }
}

/// Synchronous, stateless client for the geocoding API.
#[derive(Debug, Clone)]
pub struct GeocodeClient<E = SystemEnvironment> {
    config: ClientConfig,
    credentials: CredentialResolver<E>,
}

impl GeocodeClient<SystemEnvironment> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_environment(config, SystemEnvironment)
    }

    pub fn with_defaults() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<E: Environment> GeocodeClient<E> {
    pub fn with_environment(mut config: ClientConfig, env: E) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let credentials = CredentialResolver::new(env, &config.api_key_env);
        Self {
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve the API key from `explicit` or the environment.
    pub fn resolve_key(&self, explicit: Option<&str>) -> Result<String> {
        self.credentials.resolve(explicit)
    }

    /// Validate a forward request and build its parameter set, without the key.
    pub fn forward_params(&self, request: &ForwardRequest) -> Result<ParameterSet> {
        let query = request.query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(GeocodeError::InvalidArgument(format!(
                "query must contain at least {MIN_QUERY_CHARS} characters"
            )));
        }

        let mut params = ParameterSet::new();

        if let Some(codes) = &request.country_codes {
            let codes: Vec<String> = codes
                .iter()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect();
            if codes.is_empty() {
                return Err(GeocodeError::InvalidArgument(
                    "country codes must contain at least one non-empty code".to_string(),
                ));
            }
            params.insert("countrycode", codes.join(","));
        }

        if let Some(language) = non_blank(request.language.as_deref()) {
            params.insert("language", language);
        }

        if let Some(limit) = request.limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(GeocodeError::InvalidArgument(format!(
                    "limit must be between 1 and {MAX_LIMIT}, got {limit}"
                )));
            }
            params.insert("limit", limit);
        }

        if let Some(bounds) = &request.bounds {
            if bounds.len() != 4 {
                return Err(GeocodeError::InvalidArgument(format!(
                    "bounds must contain exactly 4 values (minLon, minLat, maxLon, maxLat), got {}",
                    bounds.len()
                )));
            }
            if bounds.iter().any(|v| !v.is_finite()) {
                return Err(GeocodeError::InvalidArgument(
                    "bounds must contain finite numbers".to_string(),
                ));
            }
            params.insert("bounds", bounds.clone());
        }

        match (request.proximity_latitude, request.proximity_longitude) {
            (Some(lat), Some(lon)) => {
                let point = Coordinates::new(lat, lon)?;
                params.insert("proximity", vec![point.latitude(), point.longitude()]);
            }
            (None, None) => {}
            _ => {
                return Err(GeocodeError::InvalidArgument(
                    "proximity latitude and longitude must be supplied together".to_string(),
                ))
            }
        }

        apply_options(&mut params, request.options.iter().copied());
        merge_extra(&mut params, &request.extra);
        params.insert("q", query);
        Ok(params)
    }

    /// Build a reverse request's parameter set, without the key.
    pub fn reverse_params(&self, request: &ReverseRequest) -> ParameterSet {
        let mut params = ParameterSet::new();
        if let Some(language) = non_blank(request.language.as_deref()) {
            params.insert("language", language);
        }
        apply_options(&mut params, request.options.iter().copied());
        merge_extra(&mut params, &request.extra);
        params.insert("q", reverse_query(&request.coordinates));
        params
    }

    pub fn build_forward(&self, request: &ForwardRequest, api_key: &str) -> Result<HttpRequest> {
        let params = self.forward_params(request)?;
        Ok(self.build_request(params, api_key))
    }

    pub fn build_reverse(&self, request: &ReverseRequest, api_key: &str) -> HttpRequest {
        let params = self.reverse_params(request);
        self.build_request(params, api_key)
    }

    /// Normalize a response. `query` is the `q` value the request was built with.
    pub fn parse_response(
        &self,
        query: &str,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<ResultEnvelope> {
        normalize(query, &request.uri, response)
    }

    /// Resolve the key, build, execute through `transport` and normalize.
    #[instrument(skip_all, fields(query = %request.query.trim()))]
    pub fn forward<T: Transport>(
        &self,
        transport: &T,
        request: &ForwardRequest,
        api_key: Option<&str>,
    ) -> Result<ResultEnvelope> {
        let params = self.forward_params(request)?;
        let key = self.resolve_key(api_key)?;
        let http = self.build_request(params, &key);
        let response = transport.get(&http)?;
        self.parse_response(request.query.trim(), &http, response)
    }

    #[instrument(skip_all, fields(lat = request.coordinates.latitude(), lon = request.coordinates.longitude()))]
    pub fn reverse<T: Transport>(
        &self,
        transport: &T,
        request: &ReverseRequest,
        api_key: Option<&str>,
    ) -> Result<ResultEnvelope> {
        let params = self.reverse_params(request);
        let key = self.resolve_key(api_key)?;
        let http = self.build_request(params, &key);
        let response = transport.get(&http)?;
        self.parse_response(&reverse_query(&request.coordinates), &http, response)
    }

    /// Inject the key last and attach the fixed headers.
    fn build_request(&self, mut params: ParameterSet, api_key: &str) -> HttpRequest {
        params.insert("key", api_key);
        let request = HttpRequest {
            uri: format!("{}?{}", self.config.base_url, params.encode()),
            headers: vec![
                ("User-Agent".to_string(), self.config.user_agent.clone()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
        };
        debug!(uri = %request.redacted_uri(), "built geocoding request");
        request
    }
}

/// `lat,lon` with culture-invariant formatting.
pub fn reverse_query(coordinates: &Coordinates) -> String {
    format!(
        "{},{}",
        format_float(coordinates.latitude()),
        format_float(coordinates.longitude())
    )
}

fn apply_options(params: &mut ParameterSet, options: impl Iterator<Item = GeocodeOption>) {
    for option in options {
        params.insert(option.param_name(), 1_i64);
    }
}

/// Merge caller extensions, dropping reserved keys.
fn merge_extra(params: &mut ParameterSet, extra: &ParameterSet) {
    for (key, value) in extra.iter() {
        if RESERVED_KEYS.contains(&key) {
            debug!(key, "ignoring reserved key in extra parameters");
            continue;
        }
        params.insert(key, value.clone());
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
