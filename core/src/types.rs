//! Request and result types.
//!
//! # Design
//! Requests are plain value objects with public fields plus builder-style
//! setters; structural validation happens once, when the client turns them
//! into a parameter set. `Coordinates` is the exception: its ranges are
//! checked on construction, so a `ReverseRequest` can never hold an
//! out-of-range point.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoding::{ParamValue, ParameterSet};
use crate::error::{GeocodeError, Result};
use crate::http::find_header;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeocodeError::InvalidArgument(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeocodeError::InvalidArgument(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Presence-only switches understood by the API. Each one that is set adds
/// its parameter with value `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeOption {
    Abbreviate,
    AddRequest,
    AddressOnly,
    NoAnnotations,
    NoDedupe,
    NoRecord,
    Pretty,
    RoadInfo,
}

impl GeocodeOption {
    pub const ALL: [GeocodeOption; 8] = [
        GeocodeOption::Abbreviate,
        GeocodeOption::AddRequest,
        GeocodeOption::AddressOnly,
        GeocodeOption::NoAnnotations,
        GeocodeOption::NoDedupe,
        GeocodeOption::NoRecord,
        GeocodeOption::Pretty,
        GeocodeOption::RoadInfo,
    ];

    /// Query parameter name for this option.
    pub fn param_name(self) -> &'static str {
        match self {
            GeocodeOption::Abbreviate => "abbrv",
            GeocodeOption::AddRequest => "add_request",
            GeocodeOption::AddressOnly => "address_only",
            GeocodeOption::NoAnnotations => "no_annotations",
            GeocodeOption::NoDedupe => "no_dedupe",
            GeocodeOption::NoRecord => "no_record",
            GeocodeOption::Pretty => "pretty",
            GeocodeOption::RoadInfo => "roadinfo",
        }
    }
}

/// Forward geocoding input: free-text query plus optional filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardRequest {
    pub query: String,
    pub country_codes: Option<Vec<String>>,
    pub language: Option<String>,
    pub limit: Option<u32>,
    /// `minLon, minLat, maxLon, maxLat`; must hold exactly four values.
    pub bounds: Option<Vec<f64>>,
    pub proximity_latitude: Option<f64>,
    pub proximity_longitude: Option<f64>,
    pub options: BTreeSet<GeocodeOption>,
    /// Extra parameters merged after the typed ones. `q` and `key` are ignored.
    pub extra: ParameterSet,
}

impl ForwardRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn country_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.country_codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn bounds(mut self, bounds: impl Into<Vec<f64>>) -> Self {
        self.bounds = Some(bounds.into());
        self
    }

    pub fn proximity(mut self, latitude: f64, longitude: f64) -> Self {
        self.proximity_latitude = Some(latitude);
        self.proximity_longitude = Some(longitude);
        self
    }

    pub fn option(mut self, option: GeocodeOption) -> Self {
        self.options.insert(option);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.extra.insert(key, value);
        self
    }
}

/// Reverse geocoding input.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseRequest {
    pub coordinates: Coordinates,
    pub language: Option<String>,
    pub options: BTreeSet<GeocodeOption>,
    pub extra: ParameterSet,
}

impl ReverseRequest {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            language: None,
            options: BTreeSet::new(),
            extra: ParameterSet::new(),
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn option(mut self, option: GeocodeOption) -> Self {
        self.options.insert(option);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.extra.insert(key, value);
        self
    }
}

/// The payload's own `status` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub code: u16,
    pub message: Option<String>,
}

/// Normalized response returned to callers.
///
/// `results` is always a sequence and `has_results` always equals
/// `!results.is_empty()`, whatever shape the payload used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub query: String,
    pub request_uri: String,
    pub http_status_code: Option<u16>,
    pub status: Status,
    pub total_results: Option<u64>,
    pub has_results: bool,
    pub results: Vec<Value>,
    pub rate: Option<Value>,
    pub response_headers: Option<Vec<(String, String)>>,
    pub raw: Value,
}

impl ResultEnvelope {
    /// Rate-limit metadata from the `X-RateLimit-*` response headers, if any
    /// were sent.
    pub fn rate_limit(&self) -> Option<RateLimit> {
        let headers = self.response_headers.as_deref()?;
        let read = |name: &str| find_header(headers, name).and_then(|v| v.trim().parse().ok());
        let rate = RateLimit {
            limit: read("X-RateLimit-Limit"),
            remaining: read("X-RateLimit-Remaining"),
            reset: read("X-RateLimit-Reset"),
        };
        if rate.limit.is_none() && rate.remaining.is_none() && rate.reset.is_none() {
            return None;
        }
        Some(rate)
    }
}

/// Report-only view of the rate-limit headers. `reset` is a unix timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimit {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset: Option<u64>,
}
