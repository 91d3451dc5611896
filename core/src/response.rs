//! Response normalization and status classification.
//!
//! # Design
//! The body is read as an untyped `serde_json::Value` and every field is
//! probed rather than deserialized into a fixed struct, so a payload that
//! drops `total_results`, sends `results` as a lone object, or omits `rate`
//! still normalizes. The payload's `status.code` decides success; the HTTP
//! status is only recorded.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GeocodeError, Result};
use crate::http::HttpResponse;
use crate::types::{ResultEnvelope, Status};

/// The three shapes the `results` field is seen in.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsShape {
    Empty,
    Single(Value),
    Many(Vec<Value>),
}

impl ResultsShape {
    pub fn from_field(field: Option<&Value>) -> Self {
        match field {
            None | Some(Value::Null) => ResultsShape::Empty,
            Some(Value::Array(items)) => ResultsShape::Many(items.clone()),
            Some(other) => ResultsShape::Single(other.clone()),
        }
    }

    pub fn into_vec(self) -> Vec<Value> {
        match self {
            ResultsShape::Empty => Vec::new(),
            ResultsShape::Single(item) => vec![item],
            ResultsShape::Many(items) => items,
        }
    }
}

/// Parse the raw body. Empty, blank or `null` bodies count as missing.
pub fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Err(GeocodeError::Protocol("empty response body".to_string()));
    }
    let raw: Value = serde_json::from_str(body)
        .map_err(|e| GeocodeError::Protocol(format!("response body is not JSON: {e}")))?;
    if raw.is_null() {
        return Err(GeocodeError::Protocol("empty response body".to_string()));
    }
    Ok(raw)
}

/// Extract `status.code` and `status.message` from a parsed body.
pub fn read_status(raw: &Value) -> Result<Status> {
    let unexpected = || GeocodeError::Protocol("unexpected response format".to_string());
    let status = raw.get("status").filter(|s| s.is_object()).ok_or_else(unexpected)?;
    let code = status
        .get("code")
        .and_then(Value::as_u64)
        .and_then(|c| u16::try_from(c).ok())
        .ok_or_else(unexpected)?;
    let message = status
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(Status { code, message })
}

/// Map a non-200 payload status to its failure kind.
pub fn classify(status: &Status) -> Result<()> {
    match status.code {
        200 => Ok(()),
        402 | 403 => {
            warn!(code = status.code, message = ?status.message, "quota or access failure, stop issuing calls");
            Err(GeocodeError::QuotaOrAccess {
                code: status.code,
                message: status.message.clone(),
            })
        }
        code => Err(GeocodeError::Api {
            code,
            message: status.message.clone(),
        }),
    }
}

/// Turn a raw transport response into a `ResultEnvelope` or a failure.
pub fn normalize(query: &str, request_uri: &str, response: HttpResponse) -> Result<ResultEnvelope> {
    let raw = parse_body(&response.body)?;
    let status = read_status(&raw)?;
    classify(&status)?;

    let results = ResultsShape::from_field(raw.get("results")).into_vec();
    let total_results = raw.get("total_results").and_then(Value::as_u64);
    let rate = raw.get("rate").filter(|r| !r.is_null()).cloned();
    let response_headers = (!response.headers.is_empty()).then_some(response.headers);

    debug!(
        http_status = response.status,
        results = results.len(),
        total_results = ?total_results,
        "normalized geocoding response"
    );

    Ok(ResultEnvelope {
        query: query.to_string(),
        request_uri: request_uri.to_string(),
        http_status_code: Some(response.status),
        status,
        total_results,
        has_results: !results.is_empty(),
        results,
        rate,
        response_headers,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn ok_body(results: Option<Value>) -> Value {
        let mut body = json!({
            "status": {"code": 200, "message": "OK"},
            "total_results": 0,
        });
        if let Some(results) = results {
            body["results"] = results;
        }
        body
    }

    #[test]
    fn results_absent_becomes_empty() {
        let env = normalize("x", "u", response(200, ok_body(None))).unwrap();
        assert!(env.results.is_empty());
        assert!(!env.has_results);
        assert_eq!(env.total_results, Some(0));
    }

    #[test]
    fn results_empty_array_has_no_results() {
        let env = normalize("x", "u", response(200, ok_body(Some(json!([]))))).unwrap();
        assert!(!env.has_results);
    }

    #[test]
    fn results_null_becomes_empty() {
        let env = normalize("x", "u", response(200, ok_body(Some(Value::Null)))).unwrap();
        assert!(env.results.is_empty());
    }

    #[test]
    fn lone_result_object_becomes_one_element() {
        let env = normalize(
            "x",
            "u",
            response(200, ok_body(Some(json!({"formatted": "Berlin"})))),
        )
        .unwrap();
        assert_eq!(env.results, vec![json!({"formatted": "Berlin"})]);
        assert!(env.has_results);
    }

    #[test]
    fn result_array_is_used_as_is() {
        let env = normalize(
            "x",
            "u",
            response(200, ok_body(Some(json!([{"a": 1}, {"b": 2}])))),
        )
        .unwrap();
        assert_eq!(env.results.len(), 2);
        assert!(env.has_results);
    }

    #[test]
    fn rate_is_only_present_when_sent() {
        let env = normalize("x", "u", response(200, ok_body(None))).unwrap();
        assert!(env.rate.is_none());

        let mut body = ok_body(None);
        body["rate"] = json!({"limit": 2500, "remaining": 2499, "reset": 1700000000});
        let env = normalize("x", "u", response(200, body)).unwrap();
        assert_eq!(env.rate.unwrap()["remaining"], 2499);
    }

    #[test]
    fn total_results_may_be_absent() {
        let body = json!({"status": {"code": 200}});
        let env = normalize("x", "u", response(200, body)).unwrap();
        assert_eq!(env.total_results, None);
        assert_eq!(env.status.message, None);
    }

    #[test]
    fn http_status_is_recorded_but_payload_decides() {
        let env = normalize("x", "u", response(203, ok_body(None))).unwrap();
        assert_eq!(env.http_status_code, Some(203));
        assert_eq!(env.status.code, 200);
    }

    #[test]
    fn raw_body_is_kept_untouched() {
        let body = ok_body(Some(json!({"formatted": "Berlin"})));
        let env = normalize("x", "u", response(200, body.clone())).unwrap();
        assert_eq!(env.raw, body);
    }

    #[test]
    fn empty_body_is_protocol_error() {
        for body in ["", "   ", "null"] {
            let resp = HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: body.to_string(),
            };
            let err = normalize("x", "u", resp).unwrap_err();
            assert!(
                matches!(&err, GeocodeError::Protocol(m) if m == "empty response body"),
                "{body:?}: {err}"
            );
        }
    }

    #[test]
    fn non_json_body_is_protocol_error() {
        let resp = HttpResponse {
            status: 502,
            headers: Vec::new(),
            body: "<html>Bad Gateway</html>".to_string(),
        };
        assert!(matches!(
            normalize("x", "u", resp).unwrap_err(),
            GeocodeError::Protocol(_)
        ));
    }

    #[test]
    fn missing_status_is_unexpected_format() {
        for body in [json!({"results": []}), json!({"status": "ok"}), json!({"status": {}})] {
            let err = normalize("x", "u", response(200, body)).unwrap_err();
            assert!(matches!(&err, GeocodeError::Protocol(m) if m == "unexpected response format"));
        }
    }

    #[test]
    fn quota_and_access_codes_are_fatal() {
        for code in [402_u16, 403] {
            let body = json!({"status": {"code": code, "message": "quota exceeded"}});
            let err = normalize("x", "u", response(code, body)).unwrap_err();
            assert!(err.is_fatal());
            assert_eq!(err.to_string(), format!("OpenCage error {code}: quota exceeded"));
        }
    }

    #[test]
    fn other_codes_are_api_errors() {
        let body = json!({"status": {"code": 500}});
        let err = normalize("x", "u", response(500, body)).unwrap_err();
        assert!(matches!(err, GeocodeError::Api { code: 500, .. }));
        assert!(err.to_string().contains("500"));

        let body = json!({"status": {"code": 400, "message": "invalid coordinates"}});
        let err = normalize("x", "u", response(400, body)).unwrap_err();
        assert_eq!(err.to_string(), "OpenCage error 400: invalid coordinates");
    }

    #[test]
    fn headers_are_kept_when_present() {
        let resp = HttpResponse {
            status: 200,
            headers: vec![("X-RateLimit-Remaining".to_string(), "10".to_string())],
            body: ok_body(None).to_string(),
        };
        let env = normalize("x", "u", resp).unwrap();
        assert_eq!(env.rate_limit().and_then(|r| r.remaining), Some(10));
    }
}
