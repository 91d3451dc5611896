//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes typed inputs with the expected query string or
//! error kind, or a simulated response with the envelope fields it must
//! normalize to.

use std::collections::BTreeSet;

use geocode_core::{
    ClientConfig, Coordinates, Environment, ForwardRequest, GeocodeClient, GeocodeError,
    GeocodeOption, HttpResponse, ParamValue, ParameterSet, ReverseRequest, Scope,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000/geocode/v1/json";

struct EmptyEnv;

impl Environment for EmptyEnv {
    fn lookup(&self, _scope: Scope, _name: &str) -> Option<String> {
        None
    }
}

fn client() -> GeocodeClient<EmptyEnv> {
    GeocodeClient::with_environment(ClientConfig::with_base_url(BASE_URL), EmptyEnv)
}

fn param_value(v: &Value) -> ParamValue {
    match v {
        Value::Null => ParamValue::Null,
        Value::Bool(b) => ParamValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ParamValue::Int(i),
            None => ParamValue::Float(n.as_f64().unwrap()),
        },
        Value::String(s) => ParamValue::Str(s.clone()),
        Value::Array(items) => ParamValue::List(items.iter().map(param_value).collect()),
        Value::Object(_) => panic!("objects are not parameter values"),
    }
}

fn extra(input: &Value) -> ParameterSet {
    input["extra"]
        .as_array()
        .map(|pairs| {
            pairs
                .iter()
                .map(|pair| (pair[0].as_str().unwrap().to_string(), param_value(&pair[1])))
                .collect()
        })
        .unwrap_or_default()
}

fn options(input: &Value) -> BTreeSet<GeocodeOption> {
    input
        .get("options")
        .map(|o| serde_json::from_value(o.clone()).unwrap())
        .unwrap_or_default()
}

fn assert_error_kind(name: &str, err: &GeocodeError, expected: &str) {
    let matched = match expected {
        "InvalidArgument" => matches!(err, GeocodeError::InvalidArgument(_)),
        "Protocol" => matches!(err, GeocodeError::Protocol(_)),
        "QuotaOrAccess" => matches!(err, GeocodeError::QuotaOrAccess { .. }),
        "Api" => matches!(err, GeocodeError::Api { .. }),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");
}

// ---------------------------------------------------------------------------
// Forward
// ---------------------------------------------------------------------------

#[test]
fn forward_test_vectors() {
    let raw = include_str!("../../test-vectors/forward.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];

        let request = ForwardRequest {
            query: input["query"].as_str().unwrap().to_string(),
            country_codes: input.get("country_codes").map(|c| serde_json::from_value(c.clone()).unwrap()),
            language: input["language"].as_str().map(str::to_string),
            limit: input["limit"].as_u64().map(|l| l as u32),
            bounds: input.get("bounds").map(|b| serde_json::from_value(b.clone()).unwrap()),
            proximity_latitude: input["proximity_latitude"].as_f64(),
            proximity_longitude: input["proximity_longitude"].as_f64(),
            options: options(input),
            extra: extra(input),
        };
        let result = c.build_forward(&request, case["api_key"].as_str().unwrap());

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_error_kind(name, &err, expected_error.as_str().unwrap());
        } else {
            let req = result.unwrap();
            let expected = format!("{BASE_URL}?{}", case["expected_query"].as_str().unwrap());
            assert_eq!(req.uri, expected, "{name}: uri");
        }
    }
}

// ---------------------------------------------------------------------------
// Reverse
// ---------------------------------------------------------------------------

#[test]
fn reverse_test_vectors() {
    let raw = include_str!("../../test-vectors/reverse.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];

        let coordinates = Coordinates::new(
            input["latitude"].as_f64().unwrap(),
            input["longitude"].as_f64().unwrap(),
        );

        if let Some(expected_error) = case.get("expected_error") {
            let err = coordinates.unwrap_err();
            assert_error_kind(name, &err, expected_error.as_str().unwrap());
            continue;
        }

        let request = ReverseRequest {
            coordinates: coordinates.unwrap(),
            language: input["language"].as_str().map(str::to_string),
            options: options(input),
            extra: extra(input),
        };
        let req = c.build_reverse(&request, case["api_key"].as_str().unwrap());
        let expected = format!("{BASE_URL}?{}", case["expected_query"].as_str().unwrap());
        assert_eq!(req.uri, expected, "{name}: uri");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    let request = c.build_forward(&ForwardRequest::new("Berlin"), "k").unwrap();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = HttpResponse {
            status: case["http_status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: case["body"].as_str().unwrap().to_string(),
        };
        let result = c.parse_response("Berlin", &request, response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_error_kind(name, &err, expected_error.as_str().unwrap());
            if let Some(message) = case["expected_message"].as_str() {
                assert_eq!(err.to_string(), message, "{name}: message");
            }
            continue;
        }

        let env = result.unwrap();
        let expected = &case["expected"];
        assert_eq!(env.query, "Berlin", "{name}: query");
        assert_eq!(env.request_uri, request.uri, "{name}: request uri");
        assert_eq!(env.has_results, expected["has_results"].as_bool().unwrap(), "{name}: has_results");
        assert_eq!(env.results.len() as u64, expected["result_count"].as_u64().unwrap(), "{name}: count");
        assert_eq!(env.total_results, expected["total_results"].as_u64(), "{name}: total_results");
        assert_eq!(env.rate.is_some(), expected["rate_present"].as_bool().unwrap(), "{name}: rate");
        assert_eq!(env.has_results, !env.results.is_empty(), "{name}: has_results invariant");
    }
}
