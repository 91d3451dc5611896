use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const GEOCODE_PATH: &str = "/geocode/v1/json";

/// Keys with canned behaviour. Any other non-empty key is a trial account.
pub const QUOTA_EXCEEDED_KEY: &str = "quota-exceeded";
pub const SUSPENDED_KEY: &str = "suspended";
pub const PAID_KEY: &str = "paid";

/// Queries with canned result shapes.
pub const NO_RESULTS_QUERY: &str = "nowhere";
pub const SINGLE_RESULT_QUERY: &str = "single";
pub const SERVER_ERROR_QUERY: &str = "explode";

const RATE_LIMIT: u64 = 2500;
const RATE_REMAINING: u64 = 2499;
const RATE_RESET: u64 = 1_700_006_400;

pub fn app() -> Router {
    Router::new().route(GEOCODE_PATH, get(geocode))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn geocode(Query(params): Query<HashMap<String, String>>) -> Response {
    let key = params.get("key").map(String::as_str).unwrap_or_default();
    let query = params.get("q").map(|q| q.trim()).unwrap_or_default();
    tracing::info!(q = query, "geocode request");

    match key {
        "" => return failure(StatusCode::UNAUTHORIZED, "missing API key"),
        QUOTA_EXCEEDED_KEY => return failure(StatusCode::PAYMENT_REQUIRED, "quota exceeded"),
        SUSPENDED_KEY => return failure(StatusCode::FORBIDDEN, "suspended"),
        _ => {}
    }
    if query.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "missing query");
    }
    if query == SERVER_ERROR_QUERY {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "");
    }

    let results = if query == NO_RESULTS_QUERY {
        Vec::new()
    } else if let Some((lat, lng)) = parse_point(query) {
        vec![result(&format!("Point {lat},{lng}"), lat, lng, None)]
    } else {
        let country = params
            .get("countrycode")
            .and_then(|c| c.split(',').next())
            .map(str::to_string);
        vec![result(query, 52.5170365, 13.3888599, country)]
    };
    let total = results.len();
    let results = if query == SINGLE_RESULT_QUERY {
        results.into_iter().next().unwrap_or(Value::Null)
    } else {
        Value::Array(results)
    };

    let mut body = json!({
        "status": {"code": 200, "message": "OK"},
        "total_results": total,
        "results": results,
    });
    if params.get("add_request").map(String::as_str) == Some("1") {
        let mut echoed: serde_json::Map<String, Value> = params
            .iter()
            .filter(|(k, _)| k.as_str() != "key")
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        echoed.insert("key".to_string(), Value::String("hidden".to_string()));
        body["request"] = Value::Object(echoed);
    }

    let mut headers = HeaderMap::new();
    if key != PAID_KEY {
        body["rate"] = json!({"limit": RATE_LIMIT, "remaining": RATE_REMAINING, "reset": RATE_RESET});
        headers.insert("x-ratelimit-limit", HeaderValue::from(RATE_LIMIT));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(RATE_REMAINING));
        headers.insert("x-ratelimit-reset", HeaderValue::from(RATE_RESET));
    }

    (StatusCode::OK, headers, Json(body)).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    let mut status_obj = json!({"code": status.as_u16()});
    if !message.is_empty() {
        status_obj["message"] = Value::String(message.to_string());
    }
    (status, Json(json!({"status": status_obj, "total_results": 0, "results": []}))).into_response()
}

/// `lat,lng` in decimal degrees, as sent for reverse geocoding.
fn parse_point(query: &str) -> Option<(f64, f64)> {
    let (lat, lng) = query.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then_some((lat, lng))
}

fn result(formatted: &str, lat: f64, lng: f64, country_code: Option<String>) -> Value {
    let mut components = json!({"_type": "city"});
    if let Some(cc) = country_code {
        components["country_code"] = Value::String(cc);
    }
    json!({
        "formatted": formatted,
        "geometry": {"lat": lat, "lng": lng},
        "components": components,
        "confidence": 7,
    })
}
