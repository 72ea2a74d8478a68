//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use causality_core::{
    ApiError, ApiStatusCheckParams, ApiStatusCheckResult, CausalityClient, ClearUidsResult,
    HttpMethod, HttpRequest, HttpResponse, RequestQrCodeResult,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn client_for(case: &Value) -> CausalityClient {
    let creds = &case["credentials"];
    CausalityClient::with_base_url(
        BASE_URL,
        creds["key"].as_str().unwrap_or("k1"),
        creds["token"].as_str().unwrap_or("t1"),
    )
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, expected["body"], "{name}: body");
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// Compare a parse outcome against either `expected_result` or `expected_error`.
fn assert_outcome<T>(name: &str, case: &Value, result: Result<T, ApiError>)
where
    T: DeserializeOwned + PartialEq + std::fmt::Debug,
{
    if let Some(expected_error) = case.get("expected_error") {
        let err = result.unwrap_err();
        let status = expected_error["status"].as_u64().unwrap() as u16;
        assert_eq!(err.status(), Some(status), "{name}: status");
        assert_eq!(err.to_string(), expected_error["message"].as_str().unwrap(), "{name}: message");
    } else {
        let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// requestQrCode
// ---------------------------------------------------------------------------

#[test]
fn request_qr_code_test_vectors() {
    for case in load(include_str!("../../test-vectors/request_qr_code.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case);

        let req = c.build_request_qr_code().unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_request_qr_code(simulated_response(&case));
        assert_outcome::<RequestQrCodeResult>(name, &case, result);
    }
}

// ---------------------------------------------------------------------------
// apiStatusCheck
// ---------------------------------------------------------------------------

#[test]
fn api_status_check_test_vectors() {
    for case in load(include_str!("../../test-vectors/api_status_check.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case);
        let input: ApiStatusCheckParams = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_api_status_check(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_api_status_check(simulated_response(&case));
        assert_outcome::<ApiStatusCheckResult>(name, &case, result);
    }
}

// ---------------------------------------------------------------------------
// clear_uids
// ---------------------------------------------------------------------------

#[test]
fn clear_uids_test_vectors() {
    for case in load(include_str!("../../test-vectors/clear_uids.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case);

        let req = c.build_clear_uids().unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_clear_uids(simulated_response(&case));
        assert_outcome::<ClearUidsResult>(name, &case, result);
    }
}
