//! Integration tests for parameter encoding and request construction.
//!
//! These tests verify the public encoders working together:
//! - Query items and bodies are mutually exclusive per method
//! - Multipart fragments and bodies have the exact wire format
//! - Typed and untyped parameters encode identically
//! - Request construction fails with an absent value, never a panic

use bytes::Bytes;
use http_relay::encoding::generate_boundary;
use http_relay::interceptors::{FormDataInterceptor, JsonInterceptor};
use http_relay::{
    BodyBuilder, FormDataParameter, InterceptorGroup, Method, Parameters, QueryBuilder,
    RequestBuilder, Scheme,
};
use serde::Serialize;
use serde_json::json;

fn sample() -> Parameters {
    [("a", json!([1, 2])), ("b", json!("x")), ("c", json!(true))]
        .into_iter()
        .collect()
}

// ============================================================================
// Method eligibility
// ============================================================================

#[test]
fn test_query_eligible_methods_never_have_bodies() {
    let params = sample();
    let fields = vec![FormDataParameter::text("n", "v")];

    for method in [Method::Get, Method::Head, Method::Delete] {
        assert!(BodyBuilder::json(method, &params).is_none());
        assert!(BodyBuilder::form_url_encoded(method, &params).is_none());
        assert!(BodyBuilder::form_data(method, "b", &fields).is_none());
        assert!(QueryBuilder::build(method, &params).is_some());
    }
}

#[test]
fn test_body_eligible_methods_never_have_query_items() {
    let params = sample();

    for method in Method::ALL {
        if method.is_query_eligible() {
            continue;
        }
        assert!(QueryBuilder::build(method, &params).is_none(), "{method}");
        assert!(BodyBuilder::json(method, &params).is_some(), "{method}");
    }
}

// ============================================================================
// Query encoding
// ============================================================================

#[test]
fn test_array_values_repeat_the_key_in_order() {
    let params: Parameters = [("a", json!([1, 2]))].into_iter().collect();
    let items = QueryBuilder::build(Method::Get, &params).unwrap();

    assert_eq!(
        items,
        vec![
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string())
        ]
    );
}

#[test]
fn test_typed_and_untyped_parameters_encode_identically() {
    #[derive(Serialize)]
    struct Filter {
        a: Vec<u32>,
        b: &'static str,
        c: bool,
    }

    let typed = Parameters::typed(&Filter {
        a: vec![1, 2],
        b: "x",
        c: true,
    })
    .unwrap();

    assert_eq!(
        QueryBuilder::build(Method::Get, &typed),
        QueryBuilder::build(Method::Get, &sample())
    );
    assert_eq!(
        BodyBuilder::json(Method::Post, &typed),
        BodyBuilder::json(Method::Post, &sample())
    );
}

#[test]
fn test_typed_non_object_parameters_have_no_query() {
    let typed = Parameters::typed(&vec![1, 2, 3]).unwrap();
    assert!(QueryBuilder::build(Method::Get, &typed).is_none());
    assert!(BodyBuilder::form_url_encoded(Method::Post, &typed).is_none());
    // JSON bodies accept any shape.
    assert_eq!(
        BodyBuilder::json(Method::Post, &typed).unwrap(),
        Bytes::from_static(b"[1,2,3]")
    );
}

#[test]
fn test_form_url_encoded_body_is_not_percent_encoded() {
    let params: Parameters = [("q", json!("a b")), ("tags", json!(["x", "y"]))]
        .into_iter()
        .collect();
    let body = BodyBuilder::form_url_encoded(Method::Post, &params).unwrap();
    assert_eq!(body.as_ref(), b"q=a b&tags=x&tags=y");
}

// ============================================================================
// Multipart encoding
// ============================================================================

#[test]
fn test_single_text_field_form_body() {
    let body =
        BodyBuilder::form_data(Method::Post, "b", &[FormDataParameter::text("n", "v")]).unwrap();
    assert_eq!(
        body.as_ref(),
        b"--b\r\nContent-Disposition: form-data; name=\"n\"\r\n\r\nv\r\n--b--\r\n"
    );
}

#[test]
fn test_form_body_rejects_empty_inputs() {
    let fields = vec![FormDataParameter::text("n", "v")];
    assert!(BodyBuilder::form_data(Method::Post, "", &fields).is_none());
    assert!(BodyBuilder::form_data(Method::Post, "b", &[]).is_none());
}

#[test]
fn test_unrenderable_fields_are_skipped() {
    let fields = vec![
        FormDataParameter::text("", "dropped"),
        FormDataParameter::text("kept", "1"),
    ];
    let body = BodyBuilder::form_data(Method::Put, "b", &fields).unwrap();
    assert_eq!(
        body.as_ref(),
        b"--b\r\nContent-Disposition: form-data; name=\"kept\"\r\n\r\n1\r\n--b--\r\n"
    );
}

#[test]
fn test_every_field_kind_needs_a_boundary() {
    let fields = [
        FormDataParameter::text("n", "v"),
        FormDataParameter::json("n", &json!({"k": 1})).unwrap(),
        FormDataParameter::file("n", "f.bin", "application/octet-stream", vec![1u8, 2]),
    ];
    for field in &fields {
        assert!(field.render("").is_none());
        assert!(field.render("b").is_some());
    }
}

#[test]
fn test_file_field_keeps_binary_payload() {
    let field = FormDataParameter::file("upload", "a.bin", "application/octet-stream", vec![0u8, 255]);
    let rendered = field.render("b").unwrap();

    let mut expected = b"--b\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"a.bin\"\r\nContent-Type: \"application/octet-stream\"\r\n\r\n".to_vec();
    expected.extend_from_slice(&[0, 255]);
    expected.extend_from_slice(b"\r\n");
    assert_eq!(rendered, expected);
}

#[test]
fn test_generated_boundaries_differ() {
    assert_ne!(generate_boundary(), generate_boundary());
}

// ============================================================================
// Request construction
// ============================================================================

#[test]
fn test_empty_host_yields_no_request() {
    let request = RequestBuilder::new(Scheme::Https, Method::Get, "")
        .path("x")
        .build();
    assert!(request.is_none());
}

#[test]
fn test_interceptors_see_fixed_routing() {
    let boundary = generate_boundary();
    let group = InterceptorGroup::new()
        .with(JsonInterceptor)
        .with(FormDataInterceptor::new(boundary.clone()));

    let request = RequestBuilder::new(Scheme::Http, Method::Post, "localhost")
        .port(Some(8080))
        .path(["api", "items"])
        .body(Bytes::from_static(b"{}"))
        .interceptor(Some(&group))
        .build()
        .unwrap();

    assert_eq!(request.url().as_str(), "http://localhost:8080/api/items");
    // Later interceptors win.
    assert_eq!(
        request.header("content-type").unwrap(),
        format!("multipart/form-data; boundary={boundary}")
    );
    assert_eq!(request.body().unwrap().as_ref(), b"{}");
}
