//! Tests for response coercion: the payload table, helpers, and error
//! rendering.

use http::Method;
use serde_json::{json, Value};
use trellis::{html, no_content, redirect, stream, App, Context, HttpError, Outcome, Payload};

mod common;
use common::{body_string, header, request, request_with_header};

#[test]
fn test_text_payload_sets_no_content_type() {
    let mut app = App::new();
    app.get("/t", |_ctx: &mut Context| -> Outcome {
        Ok(Payload::Text("plain".to_string()))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/t"));
    assert_eq!(response.status, 200);
    assert_eq!(header(&response, "content-type"), None);
    assert_eq!(body_string(response), "plain");
}

#[test]
fn test_json_payload_sets_content_type_if_absent() {
    let mut app = App::new();
    app.get("/j", |_ctx: &mut Context| -> Outcome {
        Ok(Payload::Json(json!({ "ok": true })))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/j"));
    assert_eq!(header(&response, "content-type"), Some("application/json"));
    let value: Value = serde_json::from_str(&body_string(response)).unwrap();
    assert_eq!(value, json!({ "ok": true }));
}

#[test]
fn test_caller_content_type_wins() {
    let mut app = App::new();
    app.get("/custom", |ctx: &mut Context| -> Outcome {
        ctx.set_header("content-type", "application/problem+json");
        Ok(Payload::Json(json!({ "ok": false })))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/custom"));
    assert_eq!(
        header(&response, "content-type"),
        Some("application/problem+json")
    );
}

#[test]
fn test_html_helper_sets_text_html() {
    let mut app = App::new();
    app.get("/h", |_ctx: &mut Context| -> Outcome {
        Ok(html("<h1>hi</h1>"))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/h"));
    assert_eq!(header(&response, "content-type"), Some("text/html"));
    assert_eq!(body_string(response), "<h1>hi</h1>");
}

#[test]
fn test_absent_payload_preserves_status_and_headers() {
    let mut app = App::new();
    app.get("/n", |ctx: &mut Context| -> Outcome {
        ctx.set_status(201);
        ctx.set_header("x-marker", "kept");
        Ok(Payload::None)
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/n"));
    assert_eq!(response.status, 201);
    assert_eq!(header(&response, "x-marker"), Some("kept"));
    assert_eq!(body_string(response), "");
}

#[test]
fn test_no_content_defaults_to_204() {
    let mut app = App::new();
    app.get("/nc", |ctx: &mut Context| -> Outcome {
        ctx.set_header("content-length", "12");
        Ok(no_content(ctx, None))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/nc"));
    assert_eq!(response.status, 204);
    // 204 must not carry a content-length.
    assert_eq!(header(&response, "content-length"), None);
    assert_eq!(body_string(response), "");
}

#[test]
fn test_no_content_preserves_overridden_status() {
    let mut app = App::new();
    app.get("/gone", |ctx: &mut Context| -> Outcome {
        ctx.set_status(404);
        Ok(no_content(ctx, None))
    })
    .unwrap();

    assert_eq!(app.handle(request(Method::GET, "/gone")).status, 404);
}

#[test]
fn test_no_content_sanitizes_invalid_code() {
    let mut app = App::new();
    app.get("/weird", |ctx: &mut Context| -> Outcome {
        Ok(no_content(ctx, Some(9999)))
    })
    .unwrap();

    assert_eq!(app.handle(request(Method::GET, "/weird")).status, 204);
}

#[test]
fn test_redirect_escapes_quotes_in_body_only() {
    let mut app = App::new();
    app.get("/old", |ctx: &mut Context| -> Outcome {
        Ok(redirect(ctx, "https://example.com/a\"b", 301))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/old"));
    assert_eq!(response.status, 301);
    // Header verbatim; only the HTML attribute gets the %22 escape.
    assert_eq!(
        header(&response, "location"),
        Some("https://example.com/a\"b")
    );
    assert_eq!(header(&response, "content-type"), Some("text/html"));
    let body = body_string(response);
    assert!(body.contains("url=https://example.com/a%22b"));
    assert!(!body.contains("a\"b"));
}

#[test]
fn test_redirect_rejects_non_3xx_code() {
    let mut app = App::new();
    app.get("/odd", |ctx: &mut Context| -> Outcome {
        Ok(redirect(ctx, "/elsewhere", 200))
    })
    .unwrap();

    assert_eq!(app.handle(request(Method::GET, "/odd")).status, 302);
}

#[test]
fn test_error_renders_json_by_default() {
    let mut app = App::new();
    app.get("/err", |_ctx: &mut Context| -> Outcome {
        Err(HttpError::new(409, "conflicting edit"))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/err"));
    assert_eq!(response.status, 409);
    assert_eq!(header(&response, "content-type"), Some("application/json"));
    let value: Value = serde_json::from_str(&body_string(response)).unwrap();
    assert_eq!(value["status"], 409);
    assert_eq!(value["message"], "conflicting edit");
}

#[test]
fn test_error_renders_text_when_negotiated() {
    let mut app = App::new();
    app.get("/err", |_ctx: &mut Context| -> Outcome {
        Err(HttpError::new(400, "bad input"))
    })
    .unwrap();

    let response = app.handle(request_with_header(
        Method::GET,
        "/err",
        "accept",
        "text/plain",
    ));
    assert_eq!(header(&response, "content-type"), Some("text/plain"));
    assert_eq!(body_string(response), "bad input");
}

#[test]
fn test_error_cause_hidden_unless_debug() {
    fn failing(_ctx: &mut Context) -> Outcome {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        Err(HttpError::internal("storage failed").with_cause(io))
    }

    let mut app = App::new();
    app.get("/err", failing).unwrap();
    let body = body_string(app.handle(request(Method::GET, "/err")));
    assert!(!body.contains("disk on fire"));

    let mut app = App::new();
    app.set_debug(true);
    app.get("/err", failing).unwrap();
    let body = body_string(app.handle(request(Method::GET, "/err")));
    assert!(body.contains("disk on fire"));
}

#[test]
fn test_stream_payload_emits_chunks_in_order() {
    let mut app = App::new();
    app.get("/s", |_ctx: &mut Context| -> Outcome {
        Ok(stream(["<p>", "1", "</p>"]))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/s"));
    assert_eq!(response.status, 200);
    assert_eq!(header(&response, "content-type"), None);
    assert_eq!(body_string(response), "<p>1</p>");
}

#[test]
fn test_bytes_payload_defaults_to_octet_stream() {
    let mut app = App::new();
    app.get("/b", |_ctx: &mut Context| -> Outcome {
        Ok(Payload::Bytes(vec![1, 2, 3]))
    })
    .unwrap();

    let response = app.handle(request(Method::GET, "/b"));
    assert_eq!(
        header(&response, "content-type"),
        Some("application/octet-stream")
    );
}
